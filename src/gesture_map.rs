use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::error::GestureError;
use crate::types::GestureMap;

const PATH_SEPARATORS: &[char] = &['/', '\\'];
const KEY_JOIN: char = '_';

/// Turn a folder path such as `a/b\c/` into the search key `a_b_c`.
///
/// Returns an empty string when the path consists of separators only.
pub fn normalize_path_key(raw: &str) -> String {
    raw.trim_matches(PATH_SEPARATORS)
        .chars()
        .map(|c| if PATH_SEPARATORS.contains(&c) { KEY_JOIN } else { c })
        .collect()
}

/// Parse the text of a gesture map file.
///
/// Each entry line is `<path_key> <label text...> <class_id>`. Blank lines and
/// `#` comments are ignored; malformed lines are logged and skipped.
pub fn parse_gesture_map(content: &str) -> GestureMap {
    let mut map = GestureMap::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < 2 {
            warn!("Line {}: cannot parse mapping line: {}", line_num, trimmed);
            continue;
        }

        let class_id = match tokens[tokens.len() - 1].parse::<u32>() {
            Ok(id) => id,
            Err(_) => {
                warn!(
                    "Line {}: no integer class id at end of line: {}",
                    line_num, trimmed
                );
                continue;
            }
        };

        let key = normalize_path_key(tokens[0]);
        if key.is_empty() {
            warn!("Line {}: empty folder key: {}", line_num, trimmed);
            continue;
        }

        if let Some(previous) = map.insert(key.clone(), class_id) {
            if previous != class_id {
                warn!(
                    "Line {}: key '{}' remapped from class {} to {}",
                    line_num, key, previous, class_id
                );
            }
        }
    }

    map
}

/// Load the folder-key mapping from `path`.
///
/// A missing file or a file without a single valid entry is a configuration error.
pub fn load_gesture_map(path: &Path) -> Result<GestureMap, GestureError> {
    if !path.is_file() {
        return Err(GestureError::MapNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|e| GestureError::io(path, e))?;
    let map = parse_gesture_map(&content);
    if map.is_empty() {
        return Err(GestureError::EmptyMap(path.to_path_buf()));
    }

    info!(
        "Loaded {} folder mappings from {}",
        map.len(),
        path.display()
    );
    Ok(map)
}
