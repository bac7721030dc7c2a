use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::ClassTable;
use crate::error::GestureError;

pub const MAP_HEADER: &str =
    "# Auto-generated gesture_map.txt\n# Format: [path_key] [gesture_name] [class_id]\n\n";

/// Canonical form of a gesture name: lower case, without `-`, `_` or spaces.
///
/// `"Open-Pinch"` and `"open pinch"` both become `"openpinch"`.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect()
}

/// Reverse lookup from canonical gesture name to class id
#[derive(Debug, Clone, Default)]
pub struct NameLookup {
    ids: HashMap<String, u32>,
}

impl NameLookup {
    pub fn from_classes(classes: &ClassTable) -> Self {
        let mut ids = HashMap::with_capacity(classes.len());
        let mut origins: HashMap<String, &str> = HashMap::with_capacity(classes.len());

        for (id, name) in classes.iter() {
            let key = normalize_name(name);
            if let Some(previous) = origins.insert(key.clone(), name) {
                if previous != name {
                    warn!(
                        "Gesture names '{}' and '{}' both normalize to '{}'",
                        previous, name, key
                    );
                }
            }
            ids.insert(key, id);
        }

        Self { ids }
    }

    pub fn resolve(&self, name: &str) -> Option<u32> {
        self.ids.get(&normalize_name(name)).copied()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapBuildStats {
    pub converted: usize,
    pub failed: usize,
}

/// Turn a `<path_key> <gesture name>` list into gesture map text.
///
/// Comments and blank lines are carried over. Lines whose name cannot be
/// resolved are reported and left out.
pub fn build_gesture_map(input: &str, lookup: &NameLookup) -> (String, MapBuildStats) {
    let mut output = String::from(MAP_HEADER);
    let mut stats = MapBuildStats::default();

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            output.push_str(line);
            output.push('\n');
            continue;
        }

        let (path_key, name) = match line.split_once(char::is_whitespace) {
            Some((path_key, name)) if !name.trim().is_empty() => (path_key, name.trim()),
            _ => {
                warn!("Skipping line without a gesture name: {}", line);
                stats.failed += 1;
                continue;
            }
        };

        match lookup.resolve(name) {
            Some(class_id) => {
                output.push_str(&format!("{} {} {}\n", path_key, name, class_id));
                stats.converted += 1;
            }
            None => {
                warn!(
                    "Unknown gesture name '{}' (normalized: '{}')",
                    name,
                    normalize_name(name)
                );
                stats.failed += 1;
            }
        }
    }

    (output, stats)
}

/// Read the gesture list at `input` and write the gesture map to `output`
pub fn make_gesture_map(
    input: &Path,
    output: &Path,
    classes: &ClassTable,
) -> Result<MapBuildStats, GestureError> {
    let content = fs::read_to_string(input).map_err(|e| GestureError::io(input, e))?;
    info!("Reading '{}', writing '{}'", input.display(), output.display());

    let lookup = NameLookup::from_classes(classes);
    let (map_text, stats) = build_gesture_map(&content, &lookup);
    fs::write(output, map_text).map_err(|e| GestureError::io(output, e))?;

    Ok(stats)
}
