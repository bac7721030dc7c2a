use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::ClassTable;
use crate::error::GestureError;
use crate::types::GestureMap;

/// Render the dataset.yaml content.
///
/// `nc` covers the highest id of both the class table and the gesture map;
/// ids without a name get a `MISSING_CLASS_<id>` placeholder.
pub fn dataset_yaml_content(classes: &ClassTable, gesture_map: &GestureMap) -> String {
    let nc = classes
        .max_id()
        .into_iter()
        .chain(gesture_map.max_id())
        .max()
        .map_or(0, |max_id| max_id + 1);

    let names: Vec<String> = (0..nc)
        .map(|id| match classes.name(id) {
            Some(name) => format!("'{}'", name.replace('\'', "''")),
            None => format!("'MISSING_CLASS_{}'", id),
        })
        .collect();

    let mut yaml_content = String::from("# YOLO gesture detection dataset\n\n");
    yaml_content.push_str("# paths (relative to this file)\n");
    yaml_content.push_str("train: ./images/train\nval: ./images/val\n\n");
    yaml_content.push_str("# classes\n");
    yaml_content.push_str(&format!("nc: {}\n", nc));
    yaml_content.push_str(&format!("names: [{}]\n", names.join(", ")));
    yaml_content
}

/// Create the dataset.yaml file for YOLO training under `dest_root`
pub fn create_dataset_yaml(
    dest_root: &Path,
    classes: &ClassTable,
    gesture_map: &GestureMap,
) -> Result<PathBuf, GestureError> {
    fs::create_dir_all(dest_root).map_err(|e| GestureError::io(dest_root, e))?;

    let dataset_yaml_path = dest_root.join("dataset.yaml");
    let yaml_content = dataset_yaml_content(classes, gesture_map);
    File::create(&dataset_yaml_path)
        .map(BufWriter::new)
        .and_then(|mut writer| {
            writer.write_all(yaml_content.as_bytes())?;
            writer.flush()
        })
        .map_err(|e| GestureError::io(&dataset_yaml_path, e))?;

    Ok(dataset_yaml_path)
}
