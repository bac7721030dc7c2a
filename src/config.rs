use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GestureError;

/// Command-line arguments for converting a YOLO pose dataset into a gesture detection dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Root of the source pose dataset (contains images/ and labels/)
    #[arg(short = 'p', long = "pose_dir", default_value = "yolo_hand_pose_dataset")]
    pub pose_dir: PathBuf,

    /// Root of the gesture dataset to create
    #[arg(short = 'o', long = "output_dir", default_value = "yolo_gesture_dataset")]
    pub output_dir: PathBuf,

    /// Folder-key to class id mapping file
    #[arg(short = 'm', long = "map_file", default_value = "gesture_map.txt")]
    pub map_file: PathBuf,

    /// Optional JSON file with the class id to gesture name table
    #[arg(long = "classes")]
    pub classes: Option<PathBuf>,

    /// Directory for rendered verification images
    #[arg(long = "verify_dir", default_value = "gesture_verification_images")]
    pub verify_dir: PathBuf,

    /// Number of validation images to render for inspection (0 disables)
    #[arg(long = "verify_count", default_value_t = 5)]
    pub verify_count: usize,

    /// Seed for sampling verification images
    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,
}

/// Command-line arguments for building the gesture map file from a free-text gesture list.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct MapArgs {
    /// Hand-written list of `<path_key> <gesture name>` lines
    #[arg(short = 'i', long = "input", default_value = "original_gestures.txt")]
    pub input: PathBuf,

    /// Gesture map file to write
    #[arg(short = 'o', long = "output", default_value = "gesture_map.txt")]
    pub output: PathBuf,

    /// Optional JSON file with the class id to gesture name table
    #[arg(long = "classes")]
    pub classes: Option<PathBuf>,
}

// Built-in gesture classes. Id 6 is intentionally unused.
const DEFAULT_CLASSES: &[(u32, &str)] = &[
    (0, "open palm"),
    (1, "index up"),
    (2, "0-Shape"),
    (3, "fist"),
    (4, "thumb up"),
    (5, "thumb down"),
    (7, "L-shape"),
    (8, "thumb left"),
    (9, "thumb right"),
    (10, "OK"),
    (11, "Close-Pinch"),
    (12, "Open-Pinch"),
    (13, "heart-single-hand"),
    (14, "heart-two-hand"),
];

/// Class id to gesture name table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassTable(BTreeMap<u32, String>);

impl Default for ClassTable {
    fn default() -> Self {
        DEFAULT_CLASSES
            .iter()
            .map(|&(id, name)| (id, name.to_string()))
            .collect()
    }
}

impl FromIterator<(u32, String)> for ClassTable {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        ClassTable(iter.into_iter().collect())
    }
}

impl ClassTable {
    /// Load a table from a JSON object such as `{"0": "open palm", "3": "fist"}`
    pub fn from_json_file(path: &Path) -> Result<Self, GestureError> {
        if !path.is_file() {
            return Err(GestureError::ClassTableNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| GestureError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| GestureError::ClassTable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Use the table at `path` if given, the built-in table otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, GestureError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    pub fn max_id(&self) -> Option<u32> {
        self.0.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
