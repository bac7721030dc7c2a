//! YOLO hand-pose to gesture detection dataset converter
//!
//! This library rewrites a keypoint-annotated YOLO pose dataset into a plain
//! detection dataset whose class ids are inferred from folder keys embedded in
//! the image file names.

pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod gesture_map;
pub mod io;
pub mod matcher;
pub mod names;
pub mod store;
pub mod types;
pub mod utils;
pub mod verify;

// Re-export commonly used types and functions
pub use config::{Args, ClassTable, MapArgs};
pub use conversion::transcode_label;
pub use dataset::process_dataset;
pub use error::GestureError;
pub use gesture_map::{load_gesture_map, normalize_path_key, parse_gesture_map};
pub use io::create_dataset_yaml;
pub use matcher::KeyMatcher;
pub use names::{build_gesture_map, make_gesture_map, normalize_name, NameLookup};
pub use store::{DatasetStore, LocalStore, MemoryStore};
pub use types::{GestureMap, ProcessingStats, Split};
pub use verify::render_verification;
