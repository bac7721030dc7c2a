use log::{info, warn};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::conversion::convert_images_in_parallel;
use crate::error::GestureError;
use crate::matcher::KeyMatcher;
use crate::store::DatasetStore;
use crate::types::{GestureMap, Outcome, ProcessingStats, SkipReason, Split, SplitDirs};
use crate::utils::create_progress_bar;

/// Create the image and label directories of `split` under `root`.
///
/// Existing directories are reused as they are.
pub fn setup_split_directories<S: DatasetStore>(
    store: &S,
    root: &Path,
    split: Split,
) -> Result<SplitDirs, GestureError> {
    let dirs = SplitDirs::new(root, split);
    for dir in [&dirs.images_dir, &dirs.labels_dir] {
        store
            .create_dir_all(dir)
            .map_err(|e| GestureError::io(dir, e))?;
    }
    Ok(dirs)
}

/// Split image paths into those whose stem is unique and those sharing a stem
/// with another image (`a.png` and `a.jpg`). Both keep the input order.
pub fn partition_by_stem(images: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut stem_counts: HashMap<Option<&OsStr>, usize> = HashMap::with_capacity(images.len());
    for image in &images {
        *stem_counts.entry(image.file_stem()).or_insert(0) += 1;
    }
    let shared: Vec<bool> = images
        .iter()
        .map(|image| stem_counts[&image.file_stem()] > 1)
        .collect();

    let (mut unique, mut ambiguous) = (Vec::new(), Vec::new());
    for (image, is_shared) in images.into_iter().zip(shared) {
        if is_shared {
            ambiguous.push(image);
        } else {
            unique.push(image);
        }
    }
    (unique, ambiguous)
}

/// Convert every split of the pose dataset at `source_root` into a gesture
/// dataset at `dest_root`.
///
/// An image is only eligible when no other image in its split shares its
/// stem, since both would pair with the same label file. Per-image problems
/// are counted as skips. Only failing to create the destination directories
/// aborts the walk.
pub fn process_dataset<S: DatasetStore>(
    store: &S,
    source_root: &Path,
    dest_root: &Path,
    gesture_map: &GestureMap,
) -> Result<ProcessingStats, GestureError> {
    let matcher = KeyMatcher::new(gesture_map);
    let mut stats = ProcessingStats::new();

    for split in Split::ALL {
        info!("Processing {} split...", split);

        let source = SplitDirs::new(source_root, split);
        let dest = setup_split_directories(store, dest_root, split)?;

        let images = match store.list_files(&source.images_dir) {
            Ok(images) => images,
            Err(e) => {
                warn!(
                    "Failed to list images in {}: {}",
                    source.images_dir.display(),
                    e
                );
                continue;
            }
        };
        if images.is_empty() {
            warn!("No images found in {}", source.images_dir.display());
            continue;
        }

        let total = images.len();
        let (images, ambiguous) = partition_by_stem(images);
        for image in &ambiguous {
            warn!(
                "Skipping {}: another image shares its stem",
                image.display()
            );
            stats.record(split, Outcome::Skipped(SkipReason::AmbiguousStem));
        }

        let pb = create_progress_bar(images.len() as u64, split);
        let outcomes = convert_images_in_parallel(store, &images, &source, &dest, &matcher, &pb);
        pb.finish_with_message(format!("{} processing complete", split.label()));

        for outcome in outcomes {
            stats.record(split, outcome);
        }
        info!(
            "Converted {} of {} {} images",
            stats.converted(split),
            total,
            split
        );
    }

    Ok(stats)
}
