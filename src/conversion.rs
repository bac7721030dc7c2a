use log::debug;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::matcher::KeyMatcher;
use crate::store::DatasetStore;
use crate::types::{Outcome, SkipReason, SplitDirs};

// Tokens per pose label line up to and including the bounding box
const BBOX_END: usize = 5;

/// Convert pose label text into detection label text for `class_id`.
///
/// Every non-blank line `cls cx cy w h kp...` becomes `class_id cx cy w h`. The
/// bounding box tokens are copied verbatim; the source class and keypoints are
/// dropped. Lines too short to carry a bounding box are ignored. An empty
/// result means no usable label.
pub fn transcode_label(source: &str, class_id: u32) -> String {
    let mut yolo_data = String::with_capacity(source.len().min(4096));

    for line in source.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < BBOX_END {
            debug!("Ignoring label line without a full bounding box: {:?}", line);
            continue;
        }

        yolo_data.push_str(&class_id.to_string());
        for token in &tokens[1..BBOX_END] {
            yolo_data.push(' ');
            yolo_data.push_str(token);
        }
        yolo_data.push('\n');
    }

    yolo_data
}

/// Process one split's images in parallel, returning an outcome per image
pub fn convert_images_in_parallel<S: DatasetStore>(
    store: &S,
    images: &[PathBuf],
    source: &SplitDirs,
    dest: &SplitDirs,
    matcher: &KeyMatcher,
    pb: &indicatif::ProgressBar,
) -> Vec<Outcome> {
    images
        .par_iter()
        .map(|image_path| {
            let outcome = convert_image(store, image_path, source, dest, matcher);
            pb.inc(1);
            outcome
        })
        .collect()
}

/// Convert a single source image and its pose label.
///
/// The label is written before the image is copied. If either step fails,
/// whatever was left at both destination paths is removed so the destination
/// never holds half a pair.
pub fn convert_image<S: DatasetStore>(
    store: &S,
    image_path: &Path,
    source: &SplitDirs,
    dest: &SplitDirs,
    matcher: &KeyMatcher,
) -> Outcome {
    let (Some(stem), Some(file_name)) = (
        image_path.file_stem().and_then(|s| s.to_str()),
        image_path.file_name(),
    ) else {
        debug!("Skipping non UTF-8 image path: {:?}", image_path);
        return Outcome::Skipped(SkipReason::NoMatch);
    };

    let class_id = match matcher.match_stem(stem) {
        Some(class_id) => class_id,
        None => {
            debug!("No folder key matches {}", stem);
            return Outcome::Skipped(SkipReason::NoMatch);
        }
    };

    let label_name = format!("{}.txt", stem);
    let source_label = source.labels_dir.join(&label_name);
    if !store.is_file(&source_label) {
        debug!("Missing label file {}", source_label.display());
        return Outcome::Skipped(SkipReason::MissingLabel);
    }

    let yolo_data = match store.read_to_string(&source_label) {
        Ok(content) => transcode_label(&content, class_id),
        Err(e) => {
            log::error!("Failed to read {}: {}", source_label.display(), e);
            return Outcome::Skipped(SkipReason::EmptyLabel);
        }
    };
    if yolo_data.is_empty() {
        debug!("No bounding boxes in {}", source_label.display());
        return Outcome::Skipped(SkipReason::EmptyLabel);
    }

    let dest_label = dest.labels_dir.join(&label_name);
    let dest_image = dest.images_dir.join(file_name);
    if let Err(e) = store.write(&dest_label, &yolo_data) {
        log::error!("Failed to write {}: {}", dest_label.display(), e);
        discard(store, &dest_label);
        discard(store, &dest_image);
        return Outcome::Skipped(SkipReason::WriteFailed);
    }

    if let Err(e) = store.copy(image_path, &dest_image) {
        log::error!(
            "Failed to copy {} to {}: {}",
            image_path.display(),
            dest_image.display(),
            e
        );
        discard(store, &dest_label);
        discard(store, &dest_image);
        return Outcome::Skipped(SkipReason::WriteFailed);
    }

    Outcome::Converted
}

// Remove a partially written output; a file that is already gone is fine
fn discard<S: DatasetStore>(store: &S, path: &Path) {
    match store.remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::error!("Failed to remove {}: {}", path.display(), e),
    }
}
