use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Normalized folder-key to class id mapping.
///
/// Keys use `_` as the only separator and never start or end with one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureMap {
    entries: BTreeMap<String, u32>,
}

impl GestureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, returning the class id it previously mapped to
    pub fn insert(&mut self, key: impl Into<String>, class_id: u32) -> Option<u32> {
        self.entries.insert(key.into(), class_id)
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(key, id)| (key.as_str(), *id))
    }

    pub fn max_id(&self) -> Option<u32> {
        self.entries.values().copied().max()
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for GestureMap {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        let mut map = GestureMap::new();
        for (key, id) in iter {
            map.insert(key, id);
        }
        map
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Val,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::Train, Split::Val];

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Split::Train => "Train",
            Split::Val => "Val",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Image and label directories of one split under a dataset root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDirs {
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
}

impl SplitDirs {
    pub fn new(root: &Path, split: Split) -> Self {
        Self {
            images_dir: root.join("images").join(split.as_str()),
            labels_dir: root.join("labels").join(split.as_str()),
        }
    }
}

// Why an image did not make it into the output dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoMatch,
    AmbiguousStem,
    MissingLabel,
    EmptyLabel,
    WriteFailed,
}

// Result of processing a single source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Converted,
    Skipped(SkipReason),
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub train: usize,
    pub val: usize,
    pub skipped: usize,
    pub skipped_no_match: usize,
    pub skipped_ambiguous_stem: usize,
    pub skipped_missing_label: usize,
    pub skipped_empty_label: usize,
    pub failed_writes: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, split: Split, outcome: Outcome) {
        match outcome {
            Outcome::Converted => match split {
                Split::Train => self.train += 1,
                Split::Val => self.val += 1,
            },
            Outcome::Skipped(reason) => {
                self.skipped += 1;
                match reason {
                    SkipReason::NoMatch => self.skipped_no_match += 1,
                    SkipReason::AmbiguousStem => self.skipped_ambiguous_stem += 1,
                    SkipReason::MissingLabel => self.skipped_missing_label += 1,
                    SkipReason::EmptyLabel => self.skipped_empty_label += 1,
                    SkipReason::WriteFailed => self.failed_writes += 1,
                }
            }
        }
    }

    pub fn converted(&self, split: Split) -> usize {
        match split {
            Split::Train => self.train,
            Split::Val => self.val,
        }
    }

    pub fn print_summary(&self) {
        log::info!("=== Conversion Summary ===");
        log::info!("New train images: {}", self.train);
        log::info!("New val images: {}", self.val);
        log::info!("Skipped images: {}", self.skipped);

        if self.skipped > 0 {
            log::warn!(
                "Skipped breakdown (no folder-key match: {}, shared stem: {}, missing label: {}, empty label: {}, write failed: {})",
                self.skipped_no_match,
                self.skipped_ambiguous_stem,
                self.skipped_missing_label,
                self.skipped_empty_label,
                self.failed_writes
            );
        }
    }
}
