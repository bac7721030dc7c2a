use indicatif::{ProgressBar, ProgressStyle};

use crate::types::Split;

/// Progress bar for converting the images of one split
pub fn create_progress_bar(len: u64, split: Split) -> ProgressBar {
    let template = format!(
        "{{spinner:.green}} [{:<5}] {{bar:40.cyan/blue}} {{pos:>6}}/{{len:6}} {{msg}} ({{elapsed}})",
        split.label()
    );
    let style = ProgressStyle::with_template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    ProgressBar::new(len).with_style(style)
}
