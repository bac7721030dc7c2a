use image::{Rgb, RgbImage};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

use crate::config::ClassTable;
use crate::error::GestureError;
use crate::store::{DatasetStore, LocalStore};
use crate::types::{Split, SplitDirs};

const STROKE: u32 = 2;

const PALETTE: [[u8; 3]; 8] = [
    [0, 255, 0],
    [255, 0, 0],
    [0, 128, 255],
    [255, 200, 0],
    [255, 0, 255],
    [0, 255, 255],
    [255, 128, 0],
    [128, 0, 255],
];

/// One parsed detection label line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub class_id: u32,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl Detection {
    /// Parse `class_id cx cy w h`; extra tokens are ignored
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let class_id = tokens.next()?.parse().ok()?;
        let mut bbox = [0.0f64; 4];
        for value in bbox.iter_mut() {
            *value = tokens.next()?.parse().ok()?;
        }
        Some(Self {
            class_id,
            x_center: bbox[0],
            y_center: bbox[1],
            width: bbox[2],
            height: bbox[3],
        })
    }

    /// Pixel corners `(x1, y1, x2, y2)` in an image of the given size
    pub fn to_pixel_corners(&self, image_width: u32, image_height: u32) -> (i64, i64, i64, i64) {
        let (w, h) = (image_width as f64, image_height as f64);
        let x_center = self.x_center * w;
        let y_center = self.y_center * h;
        let box_w = self.width * w;
        let box_h = self.height * h;
        (
            (x_center - box_w / 2.0) as i64,
            (y_center - box_h / 2.0) as i64,
            (x_center + box_w / 2.0) as i64,
            (y_center + box_h / 2.0) as i64,
        )
    }
}

pub fn class_color(class_id: u32) -> Rgb<u8> {
    Rgb(PALETTE[class_id as usize % PALETTE.len()])
}

// Fill the inclusive rectangle, clipped to the image
fn fill_rect(image: &mut RgbImage, x1: i64, y1: i64, x2: i64, y2: i64, color: Rgb<u8>) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    if width == 0 || height == 0 {
        return;
    }
    let (x1, x2) = (x1.clamp(0, width - 1), x2.clamp(0, width - 1));
    let (y1, y2) = (y1.clamp(0, height - 1), y2.clamp(0, height - 1));
    for y in y1..=y2 {
        for x in x1..=x2 {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Draw a hollow rectangle whose edges are `stroke` pixels thick
pub fn draw_box(
    image: &mut RgbImage,
    (x1, y1, x2, y2): (i64, i64, i64, i64),
    stroke: u32,
    color: Rgb<u8>,
) {
    let half = (stroke / 2) as i64;
    let (outer_l, outer_t, outer_r, outer_b) = (x1 - half, y1 - half, x2 + half, y2 + half);
    let stroke = stroke.max(1) as i64 - 1;

    // top, bottom, left, right
    fill_rect(image, outer_l, outer_t, outer_r, outer_t + stroke, color);
    fill_rect(image, outer_l, outer_b - stroke, outer_r, outer_b, color);
    fill_rect(image, outer_l, outer_t, outer_l + stroke, outer_b, color);
    fill_rect(image, outer_r - stroke, outer_t, outer_r, outer_b, color);
}

/// Draw a random sample of converted validation images with their boxes.
///
/// Boxes are colour-coded by class id; no text is drawn, so each box's class
/// id and name are written to the log instead. Images that cannot be decoded
/// or have no label are skipped. Returns the number of images written to
/// `out_dir`.
pub fn render_verification(
    dest_root: &Path,
    out_dir: &Path,
    count: usize,
    seed: u64,
    classes: &ClassTable,
) -> Result<usize, GestureError> {
    let val = SplitDirs::new(dest_root, Split::Val);
    let mut images = LocalStore
        .list_files(&val.images_dir)
        .map_err(|e| GestureError::io(&val.images_dir, e))?;
    if images.is_empty() {
        info!("No images in {}, nothing to verify", val.images_dir.display());
        return Ok(0);
    }

    fs::create_dir_all(out_dir).map_err(|e| GestureError::io(out_dir, e))?;

    let mut rng = StdRng::seed_from_u64(seed);
    images.shuffle(&mut rng);

    let mut saved = 0;
    for image_path in images.iter().take(count) {
        let (Some(stem), Some(file_name)) = (
            image_path.file_stem().and_then(|s| s.to_str()),
            image_path.file_name(),
        ) else {
            continue;
        };

        let label_path = val.labels_dir.join(format!("{}.txt", stem));
        let label = match fs::read_to_string(&label_path) {
            Ok(label) => label,
            Err(e) => {
                debug!("No label for {}: {}", image_path.display(), e);
                continue;
            }
        };

        let mut canvas = match image::open(image_path) {
            Ok(image) => image.to_rgb8(),
            Err(e) => {
                warn!("Failed to decode {}: {}", image_path.display(), e);
                continue;
            }
        };

        for detection in label.lines().filter_map(Detection::parse) {
            let corners = detection.to_pixel_corners(canvas.width(), canvas.height());
            draw_box(&mut canvas, corners, STROKE, class_color(detection.class_id));
            info!(
                "{}: ID {} ({})",
                file_name.to_string_lossy(),
                detection.class_id,
                classes.name(detection.class_id).unwrap_or("Unknown")
            );
        }

        let save_path = out_dir.join(file_name);
        match canvas.save(&save_path) {
            Ok(()) => saved += 1,
            Err(e) => warn!("Failed to save {}: {}", save_path.display(), e),
        }
    }

    info!(
        "Saved {} verification images to {}",
        saved,
        out_dir.display()
    );
    Ok(saved)
}
