// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame annotation for flagged people.
//!
//! [`Annotator::annotate`] draws a red box, an action label and the body skeleton
//! for every flagged person on a copy of the frame. [`Annotator::warning_overlay`]
//! adds the full-frame alert panel. Text needs a font; without one only shapes
//! are drawn.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_polygon_mut, draw_hollow_rect_mut,
    draw_line_segment_mut, draw_polygon_mut, draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::action::{Action, ActionType, Severity};
use crate::error::{Result, SentinelError};
use crate::keypoints::PersonPose;
use crate::visualizer::Color;
use crate::visualizer::skeleton::{BODY_JOINTS, DRAW_CONF, SKELETON};

/// Assets URL for downloading fonts
const ASSETS_URL: &str = "https://github.com/ultralytics/assets/releases/download/v0.0.0";

/// Default label font.
pub const DEFAULT_FONT: &str = "Arial.ttf";

/// Thickness of the box around a flagged person.
const BOX_THICKNESS: i32 = 3;
/// Thickness of the warning panel border.
const PANEL_BORDER: i32 = 8;
/// Opacity of the warning panel background.
const PANEL_ALPHA: f32 = 0.85;
/// Maximum number of description lines in the warning panel.
const PANEL_MAX_LINES: usize = 3;

/// First run directory under `base` that does not exist yet: `prefix`, then
/// `prefix2`, `prefix3`, ...
pub fn find_next_run_dir(base: impl AsRef<Path>, prefix: &str) -> PathBuf {
    let base = base.as_ref();
    std::iter::once(base.join(prefix))
        .chain((2u32..).map(|n| base.join(format!("{prefix}{n}"))))
        .find(|dir| !dir.exists())
        .unwrap_or_else(|| base.join(prefix))
}

/// Check if font exists locally or download it into the user config directory.
pub fn check_font(font: &str) -> Option<PathBuf> {
    let font_name = Path::new(font).file_name()?.to_string_lossy();
    let config_dir = dirs::config_dir()?.join("pose-sentinel");
    let font_path = config_dir.join(font_name.as_ref());

    if font_path.exists() {
        return Some(font_path);
    }

    if let Err(e) = fs::create_dir_all(&config_dir) {
        crate::warn!("Failed to create config directory: {e}");
        return None;
    }

    let url = format!("{ASSETS_URL}/{font_name}");
    crate::verbose!("Downloading {url} to {}", font_path.display());

    let response = match ureq::get(&url).call() {
        Ok(response) => response,
        Err(e) => {
            crate::warn!("Failed to download font from {url}: {e}");
            return None;
        }
    };

    let mut file = match File::create(&font_path) {
        Ok(f) => f,
        Err(e) => {
            crate::warn!("Failed to create font file: {e}");
            return None;
        }
    };

    let mut reader = response.into_body().into_reader();
    if let Err(e) = io::copy(&mut reader, &mut file) {
        crate::warn!("Failed to download font: {e}");
        let _ = fs::remove_file(&font_path);
        return None;
    }

    Some(font_path)
}

/// Split `text` into lines no wider than `max_width` according to `measure`.
///
/// A single word wider than `max_width` is kept on its own line.
pub fn wrap_words(text: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure(&candidate) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Clamp a box to the image, returning `None` when nothing is left of it.
fn clamp_box(bbox: [f32; 4], width: u32, height: u32) -> Option<(i32, i32, i32, i32)> {
    let (w, h) = (width as i32, height as i32);
    let mut x1 = bbox[0].round() as i32;
    let mut y1 = bbox[1].round() as i32;
    let mut x2 = bbox[2].round() as i32;
    let mut y2 = bbox[3].round() as i32;

    if x1 > x2 {
        std::mem::swap(&mut x1, &mut x2);
    }
    if y1 > y2 {
        std::mem::swap(&mut y1, &mut y2);
    }

    x1 = x1.clamp(0, w - 1);
    y1 = y1.clamp(0, h - 1);
    x2 = x2.clamp(0, w - 1);
    y2 = y2.clamp(0, h - 1);

    (x2 > x1 && y2 > y1).then_some((x1, y1, x2, y2))
}

/// Draw a hollow rectangle `thickness` pixels wide, growing inwards.
fn draw_thick_rect(
    img: &mut RgbImage,
    (x1, y1, x2, y2): (i32, i32, i32, i32),
    thickness: i32,
    color: Rgb<u8>,
) {
    for t in 0..thickness {
        let tx1 = (x1 + t).min(x2);
        let ty1 = (y1 + t).min(y2);
        let tx2 = (x2 - t).max(tx1);
        let ty2 = (y2 - t).max(ty1);
        if tx2 > tx1 && ty2 > ty1 {
            let rect = Rect::at(tx1, ty1).of_size((tx2 - tx1) as u32, (ty2 - ty1) as u32);
            draw_hollow_rect_mut(img, rect, color);
        }
    }
}

/// Draw a border around the whole frame.
pub fn draw_border(img: &mut RgbImage, color: Color, thickness: u32) {
    let (w, h) = img.dimensions();
    if w < 2 || h < 2 {
        return;
    }
    draw_thick_rect(
        img,
        (0, 0, w as i32 - 1, h as i32 - 1),
        thickness as i32,
        color.rgb(),
    );
}

/// Draws flagged actions onto frames.
#[derive(Default)]
pub struct Annotator {
    font: Option<FontVec>,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl Annotator {
    /// Create an annotator without a font; labels are skipped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an annotator using an already loaded font.
    #[must_use]
    pub fn with_font(font: FontVec) -> Self {
        Self { font: Some(font) }
    }

    /// Load a TrueType/OpenType font file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid font.
    pub fn from_font_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        let font = FontVec::try_from_vec(data).map_err(|e| {
            SentinelError::ConfigError(format!(
                "Invalid font {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self::with_font(font))
    }

    /// Use the default font, downloading it on first use.
    ///
    /// Falls back to a font-less annotator when the font is unavailable.
    #[must_use]
    pub fn load_default() -> Self {
        check_font(DEFAULT_FONT)
            .and_then(|path| Self::from_font_file(path).ok())
            .unwrap_or_default()
    }

    /// Whether labels will be rendered.
    #[must_use]
    pub const fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Annotate a frame with the flagged people.
    ///
    /// Each action is matched to the pose with the same `person_id`. An empty
    /// action list returns an unchanged copy of the frame.
    #[must_use]
    pub fn annotate(
        &self,
        image: &DynamicImage,
        poses: &[PersonPose],
        actions: &[Action],
    ) -> DynamicImage {
        if actions.is_empty() {
            return image.clone();
        }

        let mut img = image.to_rgb8();
        let color = Color::RED.rgb();

        for action in actions {
            let Some(pose) = poses.iter().find(|p| p.person_id == action.person_id) else {
                continue;
            };

            if let Some(bounds) = clamp_box(pose.bbox, img.width(), img.height()) {
                draw_thick_rect(&mut img, bounds, BOX_THICKNESS, color);
                self.draw_label(&mut img, bounds, action.action_type, color);
            }
            draw_skeleton(&mut img, pose, color);
        }

        DynamicImage::ImageRgb8(img)
    }

    fn draw_label(
        &self,
        img: &mut RgbImage,
        (x1, y1, _, _): (i32, i32, i32, i32),
        action: ActionType,
        color: Rgb<u8>,
    ) {
        let Some(font) = self.font.as_ref() else {
            return;
        };
        let label = format!("{}!", action.as_str().to_uppercase());
        let scale = PxScale::from(18.0);
        let (tw, th) = text_size(scale, font, &label);

        let top = (y1 - th as i32 - 10).max(0);
        draw_filled_rect_mut(img, Rect::at(x1, top).of_size(tw.max(1), th + 10), color);
        draw_text_mut(img, Color::WHITE.rgb(), x1, top + 5, scale, font, &label);
    }

    /// Draw the full-frame alert panel for the primary action.
    ///
    /// The panel covers the central 80% x 40% of the frame: a blended
    /// background colored by severity, a white border, a warning triangle and,
    /// when a font is loaded, the alert title and wrapped description.
    #[must_use]
    pub fn warning_overlay(
        &self,
        image: &DynamicImage,
        action_type: ActionType,
        description: &str,
        severity: Severity,
    ) -> DynamicImage {
        let mut img = image.to_rgb8();
        let (width, height) = img.dimensions();
        let panel_w = (width as f32 * 0.8) as u32;
        let panel_h = (height as f32 * 0.4) as u32;
        if panel_w < 2 || panel_h < 2 {
            return DynamicImage::ImageRgb8(img);
        }
        let x0 = (width - panel_w) / 2;
        let y0 = (height - panel_h) / 2;

        blend_rect(
            &mut img,
            (x0, y0, panel_w, panel_h),
            Color::panel_for_severity(severity),
            PANEL_ALPHA,
        );
        draw_thick_rect(
            &mut img,
            (
                x0 as i32,
                y0 as i32,
                (x0 + panel_w - 1) as i32,
                (y0 + panel_h - 1) as i32,
            ),
            PANEL_BORDER,
            Color::WHITE.rgb(),
        );

        let icon = (panel_h / 6).max(4) as i32;
        let cx = (width / 2) as i32;
        let apex = y0 as i32 + PANEL_BORDER + (panel_h / 12) as i32;
        draw_warning_icon(&mut img, cx, apex, icon);

        if let Some(font) = self.font.as_ref() {
            let mut y = apex + 2 * icon + 10;
            let title_scale = PxScale::from((panel_h as f32 / 8.0).clamp(12.0, 64.0));
            let body_scale = PxScale::from((panel_h as f32 / 14.0).clamp(10.0, 28.0));

            y = draw_centered(&mut img, font, "ALERT!", title_scale, y, Color::WHITE);
            let name = action_type.display_name();
            y = draw_centered(&mut img, font, &name, body_scale, y + 4, Color::YELLOW);

            let max_width = panel_w.saturating_sub(40);
            let lines = wrap_words(description, max_width, |s| text_size(body_scale, font, s).0);
            for line in lines.iter().take(PANEL_MAX_LINES) {
                y = draw_centered(&mut img, font, line, body_scale, y + 6, Color::WHITE);
            }
        }

        DynamicImage::ImageRgb8(img)
    }
}

/// Draw skeleton bones and joints for keypoints confident enough to show.
fn draw_skeleton(img: &mut RgbImage, pose: &PersonPose, color: Rgb<u8>) {
    let visible = |i: usize| pose.get(i).filter(|kp| kp.is_confident(DRAW_CONF) && kp.is_finite());

    for [a, b] in SKELETON {
        if let (Some(p), Some(q)) = (visible(a), visible(b)) {
            draw_line_segment_mut(img, (p.x, p.y), (q.x, q.y), color);
            draw_line_segment_mut(img, (p.x + 1.0, p.y), (q.x + 1.0, q.y), color);
        }
    }

    for i in BODY_JOINTS {
        if let Some(kp) = visible(i) {
            let center = (kp.x as i32, kp.y as i32);
            draw_filled_circle_mut(img, center, 4, Color::WHITE.rgb());
            draw_filled_circle_mut(img, center, 2, color);
        }
    }
}

/// Alpha-blend a solid color over a rectangle.
fn blend_rect(
    img: &mut RgbImage,
    (x0, y0, w, h): (u32, u32, u32, u32),
    color: Color,
    alpha: f32,
) {
    let tint = [color.0, color.1, color.2];
    for y in y0..(y0 + h).min(img.height()) {
        for x in x0..(x0 + w).min(img.width()) {
            let px = img.get_pixel_mut(x, y);
            for (c, t) in px.0.iter_mut().zip(tint) {
                *c = (alpha * f32::from(t) + (1.0 - alpha) * f32::from(*c)).round() as u8;
            }
        }
    }
}

/// Yellow triangle with a black exclamation mark, apex at (`cx`, `top`).
fn draw_warning_icon(img: &mut RgbImage, cx: i32, top: i32, size: i32) {
    let base = top + 2 * size;
    let triangle = [
        Point::new(cx, top),
        Point::new(cx - size, base),
        Point::new(cx + size, base),
    ];
    draw_polygon_mut(img, &triangle, Color::YELLOW.rgb());

    let outline = triangle.map(|p| Point::new(p.x as f32, p.y as f32));
    draw_hollow_polygon_mut(img, &outline, Color::WHITE.rgb());

    let bar_w = (size / 5).max(1);
    let bar_h = size;
    let black = Color::BLACK.rgb();
    draw_filled_rect_mut(
        img,
        Rect::at(cx - bar_w / 2, top + size / 2)
            .of_size(bar_w as u32, (bar_h * 3 / 4).max(1) as u32),
        black,
    );
    draw_filled_rect_mut(
        img,
        Rect::at(cx - bar_w / 2, base - bar_w - 2).of_size(bar_w as u32, bar_w as u32),
        black,
    );
}

/// Draw horizontally centered text with a drop shadow; returns the next line's y.
fn draw_centered(
    img: &mut RgbImage,
    font: &FontVec,
    text: &str,
    scale: PxScale,
    y: i32,
    color: Color,
) -> i32 {
    let (tw, th) = text_size(scale, font, text);
    let x = (img.width() as i32 - tw as i32) / 2;
    draw_text_mut(img, Color::BLACK.rgb(), x + 2, y + 2, scale, font, text);
    draw_text_mut(img, color.rgb(), x, y, scale, font, text);
    y + th as i32
}
