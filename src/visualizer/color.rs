// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use crate::action::Severity;

/// Color type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Red color, used for flagged people.
    pub const RED: Color = Color(255, 0, 0);
    /// Dark red, the high-severity panel background.
    pub const DARK_RED: Color = Color(200, 0, 0);
    /// Dark orange, the medium-severity panel background.
    pub const DARK_ORANGE: Color = Color(200, 140, 0);
    /// Yellow color, used for the warning icon.
    pub const YELLOW: Color = Color(255, 255, 0);
    /// White color.
    pub const WHITE: Color = Color(255, 255, 255);
    /// Black color.
    pub const BLACK: Color = Color(0, 0, 0);

    /// Create a new color from RGB values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Warning panel background for a severity level.
    #[must_use]
    pub const fn panel_for_severity(severity: Severity) -> Self {
        match severity {
            Severity::High => Self::DARK_RED,
            Severity::Medium | Severity::Low => Self::DARK_ORANGE,
        }
    }

    /// Convert to an `image` pixel.
    #[must_use]
    pub const fn rgb(self) -> image::Rgb<u8> {
        image::Rgb([self.0, self.1, self.2])
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(color: Color) -> Self {
        color.rgb()
    }
}
