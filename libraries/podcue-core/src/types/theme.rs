/// Colour types used for ambient theming
use serde::{Deserialize, Serialize};
use std::fmt;

/// An sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a colour from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Relative luminance (Rec. 709 weights, 0-255 scale)
    pub fn luminance(&self) -> f32 {
        0.2126 * f32::from(self.r) + 0.7152 * f32::from(self.g) + 0.0722 * f32::from(self.b)
    }

    /// `#rrggbb` representation
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Squared euclidean distance in RGB space
    pub fn distance_sq(&self, other: &Rgb) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Small ordered list of representative artwork colours
///
/// The first colour is the most dominant one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<Rgb>,
}

/// Fallback colours used whenever artwork cannot be analysed
const NEUTRAL_COLORS: [Rgb; 2] = [Rgb::new(0x2d, 0x2d, 0x2d), Rgb::new(0x8c, 0x8c, 0x8c)];

impl Palette {
    /// Create a palette from already ordered colours
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    /// The neutral fallback palette
    pub fn neutral() -> Self {
        Self {
            colors: NEUTRAL_COLORS.to_vec(),
        }
    }

    /// Whether this is the neutral fallback
    pub fn is_neutral(&self) -> bool {
        self.colors == NEUTRAL_COLORS
    }

    /// Colours, most dominant first
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// The most dominant colour
    pub fn primary(&self) -> Option<Rgb> {
        self.colors.first().copied()
    }

    /// Number of colours
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no colours
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::neutral()
    }
}
