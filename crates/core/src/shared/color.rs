//! Display colors and the working color spaces used for clustering.
//!
//! HSV samples use the 8-bit scale of common vision libraries (hue in
//! `[0, 180)`, saturation and value in `[0, 255]`) so distances stay
//! comparable across channels, but are kept in `f32` to avoid the
//! quantization loss of an 8-bit round trip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 8-bit RGB color used for display and rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from unit-range channels, rounding to the nearest byte.
    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        Self::new(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b))
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Euclidean distance in 8-bit RGB space.
    pub fn distance(&self, other: &Rgb) -> f64 {
        self.channels()
            .iter()
            .zip(other.channels().iter())
            .map(|(a, b)| {
                let d = *a as f64 - *b as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(px: [u8; 3]) -> Self {
        Self::new(px[0], px[1], px[2])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn unit_to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn clamp_byte(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Color representation in which k-means distances are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    #[default]
    Hsv,
    Rgb,
    Bgr,
}

impl ColorSpace {
    pub const ALL: &[ColorSpace] = &[ColorSpace::Hsv, ColorSpace::Rgb, ColorSpace::Bgr];

    /// Projects an RGB pixel into this working space.
    pub fn project(&self, px: [u8; 3]) -> [f32; 3] {
        let [r, g, b] = px.map(|c| c as f32);
        match self {
            ColorSpace::Rgb => [r, g, b],
            ColorSpace::Bgr => [b, g, r],
            ColorSpace::Hsv => rgb_to_hsv(r / 255.0, g / 255.0, b / 255.0),
        }
    }

    /// Converts a sample (typically a centroid) back to a display color.
    pub fn to_rgb(&self, sample: [f32; 3]) -> Rgb {
        match self {
            ColorSpace::Rgb => Rgb::new(
                clamp_byte(sample[0]),
                clamp_byte(sample[1]),
                clamp_byte(sample[2]),
            ),
            ColorSpace::Bgr => Rgb::new(
                clamp_byte(sample[2]),
                clamp_byte(sample[1]),
                clamp_byte(sample[0]),
            ),
            ColorSpace::Hsv => {
                let (r, g, b) = hsv_to_rgb(sample);
                Rgb::from_unit(r, g, b)
            }
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpace::Hsv => write!(f, "hsv"),
            ColorSpace::Rgb => write!(f, "rgb"),
            ColorSpace::Bgr => write!(f, "bgr"),
        }
    }
}

impl FromStr for ColorSpace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hsv" => Ok(ColorSpace::Hsv),
            "rgb" => Ok(ColorSpace::Rgb),
            "bgr" => Ok(ColorSpace::Bgr),
            other => Err(format!(
                "color space must be one of: hsv, rgb, bgr, got '{other}'"
            )),
        }
    }
}

/// Unit-range RGB to HSV on the `[0, 180) x [0, 255] x [0, 255]` scale.
fn rgb_to_hsv(r: f32, g: f32, b: f32) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    [h / 2.0, s * 255.0, max * 255.0]
}

/// Inverse of [`rgb_to_hsv`]; out-of-range inputs are wrapped (hue) or clamped.
fn hsv_to_rgb(sample: [f32; 3]) -> (f32, f32, f32) {
    let h = (sample[0] * 2.0).rem_euclid(360.0);
    let s = (sample[1] / 255.0).clamp(0.0, 1.0);
    let v = (sample[2] / 255.0).clamp(0.0, 1.0);

    let c = v * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    (r1 + m, g1 + m, b1 + m)
}
