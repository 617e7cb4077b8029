//! Color conversion: hex strings to device HSBK commands and to
//! xterm-256 palette indices for terminal previews.
//!
//! The two paths quantize differently on purpose: HSBK channels are
//! truncated, palette indices are rounded half-to-even. Both must stay
//! bit-exact with previously stored scenes and rendered previews.

use crate::error::Error;

/// Default kelvin for colors derived from hex strings.
pub const DEFAULT_KELVIN: u16 = 3500;

/// Kelvin used for plain "lights on" white.
pub const NEUTRAL_KELVIN: u16 = 5500;

/// Device color command: hue, saturation, brightness, kelvin (0-65535 each).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hsbk {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

impl Hsbk {
    pub const fn new(hue: u16, saturation: u16, brightness: u16, kelvin: u16) -> Self {
        Self {
            hue,
            saturation,
            brightness,
            kelvin,
        }
    }

    /// Full-brightness neutral white, `[0, 0, 65535, 5500]`.
    pub const fn neutral_white() -> Self {
        Self::new(0, 0, u16::MAX, NEUTRAL_KELVIN)
    }

    /// Copy of this color with the brightness channel replaced.
    pub const fn with_brightness(self, brightness: u16) -> Self {
        Self { brightness, ..self }
    }

    pub const fn to_array(self) -> [u16; 4] {
        [self.hue, self.saturation, self.brightness, self.kelvin]
    }
}

impl From<[u16; 4]> for Hsbk {
    fn from(v: [u16; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// Parse `RRGGBB` (optionally `#RRGGBB`) into its three channels.
pub fn hex_to_rgb(hex: &str) -> Result<(u8, u8, u8), Error> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::MalformedColor(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| Error::MalformedColor(hex.to_string()))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

/// Encode three channels as uppercase `RRGGBB` (no `#`).
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("{r:02X}{g:02X}{b:02X}")
}

/// Convert a hex color to an HSBK command at [`DEFAULT_KELVIN`].
///
/// Hue, saturation, and value are each scaled by 65535 and truncated.
///
/// ```
/// use lightdeck_core::color::{hex_to_hsbk, Hsbk};
///
/// assert_eq!(hex_to_hsbk("#FFFFFF").unwrap(), Hsbk::new(0, 0, 65535, 3500));
/// assert_eq!(hex_to_hsbk("000000").unwrap(), Hsbk::new(0, 0, 0, 3500));
/// ```
pub fn hex_to_hsbk(hex: &str) -> Result<Hsbk, Error> {
    let (r, g, b) = hex_to_rgb(hex)?;
    let (h, s, v) = rgb_to_hsv(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    Ok(Hsbk::new(
        scale_truncate(h),
        scale_truncate(s),
        scale_truncate(v),
        DEFAULT_KELVIN,
    ))
}

fn scale_truncate(unit: f64) -> u16 {
    (unit * 65535.0) as u16
}

/// RGB (each 0.0-1.0) to HSV (each 0.0-1.0, hue as a fraction of a turn).
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;
    if min == max {
        return (0.0, 0.0, v);
    }
    let range = max - min;
    let s = range / max;
    let rc = (max - r) / range;
    let gc = (max - g) / range;
    let bc = (max - b) / range;
    let h = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    ((h / 6.0).rem_euclid(1.0), s, v)
}

/// Approximate a true color with an xterm-256 palette index.
///
/// Grays (`r == g == b`) use the 24-step ramp at 232-255, snapping to
/// 16 (black) below 8 and 231 (white) above 248. Everything else is
/// quantized per channel into the 6x6x6 cube at 16-231.
///
/// ```
/// use lightdeck_core::color::rgb_to_256;
///
/// assert_eq!(rgb_to_256(255, 0, 0), 196);
/// assert_eq!(rgb_to_256(0, 0, 0), 16);
/// ```
pub fn rgb_to_256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        let step = ((r as f64 - 8.0) / 247.0 * 24.0).round_ties_even() as u8;
        return 232 + step;
    }

    let level = |c: u8| (c as f64 / 255.0 * 5.0).round_ties_even() as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

/// Palette index for a hex color, or `None` when the string is malformed.
pub fn hex_to_256(hex: &str) -> Option<u8> {
    hex_to_rgb(hex).ok().map(|(r, g, b)| rgb_to_256(r, g, b))
}

#[cfg(test)]
#[path = "tests/color_tests.rs"]
mod tests;
