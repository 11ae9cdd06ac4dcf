// Copyright @yucwang 2026

//! Conversions between RGB, hexadecimal, HSL and HSV. Every component is
//! expected in `[0, 1]`, hue included.

use crate::math::constants::{ Float, Vector3f };

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ColorParseError {
    MissingHash(String),
    InvalidLength(String),
    InvalidDigit(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorParseError::MissingHash(s) => write!(f, "hex color must start with '#': {}", s),
            ColorParseError::InvalidLength(s) => write!(f, "hex color must have 6 digits: {}", s),
            ColorParseError::InvalidDigit(s) => write!(f, "invalid hex digit in color: {}", s),
        }
    }
}

impl std::error::Error for ColorParseError {}

fn to_byte(v: Float) -> u8 {
    (v.max(0.0).min(1.0) * 255.0).round() as u8
}

pub fn rgb_to_hex(rgb: &Vector3f) -> String {
    format!("#{:02x}{:02x}{:02x}", to_byte(rgb.x), to_byte(rgb.y), to_byte(rgb.z))
}

pub fn hex_to_rgb(hex: &str) -> Result<Vector3f, ColorParseError> {
    let digits = hex.trim()
        .strip_prefix('#')
        .ok_or_else(|| ColorParseError::MissingHash(hex.to_string()))?;
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ColorParseError::InvalidLength(hex.to_string()));
    }
    // from_str_radix would also take a sign.
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorParseError::InvalidDigit(hex.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as Float / 255.0)
            .map_err(|_| ColorParseError::InvalidDigit(hex.to_string()))
    };
    Ok(Vector3f::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

// Shared hue term of HSL and HSV, in [0, 1).
fn hue(rgb: &Vector3f, max: Float, d: Float) -> Float {
    let (r, g, b) = (rgb.x, rgb.y, rgb.z);
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    h / 6.0
}

pub fn rgb_to_hsl(rgb: &Vector3f) -> Vector3f {
    let max = rgb.max();
    let min = rgb.min();
    let l = 0.5 * (max + min);

    if max == min {
        return Vector3f::new(0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    Vector3f::new(hue(rgb, max, d), s, l)
}

fn hue_to_rgb(p: Float, q: Float, t: Float) -> Float {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

pub fn hsl_to_rgb(hsl: &Vector3f) -> Vector3f {
    let (h, s, l) = (hsl.x, hsl.y, hsl.z);
    if s == 0.0 {
        return Vector3f::new(l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vector3f::new(hue_to_rgb(p, q, h + 1.0 / 3.0),
                  hue_to_rgb(p, q, h),
                  hue_to_rgb(p, q, h - 1.0 / 3.0))
}

pub fn rgb_to_hsv(rgb: &Vector3f) -> Vector3f {
    let max = rgb.max();
    let min = rgb.min();
    let d = max - min;
    let s = if max == 0.0 { 0.0 } else { d / max };

    if max == min {
        return Vector3f::new(0.0, s, max);
    }
    Vector3f::new(hue(rgb, max, d), s, max)
}

pub fn hsv_to_rgb(hsv: &Vector3f) -> Vector3f {
    let (h, s, v) = (hsv.x, hsv.y, hsv.z);
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    match (i as i64).rem_euclid(6) {
        0 => Vector3f::new(v, t, p),
        1 => Vector3f::new(q, v, p),
        2 => Vector3f::new(p, v, t),
        3 => Vector3f::new(p, q, v),
        4 => Vector3f::new(t, p, v),
        _ => Vector3f::new(v, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &Vector3f, b: &Vector3f) {
        assert!((a - b).norm() < 1e-5, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_hex_pads_small_channels() {
        assert_eq!(rgb_to_hex(&Vector3f::new(0.0, 16.0 / 255.0, 1.0)), "#0010ff");
        assert_eq!(rgb_to_hex(&Vector3f::new(1.0, 1.0, 1.0)), "#ffffff");
    }

    #[test]
    fn test_hex_to_rgb() {
        let rgb = hex_to_rgb("#ff8000").unwrap();
        assert_close(&rgb, &Vector3f::new(1.0, 128.0 / 255.0, 0.0));
        assert_eq!(hex_to_rgb("ff8000"), Err(ColorParseError::MissingHash("ff8000".to_string())));
        assert!(matches!(hex_to_rgb("#ff80"), Err(ColorParseError::InvalidLength(_))));
        assert!(matches!(hex_to_rgb("#gg0000"), Err(ColorParseError::InvalidDigit(_))));
        assert!(matches!(hex_to_rgb("#+f+f+f"), Err(ColorParseError::InvalidDigit(_))));
        assert!(matches!(hex_to_rgb("#-1ff00"), Err(ColorParseError::InvalidDigit(_))));
    }

    #[test]
    fn test_primary_colors_hsl_hsv() {
        let red = Vector3f::new(1.0, 0.0, 0.0);
        let green = Vector3f::new(0.0, 1.0, 0.0);
        let blue = Vector3f::new(0.0, 0.0, 1.0);

        assert_close(&rgb_to_hsl(&red), &Vector3f::new(0.0, 1.0, 0.5));
        assert_close(&rgb_to_hsl(&green), &Vector3f::new(1.0 / 3.0, 1.0, 0.5));
        assert_close(&rgb_to_hsv(&blue), &Vector3f::new(2.0 / 3.0, 1.0, 1.0));
        assert_close(&hsv_to_rgb(&Vector3f::new(1.0 / 3.0, 1.0, 1.0)), &green);
        assert_close(&hsl_to_rgb(&Vector3f::new(2.0 / 3.0, 1.0, 0.5)), &blue);
    }

    #[test]
    fn test_achromatic() {
        let gray = Vector3f::new(0.4, 0.4, 0.4);
        assert_close(&rgb_to_hsl(&gray), &Vector3f::new(0.0, 0.0, 0.4));
        assert_close(&rgb_to_hsv(&gray), &Vector3f::new(0.0, 0.0, 0.4));
        assert_close(&hsl_to_rgb(&Vector3f::new(0.7, 0.0, 0.4)), &gray);
        assert_close(&rgb_to_hsv(&Vector3f::zeros()), &Vector3f::zeros());
    }

    #[test]
    fn test_hsl_and_hsv_invert() {
        let colors = [
            Vector3f::new(0.2, 0.6, 0.9),
            Vector3f::new(0.9, 0.1, 0.5),
            Vector3f::new(0.3, 0.8, 0.25),
        ];
        for c in colors.iter() {
            assert_close(&hsl_to_rgb(&rgb_to_hsl(c)), c);
            assert_close(&hsv_to_rgb(&rgb_to_hsv(c)), c);
        }
    }

    #[test]
    fn test_hsv_full_hue_wraps_to_red() {
        assert_close(&hsv_to_rgb(&Vector3f::new(1.0, 1.0, 1.0)), &Vector3f::new(1.0, 0.0, 0.0));
    }
}
