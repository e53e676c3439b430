//! Hex color parsing.

use glam::Vec3;

use crate::CoreError;

/// Parses an `rrggbb` hex string (an optional leading `#` is allowed) into an RGB vector with
/// each channel in `0.0..=1.0`.
pub fn hex_to_vec3(hex: &str) -> Result<Vec3, CoreError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidColor(
            hex.to_string(),
            "expected exactly 6 hex digits",
        ));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| CoreError::InvalidColor(hex.to_string(), "invalid channel"))
    };

    Ok(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
