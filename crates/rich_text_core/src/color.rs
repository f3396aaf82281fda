//! `rgb(...)` to `#rrggbb` conversion for the foreground-color query.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors produced while converting a color reported by the host.
pub enum ColorParseError {
    /// The input does not start with `rgb(` or `rgba(`.
    #[error("expected an rgb() color, got `{0}`")]
    NotRgb(String),
    /// Fewer than three channels were present.
    #[error("expected three color channels, got {0}")]
    MissingChannels(usize),
    /// A channel is not an integer in `0..=255`.
    #[error("invalid color channel `{0}`")]
    InvalidChannel(String),
}

/// Converts `rgb(r, g, b)` (comma or space separated) into lower-case `#rrggbb`.
///
/// An alpha channel in `rgba(...)` is ignored.
///
/// # Errors
///
/// Returns [`ColorParseError`] when the input is not a well-formed rgb color.
pub fn rgb_to_hex(input: &str) -> Result<String, ColorParseError> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("rgba(")
        .or_else(|| trimmed.strip_prefix("rgb("))
        .ok_or_else(|| ColorParseError::NotRgb(trimmed.to_string()))?;
    let body = body.split(')').next().unwrap_or_default();
    let separator = if body.contains(',') { ',' } else { ' ' };

    let channels: Vec<&str> = body
        .split(separator)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if channels.len() < 3 {
        return Err(ColorParseError::MissingChannels(channels.len()));
    }

    let mut hex = String::from("#");
    for raw in &channels[..3] {
        let value: u8 = raw
            .parse()
            .map_err(|_| ColorParseError::InvalidChannel((*raw).to_string()))?;
        hex.push_str(&format!("{value:02x}"));
    }
    Ok(hex)
}
