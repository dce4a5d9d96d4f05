//! Display colors for chart series.
//!
//! Saved colors are `#rrggbb`, normalized to lowercase. Users without a valid
//! saved color get a random one per request that is never persisted.

use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("Color must be a hex code like #1a2b3c, got {0:?}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayColor {
    pub color: String,
    pub persisted: bool,
}

/// Exactly `#` followed by six hex digits, either case.
pub fn is_valid_color(input: &str) -> bool {
    input.len() == 7
        && input.starts_with('#')
        && input[1..].bytes().all(|b| b.is_ascii_hexdigit())
}

pub fn validate_color(input: &str) -> Result<String, ColorError> {
    if is_valid_color(input) {
        Ok(input.to_ascii_lowercase())
    } else {
        Err(ColorError::InvalidFormat(input.to_string()))
    }
}

pub fn random_color<R: Rng>(rng: &mut R) -> String {
    let rgb: [u8; 3] = rng.gen();
    format!("#{}", hex::encode(rgb))
}

pub fn assign_display_color<R: Rng>(stored: Option<&str>, rng: &mut R) -> DisplayColor {
    match stored.filter(|c| is_valid_color(c)) {
        Some(color) => DisplayColor {
            color: color.to_ascii_lowercase(),
            persisted: true,
        },
        None => DisplayColor {
            color: random_color(rng),
            persisted: false,
        },
    }
}
