use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

static HEX_MAC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-f]+$").unwrap());

fn is_separator(c: char) -> bool {
    matches!(c, ':' | '-' | '.') || c.is_whitespace()
}

/// Canonical form of a hardware address: separators (`:`, `-`, `.`,
/// whitespace) stripped, lowercased, hex digits only.
pub fn normalize_mac(raw: &str) -> AppResult<String> {
    let mac: String = raw
        .chars()
        .filter(|c| !is_separator(*c))
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if !HEX_MAC.is_match(&mac) {
        return Err(AppError::invalid(format!("malformed mac: {raw:?}")));
    }
    Ok(mac)
}
