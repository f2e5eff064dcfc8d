//! Coarse language heuristic: share of chars in the Arabic block.
//!
//! Advisory only. Matching never depends on it.

use serde::{Deserialize, Serialize};

use crate::config::LinkerConfig;

/// Arabic Unicode block
pub fn is_arabic_char(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

/// Fraction of chars in `text` that fall in the Arabic block
pub fn arabic_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut arabic = 0usize;
    for c in text.chars() {
        total += 1;
        if is_arabic_char(c) {
            arabic += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    arabic as f64 / total as f64
}

/// Language metadata attached to every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    /// Tag chosen by the heuristic
    pub detected: String,
    /// Caller hint if supplied, otherwise `detected`
    pub effective: String,
    pub is_rtl: bool,
    pub arabic_ratio: f64,
}

pub fn detect_language(text: &str, hint: Option<&str>, config: &LinkerConfig) -> LanguageInfo {
    let ratio = arabic_ratio(text);
    let is_rtl = ratio > config.rtl_ratio_threshold;
    let detected = if is_rtl {
        config.rtl_language.clone()
    } else {
        config.fallback_language.clone()
    };
    let effective = hint
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| detected.clone());

    LanguageInfo {
        detected,
        effective,
        is_rtl,
        arabic_ratio: ratio,
    }
}
