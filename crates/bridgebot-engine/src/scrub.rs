// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text scrubbing: emoji removal and configurable pattern stripping.

use std::sync::LazyLock;

use bridgebot_core::BridgeError;
use regex::Regex;

/// Unicode emoji blocks: emoticons, symbols and pictographs, transport,
/// supplemental symbols, dingbats, enclosed characters.
static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        "\u{1F600}-\u{1F64F}", // emoticons
        "\u{1F300}-\u{1F5FF}", // symbols & pictographs
        "\u{1F680}-\u{1F6FF}", // transport & map symbols
        "\u{1F700}-\u{1F77F}", // alchemical symbols
        "\u{1F780}-\u{1F7FF}", // geometric shapes extended
        "\u{1F800}-\u{1F8FF}", // supplemental arrows-C
        "\u{1F900}-\u{1F9FF}", // supplemental symbols and pictographs
        "\u{1FA00}-\u{1FAFF}", // extended-A and chess symbols
        "\u{2702}-\u{27B0}",   // dingbats
        "\u{24C2}-\u{1F251}",  // enclosed characters
        "]+",
    ))
    .expect("emoji pattern is valid")
});

/// Platform custom emoji markup: `<:name:id>` and animated `<a:name:id>`.
static CUSTOM_EMOJI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a?:\w+:\d+>").expect("custom emoji pattern is valid"));

/// Removes Unicode emoji and platform custom-emoji markup from `text`.
pub fn strip_emoji(text: &str) -> String {
    let text = EMOJI_RE.replace_all(text, "");
    let text = CUSTOM_EMOJI_RE.replace_all(&text, "");
    text.trim().to_string()
}

/// A compiled set of removal patterns applied to user or persona text.
#[derive(Debug, Clone, Default)]
pub struct Scrubber {
    patterns: Vec<Regex>,
}

impl Scrubber {
    /// Compiles the configured pattern list. Patterns match in multi-line
    /// mode, mirroring how they are applied to whole message bodies.
    pub fn compile(patterns: &[String]) -> Result<Self, BridgeError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                regex::RegexBuilder::new(p)
                    .multi_line(true)
                    .build()
                    .map_err(|e| BridgeError::Config(format!("invalid scrub pattern `{p}`: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Removes every pattern match from `text` and trims the result.
    pub fn apply(&self, text: &str) -> String {
        if self.patterns.is_empty() {
            return text.to_string();
        }
        let mut out = text.to_string();
        for pattern in &self.patterns {
            out = pattern.replace_all(&out, "").into_owned();
        }
        out.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_unicode_emoji() {
        assert_eq!(strip_emoji("hello \u{1F600} world \u{1F680}"), "hello  world");
        assert_eq!(strip_emoji("\u{1F389}party\u{1F389}"), "party");
    }

    #[test]
    fn strips_custom_emoji_markup() {
        assert_eq!(strip_emoji("nice <:pog:123456> play"), "nice  play");
        assert_eq!(strip_emoji("<a:wave:42>hi"), "hi");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(strip_emoji("just words, no pictures"), "just words, no pictures");
    }

    #[test]
    fn scrubber_removes_configured_patterns() {
        let scrubber =
            Scrubber::compile(&[r"\*[^*]*\*".to_string(), r"^> .*$".to_string()]).unwrap();
        assert_eq!(scrubber.apply("*waves* hello there"), "hello there");
        assert_eq!(scrubber.apply("> quoted line\nreal text"), "real text");
    }

    #[test]
    fn empty_scrubber_is_identity() {
        let scrubber = Scrubber::compile(&[]).unwrap();
        assert!(scrubber.is_empty());
        assert_eq!(scrubber.apply("  spaced  "), "  spaced  ");
    }

    #[test]
    fn bad_pattern_is_a_config_error() {
        let err = Scrubber::compile(&["[unclosed".to_string()]).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
