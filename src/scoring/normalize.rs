use regex::Regex;
use std::sync::OnceLock;

/// Lowercase, drop punctuation, collapse whitespace, trim.
///
/// Punctuation is anything that is not a letter, a combining mark, a number or
/// whitespace, so Hangul, accented Latin and Devanagari survive intact.
pub fn normalize(text: &str) -> String {
    static PUNCT_RE: OnceLock<Regex> = OnceLock::new();
    let re = PUNCT_RE
        .get_or_init(|| Regex::new(r"[^\p{L}\p{M}\p{N}\s]").expect("valid punctuation regex"));

    let lowered = text.to_lowercase();
    let stripped = re.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
