use regex::Regex;
use std::sync::OnceLock;

/// Longest signature emitted per line; keeps long minified lines from
/// dominating the digest.
const MAX_SIGNATURE_LEN: usize = 120;

fn declaration_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // A line "looks like" a declaration when an identifier is eventually
        // followed by a paren, brace, colon, or assignment at low indentation.
        Regex::new(r"^[A-Za-z_@#$][A-Za-z0-9_:<>,.\s*&\[\]$]*[({:=]")
            .expect("generic declaration pattern must be valid")
    })
}

const COMMENT_PREFIXES: &[&str] = &["//", "#", "/*", "*", "--", ";"];

/// Line-signature extraction for languages without a dedicated extractor.
///
/// Takes column-zero lines shaped like declarations and emits their trimmed
/// prefix. Noisy, but stable across formatting-only edits inside bodies,
/// which is all the structural hash needs from a fallback.
pub fn extract(source: &str) -> Vec<String> {
    let mut signatures = Vec::new();
    for line in source.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        if COMMENT_PREFIXES
            .iter()
            .any(|prefix| trimmed.trim_start().starts_with(prefix))
        {
            continue;
        }
        if declaration_line().is_match(trimmed) {
            let signature: String = trimmed.chars().take(MAX_SIGNATURE_LEN).collect();
            signatures.push(format!("line:{signature}"));
        }
    }
    signatures
}
