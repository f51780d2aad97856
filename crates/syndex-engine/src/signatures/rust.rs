use regex::Regex;
use std::sync::OnceLock;

fn declaration_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (
                "fn",
                Regex::new(r#"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+(?:"[^"]*"\s+)?)?fn\s+([A-Za-z_][A-Za-z0-9_]*)"#)
                    .expect("rust fn pattern must be valid"),
            ),
            (
                "struct",
                Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?struct\s+([A-Za-z_][A-Za-z0-9_]*)")
                    .expect("rust struct pattern must be valid"),
            ),
            (
                "enum",
                Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?enum\s+([A-Za-z_][A-Za-z0-9_]*)")
                    .expect("rust enum pattern must be valid"),
            ),
            (
                "trait",
                Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?trait\s+([A-Za-z_][A-Za-z0-9_]*)")
                    .expect("rust trait pattern must be valid"),
            ),
            (
                "impl",
                Regex::new(r"^\s*(?:unsafe\s+)?impl(?:<[^>]*>)?\s+([A-Za-z_][A-Za-z0-9_:<>, ]*?)\s*(?:\{|$|\bfor\b)")
                    .expect("rust impl pattern must be valid"),
            ),
            (
                "mod",
                Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+([A-Za-z_][A-Za-z0-9_]*)")
                    .expect("rust mod pattern must be valid"),
            ),
            (
                "type",
                Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?type\s+([A-Za-z_][A-Za-z0-9_]*)")
                    .expect("rust type pattern must be valid"),
            ),
            (
                "const",
                Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:const|static)\s+([A-Za-z_][A-Za-z0-9_]*)\s*:")
                    .expect("rust const pattern must be valid"),
            ),
            (
                "use",
                Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+([A-Za-z_][A-Za-z0-9_:{}*, ]*)")
                    .expect("rust use pattern must be valid"),
            ),
        ]
    })
}

/// Extract Rust declaration signatures, one per matched line.
pub fn extract(source: &str) -> Vec<String> {
    let mut signatures = Vec::new();
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") {
            continue;
        }
        for (kind, pattern) in declaration_patterns() {
            if let Some(caps) = pattern.captures(line)
                && let Some(name) = caps.get(1)
            {
                signatures.push(format!("{kind}:{}", name.as_str().trim()));
                break;
            }
        }
    }
    signatures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_functions_and_types() {
        let source = r#"
pub struct Widget;

impl Widget {
    pub async fn spin(&self) {}
    fn inner_helper() {}
}

pub(crate) enum Mode { A, B }
pub trait Spinner {}
mod helpers;
pub const MAX_SPIN: u32 = 3;
use std::collections::HashMap;
"#;
        let signatures = extract(source);
        assert!(signatures.contains(&"struct:Widget".to_string()));
        assert!(signatures.contains(&"fn:spin".to_string()));
        assert!(signatures.contains(&"fn:inner_helper".to_string()));
        assert!(signatures.contains(&"enum:Mode".to_string()));
        assert!(signatures.contains(&"trait:Spinner".to_string()));
        assert!(signatures.contains(&"mod:helpers".to_string()));
        assert!(signatures.contains(&"const:MAX_SPIN".to_string()));
        assert!(signatures.iter().any(|s| s.starts_with("use:")));
        assert!(signatures.iter().any(|s| s.starts_with("impl:")));
    }

    #[test]
    fn commented_declarations_are_skipped() {
        let signatures = extract("// fn not_real() {}\n");
        assert!(signatures.is_empty());
    }

    #[test]
    fn body_lines_produce_no_signatures() {
        let signatures = extract("fn real() {\n    let x = 1 + 1;\n}\n");
        assert_eq!(signatures, vec!["fn:real".to_string()]);
    }
}
