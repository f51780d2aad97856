use regex::Regex;
use std::sync::OnceLock;

fn declaration_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (
                "class",
                Regex::new(r"^\s*class\s+([A-Za-z_][A-Za-z0-9_]*)")
                    .expect("python class pattern must be valid"),
            ),
            (
                "def",
                Regex::new(r"^\s*(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)")
                    .expect("python def pattern must be valid"),
            ),
            (
                "import",
                Regex::new(r"^\s*import\s+([A-Za-z_][A-Za-z0-9_.]*)")
                    .expect("python import pattern must be valid"),
            ),
            (
                "import",
                Regex::new(r"^\s*from\s+([A-Za-z_.][A-Za-z0-9_.]*)\s+import")
                    .expect("python from-import pattern must be valid"),
            ),
        ]
    })
}

/// Extract Python declaration signatures.
pub fn extract(source: &str) -> Vec<String> {
    let mut signatures = Vec::new();
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            continue;
        }
        for (kind, pattern) in declaration_patterns() {
            if let Some(caps) = pattern.captures(line)
                && let Some(name) = caps.get(1)
            {
                signatures.push(format!("{kind}:{}", name.as_str()));
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
    fn extracts_classes_defs_and_imports() {
        let source = r#"
import os
from typing import Optional

class Widget:
    def spin(self, times: int) -> None:
        pass

    async def unwind(self):
        pass

def make_widget() -> Widget:
    return Widget()
"#;
        let signatures = extract(source);
        assert!(signatures.contains(&"import:os".to_string()));
        assert!(signatures.contains(&"import:typing".to_string()));
        assert!(signatures.contains(&"class:Widget".to_string()));
        assert!(signatures.contains(&"def:spin".to_string()));
        assert!(signatures.contains(&"def:unwind".to_string()));
        assert!(signatures.contains(&"def:make_widget".to_string()));
    }

    #[test]
    fn comments_are_skipped() {
        let signatures = extract("# def not_real():\n");
        assert!(signatures.is_empty());
    }
}
