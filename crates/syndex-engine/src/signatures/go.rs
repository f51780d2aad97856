use regex::Regex;
use std::sync::OnceLock;

fn declaration_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (
                "func",
                // Plain functions and methods with receivers.
                Regex::new(r"^func\s+(?:\([^)]+\)\s+)?([A-Za-z_][A-Za-z0-9_]*)")
                    .expect("go func pattern must be valid"),
            ),
            (
                "type",
                Regex::new(r"^type\s+([A-Za-z_][A-Za-z0-9_]*)\s+(?:struct|interface|func|\[|map|chan|[A-Za-z_*])")
                    .expect("go type pattern must be valid"),
            ),
            (
                "var",
                Regex::new(r"^(?:var|const)\s+([A-Za-z_][A-Za-z0-9_]*)")
                    .expect("go var pattern must be valid"),
            ),
            (
                "package",
                Regex::new(r"^package\s+([A-Za-z_][A-Za-z0-9_]*)")
                    .expect("go package pattern must be valid"),
            ),
            (
                "import",
                Regex::new(r#"^\s*(?:import\s+)?(?:[A-Za-z_.]+\s+)?"([^"]+)"$"#)
                    .expect("go import pattern must be valid"),
            ),
        ]
    })
}

/// Extract Go declaration signatures. Top-level declarations only: Go nests
/// nothing but literals, so column-zero matching is enough.
pub fn extract(source: &str) -> Vec<String> {
    let mut signatures = Vec::new();
    let mut in_import_block = false;
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") {
            continue;
        }
        if line.starts_with("import (") {
            in_import_block = true;
            continue;
        }
        if in_import_block {
            if trimmed.starts_with(')') {
                in_import_block = false;
            } else if let Some(path) = trimmed.split('"').nth(1) {
                signatures.push(format!("import:{path}"));
            }
            continue;
        }
        for (kind, pattern) in declaration_patterns() {
            if *kind == "import" && !trimmed.starts_with("import") {
                continue;
            }
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
