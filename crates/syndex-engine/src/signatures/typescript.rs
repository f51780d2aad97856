use regex::Regex;
use std::sync::OnceLock;

fn declaration_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (
                "class",
                Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][A-Za-z0-9_$]*)")
                    .expect("ts class pattern must be valid"),
            ),
            (
                "interface",
                Regex::new(r"^\s*(?:export\s+)?interface\s+([A-Za-z_$][A-Za-z0-9_$]*)")
                    .expect("ts interface pattern must be valid"),
            ),
            (
                "enum",
                Regex::new(r"^\s*(?:export\s+)?(?:const\s+)?enum\s+([A-Za-z_$][A-Za-z0-9_$]*)")
                    .expect("ts enum pattern must be valid"),
            ),
            (
                "type",
                Regex::new(r"^\s*(?:export\s+)?type\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=")
                    .expect("ts type pattern must be valid"),
            ),
            (
                "function",
                Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][A-Za-z0-9_$]*)")
                    .expect("ts function pattern must be valid"),
            ),
            (
                "function",
                // Arrow functions assigned to const/let/var bindings.
                Regex::new(r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$][A-Za-z0-9_$]*)\s*=>")
                    .expect("ts arrow pattern must be valid"),
            ),
            (
                "method",
                // Class methods: optional modifiers, name, parameter list, body brace.
                Regex::new(r"^\s{2,}(?:public\s+|private\s+|protected\s+|static\s+|readonly\s+|async\s+)*([A-Za-z_$][A-Za-z0-9_$]*)\s*\([^;]*\)\s*(?::[^;{]+)?\{")
                    .expect("ts method pattern must be valid"),
            ),
            (
                "import",
                Regex::new(r#"^\s*import\s+.*?from\s+['"]([^'"]+)['"]"#)
                    .expect("ts import pattern must be valid"),
            ),
        ]
    })
}

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "else", "do", "try", "new",
];

/// Extract TypeScript/JavaScript declaration signatures.
pub fn extract(source: &str) -> Vec<String> {
    let mut signatures = Vec::new();
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.starts_with("/*") {
            continue;
        }
        for (kind, pattern) in declaration_patterns() {
            if let Some(caps) = pattern.captures(line)
                && let Some(name) = caps.get(1)
            {
                let name = name.as_str();
                // The method pattern is loose enough to match control flow.
                if *kind == "method" && CONTROL_KEYWORDS.contains(&name) {
                    continue;
                }
                signatures.push(format!("{kind}:{name}"));
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
    fn extracts_classes_functions_and_imports() {
        let source = r#"
import { useState } from 'react';

export interface WidgetProps {
  label: string;
}

export type WidgetId = string;

export default class Widget {
  private count = 0;

  spin(times: number): void {
    for (let i = 0; i < times; i++) {
      this.count++;
    }
  }
}

export async function loadWidget(id: WidgetId) {}

export const renderWidget = async (props: WidgetProps) => null;
"#;
        let signatures = extract(source);
        assert!(signatures.contains(&"import:react".to_string()));
        assert!(signatures.contains(&"interface:WidgetProps".to_string()));
        assert!(signatures.contains(&"type:WidgetId".to_string()));
        assert!(signatures.contains(&"class:Widget".to_string()));
        assert!(signatures.contains(&"method:spin".to_string()));
        assert!(signatures.contains(&"function:loadWidget".to_string()));
        assert!(signatures.contains(&"function:renderWidget".to_string()));
    }

    #[test]
    fn control_flow_is_not_a_method() {
        let source = "  if (ready) {\n  }\n  for (const x of xs) {\n  }\n";
        let signatures = extract(source);
        assert!(signatures.is_empty(), "got: {signatures:?}");
    }

    #[test]
    fn plain_javascript_works_too() {
        let source = "function handler(req, res) {}\nconst helper = () => 42;\n";
        let signatures = extract(source);
        assert!(signatures.contains(&"function:handler".to_string()));
        assert!(signatures.contains(&"function:helper".to_string()));
    }
}
