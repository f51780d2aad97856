/// Languages with a dedicated structural-signature extractor.
///
/// Everything else scanned goes through the generic line-signature fallback.
pub const EXTRACTOR_LANGUAGES: [&str; 5] = ["rust", "typescript", "javascript", "python", "go"];

/// Returns true if the language has a dedicated structural extractor.
pub fn has_dedicated_extractor(language: &str) -> bool {
    EXTRACTOR_LANGUAGES.contains(&language)
}

/// Detect language from file extension and return canonical language label.
///
/// The returned set is broader than the extractor languages: any extension
/// listed here is eligible for scanning and hash tracking.
pub fn detect_language_from_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "rs" => Some("rust"),
        "ts" | "tsx" => Some("typescript"),
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        "py" | "pyi" => Some("python"),
        "go" => Some("go"),
        "java" => Some("java"),
        "c" | "h" => Some("c"),
        "cpp" | "cc" | "cxx" | "hpp" => Some("cpp"),
        "rb" => Some("ruby"),
        "swift" => Some("swift"),
        "kt" | "kts" => Some("kotlin"),
        "cs" => Some("csharp"),
        "php" => Some("php"),
        "scala" => Some("scala"),
        // Config/docs: not source inputs for the sync pipeline.
        "toml" | "yaml" | "yml" | "json" | "md" | "txt" | "lock" => None,
        _ => None,
    }
}

/// Returns true if the extension belongs to a trackable source file.
pub fn is_source_extension(ext: &str) -> bool {
    detect_language_from_extension(ext).is_some()
}
