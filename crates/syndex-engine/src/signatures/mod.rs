pub mod generic;
pub mod go;
pub mod python;
pub mod rust;
pub mod typescript;

/// Extract declaration signatures from source text.
///
/// Strategy table keyed by language: a dedicated extractor for the known
/// languages, the generic line-signature fallback for everything else. New
/// languages are additive: add a module and a match arm.
pub fn extract_signatures(language: Option<&str>, source: &str) -> Vec<String> {
    match language {
        Some("rust") => rust::extract(source),
        Some("typescript") | Some("javascript") => typescript::extract(source),
        Some("python") => python::extract(source),
        Some("go") => go::extract(source),
        _ => generic::extract(source),
    }
}

/// Order-independent structural hash over the extracted signatures.
///
/// Signatures are sorted and deduplicated before hashing so formatting and
/// declaration order do not affect the digest. When extraction yields
/// nothing, the structural hash falls back to the content hash so the field
/// is never a weaker signal than the byte-level one.
pub fn structural_hash(language: Option<&str>, source: &str, content_hash: &str) -> String {
    let mut signatures = extract_signatures(language, source);
    if signatures.is_empty() {
        return content_hash.to_string();
    }
    signatures.sort();
    signatures.dedup();
    blake3::hash(signatures.join("\n").as_bytes())
        .to_hex()
        .to_string()
}
