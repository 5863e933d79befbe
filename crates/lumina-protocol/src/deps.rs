use once_cell::sync::Lazy;
use regex::Regex;

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+(?:[^'";]*?\bfrom\s+)?['"]([^'"./][^'"]*)['"]"#)
        .expect("Failed to compile import regex")
});

/// External packages referenced by non-relative imports, in first-seen order.
///
/// The import clause may span lines but never crosses a quote or `;`, so a
/// relative import cannot swallow the statement after it.
///
/// Scoped packages (`@scope/name/...`) keep their first two segments, others
/// their first segment.
pub fn detect_dependencies(content: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in IMPORT_RE.captures_iter(content) {
        let specifier = &caps[1];
        let package = package_name(specifier);
        if !found.iter().any(|p| p == &package) {
            found.push(package);
        }
    }
    found
}

fn package_name(specifier: &str) -> String {
    let take = if specifier.starts_with('@') { 2 } else { 1 };
    specifier.split('/').take(take).collect::<Vec<_>>().join("/")
}
