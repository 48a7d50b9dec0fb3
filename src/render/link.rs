//! URL filtering for generated `href` and `src` attributes.

/// Schemes a rendered link may use. Relative URLs and fragments have no
/// scheme and are always kept.
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// `url` when it is relative, a fragment or uses an allowed scheme, `#`
/// otherwise.
///
/// Browsers drop tab, CR and LF anywhere in a URL and strip leading control
/// characters and spaces before reading the scheme, so the same is done here.
pub fn safe_url(url: &str) -> String {
    let cleaned: String = url
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c <= ' ');

    match scheme(cleaned) {
        Some(scheme) if !ALLOWED_SCHEMES.iter().any(|s| scheme.eq_ignore_ascii_case(s)) => {
            "#".to_string()
        }
        _ => cleaned.to_string(),
    }
}

/// Scheme part of `url`, if it has one.
fn scheme(url: &str) -> Option<&str> {
    let (candidate, _) = url.split_once(':')?;
    let mut chars = candidate.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(candidate)
}
