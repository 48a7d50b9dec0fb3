//! Standalone HTML page with a package's details and rendered README.

use crate::manifest::DependencyKind;
use crate::registry::PackageMetadata;
use crate::render::{escape_html, safe_url};

const STYLE: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; max-width: 960px; margin: 0 auto; padding: 24px; background: #1e1e1e; color: #d4d4d4; }
    a { color: #3794ff; }
    .badge { display: inline-block; padding: 2px 8px; margin-right: 6px; border-radius: 4px; background: #0e639c; color: #fff; font-size: 12px; }
    .badge.dev { background: #6c3c9c; }
    .info-row { display: flex; gap: 12px; padding: 6px 0; border-bottom: 1px solid #333; }
    .info-label { width: 120px; font-weight: 600; }
    .readme { margin-top: 24px; }
    .code-block-wrapper { position: relative; background: #252526; border-radius: 4px; margin: 12px 0; }
    .code-block-wrapper pre { margin: 0; padding: 12px; overflow-x: auto; }
    .code-language { position: absolute; top: 4px; right: 8px; font-size: 11px; color: #858585; text-transform: uppercase; }
    code { font-family: Consolas, "Courier New", monospace; }
    blockquote { border-left: 3px solid #555; margin: 0; padding-left: 12px; color: #aaa; }
"#;

/// Everything shown on a details page.
#[derive(Debug, Clone)]
pub struct PackageDetails {
    pub name: String,
    pub version: String,
    /// Table the package is declared in, `None` when not installed.
    pub kind: Option<DependencyKind>,
    /// Registry document, `None` when it could not be fetched.
    pub metadata: Option<PackageMetadata>,
    /// README already rendered to HTML.
    pub readme_html: String,
}

fn info_row(label: &str, value_html: &str) -> String {
    format!(
        "<div class=\"info-row\"><div class=\"info-label\">{}</div><div class=\"info-value\">{}</div></div>\n",
        label, value_html
    )
}

fn link_row(label: &str, url: &str) -> String {
    let url = escape_html(&safe_url(url));
    info_row(
        label,
        &format!("<a href=\"{}\" target=\"_blank\">{}</a>", url, url),
    )
}

/// Build a complete HTML document for `details`. Registry strings are escaped;
/// `readme_html` is inserted as is.
pub fn details_page(details: &PackageDetails) -> String {
    let name = escape_html(&details.name);

    let mut badges = format!(
        "<span class=\"badge\">{}</span>",
        escape_html(&details.version)
    );
    match details.kind {
        Some(DependencyKind::Production) => {
            badges.push_str("<span class=\"badge\">Dependency</span>")
        }
        Some(DependencyKind::Development) => {
            badges.push_str("<span class=\"badge dev\">Dev Dependency</span>")
        }
        None => {}
    }

    let mut info = String::new();
    match &details.metadata {
        Some(meta) => {
            info.push_str(&info_row("Description", &escape_html(meta.description())));
            info.push_str(&info_row("Author", &escape_html(meta.author())));
            info.push_str(&info_row("License", &escape_html(meta.license())));
            info.push_str(&info_row("Keywords", &escape_html(&meta.keywords())));
            info.push_str(&link_row("Homepage", &meta.homepage()));
            if let Some(repository) = meta.repository_url() {
                info.push_str(&link_row("Repository", repository));
            }
        }
        None => {
            info.push_str(&link_row(
                "Homepage",
                &format!("https://www.npmjs.com/package/{}", details.name),
            ));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{name}</title>
<style>{style}</style>
</head>
<body>
<h1>{name}</h1>
<div class="badges">{badges}</div>
<div class="info">
{info}</div>
<div class="readme">
{readme}
</div>
</body>
</html>
"#,
        name = name,
        style = STYLE,
        badges = badges,
        info = info,
        readme = details.readme_html,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(metadata: Option<&str>, kind: Option<DependencyKind>) -> PackageDetails {
        PackageDetails {
            name: "left-pad".to_string(),
            version: "^1.3.0".to_string(),
            kind,
            metadata: metadata.map(|json| serde_json::from_str(json).expect("valid metadata")),
            readme_html: "<div><p>README</p></div>".to_string(),
        }
    }

    #[test]
    fn test_page_contains_metadata_and_readme() {
        let page = details_page(&details(
            Some(r#"{"name":"left-pad","description":"String <padding>","license":"WTFPL","repository":{"url":"https://github.com/left-pad/left-pad"}}"#),
            Some(DependencyKind::Development),
        ));

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>left-pad</title>"));
        assert!(page.contains("String &lt;padding&gt;"));
        assert!(page.contains("WTFPL"));
        assert!(page.contains("Dev Dependency"));
        assert!(page.contains("https://github.com/left-pad/left-pad"));
        assert!(page.contains("<div><p>README</p></div>"));
    }

    #[test]
    fn test_script_links_from_registry_are_neutralised() {
        let page = details_page(&details(
            Some(r#"{"name":"evil","homepage":"javascript:alert(document.cookie)","repository":"java\tscript:alert(1)"}"#),
            None,
        ));

        assert!(!page.contains("javascript:"));
        assert!(!page.contains("script:alert"));
        assert_eq!(page.matches(r##"<a href="#" target="_blank">"##).count(), 2);
    }

    #[test]
    fn test_page_without_metadata_links_npmjs() {
        let page = details_page(&details(None, None));
        assert!(page.contains("https://www.npmjs.com/package/left-pad"));
        assert!(!page.contains("Repository"));
        assert!(!page.contains(">Dependency<"));
    }
}
