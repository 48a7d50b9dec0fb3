//! Markdown to HTML conversion for package READMEs.
//!
//! The renderer is an ordered pipeline of pure string stages. Literal spans
//! (fenced blocks, inline code, generated tag markup) are parked in a
//! [`Placeholders`] table as soon as they are produced, so no later stage can
//! rewrite them; the table is drained once at the end.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::escape::escape_html;
use super::highlight::highlight;
use super::link::safe_url;
use super::placeholder::{self, map_unprotected, Placeholders};

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid markdown pattern")
}

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)```(\w*)\n(.*?)```"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"`([^`]+)`"));

static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^&gt; (.+)$"));
static H4: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^#### (.*)$"));
static H3: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^### (.*)$"));
static H2: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^## (.*)$"));
static H1: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^# (.*)$"));
static IMAGE: LazyLock<Regex> = LazyLock::new(|| compile(r"!\[([^\]]*)\]\(([^)]+)\)"));
static LINK: LazyLock<Regex> = LazyLock::new(|| compile(r"\[([^\]]+)\]\(([^)]+)\)"));
static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| compile(r"\*\*(\S(?:.*?\S)?)\*\*"));
static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b__(\S(?:.*?\S)?)__\b"));
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| compile(r"\*([^\s*](?:[^*\n]*?\S)?)\*"));
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b_(\S(?:.*?\S)?)_\b"));
static STAR_ITEM: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^\* (.+)$"));
static DASH_ITEM: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^- (.+)$"));
static ITEM_RUN: LazyLock<Regex> = LazyLock::new(|| compile(r"(?:<li>.*</li>\n?)+"));
static ORDERED_ITEM: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^\d+\. (.+)$"));
static DASH_RULE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^---$"));
static STAR_RULE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^\*\*\*$"));
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| compile(r"\n{2,}"));

/// Render a Markdown document to an HTML fragment wrapped in one `<div>`.
pub fn render(markdown: &str) -> String {
    let mut table = Placeholders::new();

    let text = placeholder::sanitize(&markdown.replace("\r\n", "\n"));
    let text = extract_fenced_blocks(&text, &mut table);
    let text = extract_inline_code(&text, &mut table);
    let text = escape_prose(&text);
    let text = apply_block_rules(&text, &mut table);
    let text = paragraphs(&text);
    let text = table.restore(&text, |html| Some(html.clone()));

    format!("<div>{}</div>", text)
}

/// Stage 1. Afterwards no triple-backtick fence remains; each block is a
/// token whose value is the finished, highlighted HTML.
fn extract_fenced_blocks(text: &str, table: &mut Placeholders<String>) -> String {
    table.protect(text, &FENCED_BLOCK, |caps| {
        let language = &caps[1];
        let code = highlight(caps[2].trim(), language);
        let label = if language.is_empty() || language == "text" {
            String::new()
        } else {
            format!(
                "<span class=\"code-language\">{}</span>",
                escape_html(language)
            )
        };
        format!(
            "<div class=\"code-block-wrapper\">{}<pre><code>{}</code></pre></div>",
            label, code
        )
    })
}

/// Stage 2. Backtick spans become tokens holding escaped `<code>` elements.
fn extract_inline_code(text: &str, table: &mut Placeholders<String>) -> String {
    table.protect(text, &INLINE_CODE, |caps| {
        format!("<code>{}</code>", escape_html(&caps[1]))
    })
}

/// Stage 3. After this no raw `<`, `>`, `&`, `"` or `'` from the input
/// survives outside of tokens.
fn escape_prose(text: &str) -> String {
    map_unprotected(text, escape_html)
}

/// Stage 4. Fixed-order substitutions over escaped prose.
fn apply_block_rules(text: &str, table: &mut Placeholders<String>) -> String {
    let text = BLOCKQUOTE.replace_all(text, "<blockquote>$1</blockquote>");
    let text = H4.replace_all(&text, "<h4>$1</h4>");
    let text = H3.replace_all(&text, "<h3>$1</h3>");
    let text = H2.replace_all(&text, "<h2>$1</h2>");
    let text = H1.replace_all(&text, "<h1>$1</h1>");

    // Images before links: `![alt](src)` also matches the link pattern.
    let text = table.protect(&text, &IMAGE, |caps| {
        format!(
            "<img src=\"{}\" alt=\"{}\" style=\"max-width: 100%; height: auto;\" />",
            safe_url(&caps[2]),
            &caps[1]
        )
    });
    let text = LINK
        .replace_all(&text, |caps: &Captures| {
            let open = table.insert(format!(
                "<a href=\"{}\" target=\"_blank\">",
                safe_url(&caps[2])
            ));
            let close = table.insert("</a>".to_string());
            format!("{}{}{}", open, &caps[1], close)
        })
        .into_owned();

    // Bold before italic: `**` would otherwise be read as two `*` markers.
    let text = BOLD_STARS.replace_all(&text, "<strong>$1</strong>");
    let text = BOLD_UNDERSCORES.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC_STAR.replace_all(&text, "<em>$1</em>");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "<em>$1</em>");

    let text = STAR_ITEM.replace_all(&text, "<li>$1</li>");
    let text = DASH_ITEM.replace_all(&text, "<li>$1</li>");
    let text = ITEM_RUN.replace_all(&text, "<ul>$0</ul>");
    let text = ORDERED_ITEM.replace_all(&text, "<li>$1</li>");

    let text = DASH_RULE.replace_all(&text, "<hr>");
    let text = STAR_RULE.replace_all(&text, "<hr>");
    text.into_owned()
}

/// Stage 5. Blank lines separate paragraphs, single newlines break lines.
fn paragraphs(text: &str) -> String {
    let text = PARAGRAPH_BREAK.replace_all(text, "</p><p>");
    format!("<p>{}</p>", text.replace('\n', "<br>"))
}
