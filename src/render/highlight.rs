//! Regex-based syntax highlighting for fenced code blocks.
//!
//! Every language family runs the same three phases:
//!
//! 1. **Protect** string and comment literals by moving them into a
//!    [`Placeholders`] table, so keyword rules can never fire inside them.
//! 2. **Escape and classify** the remaining code in one pass: text between
//!    matches is HTML-escaped, matches are escaped and wrapped in a styled span.
//! 3. **Restore** comments first, then every other literal. A comment may
//!    contain a string token (strings are protected before comments), which the
//!    second restore pass resolves.
//!
//! Unknown languages are escaped without any styling.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::escape::escape_html;
use super::placeholder::{self, map_unprotected, Placeholders};

/// Highlighting category used to pick a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    String,
    Comment,
    Number,
    Function,
    Property,
    Selector,
    Tag,
    Attribute,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::String => "string",
            Self::Comment => "comment",
            Self::Number => "number",
            Self::Function => "function",
            Self::Property => "property",
            Self::Selector => "selector",
            Self::Tag => "tag",
            Self::Attribute => "attribute",
        }
    }

    /// Fixed dark-theme palette.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Keyword | Self::Tag => "#569cd6",
            Self::String => "#ce9178",
            Self::Comment => "#6a9955",
            Self::Number => "#b5cea8",
            Self::Function => "#dcdcaa",
            Self::Property | Self::Attribute => "#9cdcfe",
            Self::Selector => "#d7ba7d",
        }
    }
}

/// Wrap already-escaped HTML in a styled span.
pub fn span(class: TokenClass, escaped: &str) -> String {
    format!("<span style=\"color: {};\">{}</span>", class.color(), escaped)
}

/// Language families with a dedicated highlighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// JavaScript, TypeScript and their JSX variants.
    Script,
    Python,
    Json,
    Shell,
    Stylesheet,
    Markup,
}

impl Language {
    /// Resolve a fenced-block language tag, case-insensitively.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "javascript" | "js" | "typescript" | "ts" | "jsx" | "tsx" => Some(Self::Script),
            "python" | "py" => Some(Self::Python),
            "json" => Some(Self::Json),
            "bash" | "sh" | "shell" => Some(Self::Shell),
            "css" | "scss" | "sass" => Some(Self::Stylesheet),
            "html" | "xml" => Some(Self::Markup),
            _ => None,
        }
    }

    pub fn highlight(&self, code: &str) -> String {
        match self {
            Self::Script => highlight_script(code),
            Self::Python => highlight_python(code),
            Self::Json => highlight_json(code),
            Self::Shell => highlight_shell(code),
            Self::Stylesheet => highlight_stylesheet(code),
            Self::Markup => highlight_markup(code),
        }
    }
}

/// Highlight `code` for the given fenced-block language tag.
pub fn highlight(code: &str, language: &str) -> String {
    let code = placeholder::sanitize(code);
    match Language::from_tag(language) {
        Some(lang) => lang.highlight(&code),
        None => escape_html(&code),
    }
}

// ============================================================
// Patterns
// ============================================================

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid highlight pattern")
}

const SCRIPT_KEYWORDS: &str = "const|let|var|function|return|if|else|for|while|do|switch|case|break|continue|class|extends|import|export|default|from|async|await|try|catch|throw|new|this|super|static";
const PYTHON_KEYWORDS: &str = "def|class|import|from|return|if|elif|else|for|while|in|not|and|or|try|except|finally|with|as|lambda|pass|break|continue|yield|async|await";
const SHELL_KEYWORDS: &str = "sudo|npm|cd|ls|mkdir|rm|cp|mv|echo|cat|grep|git";

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| compile(r#""(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'"#));
static SCRIPT_STRING: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#""(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'|`(?:\\.|[^`\\])*`"#)
});
static SLASH_LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"//.*"));
static BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)/\*.*?\*/"));
static HASH_COMMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"#.*"));
static SHELL_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)(?:^|[ \t])(?P<lit>#.*)"));
static JSON_STRING: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?P<lit>"(?:\\.|[^"\\\n])*")(?P<key>\s*:)?"#));
static MARKUP_COMMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<!--.*?-->"));
static MARKUP_VALUE: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"=(?P<lit>"[^"]*"|'[^']*')"#));

static SCRIPT_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"\b(?P<kw>{})\b|\b(?P<num>\d+(?:\.\d+)?)\b|\b(?P<func>[A-Za-z_]\w*)(?P<ws>\s*)\(",
        SCRIPT_KEYWORDS
    ))
});
static PYTHON_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"\b(?P<kw>{})\b|\b(?P<num>\d+(?:\.\d+)?)\b",
        PYTHON_KEYWORDS
    ))
});
static JSON_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?P<kw>true|false|null)\b|(?P<num>-?\b\d+(?:\.\d+)?\b)")
});
static SHELL_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?m)(?P<prompt>^\$[ \t]*)|\b(?P<kw>{})\b",
        SHELL_KEYWORDS
    ))
});
static STYLESHEET_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)(?P<sel>^[.#]?[\w-]+)(?P<sws>[ \t]*)\{|\b(?P<prop>[A-Za-z-][\w-]*)(?P<sep>[ \t]*:[ \t]*)(?P<val>[^;{}\n]+)(?P<end>[;}]|$)",
    )
});
static MARKUP_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?P<open></?)(?P<tag>[\w:.-]+)|(?P<attr>[\w:-]+)(?P<eq>=)")
});

// ============================================================
// Phases
// ============================================================

/// A protected literal awaiting restoration.
#[derive(Debug)]
struct Literal {
    class: TokenClass,
    text: String,
    /// Unstyled text that followed the literal inside the same match.
    tail: String,
}

impl Literal {
    fn render(&self) -> String {
        format!("{}{}", span(self.class, &escape_html(&self.text)), escape_html(&self.tail))
    }
}

/// Phase 1: move every match of `pattern` into the table.
///
/// If the pattern has a `lit` group only that group is protected; text of the
/// match before it stays in the code. A `key` group, when it matched, turns
/// the literal into a property and becomes its tail.
fn protect(
    table: &mut Placeholders<Literal>,
    code: &str,
    pattern: &Regex,
    class: TokenClass,
) -> String {
    pattern
        .replace_all(code, |caps: &Captures| {
            let Some(whole) = caps.get(0) else {
                return String::new();
            };
            let lit = caps.name("lit").unwrap_or(whole);
            let lead = &code[whole.start()..lit.start()];
            let (class, tail) = match caps.name("key") {
                Some(key) => (TokenClass::Property, key.as_str().to_string()),
                None => (class, code[lit.end()..whole.end()].to_string()),
            };
            let token = table.insert(Literal {
                class,
                text: lit.as_str().to_string(),
                tail,
            });
            format!("{}{}", lead, token)
        })
        .into_owned()
}

/// Phase 2: escape the unprotected code and style every match of `pattern`.
fn classify<F>(code: &str, pattern: &Regex, mut style: F) -> String
where
    F: FnMut(&Captures) -> String,
{
    map_unprotected(code, |text| {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&escape_html(&text[last..whole.start()]));
            out.push_str(&style(&caps));
            last = whole.end();
        }
        out.push_str(&escape_html(&text[last..]));
        out
    })
}

/// Phase 3: comments first, then the remaining literals.
fn restore(table: &Placeholders<Literal>, code: &str) -> String {
    let code = table.restore(code, |lit| {
        (lit.class == TokenClass::Comment).then(|| lit.render())
    });
    table.restore(&code, |lit| Some(lit.render()))
}

fn styled(caps: &Captures, name: &str, class: TokenClass) -> Option<String> {
    caps.name(name)
        .map(|m| span(class, &escape_html(m.as_str())))
}

fn raw(caps: &Captures, name: &str) -> String {
    caps.name(name)
        .map(|m| escape_html(m.as_str()))
        .unwrap_or_default()
}

// ============================================================
// Families
// ============================================================

fn highlight_script(code: &str) -> String {
    let mut table = Placeholders::new();
    let code = protect(&mut table, code, &SCRIPT_STRING, TokenClass::String);
    let code = protect(&mut table, &code, &SLASH_LINE_COMMENT, TokenClass::Comment);
    let code = protect(&mut table, &code, &BLOCK_COMMENT, TokenClass::Comment);

    let code = classify(&code, &SCRIPT_TOKENS, |caps| {
        styled(caps, "kw", TokenClass::Keyword)
            .or_else(|| styled(caps, "num", TokenClass::Number))
            .or_else(|| {
                styled(caps, "func", TokenClass::Function)
                    .map(|name| format!("{}{}(", name, raw(caps, "ws")))
            })
            .unwrap_or_default()
    });

    restore(&table, &code)
}

fn highlight_python(code: &str) -> String {
    let mut table = Placeholders::new();
    let code = protect(&mut table, code, &QUOTED, TokenClass::String);
    let code = protect(&mut table, &code, &HASH_COMMENT, TokenClass::Comment);

    let code = classify(&code, &PYTHON_TOKENS, |caps| {
        styled(caps, "kw", TokenClass::Keyword)
            .or_else(|| styled(caps, "num", TokenClass::Number))
            .unwrap_or_default()
    });

    restore(&table, &code)
}

fn highlight_json(code: &str) -> String {
    let mut table = Placeholders::new();
    let code = protect(&mut table, code, &JSON_STRING, TokenClass::String);

    let code = classify(&code, &JSON_TOKENS, |caps| {
        styled(caps, "kw", TokenClass::Keyword)
            .or_else(|| styled(caps, "num", TokenClass::Number))
            .unwrap_or_default()
    });

    restore(&table, &code)
}

fn highlight_shell(code: &str) -> String {
    let mut table = Placeholders::new();
    let code = protect(&mut table, code, &QUOTED, TokenClass::String);
    let code = protect(&mut table, &code, &SHELL_COMMENT, TokenClass::Comment);

    let code = classify(&code, &SHELL_TOKENS, |caps| {
        styled(caps, "prompt", TokenClass::Keyword)
            .or_else(|| styled(caps, "kw", TokenClass::Keyword))
            .unwrap_or_default()
    });

    restore(&table, &code)
}

fn highlight_stylesheet(code: &str) -> String {
    let mut table = Placeholders::new();
    let code = protect(&mut table, code, &QUOTED, TokenClass::String);
    let code = protect(&mut table, &code, &BLOCK_COMMENT, TokenClass::Comment);

    let code = classify(&code, &STYLESHEET_TOKENS, |caps| {
        if let Some(selector) = styled(caps, "sel", TokenClass::Selector) {
            return format!("{}{}{{", selector, raw(caps, "sws"));
        }
        format!(
            "{}{}{}{}",
            styled(caps, "prop", TokenClass::Property).unwrap_or_default(),
            raw(caps, "sep"),
            styled(caps, "val", TokenClass::String).unwrap_or_default(),
            raw(caps, "end"),
        )
    });

    restore(&table, &code)
}

fn highlight_markup(code: &str) -> String {
    let mut table = Placeholders::new();
    let code = protect(&mut table, code, &MARKUP_COMMENT, TokenClass::Comment);
    let code = protect(&mut table, &code, &MARKUP_VALUE, TokenClass::String);

    let code = classify(&code, &MARKUP_TOKENS, |caps| {
        if let Some(tag) = styled(caps, "tag", TokenClass::Tag) {
            return format!("{}{}", raw(caps, "open"), tag);
        }
        format!(
            "{}{}",
            styled(caps, "attr", TokenClass::Attribute).unwrap_or_default(),
            raw(caps, "eq"),
        )
    });

    restore(&table, &code)
}
