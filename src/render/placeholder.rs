//! Side table for literal spans that later rewrite passes must not touch.
//!
//! A protected span is replaced in the text by an opaque token built from
//! Unicode private-use characters, so no Markdown or highlighting pattern
//! can match any part of it. The protected value is kept in an ordered list
//! indexed by the number embedded in the token.

use std::sync::LazyLock;

use regex::{Captures, Regex};

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{E000}(\d+)\x{E001}").expect("valid token pattern"));

/// Remove the token delimiters from untrusted input so it can never forge a
/// placeholder.
pub fn sanitize(text: &str) -> String {
    text.replace([OPEN, CLOSE], "")
}

/// Ordered association list from placeholder token to protected value.
#[derive(Debug)]
pub struct Placeholders<T> {
    entries: Vec<T>,
}

impl<T> Default for Placeholders<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Placeholders<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a value and return the token that stands in for it.
    pub fn insert(&mut self, value: T) -> String {
        let token = format!("{}{}{}", OPEN, self.entries.len(), CLOSE);
        self.entries.push(value);
        token
    }

    /// Replace every match of `pattern` in `text` with a fresh token whose
    /// value is built from the match by `make`.
    pub fn protect<F>(&mut self, text: &str, pattern: &Regex, mut make: F) -> String
    where
        F: FnMut(&Captures) -> T,
    {
        pattern
            .replace_all(text, |caps: &Captures| {
                let value = make(caps);
                self.insert(value)
            })
            .into_owned()
    }

    /// Substitute tokens back. `emit` decides per entry: `Some(html)` replaces
    /// the token, `None` leaves it for a later restore pass. Tokens that do
    /// not belong to this table are left untouched.
    pub fn restore<F>(&self, text: &str, mut emit: F) -> String
    where
        F: FnMut(&T) -> Option<String>,
    {
        TOKEN
            .replace_all(text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.entries.get(index))
                    .and_then(&mut emit)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Apply `f` to every stretch of `text` between placeholder tokens, copying
/// the tokens themselves through unchanged.
pub fn map_unprotected<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in TOKEN.find_iter(text) {
        out.push_str(&f(&text[last..token.start()]));
        out.push_str(token.as_str());
        last = token.end();
    }
    out.push_str(&f(&text[last..]));
    out
}
