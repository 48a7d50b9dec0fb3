//! README rendering: Markdown to HTML with highlighted code blocks.
//!
//! Both entry points are pure functions. Output is safe to embed in a page:
//! every piece of input text is entity-escaped and only markup produced here
//! is emitted as literal HTML.

mod escape;
pub mod highlight;
mod link;
pub mod markdown;
mod placeholder;

pub use escape::escape_html;
pub use highlight::{highlight, Language, TokenClass};
pub(crate) use link::safe_url;
pub use markdown::render;
