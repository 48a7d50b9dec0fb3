//! Search the npm registry, read package READMEs and manage the dependencies
//! of a project.
//!
//! # Modules
//!
//! - [`render`]: Markdown to HTML with highlighted code blocks.
//! - [`watcher`]: detects when a package manager run has changed `package.json`.
//! - [`registry`]: npm registry HTTP client.
//! - [`manifest`]: read-only `package.json` access.
//! - [`npm`]: package manager command lines.
//! - [`actions`]: the operations exposed by the command line.

pub mod actions;
pub mod config;
pub mod manifest;
pub mod npm;
pub mod page;
pub mod registry;
pub mod render;
pub mod tree;
pub mod watcher;
