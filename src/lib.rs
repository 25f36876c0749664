//! An incremental Markdown to HTML renderer for live previews.
//!
//! The parser keeps the tree of the previous parse around, so feeding it
//! the same document a keystroke at a time only rescans what changed.
//!
//! ```
//! use runmark::{markdown_to_html, Options};
//!
//! assert_eq!(markdown_to_html("Hello, **世界**!", &Options::default()),
//!            "<div class=\"mdDiv\">Hello, <strong>世界</strong>!</div>");
//! ```
//!
//! For repeated parses of an evolving document, keep a [`Markdown`] around:
//!
//! ```
//! use runmark::{Markdown, Options};
//!
//! let md = Markdown::new(Options::default());
//! md.parse("# Title\nSome").unwrap();
//! let html = md.parse("# Title\nSome text").unwrap();
//! assert_eq!(html, "<h1 id=\"title\">Title</h1><div class=\"mdDiv\">Some text</div>");
//! ```

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]
#![allow(unknown_lints, clippy::doc_markdown, clippy::too_many_arguments)]

pub mod arena_tree;
pub mod html;
pub mod nodes;
pub mod parser;
mod strings;
#[cfg(test)]
mod tests;

pub use parser::options::{Options, Parse, Render};
pub use parser::{Markdown, ParseError};

/// Render Markdown to HTML with a fresh parser.
///
/// See the documentation of the crate root for an example.
pub fn markdown_to_html(text: &str, options: &Options) -> String {
    Markdown::new(options.clone())
        .parse(text)
        .unwrap_or_default()
}

/// Render Markdown to HTML with only inline constructs recognized.
pub fn markdown_to_html_inline(text: &str, options: &Options) -> String {
    Markdown::new(options.clone())
        .parse_inline(text)
        .unwrap_or_default()
}
