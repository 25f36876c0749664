use pretty_assertions::assert_eq;

use crate::nodes::{RunArena, RunId};
use crate::*;

mod cache;
mod core;
mod pathological;
mod quotes;
mod supersubscript;
mod table;

#[track_caller]
fn html(input: &str, expected: &str) {
    html_opts(input, expected, &Options::default());
}

/// Options for documents served from `danrahn.com`, with bare domains left
/// relative. Links then render without any added attributes.
fn site() -> Options {
    let mut options = Options::default();
    options.render.site_host = Some("danrahn.com".to_string());
    options.render.absolute_domains = false;
    options
}

/// Render `input` and compare with `expected`. Also checks that the tree
/// is well formed, that a repeat parse is served from the cache, and that
/// typing the input out a character at a time arrives at the same output.
#[track_caller]
fn html_opts(input: &str, expected: &str, options: &Options) {
    let md = Markdown::new(options.clone());
    let actual = md.parse(input).unwrap();
    assert_eq!(expected, actual, "input: {:?}", input);
    assert_bounds(&md);

    assert_eq!(actual, md.parse(input).unwrap());
    assert!(md.same_text(), "repeat parse of {:?} was not cached", input);

    let typed = Markdown::new(options.clone());
    for (i, _) in input.char_indices() {
        typed.parse(&input[..i]).unwrap();
    }
    assert_eq!(
        actual,
        typed.parse(input).unwrap(),
        "typed input: {:?}",
        input
    );
    assert_bounds(&typed);
}

/// Like `html_opts`, without typing the input out. For inputs too large to
/// reparse once per character.
#[track_caller]
fn html_once(input: &str, expected: &str) {
    let md = Markdown::default();
    assert_eq!(expected, md.parse(input).unwrap(), "input: {:?}", input);
    assert_bounds(&md);
}

#[track_caller]
fn html_inline(input: &str, expected: &str) {
    let md = Markdown::default();
    assert_eq!(expected, md.parse_inline(input).unwrap(), "input: {:?}", input);
    assert_bounds(&md);
}

/// Every run lies within its parent, and siblings are ordered and disjoint.
#[track_caller]
fn assert_bounds(md: &Markdown) {
    let root = md.root().unwrap();
    let arena = md.arena().unwrap();
    assert_within(&arena, root);
}

#[track_caller]
fn assert_within(arena: &RunArena, id: RunId) {
    let run = id.data(arena);
    assert!(run.start <= run.end, "{:?} ends before it starts", run);

    let mut previous_end = run.start;
    for child in id.children(arena) {
        let inner = child.data(arena);
        assert!(
            previous_end <= inner.start && inner.end <= run.end,
            "{:?} [{}, {}) is misplaced in {:?} [{}, {})",
            inner.state(),
            inner.start,
            inner.end,
            run.state(),
            run.start,
            run.end
        );
        previous_end = inner.end;
        assert_within(arena, child);
    }
}

/// Wrap `inner` in a paragraph, as the root does with loose text.
fn div(inner: &str) -> String {
    format!("<div class=\"mdDiv\">{}</div>", inner)
}

/// The numbered lines of a code block.
fn pre_lines(lines: &[&str]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("<span class=\"codeLineNumber\">{}</span>{}\n", i + 1, line))
        .collect()
}
