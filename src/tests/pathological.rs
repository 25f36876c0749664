use super::*;
use ntest::timeout;

#[test]
#[timeout(4000)]
fn unclosed_emphasis() {
    let input = "*a_ ".repeat(1_000);
    let md = Markdown::default();
    let out = md.parse(&input).unwrap();
    assert!(out.starts_with("<div class=\"mdDiv\">"));
}

#[test]
#[timeout(4000)]
fn many_open_brackets() {
    let input = "[".repeat(2_000);
    html_once(&input, &div(&input));

    let input = "[a".repeat(1_000);
    html_once(&input, &div(&input));
}

#[test]
#[timeout(4000)]
fn many_backticks() {
    let input = "`a".repeat(5_000);
    let md = Markdown::default();
    md.parse(&input).unwrap();
}

#[test]
#[timeout(4000)]
fn deep_lists() {
    let input: String = (0..200)
        .map(|depth| format!("{}* item\n", "  ".repeat(depth)))
        .collect();
    let md = Markdown::default();
    let out = md.parse(&input).unwrap();
    assert!(out.starts_with("<ul><li>item"));
}

#[test]
#[timeout(4000)]
fn many_lines() {
    let input = "line\n".repeat(5_000);
    let md = Markdown::default();
    let out = md.parse(&input).unwrap();
    assert!(out.matches("<br />").count() >= 4_999);
}
