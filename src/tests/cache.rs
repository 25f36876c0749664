use super::*;
use pretty_assertions::assert_eq;

const DOCUMENT: &str = concat!(
    "# Notes\n",
    "Some **bold** and _italic_ text.\n",
    "\n",
    "* one\n",
    "* two\n",
    "  1. nested\n",
    "\n",
    "> quoted\n",
    "> text\n",
    "\n",
    "```\n",
    "code\n",
    "```\n",
    "A|B\n",
    "---|---\n",
    "1|2\n",
    "\n",
    "See [docs][d] and example.com.\n",
    "[d]: docs.php\n",
);

fn fresh(text: &str) -> String {
    Markdown::default().parse(text).unwrap()
}

#[test]
fn typing_matches_fresh_parses() {
    let md = Markdown::default();
    for (i, _) in DOCUMENT.char_indices() {
        let prefix = &DOCUMENT[..i];
        assert_eq!(fresh(prefix), md.parse(prefix).unwrap(), "prefix: {:?}", prefix);
    }
    assert_eq!(fresh(DOCUMENT), md.parse(DOCUMENT).unwrap());
}

#[test]
fn deleting_matches_fresh_parses() {
    let md = Markdown::default();
    let ends: Vec<usize> = DOCUMENT.char_indices().map(|(i, _)| i).rev().collect();
    for end in ends {
        let prefix = &DOCUMENT[..end];
        assert_eq!(fresh(prefix), md.parse(prefix).unwrap(), "prefix: {:?}", prefix);
    }
}

#[test]
fn edits_in_the_middle() {
    let md = Markdown::default();
    md.parse(DOCUMENT).unwrap();

    let edited = DOCUMENT.replace("**bold**", "**bold");
    assert_eq!(fresh(&edited), md.parse(&edited).unwrap());

    let edited = DOCUMENT.replace("* two", "* two **");
    assert_eq!(fresh(&edited), md.parse(&edited).unwrap());

    let edited = DOCUMENT.replace("[d]: docs.php", "[d]: other.php");
    let html = md.parse(&edited).unwrap();
    assert_eq!(fresh(&edited), html);
    assert!(html.contains("<a href=\"other.php\">docs</a>"));
}

#[test]
fn late_closers_reach_back() {
    let md = Markdown::default();
    let start = "A *b\n\nC";
    md.parse(start).unwrap();
    let closed = "A *b\n\nC*";
    assert_eq!(fresh(closed), md.parse(closed).unwrap());
}

#[test]
fn cache_off_matches_cache_on() {
    let mut options = Options::default();
    options.parse.cache = false;
    let uncached = Markdown::new(options);
    let cached = Markdown::default();
    for (i, _) in DOCUMENT.char_indices().step_by(7) {
        let prefix = &DOCUMENT[..i];
        assert_eq!(
            cached.parse(prefix).unwrap(),
            uncached.parse(prefix).unwrap(),
            "prefix: {:?}",
            prefix
        );
    }
}

#[test]
fn same_text() {
    let md = Markdown::default();
    md.parse("**a**").unwrap();
    assert!(!md.same_text());
    md.parse("**a**").unwrap();
    assert!(md.same_text());
    md.parse("**a** b").unwrap();
    assert!(!md.same_text());
}

#[test]
fn inline_parses_are_not_reused() {
    let md = Markdown::default();
    assert_eq!(md.parse_inline("# a").unwrap(), "# a");
    assert_eq!(md.parse("# a").unwrap(), "<h1 id=\"a\">a</h1>");
    assert!(!md.same_text());
    assert_eq!(md.parse_inline("# a").unwrap(), "# a");
}
