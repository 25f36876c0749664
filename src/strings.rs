use std::cell::RefCell;

use regex::{Captures, Regex};
use rustc_hash::FxHashMap;

/// Which part of a run's content a piece of literal text is.
///
/// Text before the first child, between children and after the last child
/// is trimmed differently from the content of a childless run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The whole content of a run without children.
    Full,
    /// Text before the first child.
    Left,
    /// Text after the last child.
    Right,
    /// Text between two children.
    Middle,
}

/// Whitespace as regular expressions see it, plus the byte order mark.
#[inline]
pub fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

#[inline]
pub fn is_alnum(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Whether the character at `index` is preceded by an odd number of backslashes.
pub fn is_escaped(text: &[char], index: usize) -> bool {
    text[..index.min(text.len())]
        .iter()
        .rev()
        .take_while(|&&c| c == '\\')
        .count()
        % 2
        == 1
}

pub fn collect(text: &[char]) -> String {
    text.iter().collect()
}

/// First occurrence of `pattern` at or after `from`.
pub fn index_of(text: &[char], pattern: &str, from: usize) -> Option<usize> {
    let pattern: smallvec::SmallVec<[char; 8]> = pattern.chars().collect();
    if pattern.is_empty() {
        return Some(from.min(text.len()));
    }
    if from >= text.len() {
        return None;
    }
    text[from..]
        .windows(pattern.len())
        .position(|w| w == pattern.as_slice())
        .map(|p| p + from)
}

/// Last `c` at or before `index`.
pub fn last_index_of(text: &[char], c: char, index: usize) -> Option<usize> {
    if text.is_empty() {
        return None;
    }
    let upto = index.min(text.len() - 1);
    text[..=upto].iter().rposition(|&x| x == c)
}

/// Strip whitespace from the requested side(s) of `text`.
///
/// `Left` strips leading whitespace from every line, `Right` strips
/// trailing whitespace before every line end, and `Middle` only collapses
/// trailing newline runs.
pub fn trim_side(text: &str, side: Side) -> String {
    match side {
        Side::Full => text.trim_matches(is_space).to_string(),
        Side::Left => trim_line_starts(text),
        Side::Right => trim_line_ends(text, is_space),
        Side::Middle => trim_line_ends(text, |c| c == '\n'),
    }
}

fn trim_line_starts(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if (i == 0 || chars[i - 1] == '\n') && is_space(chars[i]) {
            while i < chars.len() && is_space(chars[i]) {
                i += 1;
            }
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Remove runs of `strip` characters that end at a line end, keeping
/// whatever part of a run lies after its last usable line end.
fn trim_line_ends(text: &str, strip: impl Fn(char) -> bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < len {
        if !strip(chars[i]) {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let mut run_end = i;
        while run_end < len && strip(chars[run_end]) {
            run_end += 1;
        }

        let cut = (i + 1..=run_end)
            .rev()
            .find(|&r| r == len || chars[r] == '\n');
        let keep_from = cut.unwrap_or(i);
        out.extend(&chars[keep_from..run_end]);
        i = run_end;
    }
    out
}

/// Remove the backslash from `\\` and from a backslash before any of `chars`.
/// Other backslashes are literal.
pub fn escape_chars(text: &str, chars: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }

    let text: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let c = text[i];
        if c == '\\' && i + 1 < text.len() {
            let next = text[i + 1];
            if next == '\\' || chars.contains(next) {
                out.push(next);
                i += 2;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Replace the HTML-significant characters with entities.
pub fn escape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&#x2f;"),
            _ => out.push(c),
        }
    }
    out
}

/// Compiled patterns for expressions built at runtime from nesting context.
#[derive(Default)]
pub(crate) struct RegexCache {
    compiled: RefCell<FxHashMap<String, Regex>>,
}

impl RegexCache {
    fn with<R>(&self, pattern: &str, f: impl FnOnce(&Regex) -> R) -> Option<R> {
        if let Some(re) = self.compiled.borrow().get(pattern) {
            return Some(f(re));
        }

        match Regex::new(pattern) {
            Ok(re) => {
                let result = f(&re);
                self.compiled.borrow_mut().insert(pattern.to_string(), re);
                Some(result)
            }
            Err(err) => {
                log::error!("bad pattern {pattern:?}: {err}");
                None
            }
        }
    }

    pub fn is_match(&self, pattern: &str, haystack: &str) -> bool {
        self.with(pattern, |re| re.is_match(haystack)).unwrap_or(false)
    }

    /// The capture groups of the first match, as owned strings. Groups that
    /// did not participate are `None`.
    pub fn captures(&self, pattern: &str, haystack: &str) -> Option<Vec<Option<String>>> {
        self.with(pattern, |re| re.captures(haystack).map(|c| owned_groups(&c)))
            .flatten()
    }

    pub fn replace_all(&self, pattern: &str, haystack: &str, with: &str) -> String {
        self.with(pattern, |re| re.replace_all(haystack, with).into_owned())
            .unwrap_or_else(|| haystack.to_string())
    }
}

fn owned_groups(captures: &Captures) -> Vec<Option<String>> {
    captures
        .iter()
        .map(|g| g.map(|m| m.as_str().to_string()))
        .collect()
}
