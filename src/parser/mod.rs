mod blocks;
mod cache;
mod code;
mod inlines;
mod links;
mod lists;
pub mod options;
mod source;
mod table;

use std::cell::{Ref, RefCell};
use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::html;
pub(crate) use crate::parser::links::TOP_LEVEL_DOMAINS;
use crate::nodes::{ListType, Run, RunArena, RunId, RunValue, State};
pub use crate::parser::options::Options;
use crate::parser::source::Source;
use crate::strings::RegexCache;

const TAB_WIDTH: usize = 4;

/// The ways a call to [`Markdown::parse`] can fail. Malformed input is not
/// one of them: anything that doesn't parse as markup is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// `parse` was called on an instance that was already parsing.
    #[error("can't call parse while already parsing")]
    Reentrant,
}

/// A `[label]: url` seen during the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Definition {
    /// Offset of the definition's `[`.
    pub start: usize,
    pub label: String,
    pub url: String,
}

/// Resolve `label` against the definitions. The last definition wins.
pub(crate) fn lookup<'d>(definitions: &'d [Definition], label: &str) -> Option<&'d str> {
    definitions
        .iter()
        .rev()
        .find(|d| d.label == label)
        .map(|d| d.url.as_str())
}

/// A stateful Markdown parser.
///
/// Keeps the Run tree and rendered HTML of the previous parse, so that
/// parsing a slightly edited text only rescans what the edit could affect.
///
/// ```rust
/// # use runmark::{Markdown, Options};
/// let md = Markdown::new(Options::default());
/// assert_eq!(md.parse("# Hi").unwrap(), "<h1 id=\"hi\">Hi</h1>");
/// assert_eq!(md.parse("# Hi").unwrap(), "<h1 id=\"hi\">Hi</h1>");
/// assert!(md.same_text());
/// ```
pub struct Markdown {
    options: Options,
    session: RefCell<Session>,
}

/// Everything that survives from one parse to the next.
pub(crate) struct Session {
    pub arena: RunArena,
    pub root: Option<RunId>,
    pub text: Vec<char>,
    pub inline_only: bool,
    pub definitions: Vec<Definition>,
    pub html: Option<String>,
    pub same_text: bool,
    pub regexes: RegexCache,
}

impl Default for Markdown {
    fn default() -> Self {
        Markdown::new(Options::default())
    }
}

impl Markdown {
    pub fn new(options: Options) -> Markdown {
        Markdown {
            options,
            session: RefCell::new(Session::new()),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Parse `text` and render it to HTML.
    pub fn parse(&self, text: &str) -> Result<String, ParseError> {
        self.parse_with(text, self.options.parse.inline_only)
    }

    /// Parse `text` with only inline constructs enabled.
    pub fn parse_inline(&self, text: &str) -> Result<String, ParseError> {
        self.parse_with(text, true)
    }

    /// Whether the last parse was given the same text as the one before it,
    /// and returned the previous result without scanning.
    pub fn same_text(&self) -> bool {
        self.session.try_borrow().is_ok_and(|s| s.same_text)
    }

    /// The root of the Run tree built by the last parse.
    pub fn root(&self) -> Option<RunId> {
        self.session.try_borrow().ok()?.root
    }

    /// The arena holding the Run tree built by the last parse.
    pub fn arena(&self) -> Option<Ref<'_, RunArena>> {
        let session = self.session.try_borrow().ok()?;
        Some(Ref::map(session, |s| &s.arena))
    }

    fn parse_with(&self, text: &str, inline_only: bool) -> Result<String, ParseError> {
        let Ok(mut session) = self.session.try_borrow_mut() else {
            log::error!("Can't call parse when we're already parsing!");
            return Err(ParseError::Reentrant);
        };

        let started = Instant::now();
        let resume = if inline_only {
            session.reset_full(text.chars().collect(), true);
            0
        } else {
            let text = prepare_input(text);
            if session.html.is_some() && !session.inline_only && session.text == text {
                log::trace!("identical content, returning cached content");
                session.same_text = true;
                return Ok(session.html.clone().unwrap_or_default());
            }
            session.reset(text, self.options.parse.cache)
        };

        let Session {
            arena,
            root,
            text,
            definitions,
            regexes,
            ..
        } = &mut *session;
        let Some(root) = *root else {
            return Ok(String::new());
        };

        let mut parser = Parser {
            arena: &mut *arena,
            src: Source::new(text),
            root,
            current: root,
            inline_only,
            options: &self.options,
            definitions: &mut *definitions,
            regexes,
            link_scans: FxHashMap::default(),
        };
        parser.scan(resume);

        let rendered = html::render(
            arena,
            root,
            text,
            &self.options,
            definitions,
            regexes,
            inline_only,
        );
        let rendered = rendered.trim().to_string();
        session.html = Some(rendered.clone());

        let elapsed = started.elapsed().as_secs_f64() * 1000.0;
        if inline_only {
            log::trace!("Parsed inline markdown in {elapsed}ms");
        } else {
            let cache = if self.options.parse.cache { "ON" } else { "OFF" };
            log::info!("Parsed markdown in {elapsed}ms (Cache {cache})");
        }

        Ok(rendered)
    }
}

/// Drop leading newlines and carriage returns, and expand tabs.
fn prepare_input(text: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\r' => {}
            '\n' if out.is_empty() => {}
            '\t' => out.extend(std::iter::repeat(' ').take(TAB_WIDTH)),
            _ => out.push(c),
        }
    }
    out
}

/// One scan over the text, growing the Run tree.
pub(crate) struct Parser<'a> {
    arena: &'a mut RunArena,
    src: Source<'a>,
    root: RunId,
    current: RunId,
    inline_only: bool,
    options: &'a Options,
    definitions: &'a mut Vec<Definition>,
    regexes: &'a RegexCache,
    /// Outcome of every link scan so far, by `(start, limit)`.
    link_scans: FxHashMap<(usize, usize), Option<links::LinkMatch>>,
}

impl<'a> Parser<'a> {
    fn scan(&mut self, start: usize) {
        let len = self.src.len();
        let mut i = start;
        while i < len {
            while self.current != self.root && i >= self.run(self.current).end {
                self.current = self.current.parent(self.arena).unwrap_or(self.root);
            }

            if self.current == self.root {
                self.record_closed(i);
            }

            i = self.dispatch(i).max(i) + 1;
        }

        self.record_unfinished();
    }

    fn dispatch(&mut self, i: usize) -> usize {
        match self.src.at(i) {
            Some('#') => self.check_header(i),
            Some('!') => self.check_image(i),
            Some('[') => self.check_open_bracket(i),
            Some('`') => self.check_backtick(i),
            Some('-') => self.check_dash(i),
            Some('*') => self.check_asterisk(i),
            Some('_') => self.check_underscore(i),
            Some('~') => self.check_tilde(i),
            Some('+') => self.check_plus(i),
            Some('>') => {
                self.check_block_quote(i);
                i
            }
            Some('0'..='9') => {
                self.check_list(i, ListType::Ordered);
                i
            }
            Some(' ') => self.check_space(i),
            Some('<') => self.check_less_than(i),
            Some('|') => self.check_pipe(i),
            Some('.') => self.check_implicit_url(i),
            Some('^') => self.check_caret(i),
            _ => i,
        }
    }

    fn check_dash(&mut self, i: usize) -> usize {
        if self.check_hr(i) {
            return self.index_or_parent_end("\n", i) - 1;
        }
        i
    }

    fn check_asterisk(&mut self, i: usize) -> usize {
        if self.src.is_escaped(i) {
            return i;
        }
        if self.check_hr(i) {
            return self.index_or_parent_end("\n", i) - 1;
        }
        if self.check_list(i, ListType::Unordered) {
            return i;
        }
        self.check_underscore(i)
    }

    fn check_underscore(&mut self, i: usize) -> usize {
        if self.check_hr(i) {
            return self.index_or_parent_end("\n", i) - 1;
        }
        if self.check_format(i, true) {
            return i + 1;
        }
        i
    }

    fn check_tilde(&mut self, i: usize) -> usize {
        if self.src.is_escaped(i) {
            return i;
        }
        if let Some(resume) = self.check_super_subscript(i) {
            return resume;
        }
        match self.check_fenced_code(i) {
            code::FenceResult::NotFenced => self.check_plus(i),
            code::FenceResult::Unterminated => i,
            code::FenceResult::Block(end) => end - 1,
        }
    }

    fn check_plus(&mut self, i: usize) -> usize {
        if self.check_format(i, false) {
            return i + 1;
        }
        i
    }

    fn check_caret(&mut self, i: usize) -> usize {
        self.check_super_subscript(i).unwrap_or(i)
    }

    fn check_backtick(&mut self, i: usize) -> usize {
        if self.src.is_escaped(i) {
            return i;
        }
        match self.check_fenced_code(i) {
            code::FenceResult::Block(end) => end - 1,
            code::FenceResult::Unterminated => i + 2,
            code::FenceResult::NotFenced => match self.check_inline_code(i) {
                Some(end) => end - 1,
                None => i,
            },
        }
    }

    fn check_space(&mut self, i: usize) -> usize {
        match self.check_indented_code(i) {
            Some(end) => end.max(1) - 1,
            None => i,
        }
    }

    fn check_pipe(&mut self, i: usize) -> usize {
        match self.check_table(i) {
            Some(end) => end.max(1) - 1,
            None => i,
        }
    }

    #[inline]
    fn run(&self, id: RunId) -> &Run {
        id.data(self.arena)
    }

    #[inline]
    fn run_mut(&mut self, id: RunId) -> &mut Run {
        id.data_mut(self.arena)
    }

    #[inline]
    fn cur(&self) -> &Run {
        self.run(self.current)
    }

    fn state(&self) -> State {
        self.cur().state()
    }

    fn start_context(&self, id: RunId) -> usize {
        self.run(id).start_context_length(self.src.raw())
    }

    fn end_context(&self, id: RunId) -> usize {
        self.run(id).end_context_length(self.src.raw())
    }

    /// May a run of kind `candidate` open at `index` inside the current run?
    fn allowed(&self, candidate: State, index: usize) -> bool {
        crate::nodes::state_allowed_in_state(candidate, self.cur(), index, self.src.raw())
    }

    /// Append a run to the current run.
    fn add(&mut self, value: RunValue, start: usize, end: usize) -> RunId {
        log::trace!("added {:?}: start={start}, end={end}", value.state());
        let id = RunId::new_in(self.arena, Run::new(value, start, end));
        self.current.append(self.arena, id);
        id
    }

    /// Append a run to the current run and make it current.
    fn open(&mut self, value: RunValue, start: usize, end: usize) -> RunId {
        let id = self.add(value, start, end);
        self.current = id;
        id
    }

    /// End of the current run's content.
    fn parent_end(&self) -> usize {
        let cur = self.cur();
        cur.end.saturating_sub(self.end_context(self.current))
    }

    /// First `pattern` at or after `from`, or the end of the current run's
    /// content if it only occurs past that.
    fn index_or_parent_end(&self, pattern: &str, from: usize) -> usize {
        self.src.index_or_limit(pattern, from, self.parent_end())
    }

    /// The line after the newline at `newline`, within the current run's
    /// content, including its own newline. Returns where it ends and its text.
    fn line_after(&self, newline: usize) -> (usize, String) {
        let next = self.index_or_parent_end("\n", newline + 1);
        if next <= newline {
            return (newline, String::new());
        }
        (next, self.src.string(newline + 1, next + 1))
    }

    /// Nest level of the closest enclosing blockquote, or 0.
    fn quote_nest(&self) -> usize {
        self.current
            .ancestors(self.arena)
            .find_map(|id| match self.run(id).value {
                RunValue::BlockQuote { nest_level } => Some(nest_level),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// A pattern matching the start of a line inside every open list and
    /// blockquote, up to where new content may begin.
    fn nest_regex(&self) -> String {
        let mut regex = String::new();
        for id in self.current.ancestors(self.arena) {
            let prefix = match self.run(id).state() {
                State::OrderedList => r"(\d+\.)? *",
                State::UnorderedList => r"(\*)? *",
                State::BlockQuote => "> *",
                _ => continue,
            };
            regex.insert_str(0, prefix);
        }
        regex.insert_str(0, " *");
        regex
    }

    /// Whether `start` lies in the current run's own syntax, like the `**`
    /// of a bold run or the `(url)` of a link.
    fn in_special_context(&self, start: usize) -> bool {
        let cur = self.cur();
        let sc = self.start_context(self.current);
        let ec = self.end_context(self.current);
        (sc != 0 && start.saturating_sub(cur.start) < sc)
            || (ec != 0 && cur.end.saturating_sub(start) <= ec)
    }

    /// Mark `id` and its ancestors as never cacheable.
    fn set_volatile(&mut self, id: RunId) {
        let chain: Vec<RunId> = id.ancestors(self.arena).collect();
        for id in chain {
            self.run_mut(id).volatile = true;
        }
    }

    /// A list item's last line break is redundant before a code block.
    fn drop_trailing_break(&mut self) {
        if self.state() != State::ListItem {
            return;
        }
        if let Some(last) = self.current.last_child(self.arena) {
            if self.run(last).state() == State::LineBreak {
                last.detach(self.arena);
            }
        }
    }

    fn is_match(&self, pattern: &str, haystack: &str) -> bool {
        self.regexes.is_match(pattern, haystack)
    }
}
