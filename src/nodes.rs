//! The Run tree: construct kinds, per-construct payloads and the nesting policy.

use crate::arena_tree;

/// The kind of a run, as consulted by the nesting policy.
///
/// Several [`RunValue`] variants share a kind: reference links and bare
/// URLs behave like [`State::Url`], and reference definitions like
/// [`State::HtmlComment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// The document root.
    None,
    Div,
    LineBreak,
    Hr,
    OrderedList,
    UnorderedList,
    ListItem,
    Header,
    CodeBlock,
    BlockQuote,
    Table,
    Url,
    Image,
    InlineCode,
    Bold,
    Underline,
    Italic,
    Strikethrough,
    HtmlComment,
    Superscript,
    Subscript,
}

impl State {
    /// Kinds that can never open inside inline formatting: headers,
    /// blockquotes and code blocks.
    pub fn block_markdown(self) -> bool {
        matches!(self, State::Header | State::BlockQuote | State::CodeBlock)
    }

    /// Kinds that break the flow of text for layout purposes. The newline
    /// transform never wraps these in paragraphs or adds breaks around them
    /// without cause.
    pub fn is_block_element(self) -> bool {
        matches!(
            self,
            State::OrderedList
                | State::UnorderedList
                | State::ListItem
                | State::Table
                | State::BlockQuote
                | State::CodeBlock
                | State::Header
                | State::Hr
        )
    }

    /// Kinds that are not rendered as visible content and may span any
    /// number of newlines without those newlines becoming breaks.
    pub fn is_hidden_element(self) -> bool {
        matches!(self, State::HtmlComment)
    }

    /// Containers whose loose text gets line breaks and paragraphs.
    pub fn processes_newlines(self) -> bool {
        matches!(self, State::None | State::ListItem | State::BlockQuote)
    }
}

/// Free-function form of [`State::block_markdown`].
pub fn block_markdown(state: State) -> bool {
    state.block_markdown()
}

/// Free-function form of [`State::is_block_element`].
pub fn is_block_element(state: State) -> bool {
    state.is_block_element()
}

/// Free-function form of [`State::is_hidden_element`].
pub fn is_hidden_element(state: State) -> bool {
    state.is_hidden_element()
}

/// Whether a run of kind `candidate` may open at `index` while `current`
/// is the innermost open run.
///
/// Only the kind of `current` matters, except for links: inline content
/// may only open inside the bracketed text, not inside the `(url)` part.
pub fn state_allowed_in_state(candidate: State, current: &Run, index: usize, text: &[char]) -> bool {
    match current.state() {
        State::None | State::Div => true,
        State::LineBreak
        | State::Hr
        | State::HtmlComment
        | State::Image
        | State::InlineCode
        | State::CodeBlock => false,
        State::Header
        | State::Bold
        | State::Underline
        | State::Italic
        | State::Strikethrough
        | State::Superscript
        | State::Subscript
        | State::Table => !candidate.block_markdown(),
        State::Url => {
            !candidate.block_markdown()
                && index + current.end_context_length(text) < current.end
        }
        State::BlockQuote | State::ListItem => true,
        State::OrderedList | State::UnorderedList => candidate == State::ListItem,
    }
}

/// Column alignment of a table, from its delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// `---`
    #[default]
    Unset,
    /// `:---`
    Left,
    /// `:---:`
    Center,
    /// `---:`
    Right,
}

impl Alignment {
    pub(crate) fn from_delimiter(cell: &str) -> Alignment {
        match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::Unset,
        }
    }

    pub(crate) fn attribute(self) -> Option<&'static str> {
        match self {
            Alignment::Unset => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

/// Whether a list is bulleted or numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    /// `* item`
    Unordered,
    /// `1. item`
    Ordered,
}

/// The details of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeList {
    /// Bulleted or numbered.
    pub list_type: ListType,

    /// Leading spaces before the first marker, halved.
    pub nest_level: usize,

    /// The number written on the first item of an ordered list, as written.
    pub start: Option<String>,
}

/// The details of a list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeListItem {
    /// The nest level of the owning list.
    pub nest_level: usize,

    /// Length of the item marker, including its trailing space: 2 for
    /// `* `, the length of `12. ` for numbered items.
    pub marker_length: usize,
}

/// The two code block syntaxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeBlockKind {
    /// Three backticks or tildes, an optional language tag, and a closing fence.
    Fenced {
        /// The tag after the opening fence, possibly empty.
        language: String,
        /// Columns of list indentation each interior line carries.
        indent: usize,
    },
    /// Lines indented by four spaces beyond their container.
    Indented {
        /// Pattern every continuation line must start with.
        next_line_prefix: String,
    },
}

/// A parsed table. Cells hold their already-rendered inline HTML.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub alignment: Vec<Alignment>,
}

/// An inline link's destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLink {
    /// The destination exactly as written.
    pub url: String,
}

/// An image and its optional dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeImage {
    /// The alt text as written, dimensions removed.
    pub alt: String,
    pub url: String,
    /// Width as written (`150`, `50%`), or empty.
    pub width: String,
    /// Height as written, or empty.
    pub height: String,
}

/// A `[label]: url` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDefinition {
    pub label: String,
    pub url: String,
}

/// The payload of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunValue {
    /// The document. Spans the whole text.
    Root,

    /// A paragraph inserted by the newline transform, `<div class="mdDiv">`.
    Div,

    /// `<br>` written in the text, or a break inserted for a single newline.
    ///
    /// ``` md
    /// First<br>Second
    /// ```
    LineBreak {
        /// True if inserted by the newline transform.
        implicit: bool,
    },

    /// Three or more `-`, `*` or `_` alone on a line.
    Hr,

    /// A bulleted or numbered list. Contains only list items.
    ///
    /// ``` md
    /// * One
    ///   1. Nested
    /// ```
    List(NodeList),

    /// A list item. Contains anything.
    ListItem(NodeListItem),

    /// `#` through `######` followed by a space.
    Header {
        /// 1 to 6.
        level: usize,
    },

    /// A fenced or indented code block. Its content is never parsed.
    CodeBlock(NodeCodeBlock),

    /// Lines starting with `>`. Contains anything.
    BlockQuote {
        /// The number of `>` markers this quote requires on each line.
        nest_level: usize,
    },

    /// A pipe table.
    ///
    /// ``` md
    /// | A | B |
    /// |:--|--:|
    /// | 1 | 2 |
    /// ```
    Table(Box<NodeTable>),

    /// `[text](url)`.
    Url(NodeLink),

    /// `[text][label]`, resolved against definitions when rendered.
    ReferenceUrl {
        /// The label between the second pair of brackets.
        label: String,
    },

    /// A bare `domain.tld` or `scheme://domain.tld/path` in running text.
    ImplicitUrl(NodeLink),

    /// `![alt w=100,h=50%](url)`.
    Image(Box<NodeImage>),

    /// Text between matching runs of backticks.
    InlineCode {
        /// Length of the opening (and closing) backtick run.
        backticks: usize,
    },

    /// `**text**` or `__text__`.
    Bold,

    /// `*text*` or `_text_`.
    Italic,

    /// `++text++`.
    Underline,

    /// `~~text~~`.
    Strikethrough,

    /// `^text` or `^(text)`.
    Superscript {
        /// True for the parenthesized form.
        paren: bool,
    },

    /// `~(text)`.
    Subscript {
        /// Always true; kept for symmetry with superscripts.
        paren: bool,
    },

    /// `<!-- ... -->`, emitted verbatim.
    HtmlComment,

    /// `[label]: url` alone on a line. Rendered as a comment.
    ReferenceDefinition(NodeDefinition),
}

/// The details of a code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCodeBlock {
    pub kind: CodeBlockKind,

    /// Number of enclosing blockquotes, whose markers are stripped from
    /// each line.
    pub quote_level: usize,
}

impl RunValue {
    /// The kind of this payload for nesting and layout purposes.
    pub fn state(&self) -> State {
        match self {
            RunValue::Root => State::None,
            RunValue::Div => State::Div,
            RunValue::LineBreak { .. } => State::LineBreak,
            RunValue::Hr => State::Hr,
            RunValue::List(list) => match list.list_type {
                ListType::Ordered => State::OrderedList,
                ListType::Unordered => State::UnorderedList,
            },
            RunValue::ListItem(..) => State::ListItem,
            RunValue::Header { .. } => State::Header,
            RunValue::CodeBlock(..) => State::CodeBlock,
            RunValue::BlockQuote { .. } => State::BlockQuote,
            RunValue::Table(..) => State::Table,
            RunValue::Url(..) | RunValue::ReferenceUrl { .. } | RunValue::ImplicitUrl(..) => {
                State::Url
            }
            RunValue::Image(..) => State::Image,
            RunValue::InlineCode { .. } => State::InlineCode,
            RunValue::Bold => State::Bold,
            RunValue::Italic => State::Italic,
            RunValue::Underline => State::Underline,
            RunValue::Strikethrough => State::Strikethrough,
            RunValue::Superscript { .. } => State::Superscript,
            RunValue::Subscript { .. } => State::Subscript,
            RunValue::HtmlComment | RunValue::ReferenceDefinition(..) => State::HtmlComment,
        }
    }

    /// Whether the newline transform inserted this node.
    pub fn is_implicit(&self) -> bool {
        matches!(self, RunValue::Div | RunValue::LineBreak { implicit: true })
    }
}

/// Scan bookkeeping kept on children of the root, used by the incremental cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanRecord {
    /// The furthest offset any recognizer had looked at when this child closed.
    pub horizon: usize,
    /// Where the scanner stood when this child closed.
    pub resume_at: usize,
}

/// A recognized construct over `[start, end)` of the source text.
#[derive(Debug, Clone)]
pub struct Run {
    /// What was recognized.
    pub value: RunValue,

    /// First character offset, inclusive.
    pub start: usize,

    /// Last character offset, exclusive.
    pub end: usize,

    pub(crate) cached_html: Option<String>,
    pub(crate) volatile: bool,
    pub(crate) scan: Option<ScanRecord>,
}

/// A handle to a run in its arena.
pub type RunId = arena_tree::Id<Run>;

/// The arena that owns a Run tree.
pub type RunArena = arena_tree::Arena<Run>;

impl Run {
    /// A fresh, uncached run.
    pub fn new(value: RunValue, start: usize, end: usize) -> Run {
        Run {
            value,
            start,
            end,
            cached_html: None,
            volatile: false,
            scan: None,
        }
    }

    pub fn state(&self) -> State {
        self.value.state()
    }

    /// Number of characters at the front of the run that belong to its
    /// syntax rather than its content.
    pub fn start_context_length(&self, text: &[char]) -> usize {
        match &self.value {
            RunValue::Div => own_text(self, text).iter().take_while(|&&c| c == '\n').count(),
            RunValue::Header { level } => level + 1,
            RunValue::BlockQuote { .. } => 1,
            RunValue::ListItem(item) => item.marker_length,
            RunValue::Url(..) | RunValue::ReferenceUrl { .. } | RunValue::ImplicitUrl(..) => 1,
            RunValue::CodeBlock(NodeCodeBlock {
                kind: CodeBlockKind::Fenced { .. },
                ..
            }) => own_text(self, text)
                .iter()
                .position(|&c| c == '\n')
                .map_or(0, |p| p + 1),
            RunValue::CodeBlock(NodeCodeBlock {
                kind: CodeBlockKind::Indented { .. },
                ..
            }) => 4,
            RunValue::InlineCode { backticks } => *backticks,
            RunValue::Bold | RunValue::Underline | RunValue::Strikethrough => 2,
            RunValue::Italic => 1,
            RunValue::Superscript { paren } | RunValue::Subscript { paren } => {
                if *paren {
                    2
                } else {
                    1
                }
            }
            _ => 0,
        }
    }

    /// Number of characters at the back of the run that belong to its syntax.
    pub fn end_context_length(&self, text: &[char]) -> usize {
        match &self.value {
            RunValue::Div => usize::from(own_text(self, text).last() == Some(&'\n')),
            RunValue::Url(link) | RunValue::ImplicitUrl(link) => link.url.chars().count() + 3,
            RunValue::ReferenceUrl { label } => label.chars().count() + 3,
            RunValue::Image(..) => self.end - self.start,
            RunValue::CodeBlock(NodeCodeBlock {
                kind: CodeBlockKind::Fenced { .. },
                ..
            }) => {
                let own = own_text(self, text);
                match own.iter().rposition(|&c| c == '\n') {
                    Some(p) => own.len() - p,
                    None => own.len() + 1,
                }
            }
            RunValue::InlineCode { backticks } => *backticks,
            RunValue::Bold | RunValue::Underline | RunValue::Strikethrough => 2,
            RunValue::Italic => 1,
            RunValue::Superscript { paren } | RunValue::Subscript { paren } => usize::from(*paren),
            _ => 0,
        }
    }
}

/// Undo the paragraphs and breaks the newline transform added under `parent`.
pub(crate) fn strip_implicit(arena: &RunArena, parent: RunId) {
    let children: Vec<RunId> = parent.children(arena).collect();
    for child in children {
        match child.data(arena).value {
            RunValue::Div => child.unwrap_children(arena),
            RunValue::LineBreak { implicit: true } => child.detach(arena),
            _ => {}
        }
    }
}

fn own_text<'t>(run: &Run, text: &'t [char]) -> &'t [char] {
    let end = run.end.min(text.len());
    &text[run.start.min(end)..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(value: RunValue, start: usize, end: usize) -> Run {
        Run::new(value, start, end)
    }

    #[test]
    fn containers_allow_everything() {
        let text: Vec<char> = "> x".chars().collect();
        for current in [
            run(RunValue::Root, 0, 3),
            run(RunValue::Div, 0, 3),
            run(RunValue::BlockQuote { nest_level: 1 }, 0, 3),
        ] {
            assert!(state_allowed_in_state(State::CodeBlock, &current, 1, &text));
            assert!(state_allowed_in_state(State::Bold, &current, 1, &text));
        }
    }

    #[test]
    fn leaves_allow_nothing() {
        let text: Vec<char> = "`a`".chars().collect();
        let code = run(RunValue::InlineCode { backticks: 1 }, 0, 3);
        assert!(!state_allowed_in_state(State::InlineCode, &code, 1, &text));
        assert!(!state_allowed_in_state(State::Bold, &code, 1, &text));
        let hr = run(RunValue::Hr, 0, 3);
        assert!(!state_allowed_in_state(State::Italic, &hr, 1, &text));
        let block = run(
            RunValue::CodeBlock(NodeCodeBlock {
                kind: CodeBlockKind::Indented {
                    next_line_prefix: "    ".into(),
                },
                quote_level: 0,
            }),
            0,
            3,
        );
        assert!(!state_allowed_in_state(State::Bold, &block, 1, &text));
        assert!(!state_allowed_in_state(State::CodeBlock, &block, 1, &text));
    }

    #[test]
    fn inline_formats_reject_blocks() {
        let text: Vec<char> = "**a**".chars().collect();
        let bold = run(RunValue::Bold, 0, 5);
        assert!(!state_allowed_in_state(State::Header, &bold, 2, &text));
        assert!(!state_allowed_in_state(State::BlockQuote, &bold, 2, &text));
        assert!(state_allowed_in_state(State::Italic, &bold, 2, &text));
        assert!(state_allowed_in_state(State::Url, &bold, 2, &text));
    }

    #[test]
    fn links_only_allow_inline_content_in_their_text() {
        let text: Vec<char> = "[ab](url)".chars().collect();
        let link = run(
            RunValue::Url(NodeLink {
                url: "url".to_string(),
            }),
            0,
            9,
        );
        assert_eq!(link.end_context_length(&text), 6);
        assert!(state_allowed_in_state(State::Bold, &link, 1, &text));
        assert!(state_allowed_in_state(State::Bold, &link, 2, &text));
        assert!(!state_allowed_in_state(State::Bold, &link, 3, &text));
        assert!(!state_allowed_in_state(State::CodeBlock, &link, 1, &text));
    }

    #[test]
    fn lists_only_hold_items() {
        let text: Vec<char> = "* a".chars().collect();
        let list = run(
            RunValue::List(NodeList {
                list_type: ListType::Unordered,
                nest_level: 0,
                start: None,
            }),
            0,
            3,
        );
        assert_eq!(list.state(), State::UnorderedList);
        assert!(state_allowed_in_state(State::ListItem, &list, 0, &text));
        assert!(!state_allowed_in_state(State::Bold, &list, 0, &text));
    }

    #[test]
    fn layout_classification() {
        assert!(block_markdown(State::Header));
        assert!(!block_markdown(State::Table));
        assert!(is_block_element(State::Table));
        assert!(is_block_element(State::Hr));
        assert!(!is_block_element(State::HtmlComment));
        assert!(is_hidden_element(State::HtmlComment));
        assert_eq!(
            RunValue::ReferenceDefinition(NodeDefinition {
                label: "a".into(),
                url: "b".into()
            })
            .state(),
            State::HtmlComment
        );
    }

    #[test]
    fn fenced_code_context_lengths() {
        let text: Vec<char> = "```rust\nfn x\n```".chars().collect();
        let code = run(
            RunValue::CodeBlock(NodeCodeBlock {
                kind: CodeBlockKind::Fenced {
                    language: "rust".into(),
                    indent: 0,
                },
                quote_level: 0,
            }),
            0,
            text.len(),
        );
        assert_eq!(code.start_context_length(&text), 8);
        assert_eq!(code.end_context_length(&text), 4);
    }

    #[test]
    fn div_context_counts_newlines() {
        let text: Vec<char> = "\n\nab\n".chars().collect();
        let div = run(RunValue::Div, 0, 5);
        assert_eq!(div.start_context_length(&text), 2);
        assert_eq!(div.end_context_length(&text), 1);
    }
}
