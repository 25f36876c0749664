//! Delimited inline runs: emphasis, underline, strikethrough, inline code,
//! superscripts and subscripts.

use crate::nodes::{RunValue, State};
use crate::parser::Parser;
use crate::strings;

/// The state of a search for the marker run closing a format.
struct Markers {
    sep: char,
    /// Whether single markers count (`*`/`_`), or only pairs (`+`/`~`).
    allow_single: bool,
    /// Open markers still waiting to be closed.
    count: usize,
    index: usize,
    found_alpha: bool,
}

enum Precheck {
    Marker,
    Skip,
    Stop,
}

enum Opening {
    Found,
    NotOpening,
    Ignore,
}

/// End of the code span opening with the backticks at `i`, if it closes
/// before `end` and before any blank line.
pub(crate) fn inline_end(text: &[char], i: usize, end: usize) -> Option<usize> {
    let end = end.min(text.len());
    let mut ticks = 1;
    while i + ticks < end && text[i + ticks] == '`' {
        ticks += 1;
    }

    let closing = "`".repeat(ticks);
    let close = strings::index_of(&text[..end], &closing, i + ticks)?;
    if strings::index_of(&text[..close], "\n\n", i).is_some() {
        return None;
    }
    Some(close + ticks)
}

impl<'a> Parser<'a> {
    /// Bold, italic, underline and strikethrough. Returns true if a
    /// double-marker format other than bold was opened, meaning the next
    /// character is part of the opening marker.
    pub(super) fn check_format(&mut self, start: usize, allow_single: bool) -> bool {
        let Some(sep) = self.src.at(start) else {
            return false;
        };
        if start != 0 && (self.src.is_alnum(start - 1) || self.src.is_escaped(start)) {
            return false;
        }
        if self.in_special_context(start) {
            return false;
        }

        let mut m = Markers {
            sep,
            allow_single,
            count: 1,
            index: start + 1,
            found_alpha: false,
        };
        while self.src.is(m.index, sep) {
            m.count += 1;
            m.index += 1;
        }

        if !allow_single && m.count % 2 == 1 {
            return false;
        }
        if self.src.is_space(m.index) {
            return false;
        }

        if !self.find_closing_markers(&mut m) {
            return false;
        }

        self.make_format(start, &m)
    }

    fn make_format(&mut self, start: usize, m: &Markers) -> bool {
        let value = match m.sep {
            '*' | '_' => {
                if self.src.is(start + 1, m.sep) && self.src.is(m.index - 2, m.sep) {
                    RunValue::Bold
                } else {
                    RunValue::Italic
                }
            }
            '+' => RunValue::Underline,
            '~' => RunValue::Strikethrough,
            other => {
                log::error!("How did we try to make a format with a '{other}'?");
                return false;
            }
        };

        self.open(value, start, m.index);
        !matches!(m.sep, '*' | '_')
    }

    /// Markers open a run when they follow whitespace or punctuation and
    /// precede text; they close one when they follow text and precede
    /// whitespace or punctuation. Nested openings raise the count.
    fn find_closing_markers(&self, m: &mut Markers) -> bool {
        let block_end = self.parent_end();
        let mut newline = false;
        while m.count != 0 && self.src.within(m.index, block_end) {
            match self.marker_precheck(m, block_end, &mut newline) {
                Precheck::Stop => return false,
                Precheck::Skip => {
                    m.index += 1;
                    continue;
                }
                Precheck::Marker => {}
            }

            let mut tentative = 1;
            let mut opened = false;
            if self.src.is_alnum(m.index - 1) {
                m.found_alpha = true;
            } else {
                match self.opening_markers(m, &mut tentative, block_end) {
                    Opening::Ignore => {
                        m.index += 1;
                        continue;
                    }
                    Opening::Found => opened = true,
                    Opening::NotOpening => {}
                }
            }

            if !opened && self.closing_markers(m, tentative, block_end) {
                return true;
            }
            m.index += 1;
        }

        m.count == 0
    }

    fn marker_precheck(&self, m: &mut Markers, block_end: usize, newline: &mut bool) -> Precheck {
        let c = self.src.at(m.index);
        if c == Some('`') && !self.src.is_escaped(m.index) {
            if let Some(end) = self.inline_end(m.index, block_end) {
                m.index = end - 1;
                return Precheck::Skip;
            }
        }

        if let Some(state @ ('^' | '~')) = c {
            let state = if state == '^' {
                State::Superscript
            } else {
                State::Subscript
            };
            if let Some((end, _)) = self.super_subscript_end(m.index, state) {
                m.index = end - 1;
                return Precheck::Skip;
            }
        }

        if c == Some('\n') {
            if *newline {
                return Precheck::Stop;
            }
            *newline = true;
            return Precheck::Skip;
        }
        *newline = false;

        if c != Some(m.sep) || self.src.is_escaped(m.index) {
            m.found_alpha |= c.is_some_and(strings::is_alnum);
            return Precheck::Skip;
        }

        Precheck::Marker
    }

    fn opening_markers(&self, m: &mut Markers, tentative: &mut usize, block_end: usize) -> Opening {
        let mut tentative_index = m.index + *tentative;
        while self.src.within(tentative_index, block_end) && self.src.is(tentative_index, m.sep) {
            *tentative += 1;
            tentative_index += 1;
        }

        if tentative_index == block_end
            || self.src.is_space(tentative_index)
            || (m.found_alpha && self.is_format_char(tentative_index))
        {
            // Markers with whitespace on both sides belong to neither run.
            if !m.allow_single && *tentative == 1 {
                m.index = tentative_index;
                return Opening::Ignore;
            }
            *tentative = 1;
            Opening::NotOpening
        } else if self.src.is_space(m.index - 1)
            || (!m.found_alpha && self.is_format_char(m.index - 1))
        {
            m.index = tentative_index;
            m.count += *tentative - if m.allow_single { 0 } else { *tentative % 2 };
            Opening::Found
        } else {
            // Ambiguous: punctuation on both sides reads as closing.
            *tentative = 1;
            Opening::NotOpening
        }
    }

    fn closing_markers(&self, m: &mut Markers, mut tentative: usize, block_end: usize) -> bool {
        let mut tentative_index = m.index + tentative;
        while self.src.within(tentative_index, block_end) && self.src.is(tentative_index, m.sep) {
            tentative += 1;
            tentative_index += 1;
        }

        if tentative_index != block_end && self.src.is_alnum(tentative_index) {
            m.index = tentative_index;
            return false;
        }

        if tentative > m.count {
            m.index += m.count;
            m.count = 0;
            return true;
        }

        m.index += tentative;
        m.count -= tentative - if m.allow_single { 0 } else { tentative % 2 };
        if m.count != 0 {
            m.index -= 1;
        }
        m.count == 0
    }

    fn is_format_char(&self, index: usize) -> bool {
        matches!(self.src.at(index), Some('*' | '_' | '+' | '~')) && !self.src.is_escaped(index)
    }

    /// Code span starting at `start`. Returns its end.
    pub(super) fn check_inline_code(&mut self, start: usize) -> Option<usize> {
        if !self.allowed(State::InlineCode, start) {
            return None;
        }

        let end = self.inline_end(start, self.cur().end)?;
        let backticks = self
            .src
            .slice(start, end)
            .iter()
            .take_while(|&&c| c == '`')
            .count();
        self.open(RunValue::InlineCode { backticks }, start, end);
        Some(end)
    }

    pub(super) fn inline_end(&self, i: usize, end: usize) -> Option<usize> {
        let found = inline_end(self.src.raw(), i, end);
        self.src.touch(found.unwrap_or(end));
        found
    }

    /// `^` or `~` at `start`. Returns where to resume scanning.
    pub(super) fn check_super_subscript(&mut self, start: usize) -> Option<usize> {
        let state = if self.src.is(start, '^') {
            State::Superscript
        } else {
            State::Subscript
        };
        if self.in_special_context(start) {
            return None;
        }

        let (end, paren) = self.super_subscript_end(start, state)?;
        let value = if state == State::Superscript {
            RunValue::Superscript { paren }
        } else {
            RunValue::Subscript { paren }
        };
        self.open(value, start, end);
        Some(start + usize::from(paren))
    }

    /// A parenthesized run ends at its matching paren. A bare superscript
    /// ends at the next space or newline; a bare subscript doesn't exist.
    pub(super) fn super_subscript_end(&self, start: usize, state: State) -> Option<(usize, bool)> {
        let max = self.cur().end;
        if self.src.is_escaped(start) || start >= max || self.src.is_space(start + 1) {
            return None;
        }

        if self.src.is(start + 1, '(') {
            if let Some(end) = self.matching_paren(start + 1, max) {
                return Some((end, true));
            }
        }

        if state == State::Subscript {
            return None;
        }

        let end = self
            .index_or_parent_end(" ", start)
            .min(self.index_or_parent_end("\n", start));
        if end <= start + 1 {
            return None;
        }
        Some((end, false))
    }

    fn matching_paren(&self, open: usize, max: usize) -> Option<usize> {
        let mut parens = 1;
        let mut end = open + 1;
        let mut newlines = 0;
        while self.src.within(end, max) {
            if self.src.is(end, '\n') {
                newlines += 1;
                if newlines == 2 {
                    return None;
                }
            } else {
                newlines = 0;
            }

            if self.src.is_escaped(end) {
                end += 1;
                continue;
            }

            match self.src.at(end) {
                Some(')') => {
                    parens -= 1;
                    if parens == 0 {
                        return Some(end + 1);
                    }
                }
                Some('(') => parens += 1,
                _ => {}
            }
            end += 1;
        }
        None
    }
}
