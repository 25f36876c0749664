//! Line-level constructs: headers, horizontal rules and blockquotes, plus
//! the bits of raw HTML that are let through.

use crate::nodes::{RunValue, State};
use crate::parser::Parser;

const MAX_HEADER_LEVEL: usize = 6;

impl<'a> Parser<'a> {
    /// `#` through `######` and a space, at the start of a line or of a
    /// list item or quote line. Returns the offset of the last `#`.
    pub(super) fn check_header(&mut self, start: usize) -> usize {
        if self.inline_only {
            return start;
        }

        let between = self.src.string(self.src.line_start(start), start);
        if !self.is_match(&format!("^{}$", self.nest_regex()), &between) {
            return start;
        }
        if !self.allowed(State::Header, start) {
            return start;
        }

        let mut last = start;
        while self.src.is(last + 1, '#') {
            last += 1;
        }
        let level = last - start + 1;
        if level > MAX_HEADER_LEVEL || last + 1 >= self.src.len() || !self.src.is(last + 1, ' ') {
            return start;
        }

        let end = self
            .src
            .index_of("\n", last)
            .unwrap_or(self.src.len())
            .min(self.cur().end);
        self.open(RunValue::Header { level }, start, end);
        last
    }

    /// Three or more of the marker at `index` alone on a line, spaces allowed.
    pub(super) fn check_hr(&mut self, index: usize) -> bool {
        if self.inline_only || !self.allowed(State::Hr, index) {
            return false;
        }

        let Some(sep) = self.src.at(index) else {
            return false;
        };
        let line_break = self.index_or_parent_end("\n", index);
        let line = self.src.string(self.src.line_start(index), line_break);
        let marker = if sep == '*' { r"\*".to_string() } else { sep.to_string() };
        if !self.is_match(&format!("^( *{marker} *){{3,}}$"), &line) {
            return false;
        }

        self.add(RunValue::Hr, index, line_break);
        true
    }

    /// Nest level of the quote a `>` at `start` would open.
    ///
    /// Quotes nest by adding markers (`> >`, `>>`), and a deeper quote may
    /// skip levels.
    pub(super) fn check_block_quote(&mut self, start: usize) {
        if self.inline_only || self.src.is_escaped(start) {
            return;
        }
        if !self.allowed(State::BlockQuote, start) {
            return;
        }

        let nest_level = self.quote_nest() + 1;
        let prefix: String = self
            .src
            .slice(self.src.line_start(start), start + 1)
            .iter()
            .filter(|&&c| c != ' ')
            .collect();
        if !self.is_match(&format!("^{}>$", self.nest_regex()), &prefix) {
            return;
        }

        match &self.cur().value {
            RunValue::BlockQuote { nest_level: parent } if *parent >= nest_level => return,
            RunValue::BlockQuote { .. } | RunValue::ListItem(..) => {}
            _ if nest_level > 1 => {
                log::error!(
                    "Something went wrong! Nested blockquotes should have a blockquote parent or be nested in a list, found {:?}",
                    self.state()
                );
                return;
            }
            _ => {}
        }

        let end = self.block_quote_end(start, nest_level);
        self.open(RunValue::BlockQuote { nest_level }, start, end);
    }

    /// A quote runs until a blank line, or a line with fewer markers than
    /// its nest level.
    fn block_quote_end(&self, start: usize, nest_level: usize) -> usize {
        let end = self.cur().end;
        let len = self.src.len();
        let mut line_end = self.src.index_of("\n", start);
        while let Some(at) = line_end {
            if at + 1 >= len || at >= end {
                break;
            }
            if self.src.is(at + 1, '\n') {
                return at;
            }

            let mut markers = 0;
            let mut offset = at + 1;
            while self.src.within(offset, end) {
                match self.src.at(offset) {
                    Some('>') => markers += 1,
                    Some(' ') => {}
                    _ => break,
                }
                offset += 1;
            }
            if markers < nest_level {
                return at;
            }

            line_end = self.src.index_of("\n", at + 1);
        }
        end
    }

    /// `<br>` variants and `<!-- comments -->`. Any other `<` is text.
    pub(super) fn check_less_than(&mut self, i: usize) -> usize {
        if self.src.is_escaped(i) {
            return i;
        }

        let end = self.cur().end;
        let tag = self.src.string(i, i + 6);
        if self.is_match(r"^<br ?/?>", &tag) {
            if let Some(close) = self.src.index_of(">", i) {
                if close < end && self.allowed(State::LineBreak, i) {
                    self.add(RunValue::LineBreak { implicit: false }, i, close + 1);
                }
            }
            return i;
        }

        if self.src.string(i, i + 4) != "<!--" {
            return i;
        }
        let Some(close) = self.src.index_of("-->", i) else {
            return i;
        };
        let close = close + 3;
        if close > end || !self.allowed(State::HtmlComment, i) {
            return i;
        }

        self.add(RunValue::HtmlComment, i, close);
        close - 1
    }
}
