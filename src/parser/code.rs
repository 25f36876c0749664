//! Fenced and indented code blocks.

use crate::nodes::{CodeBlockKind, NodeCodeBlock, RunValue, State};
use crate::parser::Parser;

/// Outcome of looking for a fenced code block.
pub(super) enum FenceResult {
    /// Not an opening fence.
    NotFenced,
    /// An opening fence with no valid closing fence.
    Unterminated,
    /// A code block ending at the given offset.
    Block(usize),
}

impl<'a> Parser<'a> {
    /// Three backticks or tildes, an optional language and a newline, up to
    /// a closing fence at the same indentation.
    pub(super) fn check_fenced_code(&mut self, start: usize) -> FenceResult {
        let Some(marker) = self.src.at(start) else {
            return FenceResult::NotFenced;
        };
        if self.inline_only
            || start + 3 >= self.src.len()
            || !self.src.is(start + 1, marker)
            || !self.src.is(start + 2, marker)
        {
            return FenceResult::NotFenced;
        }

        let newline = match self.src.index_of("\n", start) {
            Some(n) if n + 1 < self.src.len() => n,
            _ => return FenceResult::NotFenced,
        };
        if !self.allowed(State::CodeBlock, start) {
            return FenceResult::NotFenced;
        }

        let mut prefix = self.nest_regex();
        while prefix.ends_with(" *") {
            prefix.truncate(prefix.len() - 2);
        }
        prefix.push_str(" {0,1}");

        let context = self.src.string(self.src.line_start(start), start);
        let mut min_indent = 0;
        if let RunValue::ListItem(..) = self.cur().value {
            let list_start = self
                .current
                .parent(self.arena)
                .map_or(self.cur().start, |list| self.run(list).start);
            min_indent = list_start - self.src.line_start(list_start) + 2;
            if context.chars().count() < min_indent {
                return FenceResult::NotFenced;
            }
        }

        if !self.is_match(&format!("^{prefix}$"), &context) {
            return FenceResult::NotFenced;
        }

        let info = self.src.string(start + 3, newline + 1);
        let Some(language) = self
            .regexes
            .captures(r"^ *([\w+#]*)\n", &info)
            .and_then(|groups| groups.into_iter().nth(1).flatten())
        else {
            return FenceResult::NotFenced;
        };

        let markers: String = std::iter::repeat(marker).take(3).collect();
        match self.fenced_code_end(newline, &prefix, &markers, min_indent) {
            Some(end) => {
                self.drop_trailing_break();
                let quote_level = self.quote_nest();
                self.add(
                    RunValue::CodeBlock(NodeCodeBlock {
                        kind: CodeBlockKind::Fenced {
                            language,
                            indent: min_indent,
                        },
                        quote_level,
                    }),
                    start,
                    end,
                );
                FenceResult::Block(end)
            }
            None => FenceResult::Unterminated,
        }
    }

    fn fenced_code_end(&self, newline: usize, prefix: &str, markers: &str, min_indent: usize) -> Option<usize> {
        let valid_line = format!("^{prefix}");
        let valid_end = format!("^{prefix}{markers}\\n?$");
        let blank_line = format!("^{prefix}\\n$");
        let indent_line = format!("^{prefix}$");

        let mut newline = newline;
        let (mut next, mut next_line) = self.line_after(newline);
        loop {
            if next_line.is_empty() {
                return None;
            }

            while self.is_match(&blank_line, &next_line) {
                newline = next;
                (next, next_line) = self.line_after(newline);
                if next_line.is_empty() {
                    return None;
                }
            }

            if !self.is_match(&valid_line, &next_line) {
                return None;
            }

            if self.is_match(&valid_end, &next_line) {
                let indent = self
                    .src
                    .index_of(markers, newline)
                    .map_or(0, |at| at.saturating_sub(newline + 1));
                if indent < min_indent {
                    return None;
                }
                if min_indent == 0 || indent <= min_indent + 3 {
                    return Some(next);
                }
            }

            if min_indent != 0 {
                let lead: String = next_line.chars().take(min_indent).collect();
                if !self.is_match(&indent_line, &lead) {
                    return None;
                }
            }

            newline = next;
            (next, next_line) = self.line_after(newline);
        }
    }

    /// Four spaces past the current container's indentation. Returns the
    /// block's end.
    pub(super) fn check_indented_code(&mut self, start: usize) -> Option<usize> {
        if self.inline_only
            || start < 3
            || !(1..=3).all(|back| self.src.is(start - back, ' '))
        {
            return None;
        }
        if !self.allowed(State::CodeBlock, start) {
            return None;
        }

        let last_newline = self.src.last_newline(start);
        let quote_nest = self.quote_nest();
        let quote_prefix = if quote_nest == 0 {
            "^".to_string()
        } else {
            format!("^(?:[^>]*>){{{quote_nest}}}")
        };

        let (list_prefix, list_nest) = self.indented_code_list_prefix(last_newline);
        let double_nest = list_nest.is_some() && quote_nest != 0;
        let first_line = format!(
            "{quote_prefix}{}{list_prefix}    $",
            if double_nest { " {1,3}" } else { "" }
        );

        let line_start = last_newline.map_or(0, |n| n + 1);
        let context = self.src.string(line_start, start + 1);
        if !self.is_match(&first_line, &context) {
            return None;
        }

        let blank_line = format!("{quote_prefix} *\\n");
        let indent = list_nest.map_or(0, |nest| (nest + 1) * 2);
        let next_line_prefix = format!("{quote_prefix} {{{indent}}}    ");
        let end = self.indented_code_end(start, &blank_line, &next_line_prefix);

        self.drop_trailing_break();
        let quote_level = quote_nest;
        self.add(
            RunValue::CodeBlock(NodeCodeBlock {
                kind: CodeBlockKind::Indented { next_line_prefix },
                quote_level,
            }),
            start - 3,
            end,
        );
        Some(end)
    }

    /// The list markers or continuation indents that may precede an
    /// indented block on its first line, and the nest level of the
    /// innermost list, both up to the nearest quote.
    fn indented_code_list_prefix(&self, last_newline: Option<usize>) -> (String, Option<usize>) {
        let mut prefix = String::new();
        let mut list_nest = None;
        for id in self.current.ancestors(self.arena) {
            let run = self.run(id);
            match &run.value {
                RunValue::BlockQuote { .. } => break,
                RunValue::ListItem(item) => {
                    list_nest.get_or_insert(item.nest_level);
                    if last_newline.is_some_and(|n| n > run.start) {
                        prefix.insert_str(0, "  ");
                    } else {
                        let ordered = id
                            .parent(self.arena)
                            .is_some_and(|list| self.run(list).state() == State::OrderedList);
                        let marker = if ordered { r"\d+\. {1,4}" } else { r"\* {1,4}" };
                        prefix.insert_str(0, marker);
                    }
                }
                _ => {}
            }
        }
        (prefix, list_nest)
    }

    fn indented_code_end(&self, start: usize, blank_line: &str, next_line_prefix: &str) -> usize {
        let newline = self.index_or_parent_end("\n", start);
        let mut end = newline;
        let (mut next, mut next_line) = self.line_after(newline);
        loop {
            if next_line.is_empty() {
                return end;
            }

            while self.is_match(blank_line, &next_line) {
                (next, next_line) = self.line_after(next);
                if next_line.is_empty() {
                    break;
                }
            }

            if !self.is_match(next_line_prefix, &next_line) {
                return end;
            }

            end = next;
            (next, next_line) = self.line_after(next);
        }
    }
}
