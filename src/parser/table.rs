//! Pipe tables.
//!
//! ``` md
//! | Left | Center | Right |
//! |:-----|:------:|------:|
//! | a    | `b|c`  | **d** |
//! ```
//!
//! The row under the header defines the columns: three or more dashes
//! each, with colons for alignment. Every following line with a pipe is a
//! row. Cells are parsed on their own, with only inline constructs, and
//! stored already rendered.

use crate::nodes::{Alignment, NodeTable, RunId, RunValue, State};
use crate::parser::inlines::inline_end;
use crate::parser::{Markdown, Parser};
use crate::strings;

impl<'a> Parser<'a> {
    /// A table whose header row holds the pipe at `start`. Returns its end.
    pub(super) fn check_table(&mut self, start: usize) -> Option<usize> {
        if self.inline_only || self.src.is_escaped(start) {
            return None;
        }
        if !matches!(
            self.state(),
            State::None | State::ListItem | State::BlockQuote
        ) {
            return None;
        }

        let header_end = self.src.index_of("\n", start)?;
        if header_end >= self.parent_end() {
            return None;
        }

        let mut table_start = self.src.line_start(start);
        if self.state() != State::None && table_start <= self.cur().start {
            table_start = self.cur().start + self.start_context(self.current);
        }

        // Inline runs already found on the header line become cell text.
        if let Some(last) = self.current.last_child(self.arena) {
            let run = self.run(last);
            if run.start < table_start && run.end > table_start {
                return None;
            }
        }

        let define_end = self.index_or_parent_end("\n", header_end + 1);
        let quote_prefix = match self.cur().value {
            RunValue::BlockQuote { nest_level } => Some(format!("^( *> *){{{nest_level}}}")),
            _ => None,
        };

        let mut definition: String = self
            .src
            .slice(header_end + 1, define_end)
            .iter()
            .filter(|&&c| c != ' ')
            .collect();
        let mut header_row = self.src.string(table_start, header_end);
        if let Some(prefix) = &quote_prefix {
            definition = self.regexes.replace_all(prefix, &definition, "");
            header_row = self.regexes.replace_all(prefix, &header_row, "");
        }

        let alignment = self.table_alignment(&definition)?;
        let header = fit_to_columns(split_row(&header_row), alignment.len());
        let (rows, end) = self.table_rows(define_end, alignment.len(), quote_prefix.as_deref());

        let cells = Markdown::new(self.options.clone());
        let render = |cell: String| cells.parse_inline(&cell).unwrap_or_default();
        let table = NodeTable {
            header: header.into_iter().map(render).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(render).collect())
                .collect(),
            alignment,
        };

        let absorbed: Vec<RunId> = self
            .current
            .children(self.arena)
            .filter(|&c| self.run(c).start >= table_start)
            .collect();
        for id in absorbed {
            id.detach(self.arena);
        }

        log::debug!(
            "table with {} columns and {} rows",
            table.alignment.len(),
            table.rows.len()
        );
        self.add(RunValue::Table(Box::new(table)), table_start, end);
        Some(end)
    }

    fn table_alignment(&self, definition: &str) -> Option<Vec<Alignment>> {
        let columns = split_row(definition);
        if columns.is_empty() {
            return None;
        }

        columns
            .iter()
            .map(|col| {
                self.is_match(r"^:?-{3,}:?$", col)
                    .then(|| Alignment::from_delimiter(col))
            })
            .collect()
    }

    /// Rows after the delimiter row, up to the first line that isn't one.
    fn table_rows(
        &self,
        define_end: usize,
        columns: usize,
        quote_prefix: Option<&str>,
    ) -> (Vec<Vec<String>>, usize) {
        let len = self.src.len();
        let mut rows = vec![];
        let mut end = define_end;
        let mut newline = define_end;
        loop {
            let next = self.index_or_parent_end("\n", newline + 1);
            if next <= newline || next > len {
                break;
            }
            let mut line = self.src.string(newline + 1, next);
            if line.is_empty() || line == "\n" {
                break;
            }

            if let Some(prefix) = quote_prefix {
                line = self.regexes.replace_all(prefix, &line, "");
                if line.starts_with('>') {
                    break;
                }
            }

            let cells = split_row(&line);
            if cells.is_empty() {
                break;
            }
            rows.push(fit_to_columns(cells, columns));

            end = next;
            newline = next;
        }
        (rows, end)
    }
}

/// Pad with empty cells or drop extra ones.
fn fit_to_columns(mut cells: Vec<String>, columns: usize) -> Vec<String> {
    cells.resize(columns, String::new());
    cells
}

/// Split a row on unescaped pipes outside code spans. Pipes at either end
/// are optional. Returns nothing if the line has no pipe at all.
pub(crate) fn split_row(line: &str) -> Vec<String> {
    if !line.contains('|') {
        return vec![];
    }

    let line: Vec<char> = line.trim_matches(strings::is_space).chars().collect();
    let mut cells = vec![];
    let mut span = String::new();
    let mut i = 0;
    while i < line.len() {
        let c = line[i];
        if c == '`' && !strings::is_escaped(&line, i) {
            if let Some(end) = inline_end(&line, i, line.len()) {
                span.extend(&line[i..end]);
                i = end;
                continue;
            }
        }

        if c == '|' && !strings::is_escaped(&line, i) {
            cells.push(std::mem::take(&mut span));
        } else {
            span.push(c);
        }
        i += 1;
    }

    if !span.is_empty() {
        cells.push(span);
    }
    if cells.len() > 1 && cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }
    if cells.len() > 1 && cells[0].is_empty() {
        cells.remove(0);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::split_row;

    #[test]
    fn outer_pipes_are_optional() {
        assert_eq!(split_row("| a | b |"), [" a ", " b "]);
        assert_eq!(split_row("a|b"), ["a", "b"]);
        assert_eq!(split_row("||b|"), ["", "b"]);
        assert!(split_row("no pipes").is_empty());
    }

    #[test]
    fn pipes_in_code_and_escapes_stay() {
        assert_eq!(split_row("`a|b` | c"), ["`a|b` ", " c"]);
        assert_eq!(split_row(r"a \| b | c"), [r"a \| b ", " c"]);
    }
}
