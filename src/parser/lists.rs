//! Bulleted and numbered lists.
//!
//! Two spaces before a marker add a nest level. An item continues onto the
//! following lines until a line looks like another item at its level or
//! shallower; after a single blank line, continuation lines must be
//! indented past the item's marker.

use crate::nodes::{ListType, NodeList, NodeListItem, RunValue, State};
use crate::parser::Parser;

/// The leading part of a line that decides where a list or item ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineShape {
    /// Spaces before the first other character, after any quote markers.
    spaces: usize,
    /// The item marker (`* ` or `12. `) after those spaces.
    marker: Option<ListType>,
    /// Nothing but spaces before the newline. Outside quotes the newline
    /// must stand alone.
    empty: bool,
    /// Another `>` follows the quote markers.
    deeper_quote: bool,
}

impl LineShape {
    /// Shape of `line` under `quote_nest` levels of `>`, or `None` if the
    /// line doesn't carry that many.
    fn of(line: &[char], quote_nest: usize) -> Option<LineShape> {
        let rest = strip_quotes(line, quote_nest)?;
        let spaces = rest.iter().take_while(|&&c| c == ' ').count();
        let after = &rest[spaces..];
        let empty = if quote_nest == 0 {
            line == ['\n']
        } else {
            after.first() == Some(&'\n')
        };
        Some(LineShape {
            spaces,
            marker: marker(after),
            empty,
            deeper_quote: rest.first() == Some(&'>'),
        })
    }
}

/// `line` after its first `quote_nest` `>` markers, which may only be
/// separated by spaces.
fn strip_quotes(line: &[char], quote_nest: usize) -> Option<&[char]> {
    if quote_nest == 0 {
        return Some(line);
    }
    let mut i = line.iter().position(|&c| c == '>')? + 1;
    for _ in 1..quote_nest {
        while line.get(i) == Some(&' ') {
            i += 1;
        }
        if line.get(i) != Some(&'>') {
            return None;
        }
        i += 1;
    }
    Some(&line[i..])
}

/// The list marker, with its trailing space, at the start of `text`.
fn marker(text: &[char]) -> Option<ListType> {
    if text.starts_with(&['*', ' ']) {
        return Some(ListType::Unordered);
    }
    let digits = text.iter().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && text[digits..].starts_with(&['.', ' ']) {
        return Some(ListType::Ordered);
    }
    None
}

/// The rules that decide where a list or item at one nest level ends.
struct ListEnd {
    quote_nest: usize,
    list_type: ListType,
    /// Indentation that keeps a line inside an item: two spaces per level,
    /// plus two for the level itself.
    min_spaces: usize,
}

impl ListEnd {
    fn new(quote_nest: usize, nest_level: usize, list_type: ListType) -> ListEnd {
        ListEnd {
            quote_nest,
            list_type,
            min_spaces: (nest_level + 1) * 2,
        }
    }

    fn in_quote(&self) -> bool {
        self.quote_nest != 0
    }

    /// At this level, rather than nested deeper.
    fn at_level(&self, line: &LineShape) -> bool {
        (self.min_spaces - 2..self.min_spaces).contains(&line.spaces)
    }

    /// After a blank line, only indented lines stay in an item.
    fn indented(&self, line: &LineShape) -> bool {
        line.spaces >= self.min_spaces
    }

    /// After a blank line, another item of the same kind at this level
    /// keeps the list going.
    fn continues(&self, line: &LineShape) -> bool {
        self.at_level(line) && line.marker == Some(self.list_type)
    }

    /// Without a blank line, a list ends at an item shallower than itself
    /// or one of the other kind at its level.
    fn list_ends(&self, line: &LineShape) -> bool {
        line.marker.is_some()
            && (line.spaces < self.min_spaces - 2
                || (self.at_level(line) && line.marker != Some(self.list_type)))
    }

    /// Without a blank line, an item ends at any item not nested inside it.
    fn item_ends(&self, line: &LineShape) -> bool {
        line.marker.is_some() && line.spaces < self.min_spaces
    }

    /// Outside quotes, a list also swallows the newlines that end it.
    fn tail(&self, newlines: usize) -> usize {
        if self.in_quote() {
            0
        } else {
            newlines
        }
    }
}

impl<'a> Parser<'a> {
    /// A list item marker at `start`, opening a list first if needed.
    pub(super) fn check_list(&mut self, start: usize, list_type: ListType) -> bool {
        let Some(digits) = self.list_precheck(start, list_type) else {
            return false;
        };

        let mut spaces = 0;
        while spaces < start && self.src.is(start - spaces - 1, ' ') {
            spaces += 1;
        }
        let nest_level = spaces / 2;

        let new_list = match &self.cur().value {
            RunValue::List(list) => list.list_type != list_type || nest_level > list.nest_level,
            _ => true,
        };
        if new_list && !self.create_list(start, nest_level, list_type, digits) {
            return false;
        }

        let item_end = self
            .cur()
            .end
            .min(self.list_end(start, nest_level, list_type, false));
        let marker_length = match list_type {
            ListType::Unordered => 2,
            ListType::Ordered => digits + 2,
        };
        self.open(
            RunValue::ListItem(NodeListItem {
                nest_level,
                marker_length,
            }),
            start,
            item_end,
        );
        true
    }

    /// Whether a marker at `start` can open an item. Returns the number of
    /// digits in a numbered marker.
    fn list_precheck(&self, start: usize, list_type: ListType) -> Option<usize> {
        if self.inline_only || self.src.is_escaped(start) || start + 1 >= self.src.len() {
            return None;
        }

        let digits = match list_type {
            ListType::Unordered => {
                if !self.src.is(start + 1, ' ') {
                    return None;
                }
                0
            }
            ListType::Ordered => {
                let mut digits = 0;
                while self.src.at(start + digits).is_some_and(|c| c.is_ascii_digit()) {
                    digits += 1;
                }
                if digits == 0
                    || !self.src.is(start + digits, '.')
                    || !self.src.is(start + digits + 1, ' ')
                {
                    return None;
                }
                digits
            }
        };

        let prefix = self.src.string(self.src.line_start(start), start);
        if !self.is_match(&format!("^{}$", self.nest_regex()), &prefix) {
            return None;
        }

        Some(digits)
    }

    fn create_list(&mut self, start: usize, nest_level: usize, list_type: ListType, digits: usize) -> bool {
        let state = match list_type {
            ListType::Ordered => State::OrderedList,
            ListType::Unordered => State::UnorderedList,
        };
        if !self.allowed(state, start) {
            return false;
        }

        let end = self
            .list_end(start, nest_level, list_type, true)
            .min(self.cur().end);
        let first = match list_type {
            ListType::Ordered => Some(self.src.string(start, start + digits)),
            ListType::Unordered => None,
        };
        self.open(
            RunValue::List(NodeList {
                list_type,
                nest_level,
                start: first,
            }),
            start,
            end,
        );
        true
    }

    /// End of the list (`whole`) or list item starting at `start`.
    fn list_end(&self, start: usize, nest_level: usize, list_type: ListType, whole: bool) -> usize {
        let parent_end = self.cur().end;
        let newline = match self.src.index_of("\n", start) {
            Some(n) if n < parent_end => n,
            _ => return parent_end,
        };

        let rules = ListEnd::new(self.quote_nest(), nest_level, list_type);
        let shape = |line: &[char]| LineShape::of(line, rules.quote_nest);
        let mut end = newline;
        let (mut next, mut next_line) = self.list_line(newline);

        loop {
            if next_line.is_empty() {
                return end;
            }

            let mut empty = 0;
            while shape(next_line).is_some_and(|line| line.empty) {
                empty += 1;
                if empty == 2 {
                    return end + rules.tail(2);
                }

                (next, next_line) = self.list_line(next);
                if next_line.is_empty() {
                    return end + rules.tail(2);
                }
            }

            let line = shape(next_line);
            // A deeper quote can't bleed into the list.
            if rules.in_quote() && line.is_some_and(|line| line.deeper_quote) {
                return end;
            }

            if empty == 1 {
                if !line.is_some_and(|line| rules.indented(&line) || (whole && rules.continues(&line))) {
                    return end + rules.tail(2);
                }
            } else if whole {
                if line.is_some_and(|line| rules.list_ends(&line)) {
                    return end + rules.tail(1);
                }
            } else if line.is_some_and(|line| rules.item_ends(&line)) {
                return end + rules.tail(1);
            }

            end = next;
            (next, next_line) = self.list_line(next);
        }
    }

    /// The line after the newline at `newline`, like [`Parser::line_after`],
    /// without copying it out.
    fn list_line(&self, newline: usize) -> (usize, &'a [char]) {
        let next = self.index_or_parent_end("\n", newline + 1);
        if next <= newline {
            return (newline, &[]);
        }
        (next, self.src.slice(newline + 1, next + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn shape(line: &str, quote_nest: usize) -> Option<LineShape> {
        LineShape::of(&chars(line), quote_nest)
    }

    #[test]
    fn markers() {
        assert_eq!(marker(&chars("* a")), Some(ListType::Unordered));
        assert_eq!(marker(&chars("12. a")), Some(ListType::Ordered));
        assert_eq!(marker(&chars("*a")), None);
        assert_eq!(marker(&chars("1.a")), None);
        assert_eq!(marker(&chars(". a")), None);
    }

    #[test]
    fn empty_lines() {
        assert!(shape("\n", 0).unwrap().empty);
        assert!(!shape("  \n", 0).unwrap().empty);
        assert!(shape("> \n", 1).unwrap().empty);
        assert!(shape(">>\n", 2).unwrap().empty);
        assert!(!shape("> a\n", 1).unwrap().empty);
    }

    #[test]
    fn quote_markers_are_stripped() {
        let line = shape("> >   * a\n", 2).unwrap();
        assert_eq!(line.spaces, 3);
        assert_eq!(line.marker, Some(ListType::Unordered));
        assert!(!line.deeper_quote);

        assert!(shape(">>> a\n", 2).unwrap().deeper_quote);
        assert_eq!(shape("> a > b\n", 2), None);
        assert_eq!(shape("a\n", 1), None);
    }

    #[test]
    fn list_and_item_ends() {
        let rules = ListEnd::new(0, 1, ListType::Unordered);
        let nested = shape("    * a\n", 0).unwrap();
        let same = shape("  * a\n", 0).unwrap();
        let swapped = shape("  1. a\n", 0).unwrap();
        let outer = shape("* a\n", 0).unwrap();
        let text = shape("  a\n", 0).unwrap();

        assert!(!rules.list_ends(&nested));
        assert!(!rules.list_ends(&same));
        assert!(rules.list_ends(&swapped));
        assert!(rules.list_ends(&outer));
        assert!(!rules.list_ends(&text));

        assert!(!rules.item_ends(&nested));
        assert!(rules.item_ends(&same));
        assert!(rules.item_ends(&outer));

        assert!(rules.indented(&nested));
        assert!(!rules.indented(&same));
        assert!(rules.continues(&same));
        assert!(!rules.continues(&swapped));
    }
}
