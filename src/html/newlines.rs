//! Line breaks and paragraphs for the loose text of a container.
//!
//! A container's block children split its text into stretches. In each
//! stretch a single newline becomes a line break. At the root, blank lines
//! also split a stretch into `mdDiv` paragraphs. Next to a block child,
//! newlines only become breaks when the block doesn't already end the
//! line, so `A\n# B` gets no break between the text and the header.

use crate::nodes::{strip_implicit, Run, RunArena, RunId, RunValue, State};
use crate::strings;

/// Insert breaks and paragraphs among the children of `container`,
/// replacing any left from an earlier render.
pub(super) fn transform(arena: &mut RunArena, container: RunId, text: &[char]) {
    strip_implicit(arena, container);
    let state = container.data(arena).state();
    Newlines {
        arena,
        text,
        container,
        state,
    }
    .run();
}

struct Newlines<'a> {
    arena: &'a mut RunArena,
    text: &'a [char],
    container: RunId,
    state: State,
}

/// Where a new break goes among the container's children.
enum Place {
    Front,
    Back,
    Before(RunId),
}

impl<'a> Newlines<'a> {
    fn run(&mut self) {
        let (mut start, end) = self.bounds(self.container);
        let mut previous = self.container;
        let blocks: Vec<RunId> = self
            .container
            .children(self.arena)
            .filter(|&c| self.data(c).state().is_block_element())
            .collect();

        for block in blocks {
            let (block_start, block_end) = self.bounds(block);
            if start < block_start {
                self.stretch(start, block_start, previous, Some(block));
            }
            start = block_end;
            previous = block;
        }

        if start < end {
            let next = self
                .container
                .next_sibling(self.arena)
                .or_else(|| self.container.parent(self.arena));
            self.stretch(start, end, previous, next);
        }
    }

    #[inline]
    fn data(&self, id: RunId) -> &Run {
        id.data(self.arena)
    }

    fn bounds(&self, id: RunId) -> (usize, usize) {
        let run = self.data(id);
        (run.start, run.end)
    }

    /// Handle the text `[start, end)` between `previous` and `next`.
    fn stretch(&mut self, start: usize, end: usize, previous: RunId, next: Option<RunId>) {
        let mut paragraphs = vec![];
        let mut newline = strings::index_of(self.text, "\n", start);
        while let Some(at) = newline.filter(|&n| n < end) {
            let offset = self.newline_run(at, end, &mut paragraphs, previous, next);
            newline = strings::index_of(self.text, "\n", at + offset);
        }

        if self.state != State::None {
            return;
        }

        // Paragraphs only wrap whole lines.
        let len = self.text.len();
        if end == len || self.text.get(end) == Some(&'\n') {
            let first_end = paragraphs.first().map_or(end, |&(_, gap_end)| gap_end);
            self.insert_div(start, first_end);
        }
        for pair in paragraphs.windows(2) {
            self.insert_div(pair[0].1, pair[1].1);
        }
        if let Some(&(_, last_end)) = paragraphs.last() {
            if last_end + 1 < end || (end == len && last_end + 1 == end) {
                self.insert_div(last_end, end);
            }
        }
    }

    /// Handle the newlines (and the spaces between them) starting at
    /// `newline`. Returns how many characters they span.
    fn newline_run(
        &mut self,
        newline: usize,
        end: usize,
        paragraphs: &mut Vec<(usize, usize)>,
        previous: RunId,
        next: Option<RunId>,
    ) -> usize {
        let mut newlines = 1;
        let mut offset = 1;
        while newline + offset < end {
            match self.text[newline + offset] {
                '\n' => newlines += 1,
                ' ' => {}
                _ => break,
            }
            offset += 1;
        }

        let at_top = newline == self.data(previous).end;
        let at_bottom = next.is_some_and(|n| newline + offset == self.data(n).start);

        if newlines > 1 && self.state == State::None && ((!at_top && !at_bottom) || newlines > 2) {
            if !in_hidden_element(self.arena, self.container, newline) && !self.inside_child(newline) {
                paragraphs.push((newline, newline + offset));
            }
            return offset;
        }

        let neighbour = if at_top {
            Some(previous)
        } else if at_bottom {
            next
        } else {
            None
        };
        let wanted = neighbour.map_or(true, |n| self.breaks_next_to(n));

        if wanted {
            self.insert_break(newline);
        }
        if newlines > 1 && (wanted || newlines > 2) {
            self.insert_break(newline + 1);
        }
        offset
    }

    /// Whether `index` falls inside one of the container's inline runs. A
    /// line holding only spaces ends a paragraph here but not an inline
    /// run, and a paragraph can't cut a run in two.
    fn inside_child(&self, index: usize) -> bool {
        self.container.children(self.arena).any(|c| {
            let run = self.data(c);
            run.start < index && index < run.end
        })
    }

    /// Whether a newline right next to `other` still becomes a break. Only
    /// lists inside list items keep them.
    fn breaks_next_to(&self, other: RunId) -> bool {
        let state = self.data(other).state();
        !state.is_block_element()
            || (self.state == State::ListItem
                && matches!(
                    state,
                    State::ListItem | State::OrderedList | State::UnorderedList
                ))
    }

    fn insert_break(&mut self, index: usize) {
        if in_hidden_element(self.arena, self.container, index) {
            return;
        }

        let Some(place) = self.break_place(index) else {
            return;
        };
        let id = RunId::new_in(
            self.arena,
            Run::new(RunValue::LineBreak { implicit: true }, index, index + 1),
        );
        match place {
            Place::Front => self.container.prepend(self.arena, id),
            Place::Back => self.container.append(self.arena, id),
            Place::Before(sibling) => sibling.insert_before(self.arena, id),
        }
    }

    fn break_place(&self, index: usize) -> Option<Place> {
        let children: Vec<RunId> = self.container.children(self.arena).collect();
        let (Some(&first), Some(&last)) = (children.first(), children.last()) else {
            return Some(Place::Front);
        };
        if self.data(first).start >= index {
            return Some(Place::Front);
        }

        let last = self.data(last);
        if index > last.end || (index == last.end && !last.state().is_hidden_element()) {
            return Some(Place::Back);
        }

        for pair in children.windows(2) {
            let (before, after) = (self.data(pair[0]), self.data(pair[1]));
            if after.start < index {
                continue;
            }

            // Between two comments on their own lines.
            if after.start == index + 1
                && after.state().is_hidden_element()
                && before.end == index
                && before.state().is_hidden_element()
            {
                return None;
            }

            // Inside a run that spans lines; it renders its own breaks.
            if index < before.end {
                if before.state().is_block_element() {
                    log::warn!("Only inline elements should be hitting this");
                }
                return None;
            }

            return Some(Place::Before(pair[1]));
        }
        None
    }

    /// Wrap the children within `[start, end)` in a paragraph.
    fn insert_div(&mut self, start: usize, end: usize) {
        let children: Vec<RunId> = self.container.children(self.arena).collect();
        let volatile = self.data(self.container).volatile;

        if children.first().map_or(true, |&c| end < self.data(c).start) {
            let div = self.new_div(start, end, volatile);
            self.container.prepend(self.arena, div);
            return;
        }

        let insert = children
            .iter()
            .position(|&c| self.data(c).start >= start)
            .unwrap_or(children.len());
        let wrapped = children[insert..]
            .iter()
            .filter(|&&c| self.data(c).end <= end)
            .count();
        if wrapped == 1 && self.data(children[insert]).state() == State::Div {
            return;
        }

        let div = self.new_div(start, end, volatile);
        match children.get(insert) {
            Some(&sibling) => sibling.insert_before(self.arena, div),
            None => self.container.append(self.arena, div),
        }
        for &child in &children[insert..insert + wrapped] {
            div.append(self.arena, child);
        }
    }

    fn new_div(&mut self, start: usize, end: usize, volatile: bool) -> RunId {
        let mut run = Run::new(RunValue::Div, start, end);
        run.volatile = volatile;
        RunId::new_in(self.arena, run)
    }
}

/// Whether `index` lies strictly inside a hidden element at or below `id`.
fn in_hidden_element(arena: &RunArena, id: RunId, index: usize) -> bool {
    let run = id.data(arena);
    if run.state().is_hidden_element() && index > run.start && index < run.end {
        return true;
    }

    id.children(arena).any(|child| {
        let run = child.data(arena);
        index >= run.start && index <= run.end && in_hidden_element(arena, child, index)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(text: &str, children: Vec<(RunValue, usize, usize)>) -> (RunArena, RunId, Vec<char>) {
        let text: Vec<char> = text.chars().collect();
        let mut arena = RunArena::new();
        let root = RunId::new_in(&mut arena, Run::new(RunValue::Root, 0, text.len()));
        for (value, start, end) in children {
            let child = RunId::new_in(&mut arena, Run::new(value, start, end));
            root.append(&arena, child);
        }
        (arena, root, text)
    }

    fn shape(arena: &RunArena, id: RunId) -> Vec<(State, usize, usize)> {
        id.children(arena)
            .map(|c| {
                let run = c.data(arena);
                (run.state(), run.start, run.end)
            })
            .collect()
    }

    #[test]
    fn single_newline_is_a_break_inside_a_paragraph() {
        let (mut arena, root, text) = tree("A\nB", vec![]);
        transform(&mut arena, root, &text);
        assert_eq!(shape(&arena, root), vec![(State::Div, 0, 3)]);
        let div = root.first_child(&arena).unwrap();
        assert_eq!(shape(&arena, div), vec![(State::LineBreak, 1, 2)]);
    }

    #[test]
    fn blank_line_splits_paragraphs() {
        let (mut arena, root, text) = tree("A\n\nB", vec![]);
        transform(&mut arena, root, &text);
        assert_eq!(shape(&arena, root), vec![(State::Div, 0, 3), (State::Div, 3, 4)]);
    }

    #[test]
    fn no_break_before_a_block() {
        let (mut arena, root, text) = tree("A\n# B", vec![(RunValue::Header { level: 1 }, 2, 5)]);
        transform(&mut arena, root, &text);
        assert_eq!(shape(&arena, root), vec![(State::Header, 2, 5)]);
    }

    #[test]
    fn transform_is_repeatable() {
        let (mut arena, root, text) = tree("A\nB\n\nC", vec![]);
        transform(&mut arena, root, &text);
        let first = shape(&arena, root);
        transform(&mut arena, root, &text);
        assert_eq!(shape(&arena, root), first);
    }

    #[test]
    fn paragraphs_never_split_inline_runs() {
        let (mut arena, root, text) = tree("*a\n \nb*", vec![(RunValue::Italic, 0, 8)]);
        transform(&mut arena, root, &text);
        assert_eq!(shape(&arena, root), vec![(State::Div, 0, 8)]);
        let div = root.first_child(&arena).unwrap();
        assert_eq!(shape(&arena, div), vec![(State::Italic, 0, 8)]);
    }

    #[test]
    fn comments_swallow_their_newlines() {
        let (mut arena, root, text) = tree("<!--\n-->", vec![(RunValue::HtmlComment, 0, 8)]);
        transform(&mut arena, root, &text);
        assert_eq!(shape(&arena, root), vec![(State::Div, 0, 8)]);
        let div = root.first_child(&arena).unwrap();
        assert_eq!(shape(&arena, div), vec![(State::HtmlComment, 0, 8)]);
    }
}
