//! Read access to the text being scanned.
//!
//! Every read records how far into the text it looked. The furthest such
//! offset is the *horizon*: as long as an edit leaves `text[..horizon]`
//! alone, everything built so far would be built again identically.
//! Reads that depend on where the text ends count as reading one past it.

use std::cell::Cell;

use crate::strings;

pub(crate) struct Source<'t> {
    text: &'t [char],
    horizon: Cell<usize>,
}

impl<'t> Source<'t> {
    pub fn new(text: &'t [char]) -> Source<'t> {
        Source {
            text,
            horizon: Cell::new(0),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn horizon(&self) -> usize {
        self.horizon.get()
    }

    /// Note that the caller's result depends on `text[..upto]`.
    pub fn touch(&self, upto: usize) {
        let upto = if upto >= self.text.len() {
            self.text.len() + 1
        } else {
            upto
        };
        if upto > self.horizon.get() {
            self.horizon.set(upto);
        }
    }

    /// The whole text, without recording a read. Only for code that
    /// touches what it uses itself.
    pub fn raw(&self) -> &'t [char] {
        self.text
    }

    #[inline]
    pub fn at(&self, index: usize) -> Option<char> {
        self.touch(index.saturating_add(1));
        self.text.get(index).copied()
    }

    #[inline]
    pub fn is(&self, index: usize, c: char) -> bool {
        self.at(index) == Some(c)
    }

    pub fn is_space(&self, index: usize) -> bool {
        self.at(index).is_some_and(strings::is_space)
    }

    pub fn is_alnum(&self, index: usize) -> bool {
        self.at(index).is_some_and(strings::is_alnum)
    }

    pub fn is_escaped(&self, index: usize) -> bool {
        self.touch(index);
        strings::is_escaped(self.text, index)
    }

    /// `index < end`. A false result means the caller stopped because of
    /// `end`, which counts as having looked at it.
    #[inline]
    pub fn within(&self, index: usize, end: usize) -> bool {
        if index < end {
            true
        } else {
            self.touch(end);
            false
        }
    }

    /// `text[a..b]` with out-of-range bounds clamped and reversed bounds
    /// swapped.
    pub fn slice(&self, a: usize, b: usize) -> &'t [char] {
        let (a, b) = if a > b { (b, a) } else { (a, b) };
        let b = b.min(self.text.len());
        let a = a.min(b);
        self.touch(b);
        &self.text[a..b]
    }

    pub fn string(&self, a: usize, b: usize) -> String {
        strings::collect(self.slice(a, b))
    }

    /// First `pattern` at or after `from`, anywhere in the text.
    pub fn index_of(&self, pattern: &str, from: usize) -> Option<usize> {
        let found = strings::index_of(self.text, pattern, from);
        match found {
            Some(at) => self.touch(at + pattern.chars().count()),
            None => self.touch(self.text.len()),
        }
        found
    }

    /// First `pattern` starting in `from..=limit`, or `limit` if there is none.
    pub fn index_or_limit(&self, pattern: &str, from: usize, limit: usize) -> usize {
        let width = pattern.chars().count();
        let window_end = limit.saturating_add(width).min(self.text.len());
        let found = if from <= limit && from < window_end {
            strings::index_of(&self.text[..window_end], pattern, from)
        } else {
            None
        };
        match found {
            Some(at) => {
                self.touch(at + width);
                at
            }
            None => {
                self.touch(limit.saturating_add(width));
                limit
            }
        }
    }

    /// Last newline at or before `index`.
    pub fn last_newline(&self, index: usize) -> Option<usize> {
        self.touch(index.saturating_add(1));
        strings::last_index_of(self.text, '\n', index)
    }

    /// Offset of the first character of the line holding `index`.
    pub fn line_start(&self, index: usize) -> usize {
        self.last_newline(index).map_or(0, |n| n + 1)
    }
}
