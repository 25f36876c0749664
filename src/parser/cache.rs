//! Reuse of the previous parse.
//!
//! Each child of the root records, when it closes, the furthest offset the
//! scan had read and where the scan stood. On the next parse the children
//! whose reads all lie before the first edited offset are kept as they are,
//! and scanning resumes behind the last of them.

use crate::nodes::{strip_implicit, Run, RunArena, RunId, RunValue, ScanRecord};
use crate::parser::{Parser, Session};
use crate::strings::RegexCache;

/// Past this many nodes per character the arena is rebuilt rather than reused.
const ARENA_SLACK_PER_CHAR: usize = 8;
const ARENA_SLACK: usize = 1024;

impl Session {
    pub fn new() -> Session {
        Session {
            arena: RunArena::new(),
            root: None,
            text: vec![],
            inline_only: false,
            definitions: vec![],
            html: None,
            same_text: false,
            regexes: RegexCache::default(),
        }
    }

    /// Forget everything and start over with a bare root.
    pub fn reset_full(&mut self, text: Vec<char>, inline_only: bool) {
        let mut arena = RunArena::new();
        let root = RunId::new_in(&mut arena, Run::new(RunValue::Root, 0, text.len()));
        self.arena = arena;
        self.root = Some(root);
        self.text = text;
        self.inline_only = inline_only;
        self.definitions.clear();
        self.html = None;
        self.same_text = false;
    }

    /// Prepare for a parse of `text`, keeping whatever the edit from the
    /// previous text cannot have changed. Returns the offset to scan from.
    pub fn reset(&mut self, text: Vec<char>, cache: bool) -> usize {
        self.same_text = false;
        self.html = None;

        let root = match self.root {
            Some(root)
                if cache
                    && !self.inline_only
                    && self.arena.len() <= ARENA_SLACK_PER_CHAR * text.len() + ARENA_SLACK =>
            {
                root
            }
            _ => {
                self.reset_full(text, false);
                return 0;
            }
        };

        let diverge = first_difference(&self.text, &text);
        strip_implicit(&self.arena, root);

        let children: Vec<RunId> = root.children(&self.arena).collect();
        let mut resume: Option<usize> = None;
        let mut last_kept = None;
        let mut keeping = true;
        for child in children {
            if keeping {
                match child.data(&self.arena).scan {
                    Some(ScanRecord { horizon, resume_at })
                        if horizon <= diverge && resume.map_or(true, |r| resume_at >= r) =>
                    {
                        resume = Some(resume_at);
                        last_kept = Some(child);
                        continue;
                    }
                    _ => keeping = false,
                }
            }
            child.detach(&self.arena);
        }

        let (Some(resume), Some(last_kept)) = (resume, last_kept) else {
            self.reset_full(text, false);
            return 0;
        };

        log::debug!("reusing parse up to {resume} (first edit at {diverge})");

        self.definitions.retain(|d| d.start < resume);

        let volatile = root
            .children(&self.arena)
            .any(|c| c.data(&self.arena).volatile);
        let run = root.data_mut(&mut self.arena);
        run.end = text.len();
        run.cached_html = None;
        run.volatile = volatile;

        let stale: Vec<RunId> = last_kept.descendants(&self.arena).collect();
        for id in stale {
            id.data_mut(&mut self.arena).cached_html = None;
        }

        self.text = text;
        resume
    }
}

/// First offset at which the texts differ. A text that is a prefix of the
/// other differs where it ends.
fn first_difference(a: &[char], b: &[char]) -> usize {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .unwrap_or(a.len().min(b.len()))
}

impl<'a> Parser<'a> {
    /// Record every child of the root that has closed by `i`.
    pub(super) fn record_closed(&mut self, i: usize) {
        let horizon = self.src.horizon();
        let closed: Vec<RunId> = self
            .root
            .reverse_children(self.arena)
            .take_while(|&c| self.run(c).scan.is_none())
            .filter(|&c| self.run(c).end <= i)
            .collect();
        for id in closed {
            self.run_mut(id).scan = Some(ScanRecord {
                horizon,
                resume_at: i,
            });
        }
    }

    /// Children still open when the text ran out depend on where it ends.
    pub(super) fn record_unfinished(&mut self) {
        let open: Vec<RunId> = self
            .root
            .reverse_children(self.arena)
            .take_while(|&c| self.run(c).scan.is_none())
            .collect();
        for id in open {
            self.run_mut(id).scan = Some(ScanRecord {
                horizon: usize::MAX,
                resume_at: usize::MAX,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn differences() {
        assert_eq!(first_difference(&chars("abc"), &chars("abd")), 2);
        assert_eq!(first_difference(&chars("ab"), &chars("abc")), 2);
        assert_eq!(first_difference(&chars("abc"), &chars("abc")), 3);
        assert_eq!(first_difference(&chars(""), &chars("x")), 0);
    }

    #[test]
    fn disabled_cache_starts_over() {
        let mut session = Session::new();
        session.reset_full(chars("# a\n"), false);
        assert_eq!(session.reset(chars("# a\nb"), false), 0);
        let root = session.root.unwrap();
        assert_eq!(root.children(&session.arena).count(), 0);
        assert_eq!(root.data(&session.arena).end, 5);
    }

    #[test]
    fn unrecorded_children_are_dropped() {
        let mut session = Session::new();
        session.reset_full(chars("**a** b"), false);
        let root = session.root.unwrap();
        let bold = RunId::new_in(&mut session.arena, Run::new(RunValue::Bold, 0, 5));
        root.append(&session.arena, bold);
        assert_eq!(session.reset(chars("**a** c"), true), 0);
        let root = session.root.unwrap();
        assert_eq!(root.children(&session.arena).count(), 0);
    }

    #[test]
    fn recorded_children_before_the_edit_survive() {
        let mut session = Session::new();
        session.reset_full(chars("**a** b"), false);
        let root = session.root.unwrap();
        let bold = RunId::new_in(&mut session.arena, Run::new(RunValue::Bold, 0, 5));
        bold.data_mut(&mut session.arena).scan = Some(ScanRecord {
            horizon: 6,
            resume_at: 5,
        });
        root.append(&session.arena, bold);
        assert_eq!(session.reset(chars("**a** c"), true), 5);
        let root = session.root.unwrap();
        assert_eq!(root.children(&session.arena).collect::<Vec<_>>(), vec![bold]);
        assert_eq!(root.data(&session.arena).end, 7);
    }
}
