//! Links, reference links and their definitions, images, and bare URLs.

use crate::nodes::{NodeDefinition, NodeImage, NodeLink, RunValue, State};
use crate::parser::{Definition, Parser};

/// Domain endings that turn `name.tld` in running text into a link.
pub(crate) static TOP_LEVEL_DOMAINS: phf::Set<&'static str> = phf::phf_set! {
    "com", "org", "net", "edu", "gov", "de", "ru", "uk", "jp", "it",
    "fr", "nl", "ca", "au", "es", "ch", "se", "us", "no", "mil",
};

const MIN_LINK_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    /// `[text](url)`
    Inline,
    /// `[text][label]`
    Reference,
    /// `[label]: url`
    Definition,
}

#[derive(Debug, Clone)]
pub(super) struct LinkMatch {
    kind: LinkKind,
    /// Everything from the opening `[` up to the first `]`.
    text: String,
    /// The destination, or the label of a reference.
    url: String,
    end: usize,
}

/// A link scan in progress.
#[derive(Debug)]
struct LinkScan {
    start: usize,
    expect: Expect,
    kind: LinkKind,
    /// Everything from the opening `[` up to the first `]`, once seen.
    text: String,
    url_start: usize,
    i: usize,
}

impl LinkScan {
    fn new(start: usize) -> LinkScan {
        LinkScan {
            start,
            expect: Expect::CloseBracket,
            kind: LinkKind::Inline,
            text: String::new(),
            url_start: start,
            i: start,
        }
    }
}

enum ScanStep {
    Done(Option<LinkMatch>),
    /// Stopped at a `[` whose own scan decides how to go on.
    Nested(usize),
}

/// Which character the link scan is looking for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    CloseBracket,
    OpenParen,
    CloseParen,
}

impl<'a> Parser<'a> {
    /// `![alt](url)`, with optional ` w=`/` h=` dimensions at the end of the alt text.
    pub(super) fn check_image(&mut self, start: usize) -> usize {
        if self.src.is_escaped(start) || !self.src.is(start + 1, '[') {
            return start;
        }
        if !self.allowed(State::Image, start) {
            return start;
        }

        let Some(link) = self.test_url(start + 1) else {
            return start;
        };
        if link.kind != LinkKind::Inline || self.cur().end < link.end {
            return start;
        }

        let mut text = link.text;
        let mut width = String::new();
        let mut height = String::new();
        if let Some(groups) = self
            .regexes
            .captures(r"(.*)[\[ ]([wh])=(\d+%?)(?:,h=(\d+%?))?$", &text)
        {
            let group = |i: usize| groups.get(i).cloned().flatten().unwrap_or_default();
            if !group(4).is_empty() {
                width = group(3);
                height = group(4);
            } else if group(2) == "w" {
                width = group(3);
            } else {
                height = group(3);
            }
            text = group(1);
        }

        let alt = text.chars().skip(1).collect();
        self.add(
            RunValue::Image(Box::new(NodeImage {
                alt,
                url: link.url,
                width,
                height,
            })),
            start,
            link.end,
        );
        link.end - 1
    }

    /// `[` opening a link, a reference link, or a reference definition.
    pub(super) fn check_open_bracket(&mut self, i: usize) -> usize {
        if !self.allowed(State::Url, i) || self.src.is_escaped(i) {
            return i;
        }

        let Some(link) = self.test_url(i) else {
            return i;
        };
        if self.cur().end < link.end {
            return i;
        }

        match link.kind {
            LinkKind::Inline => {
                self.open(RunValue::Url(NodeLink { url: link.url }), i, link.end);
                i
            }
            LinkKind::Reference => {
                let id = self.open(RunValue::ReferenceUrl { label: link.url }, i, link.end);
                self.set_volatile(id);
                i
            }
            LinkKind::Definition => {
                let mut end = link.end;
                // A definition on its own line takes its newline along.
                if end < self.cur().end && self.src.is(end, '\n') && (i == 0 || self.src.is(i - 1, '\n')) {
                    end += 1;
                }

                let label: String = link.text.chars().skip(1).collect();
                self.definitions.push(Definition {
                    start: i,
                    label: label.clone(),
                    url: link.url.clone(),
                });
                self.open(
                    RunValue::ReferenceDefinition(NodeDefinition { label, url: link.url }),
                    i,
                    end,
                );
                end - 1
            }
        }
    }

    /// Scan a potential link starting with the `[` at `start`, without
    /// adding anything.
    ///
    /// A `[` inside the bracketed text starts a nested scan; when that finds
    /// a link, the outer scan skips past it. Nested scans run off an explicit
    /// stack and every result is remembered for the rest of the parse, so a
    /// long run of `[` costs neither stack depth nor repeated rescans.
    fn test_url(&mut self, start: usize) -> Option<LinkMatch> {
        let end = self.index_or_parent_end("\n\n", start);
        if let Some(known) = self.link_scans.get(&(start, end)) {
            return known.clone();
        }
        if end < start + MIN_LINK_LENGTH {
            return None;
        }

        let mut stack = vec![LinkScan::new(start)];
        let mut inner = None;
        while let Some(scan) = stack.last_mut() {
            match self.resume_scan(scan, end, inner.take()) {
                ScanStep::Nested(at) => match self.link_scans.get(&(at, end)) {
                    Some(known) => inner = Some(known.clone()),
                    None if end < at + MIN_LINK_LENGTH => inner = Some(None),
                    None => stack.push(LinkScan::new(at)),
                },
                ScanStep::Done(found) => {
                    let scan_start = scan.start;
                    stack.pop();
                    self.link_scans.insert((scan_start, end), found.clone());
                    if stack.is_empty() {
                        return found;
                    }
                    inner = Some(found);
                }
            }
        }
        None
    }

    /// Advance `scan` until it finds its link, gives up, or reaches a nested
    /// `[`. `inner` is the outcome of the nested scan it last stopped at.
    fn resume_scan(
        &mut self,
        scan: &mut LinkScan,
        end: usize,
        inner: Option<Option<LinkMatch>>,
    ) -> ScanStep {
        if let Some(inner) = inner {
            if let Some(link) = inner {
                scan.i = link.end - 1;
            }
            scan.i += 1;
        }

        while self.src.within(scan.i, end) {
            let i = scan.i;
            match self.src.at(i) {
                Some('[') if i != scan.start && !self.src.is_escaped(i) => {
                    if scan.expect == Expect::OpenParen && self.src.is(i - 1, ']') {
                        scan.expect = Expect::CloseBracket;
                        scan.url_start = i + 1;
                        scan.kind = LinkKind::Reference;
                    } else if scan.expect == Expect::CloseBracket {
                        return ScanStep::Nested(i);
                    }
                }
                Some(']') if scan.expect == Expect::CloseBracket && !self.src.is_escaped(i) => {
                    if scan.kind == LinkKind::Reference {
                        return ScanStep::Done(Some(LinkMatch {
                            kind: scan.kind,
                            text: std::mem::take(&mut scan.text),
                            url: self.src.string(scan.url_start, i),
                            end: i + 1,
                        }));
                    }

                    scan.text = self.src.string(scan.start, i);
                    scan.expect = Expect::OpenParen;
                    if !matches!(self.src.at(i + 1), Some('(' | '[' | ':')) {
                        return ScanStep::Done(None);
                    }
                }
                Some('(') if scan.expect == Expect::OpenParen && !self.src.is(i - 1, '\\') => {
                    if !self.src.is(i - 1, ']') {
                        return ScanStep::Done(None);
                    }
                    scan.url_start = i + 1;
                    scan.expect = Expect::CloseParen;
                }
                Some(')') if scan.expect == Expect::CloseParen && !self.src.is(i - 1, '\\') => {
                    return ScanStep::Done(Some(LinkMatch {
                        kind: scan.kind,
                        text: std::mem::take(&mut scan.text),
                        url: self.src.string(scan.url_start, i),
                        end: i + 1,
                    }));
                }
                Some('`') if !self.src.is_escaped(i) => {
                    if let Some(code_end) = self.inline_end(i, end) {
                        scan.i = code_end - 1;
                    }
                }
                Some(':')
                    if scan.expect == Expect::OpenParen
                        && self.src.is(i - 1, ']')
                        && !self.src.is_escaped(i)
                        && self.src.is(i + 1, ' ') =>
                {
                    let url_end = self.index_or_parent_end("\n", scan.start);
                    if url_end < i + 3 {
                        return ScanStep::Done(None);
                    }
                    return ScanStep::Done(Some(LinkMatch {
                        kind: LinkKind::Definition,
                        text: std::mem::take(&mut scan.text),
                        url: self.src.string(i + 2, url_end),
                        end: url_end,
                    }));
                }
                _ => {}
            }
            scan.i += 1;
        }

        ScanStep::Done(None)
    }

    /// A `.` that may sit inside a bare domain such as `example.com/page`.
    pub(super) fn check_implicit_url(&mut self, start: usize) -> usize {
        if self.src.is_escaped(start) || self.in_special_context(start) || self.state() == State::Url {
            return start;
        }

        let Some(link_end) = self.implicit_url_end(start) else {
            return start;
        };
        let link_start = self.implicit_url_start(start);
        if link_start >= start {
            return start;
        }

        let url = self.src.string(link_start, link_end);
        self.add(RunValue::ImplicitUrl(NodeLink { url }), link_start, link_end);
        link_end - 1
    }

    fn implicit_url_start(&self, start: usize) -> usize {
        let min = self
            .current
            .last_child(self.arena)
            .map_or(self.cur().start, |last| self.run(last).end);

        // `next` is one past the character under test.
        let mut next = start + 1;
        while next > min {
            let at = next - 1;
            let c = self.src.at(at);
            if c.is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
                next -= 1;
                continue;
            }

            if c != Some('/')
                || at < min + 5
                || !self.src.is(at - 1, '/')
                || !self.src.is(at - 2, ':')
                || !self.src.slice(at - 5, at - 2).iter().all(char::is_ascii_alphabetic)
            {
                return self.trim_url_start(at + 1);
            }

            // Schemes are three to five letters.
            for back in 6..=8 {
                if at < min + back || !self.src.at(at - back).is_some_and(|c| c.is_ascii_alphabetic()) {
                    return at + 1 - back;
                }
            }
            return self.trim_url_start(at + 1);
        }

        self.trim_url_start(next)
    }

    fn trim_url_start(&self, mut start: usize) -> usize {
        while matches!(self.src.at(start), Some('.' | '-')) {
            start += 1;
        }
        start
    }

    fn implicit_url_end(&self, start: usize) -> Option<usize> {
        let cur = self.cur();
        let max = cur
            .end
            .checked_sub(self.end_context(self.current))?
            .checked_sub(usize::from(cur.end == self.src.len()))?;
        let limit = max + 1;

        let domain_end = self.domain_end(start, limit)?;
        if !self.src.within(domain_end, limit) || !self.src.is(domain_end, '/') {
            return Some(domain_end);
        }
        Some(self.url_path_end(domain_end + 1, limit))
    }

    /// End of a known top-level domain after the `.` at `start`, with an
    /// optional port.
    fn domain_end(&self, start: usize, limit: usize) -> Option<usize> {
        let mut end = start + 1;
        while self.src.within(end, limit) && self.src.at(end).is_some_and(|c| c.is_ascii_alphabetic()) {
            end += 1;
        }

        let domain = self.src.string(start + 1, end);
        if !TOP_LEVEL_DOMAINS.contains(domain.as_str()) {
            return None;
        }

        if self.src.within(end, limit) && self.src.is(end, ':') {
            let port_start = end + 1;
            let mut port_end = port_start;
            while self.src.within(port_end, limit) && self.src.at(port_end).is_some_and(|c| c.is_ascii_digit()) {
                port_end += 1;
            }
            let port = self.src.string(port_start, port_end).parse::<u32>();
            if port.is_ok_and(|p| (1..=65535).contains(&p)) {
                return Some(port_end);
            }
        }

        Some(end)
    }

    /// Punctuation that usually ends a sentence only counts as part of the
    /// path when more path follows it.
    fn url_path_end(&self, start: usize, limit: usize) -> usize {
        let mut pos = start;
        let mut maybe = false;
        while self.src.within(pos, limit) {
            match self.src.at(pos) {
                Some(' ' | ',' | '\n' | '"' | '\'') => return pos - usize::from(maybe),
                Some(':' | ';' | '.' | '!' | ')' | '(' | '[' | ']' | '\\') => maybe = true,
                _ => maybe = false,
            }
            pos += 1;
        }

        if maybe {
            pos - 1
        } else if pos == self.src.len() {
            pos
        } else {
            start
        }
    }
}
