//! Rendering of a Run tree to HTML.
//!
//! Each run renders as its opening tag, the literal text around and
//! between its children, the children themselves, and its closing tag.
//! Literal text is trimmed and unescaped according to the run it sits in,
//! then entity-escaped. The result is memoized on the run until the
//! incremental cache invalidates it.

mod anchorizer;
mod newlines;

pub use anchorizer::anchorize;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::nodes::{
    Alignment, CodeBlockKind, ListType, NodeCodeBlock, NodeImage, NodeTable, RunArena, RunId,
    RunValue, State,
};
use crate::parser::{lookup, Definition, Options, TOP_LEVEL_DOMAINS};
use crate::strings::{self, escape_chars, escape_entities, trim_side, RegexCache, Side};

/// Characters a backslash escapes in ordinary text.
const ESCAPABLE: &str = "*`_+~<>|^()";

/// A scheme of three to five letters, optional credentials, and the host.
static ABSOLUTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{3,5}://(?:[^/?#@]*@)?([^/?#:]*)").unwrap());

static BARE_DOMAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9.-]+$").unwrap());

/// Render the tree under `root`, running the newline transform on every
/// container unless `inline_only`.
pub(crate) fn render(
    arena: &mut RunArena,
    root: RunId,
    text: &[char],
    options: &Options,
    definitions: &[Definition],
    regexes: &RegexCache,
    inline_only: bool,
) -> String {
    let mut f = HtmlFormatter {
        arena,
        text,
        options,
        definitions,
        regexes,
        inline_only,
    };
    f.convert(root)
}

struct HtmlFormatter<'a> {
    arena: &'a mut RunArena,
    text: &'a [char],
    options: &'a Options,
    definitions: &'a [Definition],
    regexes: &'a RegexCache,
    inline_only: bool,
}

impl<'a> HtmlFormatter<'a> {
    fn convert(&mut self, id: RunId) -> String {
        {
            let run = id.data(self.arena);
            if !run.volatile {
                if let Some(html) = &run.cached_html {
                    return html.clone();
                }
            }
        }

        if !self.inline_only && id.data(self.arena).state().processes_newlines() {
            newlines::transform(self.arena, id, self.text);
        }

        let mut out = self.open_tag(id);

        let run = id.data(self.arena);
        let content_start = run.start + run.start_context_length(self.text);
        let content_end = run
            .end
            .saturating_sub(run.end_context_length(self.text))
            .max(content_start);
        let children: Vec<RunId> = id.children(self.arena).collect();

        match (children.first(), children.last()) {
            (Some(&first), Some(&last)) => {
                let first_start = first.data(self.arena).start;
                if content_start < first_start {
                    out += &self.transform(id, content_start, first_start, Side::Left, None);
                }

                for (i, &child) in children.iter().enumerate() {
                    out += &self.convert(child);
                    if let Some(&next) = children.get(i + 1) {
                        let child_end = child.data(self.arena).end;
                        let next_start = next.data(self.arena).start;
                        if child_end < next_start {
                            out += &self.transform(id, child_end, next_start, Side::Middle, Some(child));
                        }
                    }
                }

                let last_end = last.data(self.arena).end;
                if last_end < content_end {
                    out += &self.transform(id, last_end, content_end, Side::Right, Some(last));
                }
            }
            _ => out += &self.transform(id, content_start, content_end, Side::Full, None),
        }

        out += self.close_tag(id);
        id.data_mut(self.arena).cached_html = Some(out.clone());
        out
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.text.len());
        strings::collect(&self.text[start.min(end)..end])
    }

    fn open_tag(&self, id: RunId) -> String {
        let run = id.data(self.arena);
        match &run.value {
            RunValue::Root | RunValue::HtmlComment => String::new(),
            RunValue::Div => r#"<div class="mdDiv">"#.to_string(),
            RunValue::LineBreak { .. } => "<br />".to_string(),
            RunValue::Hr => "<hr />".to_string(),
            RunValue::List(list) => match (&list.list_type, &list.start) {
                (ListType::Ordered, Some(first)) if first.parse::<u64>() != Ok(1) => {
                    format!(r#"<ol start="{first}">"#)
                }
                (ListType::Ordered, _) => "<ol>".to_string(),
                (ListType::Unordered, _) => "<ul>".to_string(),
            },
            RunValue::ListItem(..) => "<li>".to_string(),
            RunValue::Header { level } => {
                format!(r#"<h{level} id="{}">"#, anchorize(&self.plain_text(id)))
            }
            RunValue::CodeBlock(..) => "<pre>".to_string(),
            RunValue::BlockQuote { .. } => "<blockquote>".to_string(),
            RunValue::Table(..) => "<table>".to_string(),
            RunValue::Url(link) => self.anchor(&link.url),
            RunValue::ReferenceUrl { label } => match lookup(self.definitions, label) {
                Some(url) => self.anchor(url),
                None => {
                    log::warn!("Could not find link match for {label}");
                    "<a>".to_string()
                }
            },
            RunValue::ImplicitUrl(link) => {
                self.anchor(&link.url) + &plain(&escape_chars(&link.url, "[]"))
            }
            RunValue::Image(image) => self.image(image),
            RunValue::InlineCode { .. } => "<code>".to_string(),
            RunValue::Bold => "<strong>".to_string(),
            RunValue::Italic => "<em>".to_string(),
            RunValue::Underline => "<ins>".to_string(),
            RunValue::Strikethrough => "<s>".to_string(),
            RunValue::Superscript { .. } => "<sup>".to_string(),
            RunValue::Subscript { .. } => "<sub>".to_string(),
            RunValue::ReferenceDefinition(..) => "<!-- ".to_string(),
        }
    }

    fn close_tag(&self, id: RunId) -> &'static str {
        match &id.data(self.arena).value {
            RunValue::Root
            | RunValue::HtmlComment
            | RunValue::LineBreak { .. }
            | RunValue::Hr
            | RunValue::Image(..) => "",
            RunValue::Div => "</div>",
            RunValue::List(list) => match list.list_type {
                ListType::Ordered => "</ol>",
                ListType::Unordered => "</ul>",
            },
            RunValue::ListItem(..) => "</li>",
            RunValue::Header { level } => match level {
                1 => "</h1>",
                2 => "</h2>",
                3 => "</h3>",
                4 => "</h4>",
                5 => "</h5>",
                _ => "</h6>",
            },
            RunValue::CodeBlock(..) => "</pre>",
            RunValue::BlockQuote { .. } => "</blockquote>",
            RunValue::Table(..) => "</table>",
            RunValue::Url(..) | RunValue::ReferenceUrl { .. } | RunValue::ImplicitUrl(..) => "</a>",
            RunValue::InlineCode { .. } => "</code>",
            RunValue::Bold => "</strong>",
            RunValue::Italic => "</em>",
            RunValue::Underline => "</ins>",
            RunValue::Strikethrough => "</s>",
            RunValue::Superscript { .. } => "</sup>",
            RunValue::Subscript { .. } => "</sub>",
            RunValue::ReferenceDefinition(..) => " -->",
        }
    }

    /// Literal text `[start, end)` inside run `id`. `previous` is the child
    /// the text follows, if any.
    fn transform(&self, id: RunId, start: usize, end: usize, side: Side, previous: Option<RunId>) -> String {
        let raw = self.slice(start, end);
        match &id.data(self.arena).value {
            RunValue::Root => plain(&raw).replace('\n', ""),
            RunValue::Div => plain(&trim_side(&raw, side)),
            RunValue::Header { .. } => header_content(&raw, side),
            RunValue::BlockQuote { .. } => plain(&strip_quote_markers(&raw, side, self.after_block(previous))),
            RunValue::ListItem(..) => self.list_item_content(id, &raw, side, previous),
            RunValue::Url(..) | RunValue::ReferenceUrl { .. } => plain(&escape_chars(&raw, "[]")),
            RunValue::InlineCode { .. } => escape_entities(&trim_code_span(&raw)),
            RunValue::CodeBlock(block) => self.code_block(block, &raw),
            RunValue::Table(table) => table_body(table),
            // Newlines inside formatting become `<br>`, not the `<br />` of
            // implicit breaks. Existing rendered output depends on the difference.
            RunValue::Bold
            | RunValue::Italic
            | RunValue::Underline
            | RunValue::Strikethrough
            | RunValue::Superscript { .. }
            | RunValue::Subscript { .. } => plain(&raw).replace('\n', "<br>"),
            RunValue::HtmlComment => raw,
            RunValue::ReferenceDefinition(..) => raw
                .replacen("-->", "--&gt;", 1)
                .trim_matches(strings::is_space)
                .to_string(),
            RunValue::LineBreak { .. }
            | RunValue::Hr
            | RunValue::List(..)
            | RunValue::ImplicitUrl(..)
            | RunValue::Image(..) => String::new(),
        }
    }

    /// Whether the text follows a block element or a line break, in which
    /// case its leading whitespace goes.
    fn after_block(&self, previous: Option<RunId>) -> bool {
        previous.is_some_and(|p| {
            let state = p.data(self.arena).state();
            state.is_block_element() || state == State::LineBreak
        })
    }

    /// Drop the quote markers of enclosing blockquotes from every line but
    /// the first, and trim.
    fn list_item_content(&self, id: RunId, raw: &str, side: Side, previous: Option<RunId>) -> String {
        let quotes = id
            .ancestors(self.arena)
            .skip(1)
            .filter(|a| a.data(self.arena).state() == State::BlockQuote)
            .count();
        let trim = match (self.after_block(previous), side) {
            (true, Side::Right) => Side::Full,
            (true, _) => Side::Left,
            (false, side) => side,
        };

        let mut lines: Vec<String> = raw.split('\n').map(str::to_string).collect();
        let mut i = usize::from(matches!(side, Side::Left | Side::Full));
        while i < lines.len() {
            let line: Vec<char> = lines[i].chars().collect();
            let mut found = 0;
            let mut j = 0;
            while j < line.len() && found != quotes {
                if line[j] == '>' {
                    found += 1;
                }
                j += 1;
            }

            let trimmed = trim_side(&strings::collect(&line[j..]), trim);
            if trimmed.is_empty() {
                lines.remove(i);
            } else {
                lines[i] = trimmed;
                i += 1;
            }
        }

        plain(&lines.join("\n"))
    }

    fn code_block(&self, block: &NodeCodeBlock, raw: &str) -> String {
        match &block.kind {
            CodeBlockKind::Fenced { indent, .. } => {
                let escaped = escape_entities(raw);
                let lines: Vec<&str> = escaped.split('\n').collect();
                let pad = digits(lines.len());
                let mut out = String::new();
                for (i, line) in lines.iter().enumerate() {
                    out += &line_number(i + 1, pad);
                    out += &fenced_line(line, *indent, block.quote_level);
                    out.push('\n');
                }
                out
            }
            CodeBlockKind::Indented { next_line_prefix } => {
                let lines: Vec<&str> = raw.split('\n').collect();
                let pad = digits(lines.len());
                let content = format!("{next_line_prefix}(.*)");
                let blank = format!(
                    "{}(.*)",
                    next_line_prefix.strip_suffix("    ").unwrap_or(next_line_prefix)
                );

                let mut out = String::new();
                for (i, line) in lines.iter().enumerate() {
                    out += &line_number(i + 1, pad);
                    if i == 0 {
                        out += &escape_entities(line);
                    } else if let Some(groups) = self.regexes.captures(&content, line) {
                        let code = groups.get(1).cloned().flatten().unwrap_or_default();
                        out += &escape_entities(&code);
                    } else if !self.regexes.is_match(&blank, line) {
                        log::warn!("Error parsing indent code block line: {line}");
                        out += &escape_entities(line);
                    }
                    out.push('\n');
                }
                out
            }
        }
    }

    /// `<a href=...>`, with the attributes of an external link if it leads
    /// off the site.
    fn anchor(&self, url: &str) -> String {
        let (href, host) = self.resolve_link(url);
        let mut tag = format!(r#"<a href="{}""#, encode_href(&href));
        if self.is_external(host.as_deref()) {
            tag += r#" target="_blank" rel="noopener""#;
        }
        tag.push('>');
        tag
    }

    fn image(&self, image: &NodeImage) -> String {
        let (src, _) = self.resolve_link(&image.url);
        let mut tag = format!(r#"<img src="{}""#, encode_href(&src));
        let alt = plain(&escape_chars(&image.alt, "[]"));
        if !alt.is_empty() {
            tag += &format!(r#" alt="{alt}""#);
        }
        if let Some(width) = dimension(&image.width) {
            tag += &format!(r#" width="{width}""#);
        }
        if let Some(height) = dimension(&image.height) {
            tag += &format!(r#" height="{height}""#);
        }
        tag.push('>');
        tag
    }

    /// The href to emit for `url`, and the lowercased host if the link is
    /// absolute. A bare `domain.tld/...` is made absolute.
    fn resolve_link(&self, url: &str) -> (String, Option<String>) {
        let url = if url.starts_with('#') {
            url.to_lowercase()
        } else {
            url.to_string()
        };

        let host = ABSOLUTE_URL
            .captures(&url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase());
        if host.is_some() {
            return (url, host);
        }

        if !self.options.render.absolute_domains {
            return (url, None);
        }

        let domain = url.split('/').next().unwrap_or_default();
        let domain = domain.rfind(':').map_or(domain, |port| &domain[..port]);
        if !BARE_DOMAIN.is_match(domain) {
            return (url, None);
        }
        match domain.rfind('.') {
            Some(dot) if TOP_LEVEL_DOMAINS.contains(&domain[dot + 1..]) => {
                let host = domain.to_lowercase();
                (format!("https://{url}"), Some(host))
            }
            _ => (url, None),
        }
    }

    fn is_external(&self, host: Option<&str>) -> bool {
        let Some(host) = host else {
            return false;
        };
        let Some(site) = &self.options.render.site_host else {
            return true;
        };

        let site = site.to_lowercase();
        host != site && registrable_domain(host) != registrable_domain(&site)
    }

    /// The text a header's anchor is derived from: content without syntax,
    /// except for the `[` of links, plus image alt text.
    fn plain_text(&self, id: RunId) -> String {
        let run = id.data(self.arena);
        let text_end = match &run.value {
            RunValue::Url(..) | RunValue::ReferenceUrl { .. } => {
                run.end.saturating_sub(run.end_context_length(self.text))
            }
            _ => run.end,
        };

        let children: Vec<RunId> = id.children(self.arena).collect();
        let (Some(&first), Some(&last)) = (children.first(), children.last()) else {
            return match &run.value {
                RunValue::Image(image) => image.alt.clone(),
                RunValue::ImplicitUrl(link) => link.url.clone(),
                _ => self.slice(run.start, text_end),
            };
        };

        let mut out = String::new();
        let first_start = first.data(self.arena).start;
        if run.start < first_start {
            out += &self.slice(run.start, first_start);
        }
        for (i, &child) in children.iter().enumerate() {
            out += &self.plain_text(child);
            if let Some(&next) = children.get(i + 1) {
                out += &self.slice(child.data(self.arena).end, next.data(self.arena).start);
            }
        }
        let last_end = last.data(self.arena).end;
        if last_end < run.end {
            out += &self.slice(last_end, text_end);
        }
        out
    }
}

/// Ordinary text: backslash escapes removed, entities escaped.
fn plain(text: &str) -> String {
    escape_entities(&escape_chars(text, ESCAPABLE))
}

/// Header text without the optional closing `#`s.
fn header_content(raw: &str, side: Side) -> String {
    let trimmed: Vec<char> = trim_side(raw, side).chars().collect();
    let mut keep = trimmed.len();
    while keep > 0 && trimmed[keep - 1] == '#' && !strings::is_escaped(&trimmed, keep - 1) {
        keep -= 1;
    }

    let kept = trim_side(&strings::collect(&trimmed[..keep]), side);
    plain(&escape_chars(&kept, "#"))
}

/// Remove the `>` markers (and with `trim_spaces`, the spaces after them)
/// that start each line of a quote's text. Newlines go too.
fn strip_quote_markers(raw: &str, side: Side, after_block: bool) -> String {
    let mut chars: Vec<char> = raw.chars().collect();
    if chars.first() != Some(&'\n') {
        chars.insert(0, '\n');
    }
    let trim_spaces = matches!(side, Side::Full | Side::Left) || after_block;

    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\n' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let mut last_quote = i;
        while i + 1 < chars.len() && matches!(chars[i + 1], '>' | ' ') {
            i += 1;
            if chars[i] == '>' {
                last_quote = i;
            }
        }
        if !trim_spaces {
            i = last_quote;
        }
        i += 1;
    }
    out
}

/// A single space next to a backtick is padding, not content.
fn trim_code_span(raw: &str) -> String {
    let mut chars: Vec<char> = raw.chars().collect();
    if chars.len() > 1 {
        if chars[0] == ' ' && chars[1] == '`' {
            chars.remove(0);
        }
        let n = chars.len();
        if n > 1 && chars[n - 1] == ' ' && chars[n - 2] == '`' {
            chars.pop();
        }
    }
    strings::collect(&chars)
}

/// An escaped line of a fenced block, without the list indentation or
/// quote markers that precede its code.
fn fenced_line(line: &str, indent: usize, quote_level: usize) -> String {
    if indent != 0 {
        // Each `>` is four characters once escaped.
        return line.chars().skip(indent + quote_level * 3).collect();
    }
    if quote_level == 0 {
        return line.to_string();
    }

    let chars: Vec<char> = line.chars().collect();
    let mut left = quote_level;
    let mut trim = 0;
    while trim < chars.len() {
        if chars[trim] == '&' && chars[trim + 1..].starts_with(&['g', 't', ';']) {
            left -= 1;
            if left == 0 {
                trim += 4;
                break;
            }
        }
        trim += 1;
    }

    if left == 0 {
        strings::collect(&chars[trim.min(chars.len())..])
    } else {
        log::error!("We're in a block quote, but didn't find the right number of markers");
        line.to_string()
    }
}

fn line_number(n: usize, pad: usize) -> String {
    format!(r#"<span class="codeLineNumber">{n:<pad$}</span>"#)
}

fn digits(n: usize) -> usize {
    n.to_string().len()
}

fn table_body(table: &NodeTable) -> String {
    let cell = |text: &str, align: Alignment| match align.attribute() {
        Some(align) => format!(r#"<td align="{align}">{text}</td>"#),
        None => format!("<td>{text}</td>"),
    };
    let align = |col: usize| table.alignment.get(col).copied().unwrap_or_default();

    let mut out = String::from("<thead><tr>");
    for (col, text) in table.header.iter().enumerate() {
        out += &cell(text, align(col));
    }
    out += "</tr></thead><tbody>";
    for row in &table.rows {
        out += "<tr>";
        for (col, text) in row.iter().enumerate() {
            out += &cell(text, align(col));
        }
        out += "</tr>";
    }
    out += "</tbody>";
    out
}

/// `150`, `150px` or `50%`, normalized. Anything else is dropped.
fn dimension(value: &str) -> Option<String> {
    let (number, unit) = match value.strip_suffix('%') {
        Some(number) => (number, "%"),
        None => (value.strip_suffix("px").unwrap_or(value), "px"),
    };
    let number: u64 = number.parse().ok()?;
    Some(format!("{number}{unit}"))
}

fn encode_href(href: &str) -> String {
    href.replace(' ', "%20").replace('"', "%22")
}

/// The last two labels of a host name.
fn registrable_domain(host: &str) -> &str {
    let Some(last) = host.rfind('.') else {
        return host;
    };
    match host[..last].rfind('.') {
        Some(dot) => &host[dot + 1..],
        None => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_markers() {
        assert_eq!(strip_quote_markers(" A", Side::Full, false), "A");
        assert_eq!(strip_quote_markers("A\n> B", Side::Middle, false), "A B");
        assert_eq!(strip_quote_markers("A\n> B", Side::Middle, true), "AB");
    }

    #[test]
    fn code_spans_lose_padding_next_to_backticks() {
        assert_eq!(trim_code_span(" `a` "), "`a`");
        assert_eq!(trim_code_span("  `a`  "), "  `a`  ");
        assert_eq!(trim_code_span(" a "), " a ");
    }

    #[test]
    fn closing_hashes() {
        assert_eq!(header_content("Header 2 ###  ", Side::Full), "Header 2");
        assert_eq!(header_content(r"C\#", Side::Full), "C#");
    }

    #[test]
    fn fenced_lines_in_quotes() {
        assert_eq!(fenced_line("&gt;A", 0, 1), "A");
        assert_eq!(fenced_line("&gt; A", 0, 1), " A");
        assert_eq!(fenced_line("&gt;&gt;A", 0, 2), "A");
        assert_eq!(fenced_line("    A", 2, 0), "  A");
    }

    #[test]
    fn dimensions() {
        assert_eq!(dimension("150").as_deref(), Some("150px"));
        assert_eq!(dimension("050%").as_deref(), Some("50%"));
        assert_eq!(dimension(""), None);
    }

    #[test]
    fn line_numbers_are_padded() {
        assert_eq!(line_number(3, 2), r#"<span class="codeLineNumber">3 </span>"#);
        assert_eq!(digits(10), 2);
    }

    #[test]
    fn registrable_domains() {
        assert_eq!(registrable_domain("www.example.com"), "example.com");
        assert_eq!(registrable_domain("example.com"), "example.com");
        assert_eq!(registrable_domain("localhost"), "localhost");
    }
}
