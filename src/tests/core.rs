use super::*;

#[test]
fn headers() {
    html("# Header 1", "<h1 id=\"header-1\">Header 1</h1>");
    html("## Header 2", "<h2 id=\"header-2\">Header 2</h2>");
    html("### Header 3", "<h3 id=\"header-3\">Header 3</h3>");
    html("#### Header 4", "<h4 id=\"header-4\">Header 4</h4>");
    html("##### Header 5", "<h5 id=\"header-5\">Header 5</h5>");
    html("###### Header 6", "<h6 id=\"header-6\">Header 6</h6>");
}

#[test]
fn header_spacing() {
    html("####### Header 7", &div("####### Header 7"));
    html("##Header 2", &div("##Header 2"));
    html("  ## Header 2", "<h2 id=\"header-2\">Header 2</h2>");
    html("##   Header 2", "<h2 id=\"header-2\">Header 2</h2>");
    html("  ##   Header 2", "<h2 id=\"header-2\">Header 2</h2>");
    html(" ## Header 2 ###  ", "<h2 id=\"header-2\">Header 2</h2>");
}

#[test]
fn header_with_formatting() {
    html(
        "# _Header_ ~~With~~ ++Formatting++",
        concat!(
            "<h1 id=\"header-with-formatting\">",
            "<em>Header</em> <s>With</s> <ins>Formatting</ins>",
            "</h1>"
        ),
    );
}

#[test]
fn headers_in_containers() {
    html(
        "1. # Header in list",
        "<ol><li><h1 id=\"header-in-list\">Header in list</h1></li></ol>",
    );
    html(
        "* # Header in list",
        "<ul><li><h1 id=\"header-in-list\">Header in list</h1></li></ul>",
    );
    html(
        "> # Header in quote",
        "<blockquote><h1 id=\"header-in-quote\">Header in quote</h1></blockquote>",
    );
    html(
        "* > # Header in list quote",
        concat!(
            "<ul><li><blockquote>",
            "<h1 id=\"header-in-list-quote\">Header in list quote</h1>",
            "</blockquote></li></ul>"
        ),
    );
}

#[test]
fn bold() {
    html("**This is bold text**", &div("<strong>This is bold text</strong>"));
    html("** This is not bold text**", &div("** This is not bold text**"));
    html(
        "Mismatched **Bold **Tags**",
        &div("Mismatched **Bold <strong>Tags</strong>"),
    );
    html(
        "****Nested Bold****",
        &div("<strong><strong>Nested Bold</strong></strong>"),
    );
    html(
        "****Different** **Nest** Patterns**",
        &div("<strong><strong>Different</strong> <strong>Nest</strong> Patterns</strong>"),
    );
    html("__This is bold text__", &div("<strong>This is bold text</strong>"));
    html("__ This is not bold text__", &div("__ This is not bold text__"));
    html(
        "__**Bold^2**__",
        &div("__**Bold<sup>2**__</sup>"),
    );
    html("__**Bold?__**", &div("<strong>**Bold?</strong>**"));
}

#[test]
fn bold_across_lines() {
    html(
        "**Multiline\nSupport**",
        &div("<strong>Multiline<br>Support</strong>"),
    );
    html(
        "**More\nThan\nTwo**",
        &div("<strong>More<br>Than<br>Two</strong>"),
    );
    html(
        "**Double\n\nNewline**",
        &(div("**Double") + &div("Newline**")),
    );
}

#[test]
fn italic() {
    html("*This is italic text*", &div("<em>This is italic text</em>"));
    html("* This is not italic text*", "<ul><li>This is not italic text*</li></ul>");
    html(
        "Mismatched *italic *Tags*",
        &div("Mismatched *italic <em>Tags</em>"),
    );
    html("_This is italic text_", &div("<em>This is italic text</em>"));
    html("_ This is not italic text_", &div("_ This is not italic text_"));
    html(
        "__Different_ _Nest_ Patterns_",
        &div("<em><em>Different</em> <em>Nest</em> Patterns</em>"),
    );
    // A bare superscript runs to the end of the word, closers included.
    html("_*italic^2*_", &div("_*italic<sup>2*_</sup>"));
    html("_*italic?_*", &div("<em>*italic?</em>*"));
    html("_Multiline\nSupport_", &div("<em>Multiline<br>Support</em>"));
    html("_Double\n\nNewline_", &(div("_Double") + &div("Newline_")));
}

#[test]
fn strikethrough() {
    html(
        "~~This text has a line going through it~~",
        &div("<s>This text has a line going through it</s>"),
    );
    html(
        "~~ This is not strikethrough~~",
        &div("~~ This is not strikethrough~~"),
    );
    html(
        "~~~~Nested Strikethrough~~~~",
        &div("<s><s>Nested Strikethrough</s></s>"),
    );
    html("~~Multiline\nSupport~~", &div("<s>Multiline<br>Support</s>"));
    html("~Single Marker~", &div("~Single Marker~"));
    html("~~~Odd Markers~~~", &div("~<s>Odd Markers</s>~"));
}

#[test]
fn underline() {
    html(
        "++This text is underlined++",
        &div("<ins>This text is underlined</ins>"),
    );
    html("++ This is not underlined++", &div("++ This is not underlined++"));
    html(
        "Mismatched ++Underline ++Tags++",
        &div("Mismatched ++Underline <ins>Tags</ins>"),
    );
    html(
        "++++Different++ ++Nest++ Patterns++",
        &div("<ins><ins>Different</ins> <ins>Nest</ins> Patterns</ins>"),
    );
    html("++More\nThan\nTwo++", &div("<ins>More<br>Than<br>Two</ins>"));
    html("+Single Marker+", &div("+Single Marker+"));
    html("+++Odd Markers+++", &div("+<ins>Odd Markers</ins>+"));
}

#[test]
fn mixed_formatting() {
    html("**_Hello_**", &div("<strong><em>Hello</em></strong>"));
    html("**_Hello**_", &div("<strong>_Hello</strong>_"));
    html(
        "# ___Header_ [`1`](link)__",
        concat!(
            "<h1 id=\"header-1\"><strong><em>Header</em> ",
            "<a href=\"link\"><code>1</code></a></strong></h1>"
        ),
    );
    html(
        "# ___Header__ [`1`](link)_",
        concat!(
            "<h1 id=\"header-1\"><em><strong>Header</strong> ",
            "<a href=\"link\"><code>1</code></a></em></h1>"
        ),
    );
}

#[test]
fn horizontal_rules() {
    for rule in ["---", "***", "___", "----------", "* * *", "  _    _    _    _"] {
        html(rule, "<hr />");
    }
}

#[test]
fn line_breaks() {
    html("A\nB", &div("A<br />B"));
    html("A\n\nB", &(div("A") + &div("B")));
    html("A\nB\nC", &div("A<br />B<br />C"));
}

#[test]
fn explicit_line_breaks() {
    html("A<br>B", &div("A<br />B"));
    html("A<br/>B", &div("A<br />B"));
    html("A<br />B", &div("A<br />B"));
}

#[test]
fn html_comments_pass_through() {
    html("A <!-- hi --> B", &div("A <!-- hi --> B"));
}

#[test]
fn leading_newlines_and_tabs() {
    html("\n\n**a**", &div("<strong>a</strong>"));
    html("a\r\nb", &div("a<br />b"));
}

#[test]
fn regressions() {
    html(
        "* **Hello** World",
        "<ul><li><strong>Hello</strong> World</li></ul>",
    );
    html("**->** A", &div("<strong>-&gt;</strong> A"));
    html("* \\*A\\*", "<ul><li>*A*</li></ul>");
    html(
        "> ## Header in blockquote",
        concat!(
            "<blockquote><h2 id=\"header-in-blockquote\">",
            "Header in blockquote</h2></blockquote>"
        ),
    );
}

#[test]
fn space_only_lines_inside_inline_runs() {
    html("*a\n \nb*", &div("<em>a<br> <br>b</em>"));
    html("**a\n \nb**", &div("<strong>a<br> <br>b</strong>"));
    html("~~a\n \nb~~", &div("<s>a<br> <br>b</s>"));
    html("`a\n \nb`", &div("<code>a\n \nb</code>"));
    html("[a\n \nb](c)", &div("<a href=\"c\">a\n \nb</a>"));
}
