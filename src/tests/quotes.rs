use super::*;

#[test]
fn lists_in_quotes() {
    html(
        "> 1. ListItem1\n> 2. ListItem2",
        "<blockquote><ol><li>ListItem1</li><li>ListItem2</li></ol></blockquote>",
    );
    html(
        "> 1. ListItem1\n> 1. ListItem2",
        "<blockquote><ol><li>ListItem1</li><li>ListItem2</li></ol></blockquote>",
    );
    html(
        "> * A\n>   1. B\n>   2. C\n> * D",
        concat!(
            "<blockquote><ul><li>A<br /><ol><li>B</li><li>C</li></ol></li>",
            "<li>D</li></ul></blockquote>"
        ),
    );
}

#[test]
fn deeper_quotes() {
    html(
        "> * A\n>> * B",
        concat!(
            "<blockquote><ul><li>A</li></ul>",
            "<blockquote><ul><li>B</li></ul></blockquote></blockquote>"
        ),
    );
    html(
        "> * A\n>  > B",
        "<blockquote><ul><li>A<br /><blockquote>B</blockquote></li></ul></blockquote>",
    );
    html(
        "> * A\n>  > * B",
        concat!(
            "<blockquote><ul><li>A<br /><blockquote><ul><li>B</li></ul>",
            "</blockquote></li></ul></blockquote>"
        ),
    );
}

#[test]
fn continued_items() {
    html(
        "> * A\n>\n>   B",
        "<blockquote><ul><li>A<br /><br />B</li></ul></blockquote>",
    );
    html(
        "> * A\n> B\n>> C",
        concat!(
            "<blockquote><ul><li>A<br />B</li></ul>",
            "<blockquote>C</blockquote></blockquote>"
        ),
    );
}

#[test]
fn quotes_in_lists_in_quotes() {
    html(
        "> 1. > * A",
        concat!(
            "<blockquote><ol><li><blockquote><ul><li>A</li></ul>",
            "</blockquote></li></ol></blockquote>"
        ),
    );
    html(
        "> * > A\n> B",
        "<blockquote><ul><li><blockquote>A</blockquote>B</li></ul></blockquote>",
    );
    html(
        "> * > A\n>   >> B",
        concat!(
            "<blockquote><ul><li><blockquote>A<br /><blockquote>B</blockquote>",
            "</blockquote></li></ul></blockquote>"
        ),
    );
    html(
        "> * > A\n>> C\n> D",
        concat!(
            "<blockquote><ul><li><blockquote>A</blockquote></li></ul>",
            "<blockquote>C</blockquote>D</blockquote>"
        ),
    );
}
