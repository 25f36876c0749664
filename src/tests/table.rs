use super::*;

const PLAIN_TABLE: &str = concat!(
    "<table><thead><tr><td>A</td><td>B</td><td>C</td></tr></thead>",
    "<tbody><tr><td>D</td><td>E</td><td>F</td></tr></tbody></table>"
);

#[test]
fn without_outer_pipes() {
    html("A|B|C\n---|---|---\nD|E|F", PLAIN_TABLE);
}

#[test]
fn with_outer_pipes() {
    html("|A|B|C|\n|---|---|---|\n|D|E|F|", PLAIN_TABLE);
}

#[test]
fn cells_are_trimmed() {
    html("| A | B | C |\n| --- | --- | --- |\n| D | E | F |", PLAIN_TABLE);
}

#[test]
fn alignment() {
    html(
        "|A|B|C|\n|:---|:---:|---:|\n|D|E|F|",
        concat!(
            "<table><thead><tr>",
            "<td align=\"left\">A</td><td align=\"center\">B</td><td align=\"right\">C</td>",
            "</tr></thead><tbody><tr>",
            "<td align=\"left\">D</td><td align=\"center\">E</td><td align=\"right\">F</td>",
            "</tr></tbody></table>"
        ),
    );
}

#[test]
fn cells_are_inline_only() {
    html(
        "|~~A~~|> B|* C|\n|---|---|---|\n|**D**|`E`|[F](markdown.php)|",
        concat!(
            "<table><thead><tr><td><s>A</s></td><td>&gt; B</td><td>* C</td></tr></thead>",
            "<tbody><tr><td><strong>D</strong></td><td><code>E</code></td>",
            "<td><a href=\"markdown.php\">F</a></td></tr></tbody></table>"
        ),
    );
}

#[test]
fn missing_cells_are_padded() {
    html(
        "A|B\n---|---\nC|",
        concat!(
            "<table><thead><tr><td>A</td><td>B</td></tr></thead>",
            "<tbody><tr><td>C</td><td></td></tr></tbody></table>"
        ),
    );
}

#[test]
fn bad_delimiter_row_is_text() {
    html("A|B\nnot a rule", &div("A|B<br />not a rule"));
    html("A|B\n--|--", &div("A|B<br />--|--"));
}
