use super::*;

#[test]
fn bare_superscript() {
    html("a^2 b", &div("a<sup>2</sup> b"));
    html("e^x", &div("e<sup>x</sup>"));
}

#[test]
fn parenthesized() {
    html("x^(a b)", &div("x<sup>a b</sup>"));
    html("H~(2)O", &div("H<sub>2</sub>O"));
    html("x^(f(y))", &div("x<sup>f(y)</sup>"));
}

#[test]
fn declined() {
    html("a^ b", &div("a^ b"));
    html("a~ b", &div("a~ b"));
    html("a\\^b", &div("a^b"));
}

#[test]
fn formatting_inside() {
    html("x^(**a**)", &div("x<sup><strong>a</strong></sup>"));
}
