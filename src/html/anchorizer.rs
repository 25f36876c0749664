/// Converts header text to the `id` its header is rendered with.
///
/// Anything but ASCII letters, digits and spaces is dropped, runs of spaces
/// become a single dash, and the result is lowercased. An anchor can't
/// start with a digit, so one that would gets a leading underscore.
///
/// Anchors are not made unique: two headers with the same text share an id.
///
/// ```
/// # use runmark::html::anchorize;
/// assert_eq!("ticks-arent-in", anchorize("Ticks aren't in"));
/// assert_eq!("_2-items", anchorize(" 2  Items "));
/// ```
pub fn anchorize(header: &str) -> String {
    let kept: String = header
        .chars()
        .filter(|&c| c == ' ' || c.is_ascii_alphanumeric())
        .collect();

    let mut id = kept
        .trim()
        .split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    if id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    id
}

#[cfg(test)]
mod tests {
    use super::anchorize;

    #[test]
    fn syntax_is_dropped() {
        assert_eq!(anchorize("# _Header_ ~~With~~ ++Formatting++"), "header-with-formatting");
        assert_eq!(anchorize("[Header With Link"), "header-with-link");
    }

    #[test]
    fn empty_and_symbol_only() {
        assert_eq!(anchorize(""), "");
        assert_eq!(anchorize("!!! ???"), "");
    }
}
