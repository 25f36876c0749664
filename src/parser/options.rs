//! Configuration for the parser and renderer.

#[cfg(feature = "bon")]
use bon::Builder;

#[derive(Default, Debug, Clone)]
/// Umbrella options struct.
pub struct Options {
    /// Configure parse-time options.
    pub parse: Parse,

    /// Configure render-time options.
    pub render: Render,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "bon", derive(Builder))]
/// Options for parser functions.
pub struct Parse {
    /// Only recognize inline constructs. Headers, rules, lists, quotes,
    /// code blocks and tables are left as text, and no paragraphs or
    /// implicit line breaks are inserted.
    ///
    /// ```rust
    /// # use runmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// assert_eq!(markdown_to_html("**a**\n\nb", &options),
    ///            "<div class=\"mdDiv\"><strong>a</strong></div><div class=\"mdDiv\">b</div>");
    /// options.parse.inline_only = true;
    /// assert_eq!(markdown_to_html("**a**\n\nb", &options),
    ///            "<strong>a</strong>b");
    /// ```
    #[cfg_attr(feature = "bon", builder(default))]
    pub inline_only: bool,

    /// Reuse the tree and rendered HTML of the previous parse for the
    /// unchanged start of the text. Output is identical either way.
    #[cfg_attr(feature = "bon", builder(default = true))]
    pub cache: bool,
}

impl Default for Parse {
    fn default() -> Self {
        Parse {
            inline_only: false,
            cache: true,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "bon", derive(Builder))]
/// Options for formatter functions.
pub struct Render {
    /// The host the output will be served from. Absolute links to any other
    /// host open in a new tab.
    ///
    /// ```rust
    /// # use runmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.render.site_host = Some("example.com".to_string());
    /// assert_eq!(markdown_to_html("[a](https://www.example.com/x)", &options),
    ///            "<div class=\"mdDiv\"><a href=\"https://www.example.com/x\">a</a></div>");
    /// ```
    #[cfg_attr(feature = "bon", builder(into))]
    pub site_host: Option<String>,

    /// Treat link targets that look like a bare domain (`example.com/page`)
    /// as absolute `https://` links.
    #[cfg_attr(feature = "bon", builder(default = true))]
    pub absolute_domains: bool,
}

impl Default for Render {
    fn default() -> Self {
        Render {
            site_host: None,
            absolute_domains: true,
        }
    }
}
