//! The `runmark` binary.

use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use runmark::{Markdown, Options};

const EXIT_PARSE_ERROR: i32 = 1;

#[derive(Debug, Parser)]
#[command(about, author, version)]
struct Cli {
    /// Markdown files to read. Multiple files are concatenated. With none
    /// given, read from standard input.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Only recognize inline constructs
    #[arg(long)]
    inline: bool,

    /// Rescan the whole text on every parse
    #[arg(long)]
    no_cache: bool,

    /// Host the output is served from; absolute links elsewhere open in a new tab
    #[arg(long, value_name = "HOST")]
    site_host: Option<String>,

    /// Leave bare `domain.tld` link targets relative
    #[arg(long)]
    no_absolute_domains: bool,

    /// Parse the text this many times on the same parser
    #[arg(long, value_name = "N", default_value_t = 1)]
    repeat: usize,

    /// Log more; repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let mut options = Options::default();
    options.parse.inline_only = cli.inline;
    options.parse.cache = !cli.no_cache;
    options.render.site_host = cli.site_host;
    options.render.absolute_domains = !cli.no_absolute_domains;

    let mut text = String::new();
    if cli.files.is_empty() {
        io::stdin().read_to_string(&mut text)?;
    } else {
        for path in &cli.files {
            text.push_str(&fs::read_to_string(path)?);
        }
    }

    let md = Markdown::new(options);
    let mut html = String::new();
    for round in 0..cli.repeat.max(1) {
        html = match md.parse(&text) {
            Ok(html) => html,
            Err(err) => {
                eprintln!("runmark: {err}");
                std::process::exit(EXIT_PARSE_ERROR);
            }
        };
        if round > 0 {
            log::info!("Round {}: same text: {}", round + 1, md.same_text());
        }
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{html}")?;
    stdout.flush()?;
    Ok(())
}
