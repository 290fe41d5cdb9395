use anyhow::{anyhow, Result};
use epubcheck_css::walker::Walker;
use epubcheck_css::{
    CssDiagnostic, CssParser, CssSource, DiagnosticCollector, EventRecorder, ParserConfig,
};
use epubcheck_shared::byte_stream::Location;
use simple_logger::SimpleLogger;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;
use walkdir::WalkDir;

/// Output options shared by every checked source
struct Options {
    tokens: bool,
    json: bool,
    quiet: bool,
    ignore_errors: bool,
}

fn main() -> Result<()> {
    let matches = clap::Command::new("EPUB CSS checker")
        .version("0.1.0")
        .arg(
            clap::Arg::new("paths")
                .help("Stylesheets, or directories to search for *.css files")
                .num_args(0..)
                .index(1),
        )
        .arg(
            clap::Arg::new("style-attribute")
                .help("Check the given text as the value of a style attribute")
                .long("style-attribute")
                .short('s')
                .value_name("TEXT"),
        )
        .arg(
            clap::Arg::new("debug")
                .help("Enable debug logging")
                .short('d')
                .long("debug")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("tokens")
                .help("Just print the tokens")
                .long("tokens")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("json")
                .help("Print tokens and diagnostics as JSON")
                .long("json")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("ignore-errors")
                .help("Keep parsing when the error handler asks to stop")
                .long("ignore-errors")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("quiet")
                .help("Don't display the parsed rules")
                .long("quiet")
                .short('q')
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("debug") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    SimpleLogger::new().with_level(level).init()?;

    let options = Options {
        tokens: matches.get_flag("tokens"),
        json: matches.get_flag("json"),
        quiet: matches.get_flag("quiet"),
        ignore_errors: matches.get_flag("ignore-errors"),
    };

    let mut sources = Vec::new();
    if let Some(text) = matches.get_one::<String>("style-attribute") {
        sources.push((true, CssSource::from_str("style-attribute", text)));
    }
    if let Some(paths) = matches.get_many::<String>("paths") {
        for path in collect_stylesheets(paths.map(PathBuf::from))? {
            let bytes = fs::read(&path)?;
            sources.push((false, CssSource::new(&path.to_string_lossy(), bytes)));
        }
    }

    if sources.is_empty() {
        return Err(anyhow!("Nothing to check. Give a path or --style-attribute"));
    }

    let mut diagnostic_count = 0;
    for (is_style_attribute, source) in &sources {
        diagnostic_count += check(source, *is_style_attribute, &options)?;
    }

    if diagnostic_count > 0 {
        exit(1);
    }

    Ok(())
}

/// Expands directories into the `*.css` files below them
fn collect_stylesheets(paths: impl Iterator<Item = PathBuf>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path);
            continue;
        }

        for entry in WalkDir::new(&path).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && has_css_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}

fn has_css_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
}

/// Checks a single source and returns the number of diagnostics found
fn check(source: &CssSource, is_style_attribute: bool, options: &Options) -> Result<usize> {
    let config = if is_style_attribute {
        ParserConfig::style_attribute(source.source_id(), Location::default())
    } else {
        ParserConfig::stylesheet(source.source_id())
    };
    let parser = CssParser::new(ParserConfig {
        ignore_errors: options.ignore_errors,
        ..config
    });

    let css = source.decode()?;
    let mut errors = DiagnosticCollector::new();

    if options.tokens {
        let tokens = parser.scan(&css, &mut errors)?;
        if options.json {
            println!("{}", serde_json::to_string_pretty(tokens.tokens())?);
        } else {
            for token in &tokens {
                println!(
                    "{:<12} {:<16} {:?}",
                    format!("{}:{}", token.location.line, token.location.column),
                    token.token_type.to_string(),
                    token.text
                );
            }
        }
        return Ok(errors.len());
    }

    let mut events = EventRecorder::new();
    parser.parse(&css, &mut events, &mut errors)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&errors.diagnostics)?);
        return Ok(errors.len());
    }

    if !options.quiet {
        Walker::new(&events.events).walk_stdout();
    }
    for diagnostic in &errors.diagnostics {
        println!("{diagnostic}");
        if !options.quiet {
            display_snippet(&css, diagnostic);
        }
    }

    Ok(errors.len())
}

fn display_snippet(css: &str, diagnostic: &CssDiagnostic) {
    let lines: Vec<&str> = css.lines().collect();
    let line_nr = diagnostic.location.line.saturating_sub(1);
    let col_nr = diagnostic.location.column.saturating_sub(1);

    let Some(line) = lines.get(line_nr) else {
        return;
    };
    if col_nr > 1000 {
        println!("Error is too far to the right to display.");
        return;
    }

    // Print the previous 2 lines
    for n in line_nr.saturating_sub(2)..line_nr {
        println!("{:<5}|{}", n + 1, lines[n]);
    }

    // Print the line with the error and a pointer to the error
    println!("{:<5}|{}", line_nr + 1, line);
    println!("     |{}^", "-".repeat(col_nr));
    println!();
}
