use anyhow::{bail, Context};
use clap::Parser;
use fresh_indent::config::IndentConfig;
use fresh_indent::config_io::DirectoryContext;
use fresh_indent::indent::{IndentCalculator, IndentResult};
use fresh_indent::model::document::{Document, LineSource};
use fresh_indent::primitives::grammar_registry::GrammarRegistry;
use fresh_indent::primitives::line_text;
use fresh_indent::primitives::syntax_forest::SyntaxForest;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compute tree-sitter indentation for a source file
#[derive(Parser, Debug)]
#[command(name = "fresh-indent")]
#[command(about = "Print the indent tree-sitter captures assign to each line", long_about = None)]
struct Args {
    /// File to indent
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Grammar to use instead of detecting it from the file extension
    #[arg(long, value_name = "LANGUAGE")]
    language: Option<String>,

    /// Only compute the indent of this 1-indexed line
    #[arg(long, value_name = "LINE")]
    line: Option<usize>,

    /// Config file to use instead of searching for indent.json
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Exit with an error when a line's indentation differs from the computed one
    #[arg(long)]
    check: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Log to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let dirs = DirectoryContext::from_system();
    let config = match &args.config {
        Some(path) => IndentConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let working_dir =
                std::env::current_dir().context("Failed to read working directory")?;
            match &dirs {
                Some(dirs) => IndentConfig::load_for_working_dir(&working_dir, dirs),
                None => IndentConfig::default(),
            }
        }
    };

    let registry = GrammarRegistry::load(dirs.as_ref());
    let language = match &args.language {
        Some(language) => language.clone(),
        None => registry
            .detect(&args.file)
            .map(str::to_string)
            .with_context(|| {
                format!(
                    "Cannot detect language of {}, pass --language (one of: {})",
                    args.file.display(),
                    registry.names().join(", ")
                )
            })?,
    };

    let document = Document::open(&args.file)?;
    let forest = SyntaxForest::parse(&registry, &language, document.text())
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    let tab_size = config.tab_size;
    let mut calculator = IndentCalculator::new(registry, config);

    let lines = match args.line {
        Some(line) if line == 0 || line > document.line_count() => {
            bail!(
                "Line {} is out of range (1..={})",
                line,
                document.line_count()
            );
        }
        Some(line) => line..=line,
        None => 1..=document.line_count(),
    };

    let mut mismatches = 0usize;
    for (line, result) in calculator.reindent_lines(&document, &forest, lines) {
        println!("{}: {}", line, result);

        if !args.check {
            continue;
        }
        let text = document.line(line).unwrap_or_default();
        if let IndentResult::Column(expected) = result {
            let actual = document.line_indent(line, tab_size);
            if !line_text::is_blank(text) && actual != expected {
                eprintln!(
                    "{}:{}: indented {} columns, expected {}",
                    args.file.display(),
                    line,
                    actual,
                    expected
                );
                mismatches += 1;
            }
        }
    }

    let stats = calculator.cache_stats();
    tracing::debug!(
        "Capture cache: {} hits, {} misses",
        stats.hits,
        stats.misses
    );

    if mismatches > 0 {
        eprintln!("{} line(s) need reindenting", mismatches);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
