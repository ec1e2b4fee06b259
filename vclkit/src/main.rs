//! vclkit - VCL formatter and checker
//!
//! This is the main entry point for the vclkit CLI.

use anyhow::Context;
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vclkit_core::{ConfigLoader, StyleConfig};
use vclkit_syntax::{parse, ParseError};

/// vclkit - parse, check and format Fastly VCL
#[derive(Parser)]
#[command(name = "vclkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format VCL files and print the result
    Fmt {
        /// Files to format
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,

        /// Rewrite the files in place
        #[arg(short, long)]
        write: bool,
    },

    /// Fail if any file is not formatted or does not parse
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Print the syntax tree of a file as JSON
    Parse {
        /// File to parse
        file: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct StyleArgs {
    /// Style configuration file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override a style option, e.g. `--style ElseIf=true`
    #[arg(long = "style", value_name = "KEY=VALUE")]
    styles: Vec<String>,
}

impl StyleArgs {
    fn load(&self) -> anyhow::Result<StyleConfig> {
        let mut conf = match &self.config {
            Some(path) => ConfigLoader::load(path)
                .with_context(|| format!("Failed to load style configuration {}", path.display()))?,
            None => StyleConfig::default(),
        };
        for style in &self.styles {
            conf.apply_override(style)?;
        }
        Ok(conf)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for formatted output
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let ok = match cli.command {
        Commands::Fmt { files, style, write } => {
            let conf = style.load()?;
            tracing::debug!(?conf, files = files.len(), "formatting");
            format_files(&files, &conf, write)?
        }

        Commands::Check { files, style } => {
            let conf = style.load()?;
            check_files(&files, &conf)?
        }

        Commands::Parse { file } => dump_tree(&file)?,

        Commands::Version => {
            println!("vclkit v{}", vclkit_core::VERSION);
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn format_files(files: &[PathBuf], conf: &StyleConfig, write: bool) -> anyhow::Result<bool> {
    let mut ok = true;

    for path in files {
        let source = read_source(path)?;
        match vclkit_fmt::format_source(&source, conf) {
            Ok(formatted) if write => {
                if formatted != source {
                    std::fs::write(path, &formatted)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "rewrote file");
                }
            }
            Ok(formatted) => print!("{}", formatted),
            Err(e) => {
                report(path, &source, &e)?;
                ok = false;
            }
        }
    }

    Ok(ok)
}

fn check_files(files: &[PathBuf], conf: &StyleConfig) -> anyhow::Result<bool> {
    let mut ok = true;

    for path in files {
        let source = read_source(path)?;
        match vclkit_fmt::format_source(&source, conf) {
            Ok(formatted) if formatted == source => {
                tracing::debug!(path = %path.display(), "already formatted");
            }
            Ok(_) => {
                eprintln!("Would reformat: {}", path.display());
                ok = false;
            }
            Err(e) => {
                report(path, &source, &e)?;
                ok = false;
            }
        }
    }

    Ok(ok)
}

fn dump_tree(path: &Path) -> anyhow::Result<bool> {
    let source = read_source(path)?;
    match parse(&source) {
        Ok(program) => {
            println!("{}", serde_json::to_string_pretty(&program)?);
            Ok(true)
        }
        Err(e) => {
            report(path, &source, &e)?;
            Ok(false)
        }
    }
}

/// Render a parse error against its source on stderr
fn report(path: &Path, source: &str, error: &ParseError) -> anyhow::Result<()> {
    let name = path.display().to_string();
    // errors without a location point at the end of the input
    let span = error.span().unwrap_or(source.len()..source.len());
    let label = match error {
        ParseError::UnexpectedToken { expected, .. } | ParseError::UnexpectedEof { expected } => {
            format!("expected {}", expected)
        }
        ParseError::InvalidSyntax { message, .. } => message.clone(),
        ParseError::Lex(e) => e.to_string(),
    };

    Report::build(ReportKind::Error, (name.as_str(), span.clone()))
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_message(error.to_string())
        .with_label(
            Label::new((name.as_str(), span))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name.as_str(), Source::from(source)))?;

    Ok(())
}
