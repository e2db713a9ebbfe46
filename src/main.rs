//! CLI for bibtex-context - Build citation records for static site templates.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};

use bibtex_context::{
    load_bibliography,
    richtext::{Backend, HtmlBackend, PlainTextBackend},
    BuildOutcome, Context, ContextBuilder, PlainStyle, Settings, SourceStatus,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Render BibTeX bibliographies into template context records
#[derive(Parser)]
#[command(name = "bibtex-context")]
#[command(version)]
#[command(after_help = "\
Examples:
  bibtex-context build --settings site.toml
  bibtex-context build --settings site.toml -o context.json
  bibtex-context format publications.bib --html")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the template context from a settings file
    #[command(after_help = "\
Recognized settings: PUBLICATIONS_SRC, PRESENTATIONS_SRC, POSTERS_SRC, PATH")]
    Build {
        /// Settings file (TOML)
        #[arg(short, long)]
        settings: PathBuf,

        /// Output file for the context JSON (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the formatted citations of a BibTeX file
    Format {
        /// BibTeX file
        bib: PathBuf,

        /// Render HTML instead of plain text
        #[arg(long)]
        html: bool,
    },
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: settings file not found / invalid
    SettingsFile(String),
    /// Exit 11: bibliography file not found / invalid
    BibFile(String),
    /// Exit 12: an entry cannot be formatted
    Style(String),
    /// Exit 15: cannot write output
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::SettingsFile(_) => 10,
            AppError::BibFile(_) => 11,
            AppError::Style(_) => 12,
            AppError::OutputFile(_) => 15,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::SettingsFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: the settings file must be TOML with keys such as PUBLICATIONS_SRC = \"content/pubs.bib\"",
                    msg
                )
            }
            AppError::BibFile(msg) => {
                write!(f, "{}\n  hint: verify the file path and BibTeX syntax", msg)
            }
            AppError::Style(msg) => {
                write!(
                    f,
                    "{}\n  hint: add the missing field to the entry in your bibliography",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

/// Installs the log subscriber; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => "bibtex_context=info",
        1 => "bibtex_context=debug",
        _ => "bibtex_context=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Build { settings, output } => build_command(&settings, output.as_deref()),
        Commands::Format { bib, html } => format_command(&bib, html),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Build the context and write it as JSON.
fn build_command(settings_path: &Path, output: Option<&Path>) -> Result<(), AppError> {
    let settings = Settings::load(settings_path)
        .map_err(|e| AppError::SettingsFile(format!("'{}': {}", settings_path.display(), e)))?;

    let mut context = Context::new();
    let outcome = ContextBuilder::new(settings).build(&mut context);

    match &outcome {
        BuildOutcome::NotConfigured => {
            eprintln!("no bibliography source configured, context left empty");
        }
        BuildOutcome::Completed(reports) => {
            for report in reports {
                if let SourceStatus::Stored { entries } = report.status {
                    eprintln!(
                        "stored {} record(s) for {}",
                        entries,
                        report.source.context_key()
                    );
                }
            }
        }
    }

    let json = context
        .to_json_pretty()
        .map_err(|e| AppError::OutputFile(format!("context: {}", e)))?;
    write_output(output, &json)
}

/// Print each formatted citation in style order.
fn format_command(bib: &Path, html: bool) -> Result<(), AppError> {
    let bibliography = load_bibliography(bib)
        .map_err(|e| AppError::BibFile(format!("'{}': {}", bib.display(), e)))?;
    let entries = PlainStyle
        .format_entries(&bibliography)
        .map_err(|e| AppError::Style(format!("'{}': {}", bib.display(), e)))?;

    let backend: &dyn Backend = if html { &HtmlBackend } else { &PlainTextBackend };
    let lines: Vec<String> = entries
        .iter()
        .map(|e| format!("[{}] {}", e.label, e.text.render(backend)))
        .collect();

    let mut out = lines.join("\n");
    out.push('\n');
    write_output(None, &out)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), AppError> {
    if let Some(path) = output {
        fs::write(path, content)
            .map_err(|e| AppError::OutputFile(format!("'{}': {}", path.display(), e)))?;
        eprintln!("wrote {}", path.display());
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", content)
            .map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))?;
    }
    Ok(())
}
