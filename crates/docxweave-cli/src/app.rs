//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use docxweave_core::{convert, outline, OutputFormat, Settings};
use docxweave_ooxml::WordDocument;

/// Settings file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "docxweave.toml";

/// Output format selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Self-contained HTML page
    Html,
    /// Markdown with footnote definitions
    Markdown,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Html => OutputFormat::Html,
            FormatArg::Markdown => OutputFormat::Markdown,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "docxweave")]
#[command(author, version, about = "Word documents to HTML and Markdown", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a DOCX file
    Convert(ConvertArgs),

    /// Print the list structure rebuilt from the document body
    Inspect {
        /// Input DOCX file
        input: PathBuf,
    },
}

/// Arguments of `docxweave convert`
#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Input DOCX file
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format, overriding the settings file
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Settings file (defaults to ./docxweave.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Render top-level upper-roman lists as sections
    #[arg(long)]
    pub upper_roman_headings: bool,

    /// Detect superscript and subscript faked with font size and position
    #[arg(long)]
    pub faked_vertical_align: bool,
}

/// Run the CLI application
///
/// Parses arguments, sets up logging and dispatches to the command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}

/// Dispatch parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert(args) => {
            let rendered = convert_command(&args)?;
            match &args.output {
                Some(path) => {
                    fs::write(path, rendered)
                        .with_context(|| format!("Failed to write output: {}", path.display()))?;
                    info!(output = %path.display(), "conversion written");
                }
                None => write_stdout(&rendered)?,
            }
        }
        Commands::Inspect { input } => {
            write_stdout(&inspect_command(&input)?)?;
        }
    }
    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flag
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    stdout.flush().context("Failed to write to stdout")
}

/// Resolve settings: explicit file, else the working-directory file, else defaults
pub fn load_settings(config: Option<&Path>) -> Result<Settings> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !candidate.is_file() {
                debug!("no settings file, using defaults");
                return Ok(Settings::default());
            }
            candidate
        }
    };
    debug!(config = %path.display(), "loading settings");
    Settings::load(&path).with_context(|| format!("Failed to load settings: {}", path.display()))
}

/// Apply command-line overrides on top of loaded settings
pub fn effective_settings(args: &ConvertArgs) -> Result<Settings> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(format) = args.format {
        settings.output.format = format.into();
    }
    if args.upper_roman_headings {
        settings.layers.upper_roman_headings = true;
    }
    if args.faked_vertical_align {
        settings.layers.faked_vertical_align = true;
    }
    Ok(settings)
}

fn open_document(input: &Path) -> Result<WordDocument> {
    WordDocument::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))
}

/// Execute the convert command, returning the rendered document
pub fn convert_command(args: &ConvertArgs) -> Result<String> {
    let settings = effective_settings(args)?;
    let doc = open_document(&args.input)?;
    info!(
        input = %args.input.display(),
        format = ?settings.output.format,
        "converting"
    );
    Ok(convert(&doc, &settings))
}

/// Execute the inspect command, returning the outline
pub fn inspect_command(input: &Path) -> Result<String> {
    let doc = open_document(input)?;
    Ok(outline(&doc))
}
