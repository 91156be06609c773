// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for chatfmt.
//!
//! This binary provides the `chatfmt` command for rendering exported chat
//! transcripts from JSON to plain text, HTML or CSV.

use chatfmt::format::{FormatError, OutputFormat};
use chatfmt::{parser, renderer};
use lexopt::prelude::*;
use snafu::{OptionExt, ensure, prelude::*};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Where to write the rendered output.
#[derive(Clone)]
enum OutputTarget {
    /// Write each file to the specified directory.
    Directory(PathBuf),
    /// Write to stdout.
    Stdout,
}

struct Cli {
    input: Vec<PathBuf>,
    output: OutputTarget,
    format: String,
    date_format: String,
    quiet: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("{source}"))]
    UnsupportedFormat { source: FormatError },

    #[snafu(display("invalid date format {pattern:?}"))]
    InvalidDateFormat { pattern: String },

    #[snafu(display("no transcript JSON files found in the given inputs"))]
    NoInputFiles,

    #[snafu(display("only one transcript can be rendered to stdout"))]
    MultipleFilesToStdout,

    #[snafu(display("failed to create output directory: {source}"))]
    CreateOutputDir { source: std::io::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        path: PathBuf,
        source: parser::ParseError,
    },

    #[snafu(display("cannot name the output: input path has no file stem"))]
    InvalidFilename,

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Render exported chat transcripts as plain text, HTML or CSV

Usage: {name} [OPTIONS] -o <OUTPUT> <INPUT>...

Arguments:
  <INPUT>...  Transcript JSON files, or directories searched for *.json

Options:
  -o, --output <OUTPUT>        Directory for rendered transcripts (or - for stdout)
  -f, --format <FORMAT>        plaintext, htmldark, htmllight or csv (default: htmldark)
      --date-format <PATTERN>  strftime pattern for timestamps (default: {date_format})

Other options:
  -q, --quiet                  Only log warnings and errors
  -n, --dry-run                List the transcripts that would be rendered
      --force                  Replace transcripts already rendered
  -h, --help                   Print help
  -V, --version                Print version

Set RUST_LOG (e.g. RUST_LOG=chatfmt=debug) for more detailed logging.",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        date_format = renderer::DEFAULT_DATE_FORMAT,
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // A bare invocation prints usage
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input = Vec::new();
    let mut output: Option<OutputTarget> = None;
    let mut format = OutputFormat::HtmlDark.to_string();
    let mut date_format = renderer::DEFAULT_DATE_FORMAT.to_owned();
    let mut quiet = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = Some(if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::Directory(val)
                });
            }
            Short('f') | Long("format") => format = parser.value()?.string()?,
            Long("date-format") => date_format = parser.value()?.string()?,
            Short('q') | Long("quiet") => quiet = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => input.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input,
        output: output.ok_or("missing required option: --output")?,
        format,
        date_format,
        quiet,
        dry_run,
        force,
    })
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_tracing(cli.quiet);

    let format: OutputFormat = cli.format.parse().context(UnsupportedFormatSnafu)?;
    ensure!(
        renderer::is_valid_date_format(&cli.date_format),
        InvalidDateFormatSnafu {
            pattern: &cli.date_format
        }
    );
    ensure!(!cli.input.is_empty(), NoInputFilesSnafu);

    let opts = renderer::RenderOptions {
        date_format: cli.date_format.clone(),
    };

    let files = collect_input_files(&cli.input);
    debug!(count = files.len(), %format, "collected transcripts");
    ensure!(!files.is_empty(), NoInputFilesSnafu);

    match &cli.output {
        OutputTarget::Stdout => {
            ensure!(files.len() == 1, MultipleFilesToStdoutSnafu);
            process_to_stdout(&files[0], format, &opts, &cli)?;
        }
        OutputTarget::Directory(dir) => {
            if !cli.dry_run {
                std::fs::create_dir_all(dir).context(CreateOutputDirSnafu)?;
            }
            for file in &files {
                process_file(file, dir, format, &opts, &cli)?;
            }
        }
    }

    Ok(())
}

/// Expands the inputs into transcript paths.
///
/// Files are taken as given. Directories are walked in file-name order and
/// contribute every `*.json` file beneath them.
fn collect_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Loads one transcript and renders it as a complete document.
fn render_file(
    input: &Path,
    format: OutputFormat,
    opts: &renderer::RenderOptions,
) -> Result<String, Error> {
    let json = std::fs::read_to_string(input).context(ReadFileSnafu { path: input })?;
    let transcript = parser::parse_transcript(&json).context(ParseFileSnafu { path: input })?;
    debug!(
        path = %input.display(),
        messages = transcript.messages.len(),
        "parsed transcript"
    );
    Ok(renderer::render_transcript(&transcript, format, opts))
}

/// Renders the only transcript to stdout.
fn process_to_stdout(
    input: &Path,
    format: OutputFormat,
    opts: &renderer::RenderOptions,
    cli: &Cli,
) -> Result<(), Error> {
    if cli.dry_run {
        info!("Would render {} to stdout", input.display());
        return Ok(());
    }

    print!("{}", render_file(input, format, opts)?);
    Ok(())
}

/// Renders a transcript to `<stem>.<extension>` in `out_dir`.
///
/// Existing files are skipped unless `--force` was given.
fn process_file(
    input: &Path,
    out_dir: &Path,
    format: OutputFormat,
    opts: &renderer::RenderOptions,
    cli: &Cli,
) -> Result<(), Error> {
    let out_name = input.file_stem().context(InvalidFilenameSnafu)?;
    let out_path = out_dir.join(format!(
        "{}.{}",
        out_name.to_string_lossy(),
        format.extension()
    ));

    if cli.dry_run {
        info!("Would render {} to {}", input.display(), out_path.display());
        return Ok(());
    }

    if out_path.exists() && !cli.force {
        warn!(
            "Skipping {} (already rendered, use --force to replace it)",
            out_path.display()
        );
        return Ok(());
    }

    let rendered = render_file(input, format, opts)?;
    std::fs::write(&out_path, &rendered).context(WriteFileSnafu { path: &out_path })?;

    info!("Rendered {} to {}", input.display(), out_path.display());
    Ok(())
}
