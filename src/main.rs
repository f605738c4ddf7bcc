//! CLI tool to validate and format devcmd command files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use devcmd_rs::{Diagnostic, ParseOptions, ParseResult, SourceFile};

/// Validate and format devcmd command files
#[derive(Parser, Debug)]
#[command(name = "devcmd", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Report warnings as errors
    #[arg(long, global = true)]
    strict: bool,

    /// Accepted decorator name; unknown decorators are reported when given
    #[arg(long = "decorator", value_name = "NAME", global = true)]
    decorators: Vec<String>,

    /// Refuse files larger than this many bytes
    #[arg(long = "max-bytes", value_name = "N", global = true)]
    max_bytes: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check if file(s) are valid
    Validate {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Format file(s) and print to stdout
    Fmt {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Check if file(s) are formatted
    Check {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let cli = Cli::parse();
    let options = parse_options(&cli);

    let (Command::Validate { files } | Command::Fmt { files } | Command::Check { files }) =
        &cli.command;

    let mut had_error = false;
    for path in files {
        let source = match read_source(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{e}");
                had_error = true;
                continue;
            }
        };

        let result = devcmd_rs::parse(&source, &options);
        for diagnostic in &result.diagnostics {
            report(path, diagnostic);
        }
        if result.has_errors() {
            had_error = true;
            continue;
        }
        let ok = match &cli.command {
            Command::Validate { .. } => validate(path, &result),
            Command::Fmt { .. } => fmt(&result),
            Command::Check { .. } => check(path, &source, &result),
        };
        if !ok {
            had_error = true;
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn parse_options(cli: &Cli) -> ParseOptions {
    let mut options = ParseOptions::new().strict(cli.strict);
    if !cli.decorators.is_empty() {
        options = options.known_decorators(cli.decorators.iter().cloned());
    }
    if let Some(limit) = cli.max_bytes {
        options = options.max_input_bytes(limit);
    }
    options
}

fn read_source(path: &Path) -> Result<SourceFile, devcmd_rs::SourceError> {
    let name = path.display().to_string();
    match fs::read(path) {
        Ok(bytes) => SourceFile::from_bytes(name, bytes),
        Err(source) => Err(devcmd_rs::SourceError::Io { name, source }),
    }
}

fn report(path: &Path, diagnostic: &Diagnostic) {
    let path = path.display();
    let span = diagnostic.span;
    eprintln!(
        "{path}:{}:{}: {}[{}]: {}",
        span.start_line, span.start_col, diagnostic.severity, diagnostic.code, diagnostic.message
    );
    for note in &diagnostic.notes {
        eprintln!(
            "  {path}:{}:{}: note: {}",
            note.span.start_line, note.span.start_col, note.message
        );
    }
}

fn validate(path: &Path, result: &ParseResult) -> bool {
    let program = &result.program;
    let variables = program.variables().count();
    let commands = program.commands().count();
    let warnings = result.warnings().count();
    eprintln!(
        "{}: valid ({variables} variable(s), {commands} command(s), {warnings} warning(s))",
        path.display()
    );
    true
}

fn fmt(result: &ParseResult) -> bool {
    print!("{}", devcmd_rs::format(&result.program));
    true
}

fn check(path: &Path, source: &SourceFile, result: &ParseResult) -> bool {
    let formatted = devcmd_rs::format(&result.program);
    if formatted == source.text() {
        eprintln!("{}: formatted", path.display());
        true
    } else {
        eprintln!("{}: not formatted", path.display());
        false
    }
}
