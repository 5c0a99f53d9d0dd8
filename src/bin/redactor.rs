//! redactor - Deterministic pseudonymization CLI
//!
//! Reads a line-oriented document, replaces recognized person names with
//! stable placeholders (`A某`, `B某`, ...), and prints the redacted text.
//!
//! The built-in tagger is lexicon-based: pass the names to redact via
//! `--names`. Hosts with a real NER model drive the library directly.
//!
//! # Usage
//!
//! ```bash
//! # Redact a file, names from a lexicon file (one per line)
//! redactor --names names.txt input.txt
//!
//! # Read from stdin, persist the result and dump the mapping
//! cat input.txt | redactor --names names.txt --output out/ --mapping
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use redactor::{FileSink, LexiconTagger, Pipeline, PipelineConfig, Sink, TaggerErrorPolicy};

#[derive(Parser)]
#[command(name = "redactor", version, about = "Deterministic NER pseudonymization")]
struct Cli {
    /// Input file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Lexicon file with one name per line
    #[arg(long)]
    names: Option<PathBuf>,

    /// Directory to persist the redacted text into
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the original → placeholder mapping as JSON to stderr
    #[arg(long)]
    mapping: bool,

    /// Skip units the tagger fails on instead of aborting
    #[arg(long)]
    skip_failed_units: bool,
}

fn read_input(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let input = match read_input(cli.input.as_ref()) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("error: failed to read input: {err}");
            return ExitCode::FAILURE;
        }
    };

    let names: Vec<String> = match &cli.names {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
            Err(err) => {
                eprintln!("error: failed to read lexicon: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            log::warn!("no --names lexicon given, nothing will be redacted");
            Vec::new()
        }
    };

    let tagger = match LexiconTagger::new(names) {
        Ok(tagger) => tagger,
        Err(err) => {
            eprintln!("error: failed to build lexicon tagger: {err}");
            return ExitCode::FAILURE;
        }
    };

    let config = PipelineConfig {
        on_tagger_error: if cli.skip_failed_units {
            TaggerErrorPolicy::SkipUnit
        } else {
            TaggerErrorPolicy::Abort
        },
        ..PipelineConfig::default()
    };

    let mut pipeline = Pipeline::with_config(tagger, config);
    let report = match pipeline.run(&input) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    print!("{}", report.text);

    if cli.mapping {
        match serde_json::to_string_pretty(&report.mapping) {
            Ok(json) => eprintln!("{json}"),
            Err(err) => eprintln!("error: failed to serialize mapping: {err}"),
        }
    }

    if let Some(dir) = &cli.output {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let name = format!("redacted_{ts}.txt");
        let sink = FileSink::new(dir);
        // Persist failure is reported but does not discard the printed
        // in-memory result.
        if let Err(err) = sink.persist(&report.text, &name) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
