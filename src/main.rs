//! Comment Templates CLI
//!
//! Usage:
//!   comment-templates [OPTIONS] <COMMAND>
//!
//! Commands:
//!   list    List the templates defined in files
//!   show    Print a template's stored text
//!   render  Render a template with placeholder values
//!   strip   Print a file with all annotations removed
//!
//! Options:
//!   -c, --config <FILE>  Configuration file (TOML format)
//!   -v, --verbose        Log extraction details to stderr
//!   -h, --help           Print help

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use comment_templates::substitution::{parse_assignment, placeholders};
use comment_templates::{
    extract_files, render_template, strip_file, ExtractConfig, Registry, SubstitutionMap,
    TemplateError, UnresolvedPolicy,
};

#[derive(Parser)]
#[command(name = "comment-templates")]
#[command(about = "Extract and render templates annotated in source-file comments")]
struct Cli {
    /// Configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log extraction details to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the templates defined in files
    List {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print a template's stored text
    Show {
        name: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Render a template with placeholder values
    Render {
        name: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Placeholder value as key=value (repeatable)
        #[arg(short, long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// Fail on placeholders without a value
        #[arg(long)]
        strict: bool,
    },

    /// Print a file with all annotations removed
    Strip { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => match ExtractConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => ExtractConfig::default(),
    };

    let result = match cli.command {
        Command::List { files } => {
            extract_files(&files, &config).map(|registry| print_listing(&registry))
        }
        Command::Show { name, files } => extract_files(&files, &config).and_then(|registry| {
            let fragment = registry.lookup(&name)?;
            println!("{}", fragment.text());
            let used = placeholders(fragment);
            if !used.is_empty() {
                tracing::info!(placeholders = ?used, "template placeholders");
            }
            Ok(())
        }),
        Command::Render {
            name,
            files,
            set,
            strict,
        } => {
            if strict {
                config = config.with_unresolved_policy(UnresolvedPolicy::Error);
            }
            let map: SubstitutionMap = set.into_iter().collect();
            extract_files(&files, &config)
                .and_then(|registry| render_template(&registry, &name, &map, &config))
                .map(|text| println!("{}", text))
        }
        Command::Strip { file } => {
            strip_file(&file, &config).map(|text| println!("{}", text))
        }
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}

fn print_listing(registry: &Registry) {
    for fragment in registry {
        println!(
            "{}\t{}\t{}",
            fragment.name(),
            fragment.kind(),
            fragment.provenance()
        );
    }
}

/// Print an error, with source context when the file can be read back
fn report(err: &TemplateError) {
    let source = err
        .location()
        .and_then(|location| location.file.as_ref())
        .and_then(|path| fs::read_to_string(path).ok());
    match source {
        Some(source) => eprint!("{}", err.report(&source)),
        None => eprintln!("Error: {}", err),
    }
}
