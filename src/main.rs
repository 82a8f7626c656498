// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use cli_autocomplete::error::exit_codes;
use cli_autocomplete::{exit_on_error, CrosstermTerminal, EditorOptions, LineEditor, RuleTree};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "CLI_AUTOCOMPLETE_LOG";
const DEFAULT_LOG_FILTER: &str = "cli_autocomplete=info";

#[derive(Parser)]
#[command(name = "cli-autocomplete")]
#[command(version = VERSION)]
#[command(about = "Interactive prompt with live completion from an indented rule file.")]
#[command(long_about = "cli-autocomplete - rule-driven tab completion\n\n\
    Start a prompt:      cli-autocomplete --rules rules.txt\n\
    Validate rules:      cli-autocomplete --rules rules.txt --check\n\n\
    Tab accepts, Up/Down cycle, Enter submits, an empty line quits.")]
struct Cli {
    /// Rule file (default: <config dir>/cli-autocomplete/rules.txt)
    #[arg(short, long, value_name = "PATH")]
    rules: Option<PathBuf>,

    /// Prompt title; a counter is appended for each line read
    #[arg(short, long, default_value = "git")]
    title: String,

    /// Characters that mark a token as a placeholder Tab never inserts
    #[arg(short, long, default_value = "[{<")]
    markers: String,

    /// Read a single line and exit
    #[arg(long)]
    once: bool,

    /// Validate the rule file, print its dictionary and exit
    #[arg(long)]
    check: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_file.as_deref())?;

    let rules_path = match cli.rules {
        Some(path) => path,
        None => default_rules_path()
            .context("No --rules given and no config directory found for the default")?,
    };

    // Malformed rules get the full diagnostic and a sysexits code.
    let tree = RuleTree::from_file(&rules_path).unwrap_or_else(|err| exit_on_error(err));
    tracing::info!(path = %rules_path.display(), tokens = tree.len() - 1, "rules loaded");

    if cli.check {
        print_dictionary(&tree, &rules_path);
        return Ok(());
    }

    install_interrupt_handler()?;
    print_banner(&rules_path);

    let mut terminal = CrosstermTerminal::new();
    let mut count = 0usize;

    loop {
        let options = EditorOptions::new()
            .with_title(prompt_title(&cli.title, count))
            .with_markers(cli.markers.as_str());

        let line = LineEditor::new(&tree, options)
            .read_line(&mut terminal)
            .unwrap_or_else(|err| exit_on_error(err));

        println!("\n{}", line);

        if line.is_empty() || cli.once {
            break;
        }
        count += 1;
    }

    Ok(())
}

fn default_rules_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cli-autocomplete").join("rules.txt"))
}

fn prompt_title(title: &str, count: usize) -> String {
    if title.is_empty() {
        String::new()
    } else {
        format!("{} [{}]", title, count)
    }
}

/// Install the tracing subscriber.
///
/// stdout carries the prompt, so logs go to a file when asked. Without one
/// only warnings reach stderr.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let filter = EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("warn"))
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Ctrl+C outside the key stream (e.g. while loading) must not leave the
/// terminal raw.
fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        let _ = crossterm::terminal::disable_raw_mode();
        std::process::exit(exit_codes::INTERRUPTED);
    })
    .context("Failed to install Ctrl+C handler")
}

fn print_banner(rules_path: &Path) {
    eprintln!(
        "{} Completing from {}",
        "[i]".cyan(),
        rules_path.display().to_string().bold()
    );
    eprintln!(
        "    {} accept  {} cycle  {} submit  {} quit  {} abort",
        "Tab".bold(),
        "Up/Down".bold(),
        "Enter".bold(),
        "empty line".bold(),
        "Ctrl+C".bold()
    );
}

fn print_dictionary(tree: &RuleTree, rules_path: &Path) {
    println!(
        "{} {} is valid ({} tokens)",
        "[OK]".green(),
        rules_path.display(),
        tree.len() - 1
    );
    for (parent, children) in tree.to_dictionary() {
        println!("{}", dictionary_row(&parent, &children));
    }
}

/// One `--check` line. The label is padded before it is colored so escape
/// codes do not count toward the column width.
fn dictionary_row(parent: &str, children: &[String]) -> String {
    let label = if parent.is_empty() {
        format!("{:<16}", "<root>").dimmed().to_string()
    } else {
        format!("{:<16}", parent)
    };
    format!("  {} -> {}", label, children.join(", "))
}
