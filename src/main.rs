//! Tabulae - spaced-repetition flashcards on the command line
//!
//! CLI entry point with global panic handler.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tabulae::config::{tabulae_home, Config};
use tabulae::core::AdvancePolicy;
use tabulae::error::exit_codes;
use tabulae::storage::FileCardStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// Tabulae - spaced-repetition flashcards on the command line
#[derive(Parser)]
#[command(name = "tabulae")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a card to the deck
    Add {
        /// Prompt side
        front: String,
        /// Answer side
        back: String,
        /// Deck owner (default: configured profile owner)
        #[arg(long)]
        owner: Option<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List cards in creation order
    List {
        /// Only cards that are due now
        #[arg(long)]
        due: bool,
        /// Deck owner (default: configured profile owner)
        #[arg(long)]
        owner: Option<String>,
        /// Maximum number of results
        #[arg(long, short)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Rate one card (1 forgot, 2 hard, 3 good, 4 easy)
    Review {
        /// Card ID
        card_id: String,
        /// Quality rating, 1-4
        quality: u8,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Study interactively: Enter flips, 1-4 rates, n skips, q quits
    Study {
        /// Which cards the session cycles through
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
        /// Stop after this many ratings
        #[arg(long, short)]
        limit: Option<usize>,
        /// Deck owner (default: configured profile owner)
        #[arg(long)]
        owner: Option<String>,
        /// Print the session summary as JSON (prompts go to stderr)
        #[arg(long, short)]
        json: bool,
        /// Suppress the session summary
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show deck counts: total, due, learned
    Stats {
        /// Deck owner (default: configured profile owner)
        #[arg(long)]
        owner: Option<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Delete a card
    Remove {
        /// Card ID
        card_id: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

/// Advance policy for CLI argument parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Cycle through every card
    All,
    /// Cycle through due cards until none are left
    Due,
}

impl From<PolicyArg> for AdvancePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::All => AdvancePolicy::CycleAllCards,
            PolicyArg::Due => AdvancePolicy::CycleDueOnly,
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    init_tracing();
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("tabulae error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Install the stderr log subscriber, filtered by `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tabulae=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Set up the global panic handler.
///
/// On panic, appends to `<home>/crash.log` and exits with the error code.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("tabulae panic: {}", info);

        if let Some(home) = tabulae_home() {
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::ERROR);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Add {
            front,
            back,
            owner,
            json,
            quiet,
        } => run_add(&front, &back, owner, json, quiet),
        Commands::List {
            due,
            owner,
            limit,
            json,
            quiet,
        } => run_list(due, owner, limit, json, quiet),
        Commands::Review {
            card_id,
            quality,
            json,
            quiet,
        } => run_review(&card_id, quality, json, quiet),
        Commands::Study {
            policy,
            limit,
            owner,
            json,
            quiet,
        } => run_study(policy.map(Into::into), limit, owner, json, quiet),
        Commands::Stats { owner, json, quiet } => run_stats(owner, json, quiet),
        Commands::Remove {
            card_id,
            json,
            quiet,
        } => run_remove(&card_id, json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a command's success flag to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn print_formatted(formatted: &str) {
    if !formatted.is_empty() {
        print!("{}", formatted);
        if !formatted.ends_with('\n') {
            println!();
        }
    }
}

fn run_add(
    front: &str,
    back: &str,
    owner: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tabulae::cli::add::{AddCommand, AddOptions};

    let config = Config::load();
    let store = FileCardStore::new()?;

    let cmd = AddCommand::new(store, config);
    let options = AddOptions { json, quiet, owner };

    let output = cmd.run(front, back, &options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_list(
    due: bool,
    owner: Option<String>,
    limit: Option<usize>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tabulae::cli::list::{ListCommand, ListOptions};

    let config = Config::load();
    let store = FileCardStore::new()?;

    let cmd = ListCommand::new(store, config);
    let options = ListOptions {
        json,
        quiet,
        due,
        owner,
        limit,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_review(
    card_id: &str,
    quality: u8,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tabulae::cli::review::{ReviewCommand, ReviewOptions};

    let store = FileCardStore::new()?;
    let cmd = ReviewCommand::new(store);
    let options = ReviewOptions { json, quiet };

    let output = cmd.run(card_id, quality, &options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_study(
    policy: Option<AdvancePolicy>,
    limit: Option<usize>,
    owner: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tabulae::cli::study::{StudyCommand, StudyOptions};

    let config = Config::load();
    let store = Arc::new(FileCardStore::new()?);

    let cmd = StudyCommand::new(store, config);
    let options = StudyOptions {
        json,
        quiet,
        policy,
        limit,
        owner,
    };

    let stdin = io::stdin();
    let output = if json {
        // Keep stdout for the JSON summary
        cmd.run(stdin.lock(), io::stderr(), &options)
    } else {
        cmd.run(stdin.lock(), io::stdout(), &options)
    };
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_stats(
    owner: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tabulae::cli::stats::{StatsCommand, StatsOptions};

    let config = Config::load();
    let store = FileCardStore::new()?;

    let cmd = StatsCommand::new(store, config);
    let options = StatsOptions { json, quiet, owner };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_remove(
    card_id: &str,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use tabulae::cli::remove::{RemoveCommand, RemoveOptions};

    let store = FileCardStore::new()?;
    let cmd = RemoveCommand::new(store);
    let options = RemoveOptions { json, quiet };

    let output = cmd.run(card_id, &options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}
