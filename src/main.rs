//! urlgroup - URL path grouping
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use urlgroup::config::{urlgroup_home, Config};
use urlgroup::error::exit_codes;

// =============================================================================
// CLI Definition
// =============================================================================

/// Group URL paths into low-cardinality patterns
#[derive(Parser)]
#[command(name = "urlgroup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on URL lists and report the distinct patterns found
    Group {
        /// Newline-separated URLs or absolute paths
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Maximum number of patterns to show
        #[arg(long, short)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Train on a URL list, then simplify the given URLs
    Simplify {
        /// Newline-separated URLs or absolute paths to train on
        file: PathBuf,
        /// URLs or absolute paths to simplify
        #[arg(required = true)]
        urls: Vec<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Train on a URL list and print the grouping trees
    Tree {
        /// Newline-separated URLs or absolute paths
        file: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Write the default project configuration
    Init {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Overwrite an existing config file
        #[arg(long, short)]
        force: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("urlgroup error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, appends to ~/.urlgroup/crash.log when that directory exists and
/// exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("urlgroup panic: {}", info);

        if let Some(home) = urlgroup_home().filter(|home| home.is_dir()) {
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

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Install the stderr log subscriber.
///
/// `URLGROUP_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "urlgroup=debug"
    } else {
        "urlgroup=warn"
    };
    let filter =
        EnvFilter::try_from_env("URLGROUP_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Group {
            files,
            limit,
            json,
            quiet,
        } => run_group(files, limit, json, quiet, &cwd),
        Commands::Simplify {
            file,
            urls,
            json,
            quiet,
        } => run_simplify(file, urls, json, quiet, &cwd),
        Commands::Tree { file, json, quiet } => run_tree(file, json, quiet, &cwd),
        Commands::Init { json, quiet, force } => run_init(json, quiet, force, &cwd),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a success boolean to an exit code.
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
    }
}

fn run_group(
    files: Vec<PathBuf>,
    limit: Option<usize>,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use urlgroup::cli::group::{GroupCommand, GroupOptions};

    let cmd = GroupCommand::new(Config::load_from_cwd(cwd), files);
    let options = GroupOptions { json, quiet, limit };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_simplify(
    file: PathBuf,
    urls: Vec<String>,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use urlgroup::cli::simplify::{SimplifyCommand, SimplifyOptions};

    let cmd = SimplifyCommand::new(Config::load_from_cwd(cwd), file, urls);
    let options = SimplifyOptions { json, quiet };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_tree(
    file: PathBuf,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use urlgroup::cli::tree::{TreeCommand, TreeOptions};

    let cmd = TreeCommand::new(Config::load_from_cwd(cwd), file);
    let options = TreeOptions { json, quiet };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_init(
    json: bool,
    quiet: bool,
    force: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use urlgroup::cli::init::{InitCommand, InitOptions};

    let cmd = InitCommand::new(cwd.to_string_lossy().to_string());
    let options = InitOptions { json, quiet, force };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

// =============================================================================
// Tests
// =============================================================================
