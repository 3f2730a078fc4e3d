//! CLI for the stack migrator.
//!
//! Reads the upstream stack repository (`owner/repo`), replays the commits of
//! the selected release onto a new branch and opens a pull request.

use clap::Parser;
use stack_migrator::{
    InputError, MigrationError, MigrationReport, Migrator, MigratorConfig, PrStatus, TagSelection,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Stack Migrator - Move a repository onto the latest release of its stack template.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stack repository in the form owner/repo. Prompted for when omitted.
    repository: Option<String>,

    /// Release tag the repository currently consumes; the next newer release is migrated to.
    #[arg(long, env = "STACK_MIGRATOR_CONSUMED_TAG")]
    consumed_tag: Option<String>,

    /// Release tag to migrate to, overriding --consumed-tag.
    #[arg(long)]
    tag: Option<String>,

    /// Branch that receives the patches.
    #[arg(long, default_value = stack_migrator::runner::DEFAULT_BRANCH_NAME)]
    branch: String,

    /// Working tree of the repository being migrated.
    #[arg(long, default_value = ".")]
    workdir: PathBuf,

    /// GitHub Personal Access Token, used for API calls only.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API base URL (for GitHub Enterprise).
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Seconds allowed for each patch download.
    #[arg(long, default_value_t = 10)]
    patch_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Install the rustls crypto provider before any TLS client is built.
    // An Err only means a provider was already installed for this process.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(report) => {
            print_summary(&report);

            if report.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Migration failed");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Log level comes from `RUST_LOG`. Without it the level is `info`, or
/// `debug` when the `DEBUG` variable is set.
fn init_tracing() {
    let default_level = if std::env::var_os("DEBUG").is_some_and(|v| !v.is_empty()) {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<MigrationReport, MigrationError> {
    let repository = match args.repository {
        Some(repository) => repository,
        None => prompt_repository()?,
    };

    let mut config = MigratorConfig::new(args.workdir)
        .with_branch_name(args.branch)
        .with_tag_selection(TagSelection::from_options(args.tag, args.consumed_tag))
        .with_patch_timeout(Duration::from_secs(args.patch_timeout_secs));
    if let Some(token) = args.token {
        config = config.with_token(token);
    }
    if let Some(api_url) = args.api_url {
        config = config.with_api_base_url(api_url);
    }

    let migrator = Migrator::new(config)?;
    migrator.run_input(&repository).await
}

/// Asks for the stack repository on stdout and reads one line from stdin.
fn prompt_repository() -> Result<String, InputError> {
    println!("Enter the stack repository in form of (User/RepoName)");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Prints the final migration report.
fn print_summary(report: &MigrationReport) {
    println!("\nSummary:");
    println!("  Stack repository: {}", report.repository);
    println!("  Release: {}", report.tag);
    println!("  Branch: {}", report.branch);
    println!("  Patches applied: {}", report.patches_applied);

    for warning in &report.cleanup_warnings {
        println!("  Left behind: {} ({})", warning.path, warning.message);
    }

    match &report.pull_request {
        PrStatus::Created { url } => {
            println!("  To complete the merge, merge this PR by going to the following link: {url}");
        }
        PrStatus::Failed { error } => {
            println!("  Pull request failed: {error}");
            println!("  The branch '{}' is pushed; open the PR manually.", report.branch);
        }
    }
}
