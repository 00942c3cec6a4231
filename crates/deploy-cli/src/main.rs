//! deploy - create GitHub deployments from the command line
//!
//! Usage:
//!   deploy --env=staging --ref=master remind101/acme-inc
//!   deploy --env=staging remind101/acme-inc   # HEAD of the current branch
//!   deploy --env=staging                      # repo from the origin remote
//!   deploy --update                           # self-update

mod prompt;

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deploy_core::config::{ConfigStore, DeployConfig};
use deploy_core::deploy::{DeployOptions, Deployer};
use deploy_core::environment::alias_environment;
use deploy_core::error::{DeployError, user_message};
use deploy_core::git::LocalRepo;
use deploy_core::github::GitHubClient;
use deploy_core::refs::resolve_ref;
use deploy_core::repo::{repo_from_args, split_repo};
use deploy_core::update::{UpdateOutcome, Updater};

const EXAMPLES: &str = "\
EXAMPLES:
   # Deploy the master branch of remind101/acme-inc to staging
   deploy --env=staging --ref=master remind101/acme-inc

   # Deploy HEAD of the current branch to staging
   deploy --env=staging remind101/acme-inc

   # Deploy the current GitHub repo to staging
   deploy --env=staging";

/// Exit status for any failure.
const EXIT_FAILURE: i32 = -1;

#[derive(Parser)]
#[command(name = "deploy", version)]
#[command(about = "A command for creating GitHub deployments", long_about = None)]
#[command(after_help = EXAMPLES)]
struct Cli {
    /// The git ref to deploy. Can be a git commit, branch or tag.
    #[arg(long = "ref", visible_aliases = ["branch", "commit", "tag"], value_name = "REF")]
    reference: Option<String>,

    /// The environment to deploy to.
    #[arg(short, long)]
    env: Option<String>,

    /// Ignore commit status checks.
    #[arg(short, long)]
    force: bool,

    /// Don't wait for the deployment to complete.
    #[arg(short, long)]
    detached: bool,

    /// Silence any output to STDOUT.
    #[arg(short, long)]
    quiet: bool,

    /// Update the binary
    #[arg(short, long)]
    update: bool,

    /// GitHub API URL (defaults to the configured api_url)
    #[arg(long, value_name = "URL")]
    github: Option<String>,

    /// Seconds to wait for the deployment to start
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Repository to deploy (owner/repo, or repo with GITHUB_ORGANIZATION set)
    repo: Option<String>,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so progress output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.update {
        if let Err(err) = run_update(&cli).await {
            println!("Error Updating deploy command: {:#}", err);
            std::process::exit(EXIT_FAILURE);
        }
        return;
    }

    if let Err(err) = run_deploy(cli).await {
        println!(
            "{} {}",
            style("Error from github deployments:").red(),
            user_message(&err)
        );
        std::process::exit(EXIT_FAILURE);
    }
}

/// Load deploy.toml and layer environment variables and flags on top.
fn load_config(cli: &Cli) -> Result<(ConfigStore, DeployConfig)> {
    let store = ConfigStore::with_defaults()?;
    let mut config = store.load()?;
    config.apply_env();

    if let Some(url) = &cli.github {
        config.github.api_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.deploy.timeout_secs = secs;
    }
    config.validate()?;

    Ok((store, config))
}

async fn run_deploy(cli: Cli) -> Result<()> {
    let (store, mut config) = load_config(&cli)?;
    let cwd = std::env::current_dir()?;

    let mut out: Box<dyn Write> = if cli.quiet {
        Box::new(io::sink())
    } else {
        Box::new(io::stdout())
    };

    if config.github.token.is_none() {
        let token = prompt::github_token(&store)?;
        config.github.token = Some(token);
    }

    let args: Vec<String> = cli.repo.iter().cloned().collect();
    let remotes = if args.is_empty() {
        LocalRepo::discover(&cwd)?.remotes()?
    } else {
        Vec::new()
    };
    let nwo = repo_from_args(&args, &remotes, &config.github.host)?;
    let repo = split_repo(&nwo, config.deploy.default_org.as_deref())?;

    let env = cli
        .env
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or(DeployError::MissingFlag("env"))?;
    let environment = alias_environment(env);
    let reference = resolve_ref(cli.reference.as_deref(), || current_branch(&cwd));

    let options = DeployOptions::new(repo, reference, environment)
        .with_force(cli.force)
        .with_detached(cli.detached)
        .with_timeout(config.timeout())
        .with_poll_interval(config.poll_interval());
    tracing::debug!(
        repo = %options.repo,
        reference = %options.reference,
        environment = %options.environment,
        "resolved deploy options"
    );

    let deployer = Deployer::from_config(&config, prompt::confirm)?;
    deployer.run(&options, &mut out).await?;
    out.flush()?;

    Ok(())
}

fn current_branch(cwd: &Path) -> Result<String> {
    LocalRepo::discover(cwd)?.head()
}

async fn run_update(cli: &Cli) -> Result<()> {
    let (_, config) = load_config(cli)?;
    let client = GitHubClient::new(&config.github.api_url, config.github.token.clone())?;
    let updater = Updater::new(client, &config.github.host)?;

    match updater.update().await? {
        UpdateOutcome::NoRelease => {
            println!("There is no newer version of deploy available.");
        }
        UpdateOutcome::UpToDate(version) => {
            println!("You're already on the latest version: {}", version);
        }
        UpdateOutcome::Updated { version, path } => {
            println!(
                "{} Updated {} to {}",
                style("✓").green(),
                path.display(),
                version
            );
        }
    }

    Ok(())
}
