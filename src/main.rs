//! `pactum` command line: verify providers, publish contracts, ask the broker
//! whether a version can be deployed, and inspect local contract files.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use pactum::domain::contract::{diff_contracts, io as contract_io, Contract};
use pactum::infra::broker_client::BrokerClient;
use pactum::infra::{config, telemetry};
use pactum::verifier::{Reporter, Verifier, VerifierConfig};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pactum", version, about = "Consumer-driven contract testing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify a provider against a contract file
    Verify(VerifyArgs),
    /// Publish contract files to a broker
    Publish(PublishArgs),
    /// Check whether a pacticipant version can be deployed
    CanIDeploy(CanIDeployArgs),
    /// Show the differences between two contract files
    Diff(DiffArgs),
    /// List contract files in a directory
    List(ListArgs),
    /// Show the interactions of a contract file
    Show(ShowArgs),
}

#[derive(Args)]
struct BrokerArgs {
    /// Base URL of the broker
    #[arg(long)]
    broker_url: String,
    /// Bearer token (falls back to PACTUM_BROKER_TOKEN)
    #[arg(long)]
    broker_token: Option<String>,
}

impl BrokerArgs {
    fn client(&self, timeout: Duration) -> anyhow::Result<BrokerClient> {
        let client = BrokerClient::new(&self.broker_url, timeout)?;
        Ok(match self.broker_token.clone().or_else(config::broker_token) {
            Some(token) => client.with_token(token),
            None => client,
        })
    }
}

#[derive(Args)]
struct VerifyArgs {
    /// Path to the contract file
    #[arg(long)]
    pact_file: PathBuf,
    /// Base URL of the provider under test
    #[arg(long)]
    provider_base_url: String,
    /// URL that establishes provider states
    #[arg(long)]
    provider_states_setup_url: Option<String>,
    /// Per-request timeout in seconds (falls back to PACTUM_HTTP_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Also show passing interactions in detail
    #[arg(long)]
    verbose: bool,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
    /// Publish the outcome to this broker
    #[arg(long, requires = "provider_version")]
    publish_to: Option<String>,
    /// Provider version recorded with the published outcome
    #[arg(long)]
    provider_version: Option<String>,
    /// Consumer version the outcome applies to (defaults to the contract's version)
    #[arg(long)]
    consumer_version: Option<String>,
    #[arg(long)]
    broker_token: Option<String>,
}

#[derive(Args)]
struct PublishArgs {
    #[command(flatten)]
    broker: BrokerArgs,
    /// Single contract file to publish
    #[arg(long, conflicts_with = "pact_dir", required_unless_present = "pact_dir")]
    pact_file: Option<PathBuf>,
    /// Publish every *.json file in this directory
    #[arg(long)]
    pact_dir: Option<PathBuf>,
    /// Version of the consumer
    #[arg(long)]
    consumer_version: String,
}

#[derive(Args)]
struct CanIDeployArgs {
    #[command(flatten)]
    broker: BrokerArgs,
    #[arg(long)]
    pacticipant: String,
    #[arg(long)]
    version: String,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DiffArgs {
    #[arg(long)]
    old: PathBuf,
    #[arg(long)]
    new: PathBuf,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ListArgs {
    /// Directory containing contract files
    #[arg(long, default_value = ".")]
    dir: PathBuf,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ShowArgs {
    /// Path to the contract file
    #[arg(long)]
    pact_file: PathBuf,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    config::load_dotenv();
    telemetry::init_tracing("warn", config::log_json());

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Verify(args) => verify(args).await,
        Command::Publish(args) => publish(args).await,
        Command::CanIDeploy(args) => can_i_deploy(args).await,
        Command::Diff(args) => diff(args),
        Command::List(args) => list(args),
        Command::Show(args) => show(args),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn timeout(override_secs: Option<u64>) -> anyhow::Result<Duration> {
    match override_secs {
        Some(secs) => Ok(Duration::from_secs(secs.max(1))),
        None => config::http_timeout(),
    }
}

fn read_contract(path: &Path) -> anyhow::Result<Contract> {
    contract_io::read_file(path).with_context(|| format!("failed to load {}", path.display()))
}

/// `Ok(false)` means the provider did not satisfy the contract.
async fn verify(args: VerifyArgs) -> anyhow::Result<bool> {
    let contract = read_contract(&args.pact_file)?;
    contract.validate().context("invalid contract")?;

    let mut verifier_config =
        VerifierConfig::new(args.provider_base_url.as_str()).with_timeout(timeout(args.timeout_secs)?);
    if let Some(url) = args.provider_states_setup_url.as_deref() {
        verifier_config = verifier_config.with_provider_states_setup_url(url);
    }
    let verifier = Verifier::new(verifier_config)?;
    let result = verifier.verify(&contract).await;

    let stdout = std::io::stdout();
    let mut reporter = Reporter::new(stdout.lock()).verbose(args.verbose);
    if args.json {
        reporter.report_json(&result)?;
    } else {
        reporter.report(&result)?;
    }

    if let Some(broker_url) = args.publish_to {
        let broker = BrokerArgs {
            broker_url,
            broker_token: args.broker_token,
        };
        let consumer_version = args
            .consumer_version
            .unwrap_or_else(|| contract.version().to_string());
        broker
            .client(timeout(args.timeout_secs)?)?
            .record_verification(
                &contract.consumer.name,
                &contract.provider.name,
                &consumer_version,
                result.success,
                args.provider_version.as_deref(),
            )
            .await
            .context("failed to publish verification result")?;
        eprintln!("Verification result published to broker");
    }

    if !result.success {
        eprintln!("verification failed: {} interactions failed", result.failed_count());
    }
    Ok(result.success)
}

async fn publish(args: PublishArgs) -> anyhow::Result<bool> {
    let files = match (&args.pact_file, &args.pact_dir) {
        (Some(file), _) => vec![file.clone()],
        (None, Some(dir)) => contract_io::contract_files_in(dir)?,
        (None, None) => bail!("either --pact-file or --pact-dir is required"),
    };
    if files.is_empty() {
        bail!("no contract files found");
    }

    let client = args.broker.client(config::http_timeout()?)?;
    let mut out = std::io::stdout().lock();
    for file in &files {
        let contract = read_contract(file)?;
        client
            .publish(&contract, &args.consumer_version)
            .await
            .with_context(|| format!("failed to publish {}", file.display()))?;
        let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        writeln!(out, "Contract {} published successfully", name)?;
    }
    Ok(true)
}

async fn can_i_deploy(args: CanIDeployArgs) -> anyhow::Result<bool> {
    let client = args.broker.client(config::http_timeout()?)?;
    let matrix = client
        .can_i_deploy(&args.pacticipant, &args.version)
        .await
        .context("failed to query broker")?;

    let mut out = std::io::stdout().lock();
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&matrix)?)?;
    } else {
        let verdict = if matrix.deployable { "can" } else { "cannot" };
        writeln!(out, "{} version {} {} be deployed", args.pacticipant, args.version, verdict)?;
        writeln!(out, "Reason: {}", matrix.summary.reason)?;
    }
    Ok(matrix.deployable)
}

fn diff(args: DiffArgs) -> anyhow::Result<bool> {
    let old = read_contract(&args.old)?;
    let new = read_contract(&args.new)?;
    let diff = diff_contracts(&old, &new);

    let mut out = std::io::stdout().lock();
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&diff)?)?;
        return Ok(true);
    }
    if !diff.has_differences {
        writeln!(out, "No differences found")?;
        return Ok(true);
    }

    writeln!(out, "Differences found:")?;
    for change in &diff.metadata {
        writeln!(out, "\n  {} changed:", change.field)?;
        writeln!(out, "    - {} (old)", change.old_value)?;
        writeln!(out, "    + {} (new)", change.new_value)?;
    }
    for (title, marker, items) in [
        ("added", '+', &diff.added),
        ("removed", '-', &diff.removed),
        ("modified", '~', &diff.modified),
    ] {
        if items.is_empty() {
            continue;
        }
        writeln!(out, "\n  Interactions {}:", title)?;
        for description in items {
            writeln!(out, "    {} {}", marker, description)?;
        }
    }
    Ok(true)
}

#[derive(Serialize)]
struct ListedContract {
    file: String,
    consumer: String,
    provider: String,
}

fn list(args: ListArgs) -> anyhow::Result<bool> {
    if !args.dir.is_dir() {
        bail!("not a directory: {}", args.dir.display());
    }

    let mut listed = Vec::new();
    for path in contract_io::contract_files_in(&args.dir)? {
        // Files that are not contracts are skipped.
        let Ok(contract) = contract_io::read_file(&path) else {
            continue;
        };
        listed.push(ListedContract {
            file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            consumer: contract.consumer.name,
            provider: contract.provider.name,
        });
    }

    let mut out = std::io::stdout().lock();
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&listed)?)?;
    } else if listed.is_empty() {
        writeln!(out, "No contracts found")?;
    } else {
        writeln!(out, "Contracts:")?;
        for c in &listed {
            writeln!(out, "  {}", c.file)?;
            writeln!(out, "    Consumer: {}", c.consumer)?;
            writeln!(out, "    Provider: {}", c.provider)?;
        }
    }
    Ok(true)
}

fn show(args: ShowArgs) -> anyhow::Result<bool> {
    let contract = read_contract(&args.pact_file)?;
    let mut out = std::io::stdout().lock();
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&contract)?)?;
    } else {
        Reporter::new(out).describe(&contract)?;
    }
    Ok(true)
}
