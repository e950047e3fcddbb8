//! decision-relay command-line front end
//!
//! - `submit`: validate, gate, route and deliver one decision
//! - `lookup`: fresh reviewer lookup of one request
//! - `outbox`: list decisions kept after failed deliveries

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use decision_outbox::{Outbox, DEFAULT_OUTBOX_PATH};
use decision_relay::config::env_provider;
use decision_relay::{
    lookup_request, DecisionSubmitter, FlowKind, FormState, InboundParams, RelayConfig,
    SubmissionError,
};
use log::debug;
use relay_sdk::config::{load_dotenv, CompositeConfigProvider, MemoryConfigProvider};
use relay_sdk::ConfigProvider;

/// Relay approval decisions to automation webhooks
#[derive(Parser)]
#[command(name = "decision-relay")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Values that take precedence over the environment
#[derive(Args)]
struct Overrides {
    /// Fallback webhook URL
    #[arg(long, global = true)]
    fallback_url: Option<String>,

    /// Per-attempt timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Delivery attempts, including the first
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// Outbox file for undelivered decisions
    #[arg(long, global = true)]
    outbox_path: Option<PathBuf>,
}

impl Overrides {
    fn provider(&self) -> MemoryConfigProvider {
        let mut provider = MemoryConfigProvider::new();
        if let Some(url) = &self.fallback_url {
            provider.set("fallback_webhook_url", url);
        }
        if let Some(timeout) = self.timeout {
            provider.set("timeout_seconds", timeout);
        }
        if let Some(attempts) = self.max_attempts {
            provider.set("max_attempts", attempts);
        }
        if let Some(path) = &self.outbox_path {
            provider.set("outbox_path", path.display());
        }
        provider
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a decision
    Submit {
        /// requester, admin or owner
        #[arg(long, default_value = "requester")]
        flow: FlowKind,

        /// Tracking identifier (defaults to `id` from --query)
        #[arg(long)]
        id: Option<String>,

        /// Positive choice
        #[arg(long, visible_alias = "approve")]
        agree: bool,

        /// Negative choice
        #[arg(long, visible_alias = "decline")]
        disagree: bool,

        /// Reason, required for a negative choice
        #[arg(long)]
        reason: Option<String>,

        /// Inbound query string or page URL carrying `id` and `resume`
        #[arg(long)]
        query: Option<String>,
    },

    /// Look up a request in the store, bypassing the cache
    Lookup {
        #[arg(long, default_value = "admin")]
        flow: FlowKind,

        #[arg(long)]
        id: String,
    },

    /// List decisions kept after failed deliveries
    Outbox {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err
                .downcast_ref::<SubmissionError>()
                .map(SubmissionError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

fn provider_for(kind: FlowKind, overrides: &Overrides) -> impl ConfigProvider {
    CompositeConfigProvider::new()
        .with_provider(overrides.provider())
        .with_provider(env_provider(kind))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Submit {
            flow,
            id,
            agree,
            disagree,
            reason,
            query,
        } => {
            let config = RelayConfig::from_provider(flow, &provider_for(flow, &cli.overrides))?;
            let submitter = DecisionSubmitter::from_config(&config)?;

            let params = query.as_deref().map(InboundParams::parse).unwrap_or_default();
            let id = id
                .or_else(|| params.id().map(str::to_string))
                .unwrap_or_default();
            debug!("Submitting for '{}' via {} flow", id, flow);

            let mut form = FormState::new(id).with_flags(agree, disagree);
            form.reason = reason;
            form.resume_url = params.resume_url().map(str::to_string);

            let outcome = submitter.submit(&form).await?;

            println!(
                "Submitted: {} = {} ({} attempt(s), HTTP {})",
                outcome.id, outcome.decision, outcome.attempts, outcome.status
            );
            println!("Destination: {} [{}]", outcome.target.url, outcome.target.source);
            if let Some(response) = outcome.response_excerpt {
                println!("Server response: {}", response);
            }
        }

        Commands::Lookup { flow, id } => {
            let config = RelayConfig::from_provider(flow, &provider_for(flow, &cli.overrides))?;
            let store = config.build_store()?.ok_or_else(|| {
                SubmissionError::configuration("lookup needs spreadsheet_id and worksheet")
            })?;

            match lookup_request(&store, &id).await? {
                Some(record) => {
                    println!("ID: {}", record.id);
                    println!("State: {}", record.state);
                    println!("Reason: {}", record.reason.as_deref().unwrap_or("-"));
                    println!("Authorize: {}", record.authorize.as_deref().unwrap_or("-"));
                }
                None => println!("No request found for '{}'", id.trim()),
            }
        }

        Commands::Outbox { path } => {
            let path = path
                .or_else(|| cli.overrides.outbox_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTBOX_PATH));
            let outbox = Outbox::at(&path);
            let entries = outbox
                .read_all()
                .with_context(|| format!("reading outbox {}", path.display()))?;

            if entries.is_empty() {
                println!("Outbox {} is empty", path.display());
            }
            for entry in entries {
                println!(
                    "{} {} {} -> {} ({} attempt(s)): {}",
                    entry.recorded_at.to_rfc3339(),
                    entry.flow,
                    entry.payload["id"].as_str().unwrap_or("?"),
                    entry.target.as_deref().unwrap_or("-"),
                    entry.attempts,
                    entry.last_error
                );
            }
        }
    }

    Ok(())
}
