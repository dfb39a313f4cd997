//! Listwise daemon: entry point for the business claim service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use listwise_claims::{
    ClaimDeps, ClaimService, HttpMailer, Mailer, ServiceConfig, ShutdownController,
    StoreNotifier, UnconfiguredMailer,
};
use listwise_crypto::OsCodeGenerator;
use listwise_rpc::RpcServer;
use listwise_store_lmdb::LmdbEnvironment;
use listwise_types::{Clock, SystemClock};
use listwise_utils::{format_duration, init_logging, LogFormat};
use listwise_verification::DohResolver;

#[derive(Parser)]
#[command(name = "listwise-daemon", about = "Business ownership claim service")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "LISTWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for LMDB storage.
    #[arg(long, env = "LISTWISE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HTTP API port.
    #[arg(long, env = "LISTWISE_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "LISTWISE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "LISTWISE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// DNS-over-HTTPS endpoint used for TXT lookups.
    #[arg(long, env = "LISTWISE_DOH_ENDPOINT")]
    doh_endpoint: Option<String>,

    /// HTTP mail API endpoint. Email claims are refused when unset.
    #[arg(long, env = "LISTWISE_MAIL_ENDPOINT")]
    mail_endpoint: Option<String>,

    /// Bearer token for the mail API.
    #[arg(long, env = "LISTWISE_MAIL_API_KEY", hide_env_values = true)]
    mail_api_key: Option<String>,

    /// Moderator user ids (comma-separated) that receive new-claim alerts.
    #[arg(long, env = "LISTWISE_MODERATORS", value_delimiter = ',')]
    moderators: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the claim service.
    Run,
    /// Print the effective configuration as TOML and exit.
    PrintConfig,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(ServiceConfig, Command)> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_toml_file(&path.to_string_lossy())?,
            None => ServiceConfig::default(),
        };
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(endpoint) = self.doh_endpoint {
            config.dns.doh_endpoint = endpoint;
        }
        if self.mail_endpoint.is_some() {
            config.mail.endpoint = self.mail_endpoint;
        }
        if self.mail_api_key.is_some() {
            config.mail.api_key = self.mail_api_key;
        }
        if !self.moderators.is_empty() {
            config.moderators = self.moderators;
        }
        Ok((config, self.command))
    }
}

fn build_mailer(config: &ServiceConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    match &config.mail.endpoint {
        Some(endpoint) => {
            let mailer = HttpMailer::new(
                endpoint.clone(),
                config.mail.api_key.clone(),
                config.mail.from.clone(),
                config.policy.otp_ttl_secs,
                config.policy.mail_timeout(),
            )
            .context("building mail client")?;
            Ok(Arc::new(mailer))
        }
        None => {
            tracing::warn!("no mail endpoint configured; email claims will be refused");
            Ok(Arc::new(UnconfiguredMailer))
        }
    }
}

async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    let moderators = config.moderator_ids()?;
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size)
        .with_context(|| format!("opening store at {}", config.data_dir.display()))?;
    let store = Arc::new(env);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let resolver = DohResolver::new(config.dns.doh_endpoint.clone(), config.policy.dns_timeout())
        .context("building DNS resolver")?;
    let deps = ClaimDeps {
        store: store.clone(),
        clock: clock.clone(),
        codes: Arc::new(OsCodeGenerator),
        mailer: build_mailer(&config)?,
        notifier: Arc::new(StoreNotifier::new(store, clock)),
        resolver: Arc::new(resolver),
    };
    let service = Arc::new(ClaimService::new(deps, config.policy, moderators));

    tracing::info!(
        data_dir = %config.data_dir.display(),
        rpc_port = config.rpc_port,
        otp_ttl = %format_duration(config.policy.otp_ttl_secs),
        resend_cooldown = %format_duration(config.policy.resend_cooldown_secs),
        moderators = config.moderators.len(),
        "starting Listwise claim service"
    );

    let shutdown = Arc::new(ShutdownController::new());
    let server = RpcServer::new(config.rpc_port, service);
    let rx = shutdown.subscribe();
    let server_task = tokio::spawn(async move { server.start(rx).await });

    let signals = shutdown.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    server_task
        .await
        .context("RPC server task panicked")?
        .context("RPC server failed")?;
    tracing::info!("Listwise daemon exited cleanly");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, command) = Cli::parse().into_config()?;

    match command {
        Command::PrintConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Command::Run => {
            init_logging(config.log_format, &config.log_level);
            run(config).await
        }
    }
}
