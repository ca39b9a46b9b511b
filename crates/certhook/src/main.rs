// # certhook - certificate automation CLI
//
// Thin orchestration layer over the external ACME client (certbot) and the
// certhook-core provider abstraction:
//
// 1. `issue` spawns certbot in manual DNS-01 mode pointed at the
//    certhook-auth-hook / certhook-cleanup-hook binaries
// 2. `renew` / `revoke` are thin certbot invocations
// 3. `expiry` inspects the on-disk certificate certbot produced
// 4. `providers` / `domains` / `check` expose the provider registry and an
//    advisory propagation lookup
//
// Provider credentials are never passed on the command line; each provider
// declares the environment variable that must carry its token
// (e.g. `DIGITALOCEAN_API_TOKEN`).

mod certbot;
mod certinfo;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

use certhook_core::propagation::PropagationChecker;
use certhook_core::{DnsProvider, ProviderRegistry, config, hooks};

#[derive(Debug, Parser)]
#[command(name = "certhook", version, about = "TLS certificate automation via certbot DNS-01 hooks")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CERTHOOK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Issue a certificate for a domain via the DNS-01 challenge
    Issue {
        /// Fully-qualified domain to issue for
        #[arg(long)]
        domain: String,

        /// DNS provider registry key
        #[arg(long, env = "DNS_PROVIDER", default_value = config::DEFAULT_PROVIDER)]
        provider: String,
    },

    /// Renew all certificates that are due
    Renew,

    /// Revoke the certificate for a domain
    Revoke {
        /// Domain whose certificate should be revoked
        #[arg(long)]
        domain: String,

        /// Certbot live directory
        #[arg(long, default_value = "/etc/letsencrypt/live")]
        live_dir: PathBuf,
    },

    /// Report certificate expiry for a domain
    Expiry {
        /// Domain whose certificate should be inspected
        #[arg(long)]
        domain: String,

        /// Certbot live directory
        #[arg(long, default_value = "/etc/letsencrypt/live")]
        live_dir: PathBuf,
    },

    /// List registered DNS providers
    Providers,

    /// List domains managed by a provider account
    Domains {
        /// DNS provider registry key
        #[arg(long, env = "DNS_PROVIDER", default_value = config::DEFAULT_PROVIDER)]
        provider: String,
    },

    /// Check whether a challenge TXT record has propagated (advisory)
    Check {
        /// Fully-qualified domain under validation
        #[arg(long)]
        domain: String,

        /// Expected TXT value; any value matches when omitted
        #[arg(long)]
        value: Option<String>,
    },
}

/// Build the registry of compiled-in providers
fn builtin_registry() -> ProviderRegistry {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "digitalocean")]
    certhook_provider_digitalocean::register(&registry);

    registry
}

fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_log_level(&cli.log_level))
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<()> {
    let registry = builtin_registry();

    match command {
        Command::Issue { domain, provider } => {
            // Fail on a bad provider or domain before spawning certbot
            registry.get(&provider)?;
            config::validate_domain_name(&domain)?;
            certbot::run_certonly(&domain, &provider).await
        }

        Command::Renew => certbot::run_renew().await,

        Command::Revoke { domain, live_dir } => {
            let cert_path = certinfo::live_cert_path(&live_dir, &domain);
            certbot::run_revoke(&cert_path).await
        }

        Command::Expiry { domain, live_dir } => {
            let cert_path = certinfo::live_cert_path(&live_dir, &domain);
            let status = certinfo::inspect_file(&cert_path)?;

            println!("Certificate: {}", cert_path.display());
            println!("Expires:     {}", status.not_after.format("%Y-%m-%d %H:%M:%S UTC"));
            if status.is_expired() {
                println!("Status:      EXPIRED ({} days ago)", -status.days_remaining);
            } else if status.due_for_renewal() {
                println!("Status:      due for renewal ({} days left)", status.days_remaining);
            } else {
                println!("Status:      valid ({} days left)", status.days_remaining);
            }
            Ok(())
        }

        Command::Providers => {
            for name in registry.list_providers() {
                println!("{}", name);
            }
            Ok(())
        }

        Command::Domains { provider } => {
            let provider = hooks::resolve_provider(&registry, &provider)?;
            for domain in provider.fetch_domains().await? {
                println!("{}", domain);
            }
            Ok(())
        }

        Command::Check { domain, value } => {
            config::validate_domain_name(&domain)?;
            let checker = PropagationChecker::new()?;

            if checker.check(&domain, value.as_deref()).await? {
                println!("propagated");
            } else {
                println!("not yet propagated");
            }
            Ok(())
        }
    }
}
