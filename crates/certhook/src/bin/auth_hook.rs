// # certhook-auth-hook
//
// certbot `--manual-auth-hook` entry point. One process per challenge:
// reads `CERTBOT_DOMAIN` and `CERTBOT_VALIDATION` from the environment,
// creates the challenge TXT record through the configured DNS provider, and
// blocks for the propagation delay before exiting.
//
// Exit codes: 0 success, 1 configuration error, 2 provider error.

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::FmtSubscriber;

use certhook_core::ProviderRegistry;
use certhook_core::hooks::{self, HookExitCode};

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HookExitCode::ProviderError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HookExitCode::ProviderError.into();
        }
    };

    rt.block_on(async {
        let registry = ProviderRegistry::new();

        #[cfg(feature = "digitalocean")]
        certhook_provider_digitalocean::register(&registry);

        match hooks::run_auth_hook(&registry).await {
            Ok(()) => HookExitCode::Success.into(),
            Err(e) => {
                error!("Auth hook failed: {}", e);
                HookExitCode::for_error(&e).into()
            }
        }
    })
}
