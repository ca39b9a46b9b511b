//! External ACME client invocation
//!
//! Spawns certbot in manual DNS-01 mode pointed at the certhook hook
//! binaries, blocks on it, and surfaces its exit status. Retry and backoff
//! across challenge attempts are certbot's concern, not ours.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::info;

/// Name of the external ACME client binary, resolved via PATH
pub const CERTBOT_BIN: &str = "certbot";

/// Arguments for a manual DNS-01 certonly run
pub fn certonly_args(domain: &str, auth_hook: &Path, cleanup_hook: &Path) -> Vec<String> {
    vec![
        "certonly".to_string(),
        "--manual".to_string(),
        "--preferred-challenges=dns".to_string(),
        "--manual-public-ip-logging-ok".to_string(),
        "-d".to_string(),
        domain.to_string(),
        "--manual-auth-hook".to_string(),
        auth_hook.display().to_string(),
        "--manual-cleanup-hook".to_string(),
        cleanup_hook.display().to_string(),
        "--non-interactive".to_string(),
    ]
}

/// Locate the hook binaries installed alongside the CLI executable
pub fn hook_paths() -> Result<(PathBuf, PathBuf)> {
    let exe = std::env::current_exe().context("Failed to locate current executable")?;
    let dir = exe
        .parent()
        .context("Executable has no parent directory")?;

    let auth_hook = dir.join("certhook-auth-hook");
    let cleanup_hook = dir.join("certhook-cleanup-hook");

    if !auth_hook.exists() || !cleanup_hook.exists() {
        bail!(
            "Hook binaries not found next to {}; \
            install certhook-auth-hook and certhook-cleanup-hook alongside the CLI",
            exe.display()
        );
    }

    Ok((auth_hook, cleanup_hook))
}

/// Run `certbot certonly` for a domain, wiring in the challenge hooks
///
/// The provider name is passed to the hook processes through the
/// `DNS_PROVIDER` environment variable; the hooks resolve the credential
/// themselves from the provider's declared variable.
pub async fn run_certonly(domain: &str, provider: &str) -> Result<()> {
    let (auth_hook, cleanup_hook) = hook_paths()?;
    let args = certonly_args(domain, &auth_hook, &cleanup_hook);

    info!(command = %format!("{} {}", CERTBOT_BIN, args.join(" ")), "Invoking certbot");

    let status = Command::new(CERTBOT_BIN)
        .args(&args)
        .env("DNS_PROVIDER", provider)
        .status()
        .await
        .context("Failed to spawn certbot; is it installed?")?;

    if !status.success() {
        bail!("certbot exited with status {}", status);
    }

    info!(domain, "Certificate issued");
    Ok(())
}

/// Run `certbot renew` for all managed certificates
pub async fn run_renew() -> Result<()> {
    info!(command = %format!("{} renew --non-interactive", CERTBOT_BIN), "Invoking certbot");

    let status = Command::new(CERTBOT_BIN)
        .args(["renew", "--non-interactive"])
        .status()
        .await
        .context("Failed to spawn certbot; is it installed?")?;

    if !status.success() {
        bail!("certbot exited with status {}", status);
    }
    Ok(())
}

/// Run `certbot revoke` for a certificate file
pub async fn run_revoke(cert_path: &Path) -> Result<()> {
    let cert_path = cert_path.display().to_string();
    info!(
        command = %format!("{} revoke --cert-path {} --non-interactive", CERTBOT_BIN, cert_path),
        "Invoking certbot"
    );

    let status = Command::new(CERTBOT_BIN)
        .args(["revoke", "--cert-path", &cert_path, "--non-interactive"])
        .status()
        .await
        .context("Failed to spawn certbot; is it installed?")?;

    if !status.success() {
        bail!("certbot exited with status {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certonly_args_select_manual_dns_mode() {
        let args = certonly_args(
            "www.example.com",
            Path::new("/usr/local/bin/certhook-auth-hook"),
            Path::new("/usr/local/bin/certhook-cleanup-hook"),
        );

        assert_eq!(args[0], "certonly");
        assert!(args.contains(&"--manual".to_string()));
        assert!(args.contains(&"--preferred-challenges=dns".to_string()));
        assert!(args.contains(&"--non-interactive".to_string()));

        let d = args.iter().position(|a| a == "-d").unwrap();
        assert_eq!(args[d + 1], "www.example.com");

        let auth = args.iter().position(|a| a == "--manual-auth-hook").unwrap();
        assert_eq!(args[auth + 1], "/usr/local/bin/certhook-auth-hook");

        let cleanup = args
            .iter()
            .position(|a| a == "--manual-cleanup-hook")
            .unwrap();
        assert_eq!(args[cleanup + 1], "/usr/local/bin/certhook-cleanup-hook");
    }
}
