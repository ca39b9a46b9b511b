//! Certificate expiry inspection
//!
//! Reads a PEM certificate from certbot's live directory layout
//! (`{live_dir}/{domain}/fullchain.pem`) and reports how long it has left.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use x509_parser::pem::Pem;

/// Days before expiry at which certbot's default renewal window opens
pub const RENEWAL_WINDOW_DAYS: i64 = 30;

/// Expiry status of an inspected certificate
#[derive(Debug, Clone)]
pub struct CertificateStatus {
    /// notAfter timestamp of the leaf certificate
    pub not_after: DateTime<Utc>,
    /// Whole days until expiry (negative once expired)
    pub days_remaining: i64,
}

impl CertificateStatus {
    /// Whether the certificate has already expired
    pub fn is_expired(&self) -> bool {
        self.days_remaining < 0
    }

    /// Whether the certificate is inside the renewal window
    pub fn due_for_renewal(&self) -> bool {
        self.days_remaining <= RENEWAL_WINDOW_DAYS
    }
}

/// Path of the certificate for a domain under certbot's live directory
pub fn live_cert_path(live_dir: &Path, domain: &str) -> PathBuf {
    live_dir.join(domain).join("fullchain.pem")
}

/// Inspect the first certificate in a PEM buffer
///
/// A fullchain file starts with the leaf certificate; intermediates are
/// ignored.
pub fn inspect_pem(pem_data: &[u8]) -> Result<CertificateStatus> {
    let pem = Pem::iter_from_buffer(pem_data)
        .next()
        .ok_or_else(|| anyhow!("No PEM block found"))?
        .map_err(|e| anyhow!("Invalid PEM data: {}", e))?;

    let cert = pem
        .parse_x509()
        .map_err(|e| anyhow!("Not an X.509 certificate: {}", e))?;

    let not_after = DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0)
        .ok_or_else(|| anyhow!("Certificate notAfter timestamp out of range"))?;

    let days_remaining = (not_after - Utc::now()).num_days();

    Ok(CertificateStatus {
        not_after,
        days_remaining,
    })
}

/// Inspect a PEM certificate file on disk
pub fn inspect_file(path: &Path) -> Result<CertificateStatus> {
    let pem_data = std::fs::read(path)
        .with_context(|| format!("Failed to read certificate: {}", path.display()))?;
    inspect_pem(&pem_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{CertificateParams, KeyPair, date_time_ymd};

    fn self_signed_pem(not_after_year: i32) -> String {
        let mut params = CertificateParams::new(vec!["example.com".to_string()])
            .expect("valid certificate params");
        params.not_after = date_time_ymd(not_after_year, 1, 1);
        let key_pair = KeyPair::generate().expect("key generation");
        params.self_signed(&key_pair).expect("self-signing").pem()
    }

    #[test]
    fn live_cert_path_layout() {
        let path = live_cert_path(Path::new("/etc/letsencrypt/live"), "example.com");
        assert_eq!(
            path,
            Path::new("/etc/letsencrypt/live/example.com/fullchain.pem")
        );
    }

    #[test]
    fn far_future_cert_is_not_due() {
        let pem = self_signed_pem(2050);
        let status = inspect_pem(pem.as_bytes()).unwrap();

        assert!(status.days_remaining > RENEWAL_WINDOW_DAYS);
        assert!(!status.is_expired());
        assert!(!status.due_for_renewal());
    }

    #[test]
    fn expired_cert_is_due_for_renewal() {
        let pem = self_signed_pem(2020);
        let status = inspect_pem(pem.as_bytes()).unwrap();

        assert!(status.days_remaining < 0);
        assert!(status.is_expired());
        assert!(status.due_for_renewal());
    }

    #[test]
    fn garbage_input_is_an_error() {
        assert!(inspect_pem(b"not a certificate").is_err());
        assert!(inspect_pem(b"").is_err());
    }

    #[test]
    fn inspect_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let live_dir = dir.path();
        std::fs::create_dir(live_dir.join("example.com")).unwrap();

        let path = live_cert_path(live_dir, "example.com");
        std::fs::write(&path, self_signed_pem(2050)).unwrap();

        let status = inspect_file(&path).unwrap();
        assert!(!status.is_expired());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = inspect_file(Path::new("/nonexistent/fullchain.pem")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
