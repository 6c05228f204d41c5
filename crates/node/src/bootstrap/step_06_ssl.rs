//! Bootstrap step 6: TLS material verification.
//!
//! When SSL is enabled, the certificate and key must exist and the
//! certificate must parse and be within its validity window. An expiring
//! (but unexpired) certificate is the health layer's concern, not a
//! startup gate.

use super::Bootstrap;
use crate::error::{Error, Result};

use chrono::Utc;
use tracing::info;
use x509_parser::pem::parse_x509_pem;

pub async fn execute(bootstrap: &mut Bootstrap) -> Result<()> {
    let ssl = &bootstrap.config().server.ssl;
    if !ssl.enabled {
        info!("ssl disabled, skipping certificate verification");
        return Ok(());
    }

    for path in [&ssl.cert_file, &ssl.key_file] {
        if !path.exists() {
            return Err(Error::MissingTlsFile(path.clone()));
        }
    }

    let pem_bytes = std::fs::read(&ssl.cert_file)
        .map_err(|e| Error::Io("failed to read certificate", e))?;
    let (_, pem) = parse_x509_pem(&pem_bytes)
        .map_err(|_| Error::CertificateInvalid(ssl.cert_file.clone()))?;
    let certificate = pem
        .parse_x509()
        .map_err(|_| Error::CertificateInvalid(ssl.cert_file.clone()))?;

    let not_after = certificate.validity().not_after.timestamp();
    if not_after <= Utc::now().timestamp() {
        return Err(Error::CertificateExpired(ssl.cert_file.clone()));
    }

    info!("certificate valid until unix time {not_after}");
    Ok(())
}
