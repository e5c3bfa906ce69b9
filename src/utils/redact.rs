//! Credential redaction for log output

use url::Url;

const MASK: &str = "***";

/// Mask the password of a connection URL so it can be logged
///
/// Unparseable input is replaced entirely since it may still carry secrets.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                // Only fails for URLs that cannot carry credentials
                let _ = url.set_password(Some(MASK));
            }
            url.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}
