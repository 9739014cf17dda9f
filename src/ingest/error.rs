// src/ingest/error.rs
use thiserror::Error;

/// Failures raised while constructing adapters or talking to sources.
///
/// `MissingCredentials`, `UnknownAdapter` and `InvalidMode` are configuration
/// errors and surface at construction time. The rest are runtime failures that
/// the aggregator isolates per adapter.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{}", missing_credentials_message(.adapter, .env_vars, .setup_url.as_deref()))]
    MissingCredentials {
        adapter: String,
        env_vars: Vec<String>,
        setup_url: Option<String>,
    },
    #[error("Unknown adapter '{name}'. Available: {}", .available.join(", "))]
    UnknownAdapter { name: String, available: Vec<String> },
    #[error("Invalid mode '{0}'. Expected one of: online, seed, auto")]
    InvalidMode(String),
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: &'static str,
        url: String,
        message: String,
    },
    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    /// Transport failures and HTTP error statuses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Transport { .. })
    }

    pub fn missing_credentials(adapter: &str, env_vars: &[&str], setup_url: Option<&str>) -> Self {
        Self::MissingCredentials {
            adapter: adapter.to_string(),
            env_vars: env_vars.iter().map(|v| v.to_string()).collect(),
            setup_url: setup_url.map(str::to_string),
        }
    }
}

fn missing_credentials_message(adapter: &str, env_vars: &[String], setup_url: Option<&str>) -> String {
    let mut msg = format!(
        "[{adapter}] Online mode requires API key(s). Set environment variable(s): {}",
        env_vars.join(", ")
    );
    if let Some(url) = setup_url {
        msg.push_str("\nSetup guide: ");
        msg.push_str(url);
    }
    msg
}
