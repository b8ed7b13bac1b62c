use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Failed to read config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of the text-generation collaborator. Never fatal for a run.
#[derive(Debug, Error)]
pub(crate) enum EnrichError {
    #[error("enrichment request failed: {0}")]
    Http(String),

    #[error("enrichment service returned status {0}")]
    Status(u16),

    #[error("failed to decode enrichment response: {0}")]
    Decode(String),

    #[error("enrichment response carried no JSON object")]
    NoPayload,
}

/// Failures of the repository-metadata collaborator. Never fatal for a run.
#[derive(Debug, Error)]
pub(crate) enum RepoError {
    #[error("gh not found. Install the GitHub CLI to collect repository metadata.")]
    NotFound,

    #[error("Failed to run gh: {0}")]
    Spawn(std::io::Error),

    #[error("gh timed out after {0}s")]
    Timeout(u64),

    #[error("gh error for {repo}: {message}")]
    Lookup { repo: String, message: String },

    #[error("Invalid repository metadata for {repo}: {message}")]
    Decode { repo: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_display_timezone() {
        let e = AppError::InvalidTimezone {
            input: "Mars/Olympus".to_string(),
        };
        assert_eq!(e.to_string(), "Invalid timezone: Mars/Olympus");
    }

    #[test]
    fn app_error_display_config() {
        let e = AppError::Config {
            path: PathBuf::from("/tmp/pilotlog.toml"),
            message: "expected `=`".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Failed to read config /tmp/pilotlog.toml: expected `=`"
        );
    }

    #[test]
    fn app_error_display_write() {
        let e = AppError::Write {
            path: PathBuf::from("/ro/out.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(e.to_string(), "Failed to write /ro/out.json: denied");
    }

    #[test]
    fn enrich_error_status() {
        assert_eq!(
            EnrichError::Status(502).to_string(),
            "enrichment service returned status 502"
        );
    }

    #[test]
    fn repo_error_not_found() {
        assert_eq!(
            RepoError::NotFound.to_string(),
            "gh not found. Install the GitHub CLI to collect repository metadata."
        );
    }

    #[test]
    fn repo_error_lookup() {
        let e = RepoError::Lookup {
            repo: "acme/widget".to_string(),
            message: "not found".to_string(),
        };
        assert_eq!(e.to_string(), "gh error for acme/widget: not found");
    }
}
