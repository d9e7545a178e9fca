use crate::storage::error::StageError;
use std::path::PathBuf;

/// Backend selected by a stage URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// `az://{account}/{container}` or `azure://…`
    Azure { account: String, container: String },
    /// `file:///absolute/dir`
    Local { root: PathBuf },
    /// `memory://`
    Memory,
}

impl BackendConfig {
    pub fn parse_url(url: &str) -> Result<Self, StageError> {
        let invalid = |reason: &str| StageError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;

        match scheme.to_ascii_lowercase().as_str() {
            "az" | "azure" | "abfs" => {
                let mut parts = rest.trim_matches('/').splitn(2, '/');
                let account = parts.next().filter(|s| !s.is_empty());
                let container = parts.next().filter(|s| !s.is_empty());
                match (account, container) {
                    (Some(account), Some(container)) if !container.contains('/') => {
                        Ok(BackendConfig::Azure {
                            account: account.to_string(),
                            container: container.to_string(),
                        })
                    }
                    _ => Err(invalid("expected az://{account}/{container}")),
                }
            }
            "file" => {
                if rest.is_empty() || !rest.starts_with('/') {
                    return Err(invalid("expected an absolute path"));
                }
                Ok(BackendConfig::Local {
                    root: PathBuf::from(rest),
                })
            }
            "memory" => Ok(BackendConfig::Memory),
            other => Err(invalid(&format!("unsupported scheme '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_schemes() {
        assert_eq!(
            BackendConfig::parse_url("az://acme/landing").unwrap(),
            BackendConfig::Azure {
                account: "acme".into(),
                container: "landing".into()
            }
        );
        assert_eq!(
            BackendConfig::parse_url("file:///tmp/stage").unwrap(),
            BackendConfig::Local {
                root: PathBuf::from("/tmp/stage")
            }
        );
        assert_eq!(
            BackendConfig::parse_url("memory://").unwrap(),
            BackendConfig::Memory
        );
    }

    #[test]
    fn rejects_malformed_urls() {
        for url in ["acme/landing", "az://acme", "az://acme/a/b", "s3://bucket", "file://rel"] {
            assert!(BackendConfig::parse_url(url).is_err(), "{url}");
        }
    }
}
