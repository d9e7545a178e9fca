//! Loaders for the CSV credential files handed to the job.

use crate::error::ConfigError;
use csv::{ReaderBuilder, Trim};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Parsed `key,value` credential file.
#[derive(Clone)]
pub struct CredentialFile {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl CredentialFile {
    /// Reads a two-column CSV. Keys are case-insensitive; rows with fewer than
    /// two cells and blank keys are ignored. A `key,value` header row is
    /// tolerated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let mut entries = HashMap::new();

        for record in reader(&path)?.records() {
            let record = record.map_err(|source| ConfigError::CredentialFile {
                path: path.clone(),
                source,
            })?;
            let (Some(key), Some(value)) = (record.get(0), record.get(1)) else {
                continue;
            };
            let key = key.to_lowercase();
            if key.is_empty() || (key == "key" && value.eq_ignore_ascii_case("value")) {
                continue;
            }
            entries.insert(key, value.to_string());
        }

        Ok(CredentialFile { path, entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingCredential {
            path: self.path.clone(),
            key: key.to_string(),
        })
    }
}

impl std::fmt::Debug for CredentialFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("CredentialFile")
            .field("path", &self.path)
            .field("keys", &keys)
            .finish()
    }
}

/// Reads the API key stored as the first cell of a CSV file.
pub fn read_api_key(path: impl AsRef<Path>) -> Result<String, ConfigError> {
    let path = path.as_ref().to_path_buf();
    let missing = || ConfigError::MissingCredential {
        path: path.clone(),
        key: "api key".to_string(),
    };

    let first = reader(&path)?.records().next().ok_or_else(missing)?;
    let record = first.map_err(|source| ConfigError::CredentialFile {
        path: path.clone(),
        source,
    })?;

    record
        .get(0)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .ok_or_else(missing)
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, ConfigError> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| ConfigError::CredentialFile {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_key_from_first_cell() {
        let f = file("  abc123  ,ignored\nsecond,row\n");
        assert_eq!(read_api_key(f.path()).unwrap(), "abc123");
    }

    #[test]
    fn empty_key_file_is_an_error() {
        let f = file("");
        assert!(matches!(
            read_api_key(f.path()),
            Err(ConfigError::MissingCredential { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_api_key("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, ConfigError::CredentialFile { .. }));
    }

    #[test]
    fn parses_key_value_pairs() {
        let f = file("key,value\nACCOUNT,acme-prod\ntoken,\"s3cr,et\"\nrole\n");
        let creds = CredentialFile::load(f.path()).unwrap();

        assert_eq!(creds.get("account"), Some("acme-prod"));
        assert_eq!(creds.require("TOKEN").unwrap(), "s3cr,et");
        assert_eq!(creds.get("role"), None);
        assert!(creds.require("database").is_err());
        assert!(!format!("{creds:?}").contains("s3cr"));
    }
}
