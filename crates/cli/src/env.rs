use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::CliError;

const SENSITIVE_PATTERNS: [&str; 7] = [
    "password", "secret", "token", "key", "sas", "auth", "credential",
];

/// Environment variable manager that loads from system and .env files.
/// Values from a .env file override the process environment.
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Load variables from a .env file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Env(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        let loaded = self.parse_env_content(&content)?;
        debug!(
            path = %path.display(),
            keys = ?loaded.iter().map(|k| Self::describe(k)).collect::<Vec<_>>(),
            "Loaded env file"
        );
        Ok(())
    }

    pub fn all(&self) -> &HashMap<String, String> {
        &self.vars
    }

    fn parse_env_content(&mut self, content: &str) -> Result<Vec<String>, CliError> {
        let mut loaded = Vec::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);

            // Parse KEY=VALUE format
            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Env(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Env(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars
                .insert(key.to_string(), Self::unquote_value(value));
            loaded.push(key.to_string());
        }

        Ok(loaded)
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }

    fn is_sensitive(key: &str) -> bool {
        let key = key.to_lowercase();
        SENSITIVE_PATTERNS.iter().any(|p| key.contains(p))
    }

    /// Key name for logs, flagged when it holds a secret.
    fn describe(key: &str) -> String {
        if Self::is_sensitive(key) {
            format!("{key} (redacted)")
        } else {
            key.to_string()
        }
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}
