/// Credential resolution: process environment first, then a TOML secrets
/// file kept outside version control.
///
/// The secrets file path comes from `SECRETS_FILE` (default `secrets.toml`)
/// and holds flat `KEY = "value"` pairs. Lookup is by exact key, then by the
/// lowercased key so `GROQ_API_KEY` also matches `groq_api_key = "..."`.
use std::env;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

const SECRETS_FILE_VAR: &str = "SECRETS_FILE";
const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// Resolve a credential by name. An empty environment value counts as unset.
/// Returns `None` when neither the environment nor the secrets file has it.
pub fn resolve_credential(name: &str) -> Option<String> {
    if let Some(value) = env::var(name).ok().filter(|v| !v.is_empty()) {
        return Some(value);
    }

    let path = secrets_file_path();
    let contents = fs::read_to_string(&path)
        .inspect_err(|_| debug!(path = %path.display(), "no secrets file"))
        .ok()?;
    let table: toml::Table = toml::from_str(&contents)
        .inspect_err(|e| debug!(path = %path.display(), error = %e, "secrets file is not valid TOML"))
        .ok()?;
    lookup(&table, name)
}

fn secrets_file_path() -> PathBuf {
    env::var(SECRETS_FILE_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_FILE))
}

/// Look up a key in a parsed secrets table. Only string values qualify.
fn lookup(table: &toml::Table, name: &str) -> Option<String> {
    table
        .get(name)
        .or_else(|| table.get(&name.to_lowercase()))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_exact_key() {
        let table: toml::Table = toml::from_str(r#"GROQ_API_KEY = "gsk_abc123""#).unwrap();
        assert_eq!(lookup(&table, "GROQ_API_KEY"), Some("gsk_abc123".into()));
    }

    #[test]
    fn lookup_falls_back_to_lowercase_key() {
        let table: toml::Table = toml::from_str(r#"groq_api_key = "gsk_abc123""#).unwrap();
        assert_eq!(lookup(&table, "GROQ_API_KEY"), Some("gsk_abc123".into()));
    }

    #[test]
    fn lookup_ignores_missing_and_non_string_values() {
        let table: toml::Table = toml::from_str("GROQ_API_KEY = 42").unwrap();
        assert_eq!(lookup(&table, "GROQ_API_KEY"), None);
        assert_eq!(lookup(&table, "OTHER_KEY"), None);
    }

    #[test]
    fn lookup_ignores_empty_values() {
        let table: toml::Table = toml::from_str(r#"GROQ_API_KEY = """#).unwrap();
        assert_eq!(lookup(&table, "GROQ_API_KEY"), None);
    }
}
