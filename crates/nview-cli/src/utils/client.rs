use anyhow::Result;
use nview_core::{ApiToken, ClientConfig, Config, NotionClient};
use tracing::debug;

use crate::cli::Cli;
use crate::error::CliError;

/// Resolve client settings: defaults, then config file, then environment, then flags.
pub fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let file = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(CliError::usage)?;

    let mut config = file.client.with_env_overrides();
    if let Some(concurrency) = cli.concurrency {
        config.max_concurrency = concurrency;
    }
    Ok(config.normalized())
}

/// Build the API client, failing fast when no token is available.
pub fn build_client(cli: &Cli) -> Result<NotionClient> {
    let token = cli
        .token
        .as_deref()
        .map_or_else(ApiToken::from_env, |token| ApiToken::new(token))
        .map_err(CliError::usage)?;

    let config = resolve_config(cli)?;
    debug!(
        "Using {} (version {}, concurrency {})",
        config.base_url, config.api_version, config.max_concurrency
    );
    Ok(NotionClient::new(&token, config).map_err(CliError::usage)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\nmax_concurrency = 4\nmax_attempts = 5").unwrap();
        let path = file.path().to_str().unwrap();

        let cli = Cli::try_parse_from([
            "nview",
            "--config",
            path,
            "--concurrency",
            "2",
            "search",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn test_malformed_config_is_usage_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client\n").unwrap();
        let path = file.path().to_str().unwrap();

        let cli = Cli::try_parse_from(["nview", "--config", path, "search"]).unwrap();
        let err = resolve_config(&cli).unwrap_err();
        assert_eq!(crate::error::exit_code_from_error(&err), 2);
    }

    #[test]
    fn test_blank_token_flag_is_usage_error() {
        let cli = Cli::try_parse_from(["nview", "--token", " ", "search"]).unwrap();
        let err = build_client(&cli).err().unwrap();
        assert_eq!(crate::error::exit_code_from_error(&err), 2);
    }
}
