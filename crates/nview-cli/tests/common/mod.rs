#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

fn work_dir() -> &'static Path {
    static WORK_DIR: OnceLock<TempDir> = OnceLock::new();
    WORK_DIR
        .get_or_init(|| tempfile::tempdir().expect("failed to create work dir for tests"))
        .path()
}

/// Create an `nview` command isolated from the developer's environment.
///
/// Runs in an empty directory (no `.env`), with no token and no config file.
#[allow(dead_code)]
pub fn nview_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nview"));
    cmd.timeout(CMD_TIMEOUT);
    let dir = work_dir();
    cmd.current_dir(dir);
    cmd.env_remove("NOTION_TOKEN");
    cmd.env_remove("NOTION_VERSION");
    cmd.env_remove("NOTION_API_BASE_URL");
    cmd.env_remove("NVIEW_CONFIG");
    cmd.env("XDG_CONFIG_HOME", dir);
    cmd.env("HOME", dir);
    cmd.env("NO_COLOR", "1");
    cmd
}

/// An `nview` command pointed at a mock API root with a test token.
#[allow(dead_code)]
pub fn nview_against(server_uri: &str) -> Command {
    let mut cmd = nview_cmd();
    cmd.env("NOTION_TOKEN", "secret_test");
    cmd.env("NOTION_API_BASE_URL", format!("{server_uri}/v1"));
    cmd
}
