#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Create a `docview` command isolated from the user's config and backend.
#[allow(dead_code)]
pub fn docview_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docview"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env_remove("DOCVIEW_API_URL");
    cmd.env_remove("DOCVIEW_CONFIG");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// `docview` pointed at a mock backend.
#[allow(dead_code)]
pub fn docview_cmd_with_api(uri: &str) -> Command {
    let mut cmd = docview_cmd();
    cmd.env("DOCVIEW_API_URL", uri);
    cmd
}

/// Write `content` to `name` inside `dir`.
#[allow(dead_code)]
pub fn write_markdown(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("failed to write fixture");
    path
}

#[allow(dead_code)]
pub fn path_arg(path: &Path) -> &str {
    path.to_str().expect("fixture path is valid UTF-8")
}
