use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// A scratch workspace the `vocab` binary runs in.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp workspace"),
        }
    }

    /// Fresh workspace with `vocab init` already run.
    pub fn initialized() -> Self {
        let ws = Self::new();
        ws.vocab().arg("init").assert().success();
        ws
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The binary, isolated from the caller's environment.
    pub fn vocab(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_vocab"));
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env_remove("VOCAB_DIR")
            .env_remove("VOCAB_DB")
            .env_remove("VOCAB_ITEMS_PER_REVIEW")
            .env_remove("VOCAB_ARCHIVE_DAYS")
            .env_remove("VOCAB_ARCHIVE_DAYS_THRESHOLD")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run with `--json` and parse stdout.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .vocab()
            .args(args)
            .arg("--json")
            .output()
            .expect("run vocab");
        assert!(
            output.status.success(),
            "vocab {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }
}
