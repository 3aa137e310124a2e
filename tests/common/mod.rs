//! Shared test infrastructure for integration tests.

use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Catalog tree plus registry and config in a temp directory.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Registry with the given codes and an `en` source catalog.
    pub fn new(codes: &[&str], source: Value) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut registry = String::from("Code\n");
        for code in codes {
            registry.push_str(code);
            registry.push('\n');
        }
        std::fs::write(dir.path().join("languages.csv"), registry).expect("write registry");
        std::fs::write(
            dir.path().join("locsync.json"),
            r#"{"catalog_root": "catalogs", "retry": {"max_attempts": 2, "delay_secs": 0}}"#,
        )
        .expect("write config");
        let workspace = Self { dir };
        workspace.write_catalog("en", &source);
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn catalog_path(&self, code: &str) -> PathBuf {
        self.root()
            .join("catalogs")
            .join(code)
            .join(format!("{code}_strings.json"))
    }

    pub fn write_catalog(&self, code: &str, catalog: &Value) {
        self.write_raw_catalog(code, &serde_json::to_string_pretty(catalog).expect("serialize"));
    }

    pub fn write_raw_catalog(&self, code: &str, contents: &str) {
        let path = self.catalog_path(code);
        std::fs::create_dir_all(path.parent().expect("catalog parent")).expect("create dir");
        std::fs::write(path, contents).expect("write catalog");
    }

    pub fn read_catalog(&self, code: &str) -> Option<Value> {
        let bytes = std::fs::read(self.catalog_path(code)).ok()?;
        Some(serde_json::from_slice(&bytes).expect("parse catalog"))
    }

    /// Run `locsync <args> --config locsync.json` with `stdin` piped in.
    pub fn run(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_locsync"))
            .args(args)
            .args(["--config", "locsync.json"])
            .current_dir(self.root())
            .env_remove("LOCSYNC_LM_COMMAND")
            .env_remove("OPENAI_API_KEY")
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn locsync");
        // The child may exit before reading stdin; a broken pipe is not a test failure.
        if let Err(err) = child
            .stdin
            .take()
            .expect("stdin piped")
            .write_all(stdin.as_bytes())
        {
            assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe, "write stdin: {err}");
        }
        child.wait_with_output().expect("wait for locsync")
    }
}

/// Shell command that ignores its prompt and prints `response`.
pub fn echo_backend(response: &str) -> String {
    format!("sh -c 'cat >/dev/null; printf \"%s\" \"$0\"' '{response}'")
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
