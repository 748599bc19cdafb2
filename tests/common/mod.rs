// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed manifest root and executor doubles
// so each integration test can set up an isolated environment without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use kitstrap::exec::{ExecResult, Executor};

/// Write a full set of manifest files into `<root>/manifests/`.
pub fn setup_manifest_root(root: &Path, apt: &str, git: &str, pip: &str, snap: &str) {
    let dir = root.join("manifests");
    std::fs::create_dir_all(&dir).expect("create manifests dir");
    std::fs::write(dir.join("apt.list"), apt).expect("write apt.list");
    std::fs::write(dir.join("git.list"), git).expect("write git.list");
    std::fs::write(dir.join("pip.list"), pip).expect("write pip.list");
    std::fs::write(dir.join("snap.list"), snap).expect("write snap.list");
    std::fs::write(dir.join("downloads.toml"), "").expect("write downloads.toml");
    std::fs::write(dir.join("shellrc.toml"), "").expect("write shellrc.toml");
}

/// Overwrite one manifest file under `<root>/manifests/`.
pub fn write_manifest(root: &Path, name: &str, contents: &str) {
    std::fs::write(root.join("manifests").join(name), contents).expect("write manifest");
}

/// Executor that records every invocation and reports success with empty
/// output.
#[derive(Debug, Default)]
pub struct SpyExecutor {
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl SpyExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every invocation so far, as `(program, args)` pairs.
    pub fn recorded_calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().expect("spy poisoned").clone()
    }

    /// Whether any recorded call ran `program`.
    pub fn ran(&self, program: &str) -> bool {
        self.recorded_calls().iter().any(|(p, _)| p == program)
    }
}

impl Executor for SpyExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.calls.lock().expect("spy poisoned").push((
            program.to_string(),
            args.iter().map(|s| (*s).to_string()).collect(),
        ));
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        })
    }

    fn run_in(&self, _: &Path, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.run(program, args)
    }

    fn which(&self, _: &str) -> bool {
        true
    }
}

/// Executor that panics on any invocation; proves that simulation mode
/// issues no external command.
#[derive(Debug, Default)]
pub struct PanicExecutor;

impl Executor for PanicExecutor {
    fn run(&self, program: &str, _: &[&str]) -> anyhow::Result<ExecResult> {
        panic!("unexpected external command in simulation: {program}")
    }

    fn run_in(&self, _: &Path, program: &str, _: &[&str]) -> anyhow::Result<ExecResult> {
        panic!("unexpected external command in simulation: {program}")
    }

    fn which(&self, _: &str) -> bool {
        false
    }
}
