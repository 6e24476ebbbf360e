// Shared fixtures for javasema integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use javasema::{parse_java, AnalysisSession, NodeId, SemaConfig, Syntax, SyntaxTree};

/// A parsed compilation unit with its configuration
pub struct Fixture {
    pub tree: SyntaxTree,
    pub config: SemaConfig,
}

impl Fixture {
    pub fn new(source: &str) -> Self {
        Self::with_config(source, SemaConfig::default())
    }

    pub fn with_config(source: &str, config: SemaConfig) -> Self {
        let tree = parse_java(source)
            .unwrap_or_else(|e| panic!("fixture does not parse: {e}\n{source}"));
        Self { tree, config }
    }

    /// Wrap `body` in `class T { void f(PARAMS) { BODY } }`
    pub fn method(params: &str, body: &str) -> Self {
        Self::new(&format!("class T {{ void f({params}) {{ {body} }} }}"))
    }

    pub fn session(&self) -> AnalysisSession<'_> {
        AnalysisSession::new(&self.tree, &self.config)
    }

    /// Outermost node whose text is exactly `text`
    pub fn node(&self, text: &str) -> NodeId {
        self.tree
            .find_by_text(text)
            .unwrap_or_else(|| panic!("no node with text {text:?}"))
    }

    /// First node matching the predicate
    pub fn first(&self, predicate: impl Fn(&Syntax) -> bool) -> NodeId {
        self.tree
            .find(|t, id| predicate(t.syntax(id)))
            .unwrap_or_else(|| panic!("no matching node"))
    }

    pub fn text(&self, node: NodeId) -> &str {
        self.tree.text(node)
    }
}

/// Value of the single `return` in `class T { boolean f(...) { return EXPR; } }`
pub fn returned_expression(tree: &SyntaxTree) -> NodeId {
    let ret = tree
        .find(|t, id| matches!(t.syntax(id), Syntax::Return { value: Some(_) }))
        .unwrap_or_else(|| panic!("no return statement"));
    match tree.syntax(ret) {
        Syntax::Return { value: Some(value) } => *value,
        _ => unreachable!(),
    }
}

pub fn write_java(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// Binary execution result for tests that need to verify CLI behavior
#[derive(Debug)]
pub struct BinaryResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

pub fn run_javasema(args: &[&str], current_dir: &Path) -> BinaryResult {
    let output = Command::new(env!("CARGO_BIN_EXE_javasema"))
        .args(args)
        .current_dir(current_dir)
        .env_remove("RUST_LOG")
        .env_remove("JAVASEMA_CONFIG")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute javasema");
    BinaryResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    }
}
