//! Math translation capability.
//!
//! The converter hands the translator a one-expression Markdown document
//! (`$expr$`) and expects LaTeX back. The production implementation shells out
//! to `pandoc -f markdown -t latex`; tests substitute in-memory fakes.

use crate::error::TranslationError;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Translate Markdown math into the target LaTeX dialect.
#[async_trait]
pub trait MathTranslator: Send + Sync {
    /// Translate `markdown` (an inline math span such as `$x^2$`).
    async fn translate(&self, markdown: &str) -> Result<String, TranslationError>;
}

/// Runs the `pandoc` executable once per expression.
#[derive(Debug, Clone)]
pub struct PandocTranslator {
    program: String,
    timeout: Duration,
}

impl PandocTranslator {
    pub fn new(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn run(&self, markdown: &str) -> Result<String, TranslationError> {
        let mut child = Command::new(&self.program)
            .args(["--from", "markdown", "--to", "latex"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TranslationError::Unavailable(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(markdown.as_bytes()).await?;
            // Dropping stdin closes the pipe so pandoc sees EOF.
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(TranslationError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for PandocTranslator {
    fn default() -> Self {
        Self::new("pandoc", 30)
    }
}

#[async_trait]
impl MathTranslator for PandocTranslator {
    async fn translate(&self, markdown: &str) -> Result<String, TranslationError> {
        debug!("pandoc: translating {} bytes", markdown.len());
        match tokio::time::timeout(self.timeout, self.run(markdown)).await {
            Ok(result) => result,
            Err(_) => Err(TranslationError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

/// Always reports itself unavailable, forcing the heuristic fallback.
///
/// Used with `--no-pandoc` and when no translator is wanted at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTranslator;

#[async_trait]
impl MathTranslator for DisabledTranslator {
    async fn translate(&self, _markdown: &str) -> Result<String, TranslationError> {
        Err(TranslationError::Unavailable("math translation disabled".into()))
    }
}
