//! Line-based console adapter: stdin input, stdout output.

use super::{
    FIELD_USER_ID, FIELD_USERNAME, FIELD_WHERE, Input, InputContext, InputEntry, Metadata, Output,
    OutputKind,
};
use crate::error::{OutputError, PipelineError};
use crate::pipeline::Ingress;
use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, info};

pub const CONSOLE_ORIGIN: &str = "console";

/// Reads one message per line from a reader, stdin by default.
pub struct ConsoleInput<R = tokio::io::Stdin> {
    reader: tokio::sync::Mutex<Option<R>>,
    user: String,
}

impl ConsoleInput {
    /// Console input on stdin, identified by the `USER` environment variable.
    pub fn stdin() -> Self {
        let user = std::env::var("USER").unwrap_or_else(|_| "console".to_string());
        Self::new(tokio::io::stdin(), user)
    }
}

impl<R> ConsoleInput<R>
where
    R: AsyncRead + Send + Unpin,
{
    pub fn new(reader: R, user: impl Into<String>) -> Self {
        Self {
            reader: tokio::sync::Mutex::new(Some(reader)),
            user: user.into(),
        }
    }

    fn entry(&self, line: String) -> InputEntry {
        let mut metadata = Metadata::new();
        metadata.insert("user".to_string(), Value::from(self.user.as_str()));
        InputEntry::new(CONSOLE_ORIGIN, line)
            .with_input_metadata(metadata)
            .with_general(FIELD_USER_ID, self.user.as_str())
            .with_general(FIELD_USERNAME, self.user.as_str())
            .with_general(FIELD_WHERE, CONSOLE_ORIGIN)
    }
}

#[async_trait]
impl<R> Input for ConsoleInput<R>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    fn origin(&self) -> &str {
        CONSOLE_ORIGIN
    }

    /// The reader is consumed; a second `listen` finds nothing to read.
    async fn listen(&self, ingress: Ingress) -> anyhow::Result<()> {
        let Some(reader) = self.reader.lock().await.take() else {
            debug!("Console reader already consumed");
            return Ok(());
        };
        let mut lines = FramedRead::new(reader, LinesCodec::new());

        while let Some(line) = lines.next().await {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match ingress.submit(self.entry(line)).await {
                Ok(()) => {}
                Err(PipelineError::Closed) => break,
                Err(e) => return Err(e.into()),
            }
        }
        info!("Console input closed");
        Ok(())
    }
}

/// Prints messages to stdout. Framed messages are boxed.
#[derive(Debug, Default)]
pub struct ConsoleOutput;

/// Draw a box around `text`.
pub fn frame(text: &str) -> String {
    let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let border = format!("+{}+", "-".repeat(width + 2));
    let mut out = border.clone();
    for line in text.lines() {
        out.push_str(&format!("\n| {line:<width$} |"));
    }
    out.push('\n');
    out.push_str(&border);
    out
}

#[async_trait]
impl Output for ConsoleOutput {
    fn name(&self) -> &str {
        CONSOLE_ORIGIN
    }

    async fn send(
        &self,
        kind: OutputKind,
        text: &str,
        _input: &InputContext,
        _output: &Metadata,
    ) -> Result<(), OutputError> {
        let rendered = match kind {
            OutputKind::Default => text.to_string(),
            OutputKind::Framed => frame(text),
        };
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{rendered}\n").as_bytes())
            .await
            .map_err(|e| OutputError::Delivery(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| OutputError::Delivery(e.to_string()))
    }
}
