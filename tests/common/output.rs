//! Test sinks.

use async_trait::async_trait;
use cmdagent::io::{FIELD_TAGS, InputContext, Metadata, OutputKind};
use cmdagent::{Output, OutputError};
use parking_lot::Mutex;
use serde_json::Value;

/// A message captured by [`RecordingOutput`].
#[derive(Debug, Clone)]
pub struct Sent {
    pub kind: OutputKind,
    pub text: String,
    pub tags: Vec<String>,
}

/// Records everything sent to it.
#[derive(Default)]
pub struct RecordingOutput {
    pub sent: Mutex<Vec<Sent>>,
}

#[allow(dead_code)]
impl RecordingOutput {
    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|s| s.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Output for RecordingOutput {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(
        &self,
        kind: OutputKind,
        text: &str,
        _input: &InputContext,
        output: &Metadata,
    ) -> Result<(), OutputError> {
        let tags = match output.get(FIELD_TAGS) {
            Some(Value::Array(tags)) => tags
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        self.sent.lock().push(Sent {
            kind,
            text: text.to_string(),
            tags,
        });
        Ok(())
    }
}
