//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use crate::transport::{RequestSpec, SendError, Transport};

/// Replays a fixed script of outcomes; the last one repeats forever.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<Value, SendError>>>,
    calls: Mutex<Vec<(Instant, RequestSpec)>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<Value, SendError>>) -> Self {
        assert!(!script.is_empty(), "script needs at least one outcome");
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(Instant, RequestSpec)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, spec: &RequestSpec) -> Result<Value, SendError> {
        self.calls.lock().unwrap().push((Instant::now(), spec.clone()));

        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }
}
