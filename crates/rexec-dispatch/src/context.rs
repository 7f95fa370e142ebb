//! Per-invocation runtime context supplied by the host.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rexec_process::OutputSink;
use serde_json::{Map, Value};

/// Ambient environment for one dispatch. Read, never mutated, by the dispatcher.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    pub cwd: PathBuf,
    /// Variables layered over the inherited process environment.
    pub env: HashMap<String, String>,
    pub stdout: OutputSink,
    pub stderr: OutputSink,
    /// Release metadata (`nextRelease`, `commits`, `branch`, ...) for templates.
    pub values: Map<String, Value>,
}

impl RuntimeContext {
    /// Context rooted at `cwd`, forwarding output to the process streams.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            env: HashMap::new(),
            stdout: OutputSink::stdout(),
            stderr: OutputSink::stderr(),
            values: Map::new(),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_stdout(mut self, sink: OutputSink) -> Self {
        self.stdout = sink;
        self
    }

    pub fn with_stderr(mut self, sink: OutputSink) -> Self {
        self.stderr = sink;
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_values(mut self, values: Map<String, Value>) -> Self {
        self.values.extend(values);
        self
    }
}
