use std::time::Duration;

/// Execution settings attached to a schema.
#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Operations nesting deeper than this are rejected before execution.
    pub max_depth: Option<usize>,
    /// Once a query has run for this long, remaining fields resolve to a timeout error.
    pub timeout_ms: Option<u64>,
    pub unhandled_errors: UnhandledErrors,
    pub batching: BatchingConfig,
}

impl ExecutionConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// What to do with application errors no rescue handler claimed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnhandledErrors {
    /// Log the error and replace it with a generic field error.
    #[default]
    Mask,
    /// Abort the whole execution.
    Propagate,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchingConfig {
    /// Maximum number of keys given to a single batch fetch.
    pub max_batch_size: Option<usize>,
}
