//! Job identity: the job type name plus its ordered arguments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifies one job invocation for locking purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobIdentity {
    job_type: String,
    args: Vec<Value>,
}

impl JobIdentity {
    pub fn new(job_type: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            job_type: job_type.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Parse command-line arguments: each one as JSON, falling back to a
    /// JSON string when it is not valid JSON (so `acct-1` means `"acct-1"`).
    pub fn from_cli_args<I, T>(job_type: impl Into<String>, raw_args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let args = raw_args
            .into_iter()
            .map(|raw| {
                let raw = raw.as_ref();
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
            })
            .collect::<Vec<Value>>();
        Self::new(job_type, args)
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }
}
