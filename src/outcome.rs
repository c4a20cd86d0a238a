use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind};

/// Operation-specific fields of a successful invocation.
pub type Output = Map<String, Value>;

/// Result of one invocation after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Output),
    Failure { kind: ErrorKind, message: String },
}

impl Outcome {
    pub fn from_error(err: &Error) -> Self {
        let kind = err.kind();
        Outcome::Failure {
            kind,
            message: format!("{kind}: {err}"),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The error text; empty on success.
    pub fn error(&self) -> &str {
        match self {
            Outcome::Success(_) => "",
            Outcome::Failure { message, .. } => message,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn output(&self) -> Option<&Output> {
        match self {
            Outcome::Success(output) => Some(output),
            Outcome::Failure { .. } => None,
        }
    }

    /// The emitted document: the output fields plus `success` and `error`.
    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = self.output().cloned().unwrap_or_default();
        doc.insert("success".to_string(), Value::Bool(self.is_success()));
        doc.insert("error".to_string(), Value::String(self.error().to_string()));
        doc
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.to_document())
    }
}

impl From<Error> for Outcome {
    fn from(err: Error) -> Self {
        Outcome::from_error(&err)
    }
}

/// Runs `f` behind the error boundary. In debug mode the error is handed
/// back to the caller instead of being folded into the outcome.
pub fn normalize<F>(debug: bool, f: F) -> Result<Outcome, Error>
where
    F: FnOnce() -> Result<Output, Error>,
{
    match f() {
        Ok(output) => Ok(Outcome::Success(output)),
        Err(err) if debug => Err(err),
        Err(err) => {
            log::debug!("invocation failed: {err:?}");
            Ok(Outcome::from_error(&err))
        }
    }
}

/// A single-field output.
pub(crate) fn output<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Output, Error> {
    let value = serde_json::to_value(value)
        .map_err(|e| Error::Remote(anyhow::Error::new(e).context("failed to encode result")))?;
    let mut out = Output::new();
    out.insert(key.to_string(), value);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_document_has_an_empty_error() {
        let outcome = normalize(false, || output("competitions", &Vec::<String>::new())).unwrap();
        let doc = outcome.to_document();
        assert_eq!(doc["success"], Value::Bool(true));
        assert_eq!(doc["error"], "");
        assert_eq!(doc["competitions"], Value::Array(vec![]));
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn failures_carry_only_success_and_error() {
        let outcome = normalize(false, || Err(Error::missing("competition"))).unwrap();
        assert_eq!(outcome.kind(), Some(ErrorKind::Validation));
        let doc = outcome.to_document();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["success"], Value::Bool(false));
        assert_eq!(doc["error"], "ValidationError: must specify competition");
    }

    #[test]
    fn debug_mode_hands_the_error_back() {
        let err = normalize(true, || Err(Error::Extraction("bad entry".into()))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
    }

    #[test]
    fn yaml_document_lists_every_field() {
        let mut out = Output::new();
        out.insert("status".into(), Value::String("ready".into()));
        let yaml = Outcome::Success(out).to_yaml().unwrap();
        assert!(yaml.contains("success: true"));
        assert!(yaml.contains("error: ''"));
        assert!(yaml.contains("status: ready"));
    }
}
