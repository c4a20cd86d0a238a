use serde_json::Value;

use super::Handler;
use crate::api::KaggleApi;
use crate::error::Error;
use crate::outcome::Output;
use crate::params::Params;

/// Echoes the credential values the invocation was started with.
#[derive(Debug)]
pub struct EchoCredentials {
    username: String,
    key: String,
}

impl Handler for EchoCredentials {
    fn from_params(params: &Params) -> Result<Self, Error> {
        let (username, key) = params.credentials();
        Ok(Self {
            username: username.unwrap_or_default().to_string(),
            key: key.unwrap_or_default().to_string(),
        })
    }

    fn execute(self, _api: &dyn KaggleApi) -> Result<Output, Error> {
        let mut out = Output::new();
        out.insert("kaggle_username".to_string(), Value::String(self.username));
        out.insert("kaggle_key".to_string(), Value::String(self.key));
        Ok(out)
    }
}
