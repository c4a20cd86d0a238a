use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Presence of this variable enables debug logging and disables error suppression.
pub const DEBUG_VAR: &str = "DEBUG";

const TRUTHY: [&str; 4] = ["y", "yes", "true", "t"];

/// Case-insensitive membership test against `y`, `yes`, `true` and `t`.
pub fn is_set(value: &str) -> bool {
    let value = value.to_lowercase();
    TRUTHY.contains(&value.as_str())
}

/// Names of the variables that carry the Kaggle username and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialVars {
    pub username: String,
    pub key: String,
}

impl Default for CredentialVars {
    fn default() -> Self {
        Self {
            username: "CREDENTIALS_KAGGLE_USERNAME".to_string(),
            key: "CREDENTIALS_KAGGLE_KEY".to_string(),
        }
    }
}

/// The flat parameter bag of one invocation.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: BTreeMap<String, String>,
    credential_vars: CredentialVars,
}

impl Params {
    /// Snapshots the process environment. Variables that are not valid
    /// UTF-8 are ignored.
    pub fn from_env() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn with_credential_vars(mut self, vars: CredentialVars) -> Self {
        self.credential_vars = vars;
        self
    }

    pub fn credential_vars(&self) -> &CredentialVars {
        &self.credential_vars
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// A set, non-blank value.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    /// Fails with "must specify <field>" when `name` is absent or blank.
    pub fn required(&self, name: &str, field: &str) -> Result<&str, Error> {
        self.non_empty(name).ok_or_else(|| Error::missing(field))
    }

    pub fn optional(&self, name: &str) -> Option<String> {
        self.non_empty(name).map(str::to_string)
    }

    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.get(name).map(is_set).unwrap_or(default)
    }

    pub fn number<T: FromStr>(&self, name: &str, default: T) -> Result<T, Error> {
        Ok(self.optional_number(name)?.unwrap_or(default))
    }

    pub fn optional_number<T: FromStr>(&self, name: &str) -> Result<Option<T>, Error> {
        match self.non_empty(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                Error::Validation(format!("{name} must be an integer, got {raw:?}"))
            }),
        }
    }

    /// The directory named by `name`, or the current working directory.
    pub fn folder(&self, name: &str) -> Result<PathBuf, Error> {
        match self.non_empty(name) {
            Some(folder) => Ok(PathBuf::from(folder)),
            None => std::env::current_dir().map_err(|e| {
                Error::Validation(format!("{name} not set and no current directory: {e}"))
            }),
        }
    }

    /// The directory named by `name` (default `.`), made absolute.
    pub fn destination(&self, name: &str) -> Result<PathBuf, Error> {
        let dest = self.non_empty(name).unwrap_or(".");
        std::path::absolute(dest)
            .map_err(|e| Error::Validation(format!("invalid {name} {dest:?}: {e}")))
    }

    /// Username and key from the configured variables, falling back to
    /// `KAGGLE_USERNAME` / `KAGGLE_KEY`.
    pub fn credentials(&self) -> (Option<&str>, Option<&str>) {
        let username = self
            .non_empty(&self.credential_vars.username)
            .or_else(|| self.non_empty("KAGGLE_USERNAME"));
        let key = self
            .non_empty(&self.credential_vars.key)
            .or_else(|| self.non_empty("KAGGLE_KEY"));
        (username, key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            credential_vars: CredentialVars::default(),
        }
    }
}
