use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{Client, ClientConfig, DEFAULT_URL};
use crate::error::Error;
use crate::params::Params;

const CREDENTIALS_FILE: &str = "kaggle.json";

/// The `kaggle.json` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub key: String,
}

impl Credentials {
    fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.key.trim().is_empty()
    }
}

/// `$KAGGLE_CONFIG_DIR/kaggle.json`, else `~/.kaggle/kaggle.json`.
pub fn credentials_path(params: &Params) -> Result<PathBuf, Error> {
    if let Some(dir) = params.non_empty("KAGGLE_CONFIG_DIR") {
        return Ok(Path::new(dir).join(CREDENTIALS_FILE));
    }
    dirs::home_dir()
        .map(|home| home.join(".kaggle").join(CREDENTIALS_FILE))
        .ok_or_else(|| {
            Error::Authentication(
                "cannot locate the home directory; set KAGGLE_CONFIG_DIR".to_string(),
            )
        })
}

/// Writes `credentials` to `path` unless a file is already there, and
/// restricts the file to its owner. Returns whether the file was created.
pub fn ensure_credentials_file(path: &Path, credentials: &Credentials) -> Result<bool> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let created = match options.open(path) {
        Ok(mut file) => {
            file.write_all(serde_json::to_string(credentials)?.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            true
        }
        Err(e) if e.kind() == IoErrorKind::AlreadyExists => false,
        Err(e) => {
            return Err(e).with_context(|| format!("failed to create {}", path.display()));
        }
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions of {}", path.display()))?;
    }

    Ok(created)
}

pub fn read_credentials(path: &Path) -> Result<Credentials> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Provisions the credentials file from the parameter bag and resolves the
/// client configuration. `KAGGLE_USERNAME`/`KAGGLE_KEY` take precedence
/// over the file.
pub fn load_config(params: &Params) -> Result<ClientConfig, Error> {
    let path = credentials_path(params)?;

    if let (Some(username), Some(key)) = params.credentials() {
        let record = Credentials {
            username: username.to_string(),
            key: key.to_string(),
        };
        let created = ensure_credentials_file(&path, &record)
            .map_err(|e| Error::Authentication(format!("{e:#}")))?;
        if created {
            log::debug!("wrote credentials to {}", path.display());
        }
    }

    let credentials = match (params.non_empty("KAGGLE_USERNAME"), params.non_empty("KAGGLE_KEY")) {
        (Some(username), Some(key)) => Credentials {
            username: username.to_string(),
            key: key.to_string(),
        },
        _ if path.exists() => {
            read_credentials(&path).map_err(|e| Error::Authentication(format!("{e:#}")))?
        }
        _ => {
            let vars = params.credential_vars();
            return Err(Error::Authentication(format!(
                "Missing credentials: set {} and {} (or KAGGLE_USERNAME and KAGGLE_KEY), or create {}",
                vars.username,
                vars.key,
                path.display()
            )));
        }
    };

    if !credentials.is_complete() {
        return Err(Error::Authentication(format!(
            "Missing credentials: username or key in {} is empty",
            path.display()
        )));
    }

    let url = params.non_empty("KAGGLE_API_URL").unwrap_or(DEFAULT_URL).to_string();
    Ok(ClientConfig {
        url,
        username: credentials.username,
        key: credentials.key,
    })
}

/// Builds an authenticated client for this invocation.
pub fn authenticate(params: &Params) -> Result<Client, Error> {
    let cfg = load_config(params)?;
    let url = cfg.url.clone();
    let client = Client::new(cfg).map_err(|e| Error::Authentication(format!("{e:#}")))?;
    let client = tune(client, params)?;
    log::debug!("authenticated as {} against {url}", client.username());
    Ok(client)
}

/// Applies `KAGGLE_TIMEOUT`, `KAGGLE_RETRY_MAX` and `KAGGLE_SLEEP_MAX` (seconds
/// for the durations) over the client defaults.
fn tune(mut client: Client, params: &Params) -> Result<Client, Error> {
    if let Some(secs) = params.optional_number::<u64>("KAGGLE_TIMEOUT")? {
        client = client.with_timeout(Duration::from_secs(secs));
    }
    if let Some(tries) = params.optional_number::<usize>("KAGGLE_RETRY_MAX")? {
        client = client.with_retry_max(tries);
    }
    if let Some(secs) = params.optional_number::<u64>("KAGGLE_SLEEP_MAX")? {
        client = client.with_sleep_max(Duration::from_secs(secs));
    }
    Ok(client)
}
