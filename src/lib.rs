//! A command-dispatch bridge to the Kaggle API.
//!
//! Each invocation names a `(command, subcommand)` pair and carries its
//! parameters as a flat bag of environment variables. The pair selects one
//! handler, the handler validates its parameters and calls one operation on a
//! [`KaggleApi`], and the result or error is folded into an [`Outcome`] that
//! renders as a YAML document.
//!
//! ## Quick start
//! - Set `CREDENTIALS_KAGGLE_USERNAME` and `CREDENTIALS_KAGGLE_KEY` (or
//!   `KAGGLE_USERNAME` / `KAGGLE_KEY`). They are written once to
//!   `~/.kaggle/kaggle.json`, or to `$KAGGLE_CONFIG_DIR/kaggle.json`.
//! - Pass operation parameters in upper snake case (`COMPETITION`, `PAGE`, ...).
//!
//! ```no_run
//! use kaggle_bridge::{Params, authenticate, invoke};
//!
//! fn main() -> Result<(), kaggle_bridge::Error> {
//!     let mut params = Params::from_env();
//!     params.insert("COMPETITION", "titanic");
//!     let outcome = invoke(Some("competitions"), Some("list-files"), &params, false, authenticate)?;
//!     print!("{}", outcome.to_yaml().unwrap_or_default());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod api;
mod archive;
mod client;
mod config;
mod dispatch;
mod download;
mod error;
pub mod handlers;
pub mod metadata;
pub mod models;
mod outcome;
mod params;
mod util;

pub use api::{
    CompetitionListRequest, DatasetCreateRequest, DatasetListRequest, DatasetVersionRequest,
    DirMode, KaggleApi, KernelListRequest,
};
pub use archive::extract_nested;
pub use client::{Client, ClientConfig, DEFAULT_URL};
pub use config::{Credentials, authenticate, credentials_path, ensure_credentials_file, load_config};
pub use dispatch::{Operation, USAGE_ERROR, invoke};
pub use error::{ApiError, Error, ErrorKind};
pub use outcome::{Outcome, Output, normalize};
pub use params::{CredentialVars, DEBUG_VAR, Params, is_set};
