use std::fmt;

use crate::api::KaggleApi;
use crate::error::Error;
use crate::handlers::{self, Prepared, competitions, datasets, debug, kernels};
use crate::outcome::{Outcome, Output, normalize};
use crate::params::Params;

pub const USAGE_ERROR: &str = "must provide a command and a subcommand, e.g. \"competitions list\"";

/// Every `(command, subcommand)` pair the dispatcher knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CompetitionsList,
    CompetitionsListFiles,
    CompetitionsDownload,
    CompetitionsSubmit,
    CompetitionsListSubmissions,
    CompetitionsViewLeaderboard,
    CompetitionsDownloadLeaderboard,
    DatasetsList,
    DatasetsListFiles,
    DatasetsDownload,
    DatasetsDownloadSingleFile,
    DatasetsCreate,
    DatasetsNewVersion,
    DatasetsInitialize,
    DatasetsGetMetadata,
    DatasetsUpdateMetadata,
    DatasetsStatus,
    KernelsList,
    KernelsInitialize,
    KernelsPush,
    KernelsPull,
    KernelsGetOutput,
    KernelsStatus,
    DebugEchoCredentials,
}

impl Operation {
    pub const ALL: [Operation; 24] = [
        Operation::CompetitionsList,
        Operation::CompetitionsListFiles,
        Operation::CompetitionsDownload,
        Operation::CompetitionsSubmit,
        Operation::CompetitionsListSubmissions,
        Operation::CompetitionsViewLeaderboard,
        Operation::CompetitionsDownloadLeaderboard,
        Operation::DatasetsList,
        Operation::DatasetsListFiles,
        Operation::DatasetsDownload,
        Operation::DatasetsDownloadSingleFile,
        Operation::DatasetsCreate,
        Operation::DatasetsNewVersion,
        Operation::DatasetsInitialize,
        Operation::DatasetsGetMetadata,
        Operation::DatasetsUpdateMetadata,
        Operation::DatasetsStatus,
        Operation::KernelsList,
        Operation::KernelsInitialize,
        Operation::KernelsPush,
        Operation::KernelsPull,
        Operation::KernelsGetOutput,
        Operation::KernelsStatus,
        Operation::DebugEchoCredentials,
    ];

    /// Looks up the operation for a pair, accepting the short aliases
    /// (`competitions files`, `datasets version`, `debug auth`, ...).
    pub fn resolve(command: &str, subcommand: &str) -> Result<Self, Error> {
        use Operation::*;

        let op = match (command, subcommand) {
            ("competitions", "list") => CompetitionsList,
            ("competitions", "list-files" | "files") => CompetitionsListFiles,
            ("competitions", "download") => CompetitionsDownload,
            ("competitions", "submit") => CompetitionsSubmit,
            ("competitions", "list-submissions" | "submissions") => CompetitionsListSubmissions,
            ("competitions", "view-leaderboard" | "leaderboard") => CompetitionsViewLeaderboard,
            ("competitions", "download-leaderboard") => CompetitionsDownloadLeaderboard,
            ("datasets", "list") => DatasetsList,
            ("datasets", "list-files" | "files") => DatasetsListFiles,
            ("datasets", "download") => DatasetsDownload,
            ("datasets", "download-single-file") => DatasetsDownloadSingleFile,
            ("datasets", "create") => DatasetsCreate,
            ("datasets", "new-version" | "version") => DatasetsNewVersion,
            ("datasets", "initialize" | "init") => DatasetsInitialize,
            ("datasets", "get-metadata" | "metadata") => DatasetsGetMetadata,
            ("datasets", "update-metadata") => DatasetsUpdateMetadata,
            ("datasets", "status") => DatasetsStatus,
            ("kernels", "list") => KernelsList,
            ("kernels", "initialize" | "init") => KernelsInitialize,
            ("kernels", "push") => KernelsPush,
            ("kernels", "pull") => KernelsPull,
            ("kernels", "get-output" | "output") => KernelsGetOutput,
            ("kernels", "status") => KernelsStatus,
            ("debug", "echo-credentials" | "auth") => DebugEchoCredentials,
            _ => {
                return Err(Error::Dispatch(format!(
                    "unrecognized command: {command} {subcommand}"
                )));
            }
        };
        Ok(op)
    }

    pub fn command(self) -> &'static str {
        use Operation::*;
        match self {
            CompetitionsList
            | CompetitionsListFiles
            | CompetitionsDownload
            | CompetitionsSubmit
            | CompetitionsListSubmissions
            | CompetitionsViewLeaderboard
            | CompetitionsDownloadLeaderboard => "competitions",
            DatasetsList
            | DatasetsListFiles
            | DatasetsDownload
            | DatasetsDownloadSingleFile
            | DatasetsCreate
            | DatasetsNewVersion
            | DatasetsInitialize
            | DatasetsGetMetadata
            | DatasetsUpdateMetadata
            | DatasetsStatus => "datasets",
            KernelsList | KernelsInitialize | KernelsPush | KernelsPull | KernelsGetOutput
            | KernelsStatus => "kernels",
            DebugEchoCredentials => "debug",
        }
    }

    pub fn subcommand(self) -> &'static str {
        use Operation::*;
        match self {
            CompetitionsList | DatasetsList | KernelsList => "list",
            CompetitionsListFiles | DatasetsListFiles => "list-files",
            CompetitionsDownload | DatasetsDownload => "download",
            CompetitionsSubmit => "submit",
            CompetitionsListSubmissions => "list-submissions",
            CompetitionsViewLeaderboard => "view-leaderboard",
            CompetitionsDownloadLeaderboard => "download-leaderboard",
            DatasetsDownloadSingleFile => "download-single-file",
            DatasetsCreate => "create",
            DatasetsNewVersion => "new-version",
            DatasetsInitialize | KernelsInitialize => "initialize",
            DatasetsGetMetadata => "get-metadata",
            DatasetsUpdateMetadata => "update-metadata",
            DatasetsStatus | KernelsStatus => "status",
            KernelsPush => "push",
            KernelsPull => "pull",
            KernelsGetOutput => "get-output",
            DebugEchoCredentials => "echo-credentials",
        }
    }

    /// Validates the parameters of this operation and binds its handler.
    pub(crate) fn prepare(self, params: &Params) -> Result<Prepared, Error> {
        use Operation::*;
        use handlers::prepare;

        match self {
            CompetitionsList => prepare::<competitions::List>(params),
            CompetitionsListFiles => prepare::<competitions::ListFiles>(params),
            CompetitionsDownload => prepare::<competitions::Download>(params),
            CompetitionsSubmit => prepare::<competitions::Submit>(params),
            CompetitionsListSubmissions => prepare::<competitions::ListSubmissions>(params),
            CompetitionsViewLeaderboard => prepare::<competitions::ViewLeaderboard>(params),
            CompetitionsDownloadLeaderboard => prepare::<competitions::DownloadLeaderboard>(params),
            DatasetsList => prepare::<datasets::List>(params),
            DatasetsListFiles => prepare::<datasets::ListFiles>(params),
            DatasetsDownload => prepare::<datasets::Download>(params),
            DatasetsDownloadSingleFile => prepare::<datasets::DownloadFile>(params),
            DatasetsCreate => prepare::<datasets::Create>(params),
            DatasetsNewVersion => prepare::<datasets::NewVersion>(params),
            DatasetsInitialize => prepare::<datasets::Initialize>(params),
            DatasetsGetMetadata => prepare::<datasets::GetMetadata>(params),
            DatasetsUpdateMetadata => prepare::<datasets::UpdateMetadata>(params),
            DatasetsStatus => prepare::<datasets::Status>(params),
            KernelsList => prepare::<kernels::List>(params),
            KernelsInitialize => prepare::<kernels::Initialize>(params),
            KernelsPush => prepare::<kernels::Push>(params),
            KernelsPull => prepare::<kernels::Pull>(params),
            KernelsGetOutput => prepare::<kernels::GetOutput>(params),
            KernelsStatus => prepare::<kernels::Status>(params),
            DebugEchoCredentials => prepare::<debug::EchoCredentials>(params),
        }
    }

    /// Validates and runs this operation against `api`.
    pub fn run(self, api: &dyn KaggleApi, params: &Params) -> Result<Output, Error> {
        let handler = self.prepare(params)?;
        handler(api)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command(), self.subcommand())
    }
}

/// Runs one invocation end to end: lookup, parameter validation,
/// `connect`, then the handler, all behind the normalization boundary.
///
/// Unknown pairs and bad parameters fail before `connect` is called.
pub fn invoke<F, A>(
    command: Option<&str>,
    subcommand: Option<&str>,
    params: &Params,
    debug: bool,
    connect: F,
) -> Result<Outcome, Error>
where
    F: FnOnce(&Params) -> Result<A, Error>,
    A: KaggleApi,
{
    normalize(debug, || {
        let (Some(command), Some(subcommand)) = (command, subcommand) else {
            return Err(Error::Dispatch(USAGE_ERROR.to_string()));
        };
        let op = Operation::resolve(command, subcommand)?;
        log::debug!("dispatching {op}");
        let handler = op.prepare(params)?;
        let api = connect(params)?;
        handler(&api)
    })
}
