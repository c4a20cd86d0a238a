use anyhow::Result;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;
use crate::models::{
    Competition, CompetitionFile, Dataset, DatasetCreateResult, DatasetFile, Kernel,
    KernelPushResult, KernelStatus, LeaderboardEntry, Submission, SubmitResult,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompetitionListRequest {
    pub group: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub page: u32,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetListRequest {
    pub sort_by: Option<String>,
    pub size: Option<String>,
    pub file_type: Option<String>,
    pub license_name: Option<String>,
    pub tag_ids: Option<String>,
    pub search: Option<String>,
    pub user: Option<String>,
    pub mine: bool,
    pub page: u32,
    pub max_size: Option<u64>,
    pub min_size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelListRequest {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub mine: bool,
    pub dataset: Option<String>,
    pub competition: Option<String>,
    pub parent_kernel: Option<String>,
    pub user: Option<String>,
    pub language: Option<String>,
    pub kernel_type: Option<String>,
    pub output_type: Option<String>,
    pub sort_by: Option<String>,
}

/// What to do with subdirectories of a dataset folder on upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirMode {
    #[default]
    Skip,
    Zip,
}

impl FromStr for DirMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(DirMode::Skip),
            "zip" => Ok(DirMode::Zip),
            other => Err(Error::Validation(format!(
                "DIR_MODE must be one of skip, zip; got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCreateRequest {
    pub folder: PathBuf,
    pub public: bool,
    pub quiet: bool,
    pub convert_to_csv: bool,
    pub dir_mode: DirMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetVersionRequest {
    pub folder: PathBuf,
    pub version_notes: Option<String>,
    pub quiet: bool,
    pub convert_to_csv: bool,
    pub delete_old_versions: bool,
    pub dir_mode: DirMode,
}

/// The Kaggle operations the dispatcher can reach.
///
/// [`crate::Client`] implements this over HTTP; handlers only ever see the
/// trait. References are `owner/slug`; a bare slug belongs to the
/// authenticated user.
pub trait KaggleApi {
    fn competitions_list(&self, request: &CompetitionListRequest) -> Result<Vec<Competition>>;
    fn competition_list_files(&self, competition: &str) -> Result<Vec<CompetitionFile>>;
    /// Downloads the competition bundle to `path/<competition>.zip`.
    fn competition_download_files(
        &self,
        competition: &str,
        path: &Path,
        force: bool,
        quiet: bool,
    ) -> Result<PathBuf>;
    fn competition_submit(
        &self,
        file: &Path,
        message: &str,
        competition: &str,
        quiet: bool,
    ) -> Result<SubmitResult>;
    fn competition_submissions(&self, competition: &str, page: u32) -> Result<Vec<Submission>>;
    fn competition_leaderboard_view(&self, competition: &str) -> Result<Vec<LeaderboardEntry>>;
    fn competition_leaderboard_download(
        &self,
        competition: &str,
        path: &Path,
        quiet: bool,
    ) -> Result<PathBuf>;

    fn dataset_list(&self, request: &DatasetListRequest) -> Result<Vec<Dataset>>;
    fn dataset_list_files(&self, dataset: &str) -> Result<Vec<DatasetFile>>;
    fn dataset_download_files(
        &self,
        dataset: &str,
        path: &Path,
        unzip: bool,
        force: bool,
        quiet: bool,
    ) -> Result<PathBuf>;
    fn dataset_download_file(
        &self,
        dataset: &str,
        file_name: &str,
        path: &Path,
        force: bool,
        quiet: bool,
    ) -> Result<PathBuf>;
    fn dataset_create_new(&self, request: &DatasetCreateRequest) -> Result<DatasetCreateResult>;
    fn dataset_create_version(&self, request: &DatasetVersionRequest)
    -> Result<DatasetCreateResult>;
    fn dataset_initialize(&self, folder: &Path) -> Result<PathBuf>;
    /// Writes the dataset's metadata to `path/dataset-metadata.json`.
    fn dataset_metadata(&self, dataset: &str, path: &Path) -> Result<PathBuf>;
    /// Uploads `path/dataset-metadata.json` as the dataset's metadata.
    fn dataset_metadata_update(&self, dataset: &str, path: &Path) -> Result<()>;
    fn dataset_status(&self, dataset: &str) -> Result<String>;

    fn kernels_list(&self, request: &KernelListRequest) -> Result<Vec<Kernel>>;
    fn kernels_initialize(&self, folder: &Path) -> Result<PathBuf>;
    fn kernels_push(&self, folder: &Path) -> Result<KernelPushResult>;
    fn kernels_pull(&self, kernel: &str, path: &Path, metadata: bool, quiet: bool)
    -> Result<PathBuf>;
    fn kernels_output(
        &self,
        kernel: &str,
        path: &Path,
        force: bool,
        quiet: bool,
    ) -> Result<Vec<PathBuf>>;
    fn kernels_status(&self, kernel: &str) -> Result<KernelStatus>;
}
