//! Wire types of the Kaggle REST API.
//!
//! Each type names the fields this crate reads and keeps every other field in
//! `extra`, so results pass through to the output document unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reward: Option<String>,
    #[serde(default)]
    pub team_count: Option<i64>,
    #[serde(default)]
    pub user_has_entered: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionFile {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub total_bytes: Option<i64>,
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default, rename = "ref")]
    pub reference: Option<i64>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub public_score: Option<String>,
    #[serde(default)]
    pub private_score: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub submission_date: Option<String>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaderboardResponse {
    #[serde(default)]
    pub(crate) submissions: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub total_bytes: Option<i64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub download_count: Option<i64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub usability_rating: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFile {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub total_bytes: Option<i64>,
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DatasetFilesResponse {
    #[serde(default)]
    pub(crate) dataset_files: Vec<DatasetFile>,
    #[serde(default)]
    pub(crate) error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DatasetMetadataResponse {
    #[serde(default)]
    pub(crate) info: Option<Value>,
    #[serde(default)]
    pub(crate) error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetadataUpdateResponse {
    #[serde(default)]
    pub(crate) errors: Vec<String>,
}

/// Result of creating a dataset or a new dataset version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetCreateResult {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub invalid_tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signed upload target handed out before a blob upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadUrl {
    pub(crate) create_url: String,
    pub(crate) token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadedFile {
    pub(crate) token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kernel {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub last_run_time: Option<String>,
    #[serde(default)]
    pub total_votes: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelPushResult {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub version_number: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub failure_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KernelPullResponse {
    pub(crate) metadata: KernelPullMetadata,
    pub(crate) blob: KernelBlob,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KernelPullMetadata {
    #[serde(default, rename = "ref")]
    pub(crate) reference: Option<String>,
    #[serde(default)]
    pub(crate) id: Option<i64>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) language: Option<String>,
    #[serde(default)]
    pub(crate) kernel_type: Option<String>,
    #[serde(default)]
    pub(crate) is_private: Option<bool>,
    #[serde(default)]
    pub(crate) enable_gpu: Option<bool>,
    #[serde(default)]
    pub(crate) enable_internet: Option<bool>,
    #[serde(default)]
    pub(crate) dataset_data_sources: Vec<String>,
    #[serde(default)]
    pub(crate) competition_data_sources: Vec<String>,
    #[serde(default)]
    pub(crate) kernel_data_sources: Vec<String>,
    #[serde(default)]
    pub(crate) category_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KernelBlob {
    #[serde(default)]
    pub(crate) source: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KernelOutputResponse {
    #[serde(default)]
    pub(crate) files: Vec<KernelOutputFile>,
    #[serde(default)]
    pub(crate) log: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KernelOutputFile {
    pub(crate) url: String,
    pub(crate) file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_survive_a_pass_through() {
        let raw = r#"{"ref":"titanic","title":"Titanic","teamCount":15000,"isKernelsSubmissionsOnly":false,"tags":[{"name":"tabular"}]}"#;
        let comp: Competition = serde_json::from_str(raw).unwrap();
        assert_eq!(comp.reference.as_deref(), Some("titanic"));
        assert_eq!(comp.team_count, Some(15000));

        let back = serde_json::to_value(&comp).unwrap();
        assert_eq!(back["isKernelsSubmissionsOnly"], Value::Bool(false));
        assert_eq!(back["tags"][0]["name"], "tabular");
        assert_eq!(back["ref"], "titanic");
    }

    #[test]
    fn leaderboard_replies_default_to_empty() {
        let reply: LeaderboardResponse = serde_json::from_str("{}").unwrap();
        assert!(reply.submissions.is_empty());
    }
}
