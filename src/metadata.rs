//! Local `dataset-metadata.json` / `kernel-metadata.json` files.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use crate::params::is_set;

pub const DATASET_METADATA_FILE: &str = "dataset-metadata.json";
pub const KERNEL_METADATA_FILE: &str = "kernel-metadata.json";
// Older dataset folders carry a Frictionless data package instead.
const DATAPACKAGE_FILE: &str = "datapackage.json";

const PLACEHOLDER: &str = "INSERT_";
const KERNEL_LANGUAGES: [&str; 3] = ["python", "r", "rmarkdown"];
const KERNEL_TYPES: [&str; 2] = ["script", "notebook"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub title: String,
    pub id: String,
    #[serde(default)]
    pub licenses: Vec<License>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl DatasetMetadata {
    pub fn license_name(&self) -> &str {
        self.licenses
            .first()
            .map(|l| l.name.as_str())
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelMetadata {
    pub id: String,
    #[serde(default)]
    pub id_no: Option<i64>,
    pub title: String,
    pub code_file: String,
    pub language: String,
    pub kernel_type: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_private: Option<bool>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub enable_gpu: Option<bool>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub enable_internet: Option<bool>,
    #[serde(default)]
    pub dataset_sources: Vec<String>,
    #[serde(default)]
    pub competition_sources: Vec<String>,
    #[serde(default)]
    pub kernel_sources: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Accepts `true`, `"true"`, `"yes"` etc. Templates store booleans as strings.
fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        Value::String(s) => Ok(Some(is_set(&s))),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, got {other}"
        ))),
    }
}

fn require_folder(folder: &Path) -> Result<()> {
    if !folder.is_dir() {
        bail!("invalid folder: {}", folder.display());
    }
    Ok(())
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_dataset_template(folder: &Path, username: &str) -> Result<PathBuf> {
    require_folder(folder)?;
    let template = json!({
        "title": "INSERT_TITLE_HERE",
        "id": format!("{username}/INSERT_SLUG_HERE"),
        "licenses": [{ "name": "CC0-1.0" }],
    });
    let path = folder.join(DATASET_METADATA_FILE);
    write_json(&path, &template)?;
    Ok(path)
}

pub fn write_kernel_template(folder: &Path, username: &str) -> Result<PathBuf> {
    require_folder(folder)?;
    let template = json!({
        "id": format!("{username}/INSERT_KERNEL_SLUG_HERE"),
        "title": "INSERT_TITLE_HERE",
        "code_file": "INSERT_CODE_FILE_PATH_HERE",
        "language": "Pick one of: {python,r,rmarkdown}",
        "kernel_type": "Pick one of: {script,notebook}",
        "is_private": "true",
        "enable_gpu": "false",
        "enable_internet": "true",
        "dataset_sources": [],
        "competition_sources": [],
        "kernel_sources": [],
    });
    let path = folder.join(KERNEL_METADATA_FILE);
    write_json(&path, &template)?;
    Ok(path)
}

pub(crate) fn is_metadata_file(name: &str) -> bool {
    matches!(
        name,
        DATASET_METADATA_FILE | KERNEL_METADATA_FILE | DATAPACKAGE_FILE
    )
}

pub fn read_dataset_metadata(folder: &Path) -> Result<DatasetMetadata> {
    require_folder(folder)?;
    let path = [DATASET_METADATA_FILE, DATAPACKAGE_FILE]
        .iter()
        .map(|name| folder.join(name))
        .find(|p| p.exists())
        .with_context(|| {
            format!(
                "metadata file not found: {}",
                folder.join(DATASET_METADATA_FILE).display()
            )
        })?;
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let meta: DatasetMetadata = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    if meta.title.contains(PLACEHOLDER) {
        bail!("default title detected, please change values before uploading");
    }
    if meta.id.contains(PLACEHOLDER) {
        bail!("default slug detected, please change values before uploading");
    }
    Ok(meta)
}

pub fn read_kernel_metadata(folder: &Path) -> Result<KernelMetadata> {
    require_folder(folder)?;
    let path = folder.join(KERNEL_METADATA_FILE);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("metadata file not found: {}", path.display()))?;
    let meta: KernelMetadata = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    if meta.id.contains(PLACEHOLDER) {
        bail!("default slug detected, please change values before pushing");
    }
    if meta.title.contains(PLACEHOLDER) {
        bail!("default title detected, please change values before pushing");
    }
    if meta.code_file.contains(PLACEHOLDER) {
        bail!("a source file must be specified in {KERNEL_METADATA_FILE}");
    }
    if !KERNEL_LANGUAGES.contains(&meta.language.as_str()) {
        bail!(
            "language must be one of {:?}, got {:?}",
            KERNEL_LANGUAGES,
            meta.language
        );
    }
    if !KERNEL_TYPES.contains(&meta.kernel_type.as_str()) {
        bail!(
            "kernel_type must be one of {:?}, got {:?}",
            KERNEL_TYPES,
            meta.kernel_type
        );
    }
    Ok(meta)
}

/// File extension a pulled kernel source is saved under.
pub(crate) fn source_extension(language: &str, kernel_type: &str) -> &'static str {
    match (language, kernel_type) {
        ("python", "notebook") => "ipynb",
        ("python", _) => "py",
        ("r", "notebook") => "irnb",
        ("r", _) => "R",
        ("rmarkdown", _) => "Rmd",
        _ => "txt",
    }
}

/// Clears cell outputs so pushed notebooks carry only their sources.
pub(crate) fn strip_notebook_outputs(text: &str) -> Result<String> {
    let mut notebook: Value = serde_json::from_str(text).context("notebook is not valid JSON")?;
    if let Some(cells) = notebook.get_mut("cells").and_then(Value::as_array_mut) {
        for cell in cells {
            if let Some(outputs) = cell.get_mut("outputs") {
                *outputs = Value::Array(Vec::new());
            }
        }
    }
    Ok(serde_json::to_string(&notebook)?)
}
