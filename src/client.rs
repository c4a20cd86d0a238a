use anyhow::{Context, Result, anyhow, bail};
use indicatif::ProgressBar;
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::{Body, Client as HttpClient, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::api::{
    CompetitionListRequest, DatasetCreateRequest, DatasetListRequest, DatasetVersionRequest,
    DirMode, KaggleApi, KernelListRequest,
};
use crate::archive::{extract_flat, zip_directory};
use crate::download::save_response;
use crate::error::format_api_error;
use crate::metadata::{
    self, DATASET_METADATA_FILE, KERNEL_METADATA_FILE, is_metadata_file, source_extension,
};
use crate::models::{
    Competition, CompetitionFile, Dataset, DatasetCreateResult, DatasetFile,
    DatasetFilesResponse, DatasetMetadataResponse, Kernel, KernelOutputResponse,
    KernelPullResponse, KernelPushResult, KernelStatus, LeaderboardEntry, LeaderboardResponse,
    MetadataUpdateResponse, Submission, SubmitResult, UploadUrl, UploadedFile,
};
use crate::util::{backoff, file_name_of, last_modified_secs, retriable_status, split_ref};

pub const DEFAULT_URL: &str = "https://www.kaggle.com/api/v1";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base API URL, typically `https://www.kaggle.com/api/v1`.
    pub url: String,
    /// Kaggle account name.
    pub username: String,
    /// API key from `kaggle.json`.
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    base: Url,
    username: String,
    key: String,

    timeout: Duration,
    retry_max: usize,
    sleep_max: Duration,

    http: HttpClient,
}

// Request parameters, skipping unset optionals.
type Query = Vec<(&'static str, String)>;

fn push_opt(query: &mut Query, name: &'static str, value: &Option<String>) {
    if let Some(v) = value {
        query.push((name, v.clone()));
    }
}

impl Client {
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let base = Url::parse(cfg.url.trim_end_matches('/'))
            .with_context(|| format!("invalid API url {:?}", cfg.url))?;
        if base.cannot_be_a_base() {
            bail!("invalid API url {:?}", cfg.url);
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kaggle-bridge/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("kaggle-bridge")),
        );

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base,
            username: cfg.username,
            key: cfg.key,
            timeout: Duration::from_secs(60),
            retry_max: 3,
            sleep_max: Duration::from_secs(10),
            http,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_max(mut self, retry_max: usize) -> Self {
        self.retry_max = retry_max.max(1);
        self
    }

    pub fn with_sleep_max(mut self, sleep_max: Duration) -> Self {
        self.sleep_max = sleep_max;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("invalid API url {}", self.base))?
            .pop_if_empty()
            .extend(segments.iter().flat_map(|s| s.split('/')));
        Ok(url)
    }

    /// Resolves a server-provided link, which may be absolute or relative to the API base.
    fn resolve(&self, link: &str) -> Result<Url> {
        match Url::parse(link) {
            Ok(url) => Ok(url),
            Err(_) => self
                .base
                .join(link)
                .with_context(|| format!("invalid link {link:?}")),
        }
    }

    // Credentials only go to the API host; signed storage URLs carry their own.
    fn apply_auth(&self, url: &Url, req: RequestBuilder) -> RequestBuilder {
        if url.as_str().starts_with(self.base.as_str()) {
            req.basic_auth(&self.username, Some(&self.key))
        } else {
            req
        }
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str], query: &Query) -> Result<T> {
        let url = self.endpoint(segments)?;
        self.api_json(Method::GET, url, |req| req.query(query))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> Result<T> {
        let url = self.endpoint(segments)?;
        self.api_json(Method::POST, url, |req| req.json(body))
    }

    fn post_form<T: DeserializeOwned>(&self, segments: &[&str], form: &[(&str, &str)]) -> Result<T> {
        let url = self.endpoint(segments)?;
        self.api_json(Method::POST, url, |req| req.form(form))
    }

    fn api_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        build: impl Fn(RequestBuilder) -> RequestBuilder,
    ) -> Result<T> {
        let resp = self.robust_request(|| {
            let req = self
                .http
                .request(method.clone(), url.clone())
                .timeout(self.timeout);
            build(self.apply_auth(&url, req)).send()
        })?;

        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        if !status.is_success() {
            return Err(format_api_error(status, url.as_str(), &text).into());
        }

        serde_json::from_str::<T>(&text)
            .with_context(|| format!("failed to parse API JSON (url={}, status={})", url, status))
    }

    /// Downloads `url` into `target`, replacing what is there.
    fn fetch(&self, url: Url, target: &Path, quiet: bool) -> Result<PathBuf> {
        log::debug!("[download] {} -> {}", url, target.display());
        let resp = self.robust_request(|| self.apply_auth(&url, self.http.get(url.clone())).send())?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(format_api_error(status, url.as_str(), &text).into());
        }
        save_response(resp, target, quiet)
    }

    /// Downloads unless `target` exists and `force` is off.
    fn fetch_unless_present(
        &self,
        url: Url,
        target: &Path,
        force: bool,
        quiet: bool,
    ) -> Result<PathBuf> {
        if target.exists() && !force {
            if !quiet {
                eprintln!("{} already exists, skipping (set FORCE to overwrite)", target.display());
            }
            return Ok(target.to_path_buf());
        }
        self.fetch(url, target, quiet)
    }

    /// PUTs a blob to a signed upload URL.
    fn put_blob(&self, link: &str, body: Body) -> Result<()> {
        let url = self.resolve(link)?;
        let resp = self
            .apply_auth(&url, self.http.put(url.clone()))
            .body(body)
            .send()
            .context("upload failed")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(format_api_error(status, url.as_str(), &text).into());
        }
        Ok(())
    }

    fn spinner(&self, quiet: bool, message: String) -> Option<ProgressBar> {
        if quiet {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }

    /// Uploads one dataset file, returning the token the create call refers to.
    fn upload_dataset_blob(&self, name: &str, content_length: u64, mtime: u64, body: Body) -> Result<String> {
        let content_length = content_length.to_string();
        let mtime = mtime.to_string();
        let url: UploadUrl = self.post_form(
            &["datasets", "upload", "file", content_length.as_str(), mtime.as_str()],
            &[("fileName", name)],
        )?;
        self.put_blob(&url.create_url, body)
            .with_context(|| format!("failed to upload {name}"))?;
        Ok(url.token)
    }

    fn upload_folder(&self, folder: &Path, dir_mode: DirMode, quiet: bool) -> Result<Vec<UploadedFile>> {
        let mut entries = fs::read_dir(folder)
            .with_context(|| format!("failed to list {}", folder.display()))?
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        let mut uploaded = Vec::new();
        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_metadata_file(&name) {
                continue;
            }

            if path.is_dir() && dir_mode == DirMode::Skip {
                log::info!("skipping directory {}", path.display());
                continue;
            }

            let pb = self.spinner(quiet, format!("uploading {name}"));
            let token = if path.is_dir() {
                let bytes = zip_directory(&path)?;
                let mtime = last_modified_secs(&fs::metadata(&path)?);
                let len = bytes.len() as u64;
                self.upload_dataset_blob(&format!("{name}.zip"), len, mtime, Body::from(bytes))?
            } else {
                let meta = fs::metadata(&path)?;
                let file = fs::File::open(&path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                self.upload_dataset_blob(
                    &name,
                    meta.len(),
                    last_modified_secs(&meta),
                    Body::sized(file, meta.len()),
                )?
            };
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }

            uploaded.push(UploadedFile {
                token,
                description: None,
            });
        }

        if uploaded.is_empty() {
            bail!("no files found to upload in {}", folder.display());
        }
        Ok(uploaded)
    }

    fn check_create_result(result: DatasetCreateResult) -> Result<DatasetCreateResult> {
        if let Some(err) = result.error.as_deref().filter(|e| !e.is_empty()) {
            bail!("dataset upload failed: {err}");
        }
        if !result.invalid_tags.is_empty() {
            log::warn!("the following tags are invalid: {}", result.invalid_tags.join(", "));
        }
        Ok(result)
    }

    fn kernel_query(&self, kernel: &str) -> Result<Query> {
        let (owner, slug) = split_ref(kernel, &self.username)?;
        Ok(vec![("userName", owner), ("kernelSlug", slug)])
    }

    fn robust_request<F>(&self, mut f: F) -> Result<Response>
    where
        F: FnMut() -> std::result::Result<Response, reqwest::Error>,
    {
        let mut tries = 0usize;
        let mut sleep = Duration::ZERO;
        loop {
            let result = f();

            match result {
                Ok(resp) => {
                    if retriable_status(resp.status().as_u16()) {
                        tries += 1;
                        if tries >= self.retry_max {
                            return Ok(resp);
                        }
                        sleep = backoff(sleep, self.sleep_max);
                        log::warn!("HTTP {} from {}, retrying in {:?}", resp.status(), resp.url(), sleep);
                        thread::sleep(sleep);
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    tries += 1;
                    if tries >= self.retry_max {
                        return Err(anyhow::Error::new(err).context("could not connect"));
                    }
                    // timeouts / transient connection errors
                    sleep = backoff(sleep, self.sleep_max);
                    log::warn!("request failed ({err}), retrying in {:?}", sleep);
                    thread::sleep(sleep);
                }
            }
        }
    }
}

impl KaggleApi for Client {
    fn competitions_list(&self, request: &CompetitionListRequest) -> Result<Vec<Competition>> {
        let mut query: Query = Vec::new();
        push_opt(&mut query, "group", &request.group);
        push_opt(&mut query, "category", &request.category);
        push_opt(&mut query, "sortBy", &request.sort_by);
        query.push(("page", request.page.to_string()));
        push_opt(&mut query, "search", &request.search);
        self.get_json(&["competitions", "list"], &query)
            .context("failed to list competitions")
    }

    fn competition_list_files(&self, competition: &str) -> Result<Vec<CompetitionFile>> {
        self.get_json(&["competitions", "data", "list", competition], &Vec::new())
            .with_context(|| format!("failed to list files of competition {competition}"))
    }

    fn competition_download_files(
        &self,
        competition: &str,
        path: &Path,
        force: bool,
        quiet: bool,
    ) -> Result<PathBuf> {
        let url = self.endpoint(&["competitions", "data", "download-all", competition])?;
        let target = path.join(format!("{competition}.zip"));
        self.fetch_unless_present(url, &target, force, quiet)
            .with_context(|| format!("failed to download competition {competition}"))
    }

    fn competition_submit(
        &self,
        file: &Path,
        message: &str,
        competition: &str,
        quiet: bool,
    ) -> Result<SubmitResult> {
        let meta = fs::metadata(file).with_context(|| format!("cannot read {}", file.display()))?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("not a file: {}", file.display()))?;

        let content_length = meta.len().to_string();
        let mtime = last_modified_secs(&meta).to_string();
        let url: UploadUrl = self
            .post_form(
                &[
                    "competitions",
                    competition,
                    "submissions",
                    "url",
                    content_length.as_str(),
                    mtime.as_str(),
                ],
                &[("fileName", name.as_str())],
            )
            .context("failed to request a submission upload url")?;

        let pb = self.spinner(quiet, format!("uploading {name}"));
        let body = fs::File::open(file).with_context(|| format!("failed to open {}", file.display()))?;
        self.put_blob(&url.create_url, Body::sized(body, meta.len()))
            .with_context(|| format!("failed to upload {}", file.display()))?;
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        self.post_form(
            &["competitions", "submissions", "submit", competition],
            &[
                ("blobFileTokens", url.token.as_str()),
                ("submissionDescription", message),
            ],
        )
        .with_context(|| format!("failed to submit to competition {competition}"))
    }

    fn competition_submissions(&self, competition: &str, page: u32) -> Result<Vec<Submission>> {
        self.get_json(
            &["competitions", "submissions", "list", competition],
            &vec![("page", page.to_string())],
        )
        .with_context(|| format!("failed to list submissions of competition {competition}"))
    }

    fn competition_leaderboard_view(&self, competition: &str) -> Result<Vec<LeaderboardEntry>> {
        let reply: LeaderboardResponse = self
            .get_json(&["competitions", competition, "leaderboard", "view"], &Vec::new())
            .with_context(|| format!("failed to view leaderboard of competition {competition}"))?;
        Ok(reply.submissions)
    }

    fn competition_leaderboard_download(
        &self,
        competition: &str,
        path: &Path,
        quiet: bool,
    ) -> Result<PathBuf> {
        let url = self.endpoint(&["competitions", competition, "leaderboard", "download"])?;
        let target = path.join(format!("{competition}.zip"));
        self.fetch(url, &target, quiet)
            .with_context(|| format!("failed to download leaderboard of competition {competition}"))
    }

    fn dataset_list(&self, request: &DatasetListRequest) -> Result<Vec<Dataset>> {
        let group = match (request.mine, &request.user) {
            (true, _) => "my",
            (false, Some(_)) => "user",
            (false, None) => "public",
        };
        let mut query: Query = vec![("group", group.to_string())];
        push_opt(&mut query, "sortBy", &request.sort_by);
        push_opt(&mut query, "size", &request.size);
        push_opt(&mut query, "filetype", &request.file_type);
        push_opt(&mut query, "license", &request.license_name);
        push_opt(&mut query, "tagids", &request.tag_ids);
        push_opt(&mut query, "search", &request.search);
        push_opt(&mut query, "user", &request.user);
        query.push(("page", request.page.to_string()));
        if let Some(max) = request.max_size {
            query.push(("maxSize", max.to_string()));
        }
        if let Some(min) = request.min_size {
            query.push(("minSize", min.to_string()));
        }
        self.get_json(&["datasets", "list"], &query)
            .context("failed to list datasets")
    }

    fn dataset_list_files(&self, dataset: &str) -> Result<Vec<DatasetFile>> {
        let (owner, slug) = split_ref(dataset, &self.username)?;
        let reply: DatasetFilesResponse = self
            .get_json(&["datasets", "list", owner.as_str(), slug.as_str()], &Vec::new())
            .with_context(|| format!("failed to list files of dataset {owner}/{slug}"))?;
        if let Some(err) = reply.error_message.filter(|e| !e.is_empty()) {
            bail!("failed to list files of dataset {owner}/{slug}: {err}");
        }
        Ok(reply.dataset_files)
    }

    fn dataset_download_files(
        &self,
        dataset: &str,
        path: &Path,
        unzip: bool,
        force: bool,
        quiet: bool,
    ) -> Result<PathBuf> {
        let (owner, slug) = split_ref(dataset, &self.username)?;
        let url = self.endpoint(&["datasets", "download", owner.as_str(), slug.as_str()])?;
        let target = path.join(format!("{slug}.zip"));
        let archive = self
            .fetch_unless_present(url, &target, force, quiet)
            .with_context(|| format!("failed to download dataset {owner}/{slug}"))?;

        if !unzip {
            return Ok(archive);
        }
        extract_flat(&archive, path, true)?;
        Ok(path.to_path_buf())
    }

    fn dataset_download_file(
        &self,
        dataset: &str,
        file_name: &str,
        path: &Path,
        force: bool,
        quiet: bool,
    ) -> Result<PathBuf> {
        let (owner, slug) = split_ref(dataset, &self.username)?;
        let url = self.endpoint(&["datasets", "download", owner.as_str(), slug.as_str(), file_name])?;
        let local = file_name_of(file_name).ok_or_else(|| anyhow!("invalid file name {file_name:?}"))?;
        self.fetch_unless_present(url, &path.join(local), force, quiet)
            .with_context(|| format!("failed to download {file_name} from dataset {owner}/{slug}"))
    }

    fn dataset_create_new(&self, request: &DatasetCreateRequest) -> Result<DatasetCreateResult> {
        let meta = metadata::read_dataset_metadata(&request.folder)?;
        let (owner, slug) = split_ref(&meta.id, &self.username)?;
        let files = self.upload_folder(&request.folder, request.dir_mode, request.quiet)?;

        let body = json!({
            "title": meta.title,
            "slug": slug,
            "ownerSlug": owner,
            "licenseName": meta.license_name(),
            "subtitle": meta.subtitle,
            "description": meta.description,
            "files": files,
            "isPrivate": !request.public,
            "convertToCsv": request.convert_to_csv,
            "categoryIds": meta.keywords,
        });
        let result: DatasetCreateResult = self
            .post_json(&["datasets", "create", "new"], &body)
            .with_context(|| format!("failed to create dataset {owner}/{slug}"))?;
        Self::check_create_result(result)
    }

    fn dataset_create_version(
        &self,
        request: &DatasetVersionRequest,
    ) -> Result<DatasetCreateResult> {
        let meta = metadata::read_dataset_metadata(&request.folder)?;
        let (owner, slug) = split_ref(&meta.id, &self.username)?;
        let files = self.upload_folder(&request.folder, request.dir_mode, request.quiet)?;

        let mut body = json!({
            "subtitle": meta.subtitle,
            "description": meta.description,
            "files": files,
            "convertToCsv": request.convert_to_csv,
            "categoryIds": meta.keywords,
            "deleteOldVersions": request.delete_old_versions,
        });
        if let Some(notes) = &request.version_notes {
            body["versionNotes"] = json!(notes);
        }
        let result: DatasetCreateResult = self
            .post_json(&["datasets", "create", "version", owner.as_str(), slug.as_str()], &body)
            .with_context(|| format!("failed to create a new version of {owner}/{slug}"))?;
        Self::check_create_result(result)
    }

    fn dataset_initialize(&self, folder: &Path) -> Result<PathBuf> {
        metadata::write_dataset_template(folder, &self.username)
    }

    fn dataset_metadata(&self, dataset: &str, path: &Path) -> Result<PathBuf> {
        let (owner, slug) = split_ref(dataset, &self.username)?;
        let reply: DatasetMetadataResponse = self
            .get_json(&["datasets", "metadata", owner.as_str(), slug.as_str()], &Vec::new())
            .with_context(|| format!("failed to fetch metadata of dataset {owner}/{slug}"))?;
        if let Some(err) = reply.error_message.filter(|e| !e.is_empty()) {
            bail!("failed to fetch metadata of dataset {owner}/{slug}: {err}");
        }

        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory {}", path.display()))?;
        let target = path.join(DATASET_METADATA_FILE);
        let info = reply.info.unwrap_or(Value::Object(Map::new()));
        fs::write(&target, serde_json::to_string_pretty(&info)?)
            .with_context(|| format!("failed to write {}", target.display()))?;
        Ok(target)
    }

    fn dataset_metadata_update(&self, dataset: &str, path: &Path) -> Result<()> {
        let (owner, slug) = split_ref(dataset, &self.username)?;
        let source = path.join(DATASET_METADATA_FILE);
        let text = fs::read_to_string(&source)
            .with_context(|| format!("metadata file not found: {}", source.display()))?;
        let info: Map<String, Value> = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", source.display()))?;

        let settings: Map<String, Value> = [
            "title",
            "subtitle",
            "description",
            "isPrivate",
            "licenses",
            "keywords",
            "collaborators",
            "data",
        ]
        .into_iter()
        .filter_map(|k| info.get(k).map(|v| (k.to_string(), v.clone())))
        .collect();

        let reply: MetadataUpdateResponse = self
            .post_json(&["datasets", "metadata", owner.as_str(), slug.as_str()], &settings)
            .with_context(|| format!("failed to update metadata of dataset {owner}/{slug}"))?;
        if !reply.errors.is_empty() {
            bail!(
                "failed to update metadata of dataset {owner}/{slug}: {}",
                reply.errors.join("; ")
            );
        }
        Ok(())
    }

    fn dataset_status(&self, dataset: &str) -> Result<String> {
        let (owner, slug) = split_ref(dataset, &self.username)?;
        let status: Value = self
            .get_json(&["datasets", "status", owner.as_str(), slug.as_str()], &Vec::new())
            .with_context(|| format!("failed to fetch status of dataset {owner}/{slug}"))?;
        Ok(match status {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    fn kernels_list(&self, request: &KernelListRequest) -> Result<Vec<Kernel>> {
        if !(1..=100).contains(&request.page_size) {
            bail!("page size must be between 1 and 100, got {}", request.page_size);
        }
        let group = if request.mine { "profile" } else { "everyone" };
        let mut query: Query = vec![
            ("page", request.page.to_string()),
            ("pageSize", request.page_size.to_string()),
            ("group", group.to_string()),
        ];
        push_opt(&mut query, "search", &request.search);
        push_opt(&mut query, "user", &request.user);
        push_opt(&mut query, "language", &request.language);
        push_opt(&mut query, "kernelType", &request.kernel_type);
        push_opt(&mut query, "outputType", &request.output_type);
        push_opt(&mut query, "sortBy", &request.sort_by);
        push_opt(&mut query, "dataset", &request.dataset);
        push_opt(&mut query, "competition", &request.competition);
        push_opt(&mut query, "parentKernel", &request.parent_kernel);
        self.get_json(&["kernels", "list"], &query)
            .context("failed to list kernels")
    }

    fn kernels_initialize(&self, folder: &Path) -> Result<PathBuf> {
        metadata::write_kernel_template(folder, &self.username)
    }

    fn kernels_push(&self, folder: &Path) -> Result<KernelPushResult> {
        let meta = metadata::read_kernel_metadata(folder)?;
        let (owner, slug) = split_ref(&meta.id, &self.username)?;
        let code_path = folder.join(&meta.code_file);
        let mut text = fs::read_to_string(&code_path)
            .with_context(|| format!("source file not found: {}", code_path.display()))?;
        if meta.kernel_type == "notebook" {
            text = metadata::strip_notebook_outputs(&text)?;
        }

        let body = json!({
            "id": meta.id_no,
            "slug": format!("{owner}/{slug}"),
            "newTitle": meta.title,
            "text": text,
            "language": meta.language,
            "kernelType": meta.kernel_type,
            "isPrivate": meta.is_private,
            "enableGpu": meta.enable_gpu,
            "enableInternet": meta.enable_internet,
            "datasetDataSources": meta.dataset_sources,
            "competitionDataSources": meta.competition_sources,
            "kernelDataSources": meta.kernel_sources,
            "categoryIds": meta.keywords,
        });
        let result: KernelPushResult = self
            .post_json(&["kernels", "push"], &body)
            .with_context(|| format!("failed to push kernel {owner}/{slug}"))?;
        if let Some(err) = result.error.as_deref().filter(|e| !e.is_empty()) {
            bail!("kernel push failed: {err}");
        }
        Ok(result)
    }

    fn kernels_pull(
        &self,
        kernel: &str,
        path: &Path,
        metadata: bool,
        quiet: bool,
    ) -> Result<PathBuf> {
        let query = self.kernel_query(kernel)?;
        let (owner, slug) = (query[0].1.clone(), query[1].1.clone());
        let reply: KernelPullResponse = self
            .get_json(&["kernels", "pull"], &query)
            .with_context(|| format!("failed to pull kernel {owner}/{slug}"))?;
        let meta = reply.metadata;

        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory {}", path.display()))?;
        let language = meta.language.as_deref().unwrap_or("python");
        let kernel_type = meta.kernel_type.as_deref().unwrap_or("script");
        let code_file = format!("{slug}.{}", source_extension(language, kernel_type));
        let target = path.join(&code_file);
        fs::write(&target, &reply.blob.source)
            .with_context(|| format!("failed to write {}", target.display()))?;

        if metadata {
            let local = json!({
                "id": meta.reference.clone().unwrap_or_else(|| format!("{owner}/{slug}")),
                "id_no": meta.id,
                "title": meta.title,
                "code_file": code_file,
                "language": language,
                "kernel_type": kernel_type,
                "is_private": meta.is_private,
                "enable_gpu": meta.enable_gpu,
                "enable_internet": meta.enable_internet,
                "dataset_sources": meta.dataset_data_sources,
                "competition_sources": meta.competition_data_sources,
                "kernel_sources": meta.kernel_data_sources,
                "keywords": meta.category_ids,
            });
            let meta_path = path.join(KERNEL_METADATA_FILE);
            fs::write(&meta_path, serde_json::to_string_pretty(&local)?)
                .with_context(|| format!("failed to write {}", meta_path.display()))?;
        }

        if !quiet {
            eprintln!("Source code downloaded to {}", target.display());
        }
        Ok(target)
    }

    fn kernels_output(
        &self,
        kernel: &str,
        path: &Path,
        force: bool,
        quiet: bool,
    ) -> Result<Vec<PathBuf>> {
        let query = self.kernel_query(kernel)?;
        let slug = query[1].1.clone();
        let reply: KernelOutputResponse = self
            .get_json(&["kernels", "output"], &query)
            .with_context(|| format!("failed to fetch output of kernel {kernel}"))?;

        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory {}", path.display()))?;
        let mut written = Vec::new();
        for file in reply.files {
            let local = file_name_of(&file.file_name)
                .ok_or_else(|| anyhow!("invalid output file name {:?}", file.file_name))?;
            let url = self.resolve(&file.url)?;
            written.push(self.fetch_unless_present(url, &path.join(local), force, quiet)?);
        }

        if let Some(log) = reply.log.filter(|l| !l.is_empty()) {
            let log_path = path.join(format!("{slug}.log"));
            fs::write(&log_path, log)
                .with_context(|| format!("failed to write {}", log_path.display()))?;
            written.push(log_path);
        }
        Ok(written)
    }

    fn kernels_status(&self, kernel: &str) -> Result<KernelStatus> {
        let query = self.kernel_query(kernel)?;
        self.get_json(&["kernels", "status"], &query)
            .with_context(|| format!("failed to fetch status of kernel {kernel}"))
    }
}
