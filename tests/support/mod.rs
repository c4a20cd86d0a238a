#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{Cursor, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use serde::de::DeserializeOwned;
use zip::write::{SimpleFileOptions, ZipWriter};

use kaggle_bridge::models::{
    Competition, CompetitionFile, Dataset, DatasetCreateResult, DatasetFile, Kernel,
    KernelPushResult, KernelStatus, LeaderboardEntry, Submission, SubmitResult,
};
use kaggle_bridge::{
    CompetitionListRequest, DatasetCreateRequest, DatasetListRequest, DatasetVersionRequest,
    KaggleApi, KernelListRequest,
};

fn empty<T: DeserializeOwned>() -> T {
    serde_json::from_str("{}").expect("model accepts an empty object")
}

/// A `KaggleApi` that answers every call with an empty result and records
/// the call. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingApi {
    calls: Rc<RefCell<Vec<String>>>,
}

impl RecordingApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl KaggleApi for RecordingApi {
    fn competitions_list(&self, request: &CompetitionListRequest) -> Result<Vec<Competition>> {
        self.record(format!("competitions_list page={}", request.page));
        Ok(Vec::new())
    }

    fn competition_list_files(&self, competition: &str) -> Result<Vec<CompetitionFile>> {
        self.record(format!("competition_list_files {competition}"));
        Ok(Vec::new())
    }

    fn competition_download_files(
        &self,
        competition: &str,
        path: &Path,
        force: bool,
        quiet: bool,
    ) -> Result<PathBuf> {
        self.record(format!(
            "competition_download_files {competition} force={force} quiet={quiet}"
        ));
        Ok(path.join(format!("{competition}.zip")))
    }

    fn competition_submit(
        &self,
        file: &Path,
        message: &str,
        competition: &str,
        quiet: bool,
    ) -> Result<SubmitResult> {
        self.record(format!(
            "competition_submit {} {message:?} {competition} quiet={quiet}",
            file.display()
        ));
        Ok(empty())
    }

    fn competition_submissions(&self, competition: &str, page: u32) -> Result<Vec<Submission>> {
        self.record(format!("competition_submissions {competition} page={page}"));
        Ok(Vec::new())
    }

    fn competition_leaderboard_view(&self, competition: &str) -> Result<Vec<LeaderboardEntry>> {
        self.record(format!("competition_leaderboard_view {competition}"));
        Ok(Vec::new())
    }

    fn competition_leaderboard_download(
        &self,
        competition: &str,
        path: &Path,
        quiet: bool,
    ) -> Result<PathBuf> {
        self.record(format!("competition_leaderboard_download {competition} quiet={quiet}"));
        Ok(path.join(format!("{competition}.zip")))
    }

    fn dataset_list(&self, request: &DatasetListRequest) -> Result<Vec<Dataset>> {
        self.record(format!(
            "dataset_list page={} mine={} max_size={:?} min_size={:?}",
            request.page, request.mine, request.max_size, request.min_size
        ));
        Ok(Vec::new())
    }

    fn dataset_list_files(&self, dataset: &str) -> Result<Vec<DatasetFile>> {
        self.record(format!("dataset_list_files {dataset}"));
        Ok(Vec::new())
    }

    fn dataset_download_files(
        &self,
        dataset: &str,
        path: &Path,
        unzip: bool,
        force: bool,
        quiet: bool,
    ) -> Result<PathBuf> {
        self.record(format!(
            "dataset_download_files {dataset} unzip={unzip} force={force} quiet={quiet}"
        ));
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
        self.record(format!(
            "dataset_download_file {dataset} {file_name} force={force} quiet={quiet}"
        ));
        Ok(path.join(file_name))
    }

    fn dataset_create_new(&self, request: &DatasetCreateRequest) -> Result<DatasetCreateResult> {
        self.record(format!(
            "dataset_create_new public={} dir_mode={:?}",
            request.public, request.dir_mode
        ));
        Ok(empty())
    }

    fn dataset_create_version(
        &self,
        request: &DatasetVersionRequest,
    ) -> Result<DatasetCreateResult> {
        self.record(format!(
            "dataset_create_version {:?} delete_old_versions={}",
            request.version_notes, request.delete_old_versions
        ));
        Ok(empty())
    }

    fn dataset_initialize(&self, folder: &Path) -> Result<PathBuf> {
        self.record("dataset_initialize".to_string());
        Ok(folder.join("dataset-metadata.json"))
    }

    fn dataset_metadata(&self, dataset: &str, path: &Path) -> Result<PathBuf> {
        self.record(format!("dataset_metadata {dataset}"));
        Ok(path.join("dataset-metadata.json"))
    }

    fn dataset_metadata_update(&self, dataset: &str, _path: &Path) -> Result<()> {
        self.record(format!("dataset_metadata_update {dataset}"));
        Ok(())
    }

    fn dataset_status(&self, dataset: &str) -> Result<String> {
        self.record(format!("dataset_status {dataset}"));
        Ok("ready".to_string())
    }

    fn kernels_list(&self, request: &KernelListRequest) -> Result<Vec<Kernel>> {
        self.record(format!(
            "kernels_list page={} page_size={} dataset={:?}",
            request.page, request.page_size, request.dataset
        ));
        Ok(Vec::new())
    }

    fn kernels_initialize(&self, folder: &Path) -> Result<PathBuf> {
        self.record("kernels_initialize".to_string());
        Ok(folder.join("kernel-metadata.json"))
    }

    fn kernels_push(&self, _folder: &Path) -> Result<KernelPushResult> {
        self.record("kernels_push".to_string());
        Ok(empty())
    }

    fn kernels_pull(
        &self,
        kernel: &str,
        path: &Path,
        metadata: bool,
        quiet: bool,
    ) -> Result<PathBuf> {
        self.record(format!("kernels_pull {kernel} metadata={metadata} quiet={quiet}"));
        Ok(path.join("kernel.py"))
    }

    fn kernels_output(
        &self,
        kernel: &str,
        _path: &Path,
        force: bool,
        quiet: bool,
    ) -> Result<Vec<PathBuf>> {
        self.record(format!("kernels_output {kernel} force={force} quiet={quiet}"));
        Ok(Vec::new())
    }

    fn kernels_status(&self, kernel: &str) -> Result<KernelStatus> {
        self.record(format!("kernels_status {kernel}"));
        Ok(empty())
    }
}

/// A canned HTTP reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bytes(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "application/octet-stream".into())],
            body: body.into(),
        }
    }

    pub fn redirect(location: String) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".into(), location)],
            body: Vec::new(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.as_bytes().to_vec(),
        }
    }
}

type Route = dyn Fn(&str, &str, SocketAddr) -> Reply + Send + Sync;

/// A loopback HTTP/1.1 server answering every request through `route`
/// (method, path with query, server address). One request per connection.
pub struct StubServer {
    addr: SocketAddr,
}

impl StubServer {
    pub fn start<F>(route: F) -> Self
    where
        F: Fn(&str, &str, SocketAddr) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let route: Arc<Route> = Arc::new(route);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let route = Arc::clone(&route);
                thread::spawn(move || serve(stream, &*route, addr));
            }
        });
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }
}

fn serve(mut stream: TcpStream, route: &Route, addr: SocketAddr) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    let head = String::from_utf8_lossy(&head);
    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let reply = route(&method, &path, addr);
    let reason = match reply.status {
        200 => "OK",
        302 => "Found",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Status",
    };
    let mut response = format!("HTTP/1.1 {} {reason}\r\n", reply.status);
    for (name, value) in &reply.headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        reply.body.len()
    ));
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&reply.body);
    let _ = stream.flush();
}

/// Builds an outer zip whose entries are themselves zip archives.
pub fn nested_zip(entries: &[(&str, &[(&str, &[u8])])]) -> Vec<u8> {
    let options = SimpleFileOptions::default();
    let mut outer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, members) in entries {
        let mut inner = ZipWriter::new(Cursor::new(Vec::new()));
        for (member, content) in *members {
            inner.start_file(*member, options).expect("start inner member");
            inner.write_all(content).expect("write inner member");
        }
        let inner = inner.finish().expect("finish inner").into_inner();

        outer.start_file(*name, options).expect("start outer entry");
        outer.write_all(&inner).expect("write outer entry");
    }
    outer.finish().expect("finish outer").into_inner()
}
