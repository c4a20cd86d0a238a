use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Response;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

fn progress_bar(total: Option<u64>) -> ProgressBar {
    let pb = match total {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::new_spinner(),
    };
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {bytes}/{total_bytes} ({bytes_per_sec}) {wide_bar} {eta}",
    ) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Streams a successful response body into `target`, replacing any existing file.
pub(crate) fn save_response(mut resp: Response, target: &Path, quiet: bool) -> Result<PathBuf> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let pb = if quiet {
        None
    } else {
        Some(progress_bar(resp.content_length()))
    };

    let mut out = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(target)
        .with_context(|| format!("failed to open {}", target.display()))?;

    let mut downloaded: u64 = 0;
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = resp.read(&mut buf).context("download interrupted")?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])
            .with_context(|| format!("failed to write {}", target.display()))?;
        downloaded += n as u64;
        if let Some(pb) = &pb {
            pb.inc(n as u64);
        }
    }
    out.flush()?;

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    log::debug!("[download] {} byte(s) -> {}", downloaded, target.display());
    Ok(target.to_path_buf())
}
