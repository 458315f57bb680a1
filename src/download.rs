//! Keeps a local copy of a static GTFS ZIP in sync with its remote source.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{IF_MODIFIED_SINCE, LAST_MODIFIED};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::fetch::{HttpClient, get_request};

/// Formats a timestamp as an HTTP date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Parses an HTTP date header value.
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| SystemTime::from(dt.with_timezone(&Utc)))
}

/// Downloads `url` to `zip_path` unless the local copy is current.
///
/// When `zip_path` exists its modification time is sent as
/// `If-Modified-Since`. On `200` the body is streamed to a sibling
/// `.zip.part` file, stamped with `Last-Modified` and renamed over
/// `zip_path`, so an interrupted download leaves the previous copy intact.
/// Returns `true` only when a new file was written; `304` and any other
/// status return `false`.
///
/// # Errors
///
/// Transport failures and local I/O errors.
#[tracing::instrument(level = "debug", skip(client, zip_path), fields(zip_path = %zip_path.display()))]
pub async fn download_if_newer<C: HttpClient>(
    client: &C,
    url: &str,
    zip_path: &Path,
) -> Result<bool> {
    let mut req = get_request(url)?;

    if let Ok(meta) = std::fs::metadata(zip_path) {
        let since = http_date(meta.modified()?);
        debug!(if_modified_since = %since, "Local copy found, sending conditional request");
        req.headers_mut().insert(IF_MODIFIED_SINCE, since.parse()?);
    }

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("request to {url} failed"))?;

    match resp.status() {
        StatusCode::NOT_MODIFIED => {
            debug!("ZIP file is up to date, no download needed");
            return Ok(false);
        }
        StatusCode::OK => {}
        status => {
            warn!(status = status.as_u16(), "Failed to download ZIP");
            return Ok(false);
        }
    }

    let last_modified = resp
        .headers()
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date);

    // the cached copy is only replaced once the whole body has arrived
    let part_path = zip_path.with_extension("zip.part");
    let written = match stream_to_file(resp, &part_path, last_modified).await {
        Ok(written) => written,
        Err(e) => {
            let _ = std::fs::remove_file(&part_path);
            return Err(e);
        }
    };
    std::fs::rename(&part_path, zip_path).with_context(|| {
        format!("failed to move {} to {}", part_path.display(), zip_path.display())
    })?;

    info!(bytes = written, "Downloaded updated ZIP file");
    Ok(true)
}

/// Writes the response body to `path` and stamps it with `modified`.
async fn stream_to_file(
    mut resp: reqwest::Response,
    path: &Path,
    modified: Option<SystemTime>,
) -> Result<usize> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut written = 0usize;
    while let Some(chunk) = resp
        .chunk()
        .await
        .context("ZIP download ended before the full body arrived")?
    {
        file.write_all(&chunk)?;
        written += chunk.len();
    }
    file.flush()?;

    if let Some(modified) = modified {
        file.set_modified(modified)
            .with_context(|| format!("failed to set mtime on {}", path.display()))?;
    }
    Ok(written)
}

/// Extracts `zip_path` into `extract_to`, overwriting existing files.
///
/// # Errors
///
/// Fails if the file is not a valid ZIP archive or extraction fails.
#[tracing::instrument(level = "debug", skip_all, fields(zip_path = %zip_path.display(), extract_to = %extract_to.display()))]
pub fn unzip_and_replace(zip_path: &Path, extract_to: &Path) -> Result<()> {
    let file = File::open(zip_path)
        .with_context(|| format!("failed to open {}", zip_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid ZIP archive", zip_path.display()))?;

    std::fs::create_dir_all(extract_to)?;
    archive
        .extract(extract_to)
        .with_context(|| format!("failed to extract into {}", extract_to.display()))?;

    info!(files = archive.len(), "Extracted ZIP");
    Ok(())
}

/// Downloads and extracts the dataset when it changed. Returns `true` when
/// `extract_to` was refreshed.
///
/// A downloaded file that fails to extract is deleted, so the next call
/// requests the dataset without `If-Modified-Since`.
pub async fn sync<C: HttpClient>(
    client: &C,
    url: &str,
    zip_path: &Path,
    extract_to: &Path,
) -> Result<bool> {
    if !download_if_newer(client, url, zip_path).await? {
        return Ok(false);
    }
    if let Err(e) = unzip_and_replace(zip_path, extract_to) {
        let _ = std::fs::remove_file(zip_path);
        return Err(e);
    }
    Ok(true)
}
