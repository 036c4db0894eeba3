use crate::error::{InstallError, InstallResult};
use crate::types::{ExtractMethod, InstallerConfig};
use flate2::read::GzDecoder;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{header::LOCATION, redirect::Policy, Client, Response, StatusCode};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tar::Archive;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub max_redirects: usize,
    /// 0 disables the deadline.
    pub timeout_secs: u64,
    pub show_progress: bool,
}

impl FetchOptions {
    pub fn from_config(config: &InstallerConfig) -> Self {
        Self {
            max_redirects: config.max_redirects,
            timeout_secs: config.timeout_secs,
            show_progress: config.show_progress,
        }
    }
}

/// Removes the destination on drop unless `keep` was called. This also covers
/// the fetch future being dropped mid-transfer.
struct PartialFile<'a> {
    path: &'a Path,
    keep: bool,
}

impl<'a> PartialFile<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, keep: false }
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for PartialFile<'_> {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        match fs::remove_file(self.path) {
            Ok(()) => tracing::debug!("Removed partial download {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::debug!(
                "Could not remove partial download {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

fn build_client(url: &str) -> InstallResult<Client> {
    // Redirects are followed by hand so the hop limit is ours.
    Client::builder()
        .redirect(Policy::none())
        .user_agent(concat!("dev-swarm-install/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| InstallError::TransportError {
            url: url.to_string(),
            source,
        })
}

/// Fetch `url` into `dest`, following 301/302 responses up to
/// `options.max_redirects` hops. Returns the number of bytes written.
/// On any error the destination file is removed.
pub async fn download_file(url: &str, dest: &Path, options: &FetchOptions) -> InstallResult<u64> {
    tracing::info!("Downloading {} to {}", url, dest.display());

    let guard = PartialFile::new(dest);
    let client = build_client(url)?;
    let transfer = fetch_following_redirects(&client, url, dest, options);

    let result = if options.timeout_secs == 0 {
        transfer.await
    } else {
        match tokio::time::timeout(Duration::from_secs(options.timeout_secs), transfer).await {
            Ok(result) => result,
            Err(_) => Err(InstallError::Timeout {
                url: url.to_string(),
                secs: options.timeout_secs,
            }),
        }
    };

    if result.is_ok() {
        guard.keep();
    }
    result
}

async fn fetch_following_redirects(
    client: &Client,
    url: &str,
    dest: &Path,
    options: &FetchOptions,
) -> InstallResult<u64> {
    let mut current = url.to_string();
    let mut hops = 0usize;

    loop {
        tracing::debug!("GET {}", current);
        let response = client
            .get(&current)
            .send()
            .await
            .map_err(|source| InstallError::TransportError {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::FOUND {
            if hops >= options.max_redirects {
                return Err(InstallError::TooManyRedirects {
                    url: url.to_string(),
                    limit: options.max_redirects,
                });
            }
            let next = redirect_target(&response).ok_or_else(|| InstallError::DownloadFailed {
                url: url.to_string(),
                status,
            })?;
            hops += 1;
            tracing::debug!("Redirect hop {} ({}): {} -> {}", hops, status, current, next);
            current = next;
            continue;
        }

        if status != StatusCode::OK {
            tracing::debug!("Unexpected status {} from {}", status, current);
            return Err(InstallError::DownloadFailed {
                url: url.to_string(),
                status,
            });
        }

        return write_body(response, url, dest, options.show_progress).await;
    }
}

/// `Location` of a redirect response, resolved against the response URL.
fn redirect_target(response: &Response) -> Option<String> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response
        .url()
        .join(location)
        .ok()
        .map(|next| next.to_string())
}

fn progress_bar(total_size: u64, dest: &Path, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total_size);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    let filename = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    pb.set_message(format!("Downloading {}", filename));
    pb
}

async fn write_body(response: Response, url: &str, dest: &Path, show_progress: bool) -> InstallResult<u64> {
    let pb = progress_bar(response.content_length().unwrap_or(0), dest, show_progress);

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| InstallError::archive_write(url, format!("Could not create {}", dest.display()), e))?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| InstallError::TransportError {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| InstallError::archive_write(url, format!("Could not write {}", dest.display()), e))?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()
        .await
        .map_err(|e| InstallError::archive_write(url, format!("Could not write {}", dest.display()), e))?;
    drop(file);

    pb.finish_and_clear();
    tracing::debug!("Wrote {} bytes to {}", downloaded, dest.display());
    Ok(downloaded)
}

pub fn extract_archive(archive_path: &Path, extract_dir: &Path, method: ExtractMethod) -> InstallResult<()> {
    tracing::info!(
        "Extracting {} into {} ({:?})",
        archive_path.display(),
        extract_dir.display(),
        method
    );

    match method {
        ExtractMethod::System => extract_with_tar_command(archive_path, extract_dir),
        ExtractMethod::Native => extract_tar_gz(archive_path, extract_dir),
    }
}

fn extract_with_tar_command(archive_path: &Path, extract_dir: &Path) -> InstallResult<()> {
    let output = Command::new("tar")
        .arg("-xzf")
        .arg(archive_path)
        .arg("-C")
        .arg(extract_dir)
        .output()
        .map_err(|e| InstallError::ExtractionFailed {
            cause: format!("could not run tar: {}", e),
        })?;

    if !output.status.success() {
        return Err(InstallError::ExtractionFailed {
            cause: format!(
                "tar exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    Ok(())
}

fn extract_tar_gz(archive_path: &Path, extract_dir: &Path) -> InstallResult<()> {
    let file = fs::File::open(archive_path).map_err(|e| InstallError::ExtractionFailed {
        cause: format!("could not open {}: {}", archive_path.display(), e),
    })?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);
    archive.set_preserve_permissions(true);

    archive
        .unpack(extract_dir)
        .map_err(|e| InstallError::ExtractionFailed {
            cause: e.to_string(),
        })
}
