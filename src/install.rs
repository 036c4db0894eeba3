use crate::config::EXTRACTED_BINARY_NAME;
use crate::download::{download_file, extract_archive, FetchOptions};
use crate::error::{InstallError, InstallResult};
use crate::platform::{host_platform, resolve_platform};
use crate::release::{download_url, validate_version};
use crate::types::*;
use std::fs;
use std::path::Path;

/// Resolve the target platform and the asset URL without touching the
/// network or the filesystem.
pub fn resolve(config: &InstallerConfig) -> InstallResult<(TargetDescriptor, String)> {
    let (host_os, host_arch) = host_platform();
    let os = config.os_override.clone().unwrap_or(host_os);
    let arch = config.arch_override.clone().unwrap_or(host_arch);

    let target = resolve_platform(&os, &arch)?;
    validate_version(&config.release.version)?;
    let url = download_url(&config.release, &target);

    tracing::debug!("Resolved {}-{} to {}: {}", os, arch, target, url);
    Ok((target, url))
}

/// Unpack `archive_path` into `bin_dir` and move the extracted entry to
/// `binary_path` with mode 755. The archive is removed whether or not
/// extraction succeeded. Returns whether a binary was placed.
pub fn install_from_archive(
    archive_path: &Path,
    bin_dir: &Path,
    binary_path: &Path,
    method: ExtractMethod,
    policy: MissingBinaryPolicy,
) -> InstallResult<bool> {
    fs::create_dir_all(bin_dir)
        .map_err(|e| InstallError::io(format!("Could not create {}", bin_dir.display()), e))?;

    let extracted = extract_archive(archive_path, bin_dir, method);
    remove_archive(archive_path);
    extracted?;

    let extracted_path = bin_dir.join(EXTRACTED_BINARY_NAME);
    if extracted_path.exists() {
        fs::rename(&extracted_path, binary_path).map_err(|e| {
            InstallError::io(
                format!(
                    "Could not move {} to {}",
                    extracted_path.display(),
                    binary_path.display()
                ),
                e,
            )
        })?;
    } else {
        match policy {
            MissingBinaryPolicy::Error => {
                return Err(InstallError::InstalledBinaryMissing {
                    path: extracted_path,
                })
            }
            MissingBinaryPolicy::Ignore => {
                tracing::warn!(
                    "Archive did not contain '{}'; no binary was installed",
                    EXTRACTED_BINARY_NAME
                );
                remove_stale_binary(binary_path)?;
                return Ok(false);
            }
        }
    }

    set_executable(binary_path)?;
    tracing::info!("Installed executable at {}", binary_path.display());
    Ok(true)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> InstallResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| InstallError::io(format!("Could not set permissions on {}", path.display()), e))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> InstallResult<()> {
    Ok(())
}

/// A binary left by an earlier run would otherwise look like this release.
fn remove_stale_binary(binary_path: &Path) -> InstallResult<()> {
    match fs::remove_file(binary_path) {
        Ok(()) => {
            tracing::info!("Removed stale binary {}", binary_path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(InstallError::io(
            format!("Could not remove {}", binary_path.display()),
            e,
        )),
    }
}

fn remove_archive(archive_path: &Path) {
    if let Err(e) = fs::remove_file(archive_path) {
        tracing::warn!("Could not remove {}: {}", archive_path.display(), e);
    }
}

/// Runs the install as `Resolving -> Fetching -> Installing -> Done`.
pub struct Pipeline<'a> {
    config: &'a InstallerConfig,
    phase: InstallPhase,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a InstallerConfig) -> Self {
        Self {
            config,
            phase: InstallPhase::Resolving,
        }
    }

    pub fn phase(&self) -> InstallPhase {
        self.phase
    }

    fn advance(&mut self, next: InstallPhase) {
        tracing::debug!("Install phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    fn announce(&self, message: &str) {
        if !self.config.quiet {
            println!("{}", message);
        }
    }

    pub async fn run(&mut self) -> InstallResult<InstallReport> {
        let result = self.execute().await;
        if let Err(e) = &result {
            tracing::debug!("Install failed while {}: {}", self.phase, e);
            self.advance(InstallPhase::Failed);
        }
        result
    }

    async fn execute(&mut self) -> InstallResult<InstallReport> {
        let config = self.config;
        let (target, url) = resolve(config)?;

        self.advance(InstallPhase::Fetching);
        let bin_dir = config.bin_dir();
        fs::create_dir_all(&bin_dir).map_err(|e| {
            InstallError::archive_write(&url, format!("Could not create {}", bin_dir.display()), e)
        })?;

        self.announce(&format!("Downloading dev-swarm v{}...", config.release.version));
        let archive_path = config.archive_path();
        download_file(&url, &archive_path, &FetchOptions::from_config(config)).await?;

        self.advance(InstallPhase::Installing);
        self.announce("Extracting...");
        let binary_path = config.binary_path();
        let binary_placed = install_from_archive(
            &archive_path,
            &bin_dir,
            &binary_path,
            config.extract_method,
            config.missing_binary,
        )?;

        self.advance(InstallPhase::Done);
        if binary_placed {
            self.announce("dev-swarm installed successfully!");
        }

        Ok(InstallReport {
            url,
            target,
            binary_path,
            binary_placed,
        })
    }
}
