use crate::types::*;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "dev-swarm";
pub const DEFAULT_REPO: &str = "nathanbarrett/dev-swarm-go";
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";
pub const ASSET_PREFIX: &str = "dev-swarm";
pub const EXTRACTED_BINARY_NAME: &str = "dev-swarm";
pub const INSTALLED_BINARY_NAME: &str = "dev-swarm-binary";
pub const BIN_DIR_NAME: &str = "bin";
pub const ARCHIVE_FILE_NAME: &str = "dev-swarm.tar.gz";
pub const CONFIG_FILE_NAME: &str = "installer.json";
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Optional settings file contents. Every field falls back to a compiled-in default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerSettings {
    pub version: Option<String>,
    pub repo: Option<String>,
    pub download_base: Option<String>,
    pub install_root: Option<PathBuf>,
    pub os: Option<String>,
    pub arch: Option<String>,
    pub max_redirects: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub extract: Option<ExtractMethod>,
    pub missing_binary: Option<MissingBinaryPolicy>,
}

pub fn get_settings_file_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("DEV_SWARM_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let path = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join(APP_NAME)
        .join(CONFIG_FILE_NAME);
    tracing::debug!("Settings file path: {}", path.display());
    Ok(path)
}

pub fn load_settings_file(path: &Path) -> Result<InstallerSettings> {
    if !path.exists() {
        return Ok(InstallerSettings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read settings file at {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Could not parse settings file {} as JSON", path.display()))
}

/// Layer `DEV_SWARM_*` variables over `settings`. `env` is the variable lookup.
pub fn apply_env_overrides<F>(settings: &mut InstallerSettings, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(version) = env("DEV_SWARM_VERSION") {
        settings.version = Some(version);
    }
    if let Some(repo) = env("DEV_SWARM_REPO") {
        settings.repo = Some(repo);
    }
    if let Some(base) = env("DEV_SWARM_DOWNLOAD_BASE") {
        settings.download_base = Some(base);
    }
    if let Some(root) = env("DEV_SWARM_INSTALL_ROOT") {
        settings.install_root = Some(PathBuf::from(root));
    }
    if let Some(os) = env("DEV_SWARM_OS") {
        settings.os = Some(os);
    }
    if let Some(arch) = env("DEV_SWARM_ARCH") {
        settings.arch = Some(arch);
    }
    if let Some(hops) = env("DEV_SWARM_MAX_REDIRECTS") {
        let hops = hops
            .parse::<usize>()
            .with_context(|| format!("Invalid DEV_SWARM_MAX_REDIRECTS '{}'", hops))?;
        settings.max_redirects = Some(hops);
    }
    if let Some(secs) = env("DEV_SWARM_TIMEOUT_SECS") {
        let secs = secs
            .parse::<u64>()
            .with_context(|| format!("Invalid DEV_SWARM_TIMEOUT_SECS '{}'", secs))?;
        settings.timeout_secs = Some(secs);
    }
    if let Some(method) = env("DEV_SWARM_EXTRACT") {
        settings.extract = Some(method.parse().map_err(|e: String| anyhow!(e))?);
    }
    if let Some(policy) = env("DEV_SWARM_MISSING_BINARY") {
        settings.missing_binary = Some(policy.parse().map_err(|e: String| anyhow!(e))?);
    }

    Ok(())
}

/// Resolve the final configuration. `install_root_flag` wins over any setting,
/// and the current directory is the last resort.
pub fn build_config(
    settings: InstallerSettings,
    install_root_flag: Option<PathBuf>,
    quiet: bool,
) -> Result<InstallerConfig> {
    let install_root = match install_root_flag.or(settings.install_root) {
        Some(root) => root,
        None => std::env::current_dir().context("Could not determine current directory")?,
    };

    let version = settings
        .version
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    Ok(InstallerConfig {
        release: ReleaseCoordinate {
            version: version.trim_start_matches('v').to_string(),
            repo: settings.repo.unwrap_or_else(|| DEFAULT_REPO.to_string()),
            download_base: settings
                .download_base
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_BASE.to_string()),
        },
        install_root,
        os_override: settings.os,
        arch_override: settings.arch,
        max_redirects: settings.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS),
        timeout_secs: settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        extract_method: settings.extract.unwrap_or_default(),
        missing_binary: settings.missing_binary.unwrap_or_default(),
        show_progress: !quiet && console::Term::stderr().is_term(),
        quiet,
    })
}

pub fn load_config(install_root_flag: Option<PathBuf>, quiet: bool) -> Result<InstallerConfig> {
    let path = get_settings_file_path()?;
    let mut settings = load_settings_file(&path)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    build_config(settings, install_root_flag, quiet)
}
