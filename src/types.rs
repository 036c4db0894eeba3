use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Normalized platform identifiers as they appear in release asset names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub os_id: String,
    pub arch_id: String,
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os_id, self.arch_id)
    }
}

/// Where a release lives: `<download_base>/<repo>/releases/.../v<version>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCoordinate {
    pub version: String,
    pub repo: String,
    pub download_base: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMethod {
    /// Shell out to the host `tar` utility.
    #[default]
    System,
    /// Unpack in-process with flate2 + tar.
    Native,
}

impl std::str::FromStr for ExtractMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(ExtractMethod::System),
            "native" => Ok(ExtractMethod::Native),
            other => Err(format!(
                "unknown extraction method '{}' (expected 'system' or 'native')",
                other
            )),
        }
    }
}

/// What to do when the archive does not contain the expected binary entry.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingBinaryPolicy {
    #[default]
    Error,
    /// Skip the rename and chmod and finish without a binary.
    Ignore,
}

impl std::str::FromStr for MissingBinaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(MissingBinaryPolicy::Error),
            "ignore" => Ok(MissingBinaryPolicy::Ignore),
            other => Err(format!(
                "unknown missing-binary policy '{}' (expected 'error' or 'ignore')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    pub release: ReleaseCoordinate,
    pub install_root: PathBuf,
    pub os_override: Option<String>,
    pub arch_override: Option<String>,
    pub max_redirects: usize,
    /// Whole-transfer deadline in seconds; 0 disables it.
    pub timeout_secs: u64,
    pub extract_method: ExtractMethod,
    pub missing_binary: MissingBinaryPolicy,
    pub show_progress: bool,
    /// Suppress status lines on stdout.
    pub quiet: bool,
}

impl InstallerConfig {
    pub fn bin_dir(&self) -> PathBuf {
        self.install_root.join(crate::config::BIN_DIR_NAME)
    }

    pub fn binary_path(&self) -> PathBuf {
        self.bin_dir().join(crate::config::INSTALLED_BINARY_NAME)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.install_root.join(crate::config::ARCHIVE_FILE_NAME)
    }
}

/// Pipeline states. Any error moves the run to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Resolving,
    Fetching,
    Installing,
    Done,
    Failed,
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallPhase::Resolving => "resolving",
            InstallPhase::Fetching => "fetching",
            InstallPhase::Installing => "installing",
            InstallPhase::Done => "done",
            InstallPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub url: String,
    pub target: TargetDescriptor,
    pub binary_path: PathBuf,
    /// False only when the entry was missing under `MissingBinaryPolicy::Ignore`.
    pub binary_placed: bool,
}
