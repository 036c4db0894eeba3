use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

#[allow(dead_code)]
#[path = "../src/test_support.rs"]
mod test_support;

pub use test_support::tar_gz_with;

pub struct TestContext {
    pub _temp_dir: TempDir,
    pub install_root: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let install_root = temp_dir.path().join("package");
        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_dev-swarm-install"));

        Self {
            _temp_dir: temp_dir,
            install_root,
            bin_path,
        }
    }

    /// Command with an isolated settings file, a fixed linux/x64 target and
    /// in-process extraction.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.current_dir(self._temp_dir.path());
        cmd.env("DEV_SWARM_CONFIG", self._temp_dir.path().join("installer.json"));
        cmd.env("DEV_SWARM_INSTALL_ROOT", &self.install_root);
        cmd.env("DEV_SWARM_VERSION", "1.2.0");
        cmd.env("DEV_SWARM_REPO", "owner/repo");
        cmd.env("DEV_SWARM_OS", "linux");
        cmd.env("DEV_SWARM_ARCH", "x64");
        cmd.env("DEV_SWARM_EXTRACT", "native");
        cmd.env("DEV_SWARM_TIMEOUT_SECS", "10");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn binary(&self) -> PathBuf {
        self.install_root.join("bin").join("dev-swarm-binary")
    }

    pub fn archive(&self) -> PathBuf {
        self.install_root.join("dev-swarm.tar.gz")
    }
}

pub const ASSET_PATH: &str =
    "/owner/repo/releases/download/v1.2.0/dev-swarm_1.2.0_linux_amd64.tar.gz";

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert_eq!(
            self.status.code(),
            Some(1),
            "Expected exit status 1\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
