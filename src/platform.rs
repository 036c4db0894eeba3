use crate::error::{InstallError, InstallResult};
use crate::types::TargetDescriptor;

// Raw names reported by the host (Node-style and Rust-style) mapped to the
// identifiers used in release asset names.
const OS_TABLE: &[(&str, &str)] = &[("darwin", "darwin"), ("macos", "darwin"), ("linux", "linux")];

const ARCH_TABLE: &[(&str, &str)] = &[
    ("x64", "amd64"),
    ("x86_64", "amd64"),
    ("arm64", "arm64"),
    ("aarch64", "arm64"),
];

fn lookup(table: &[(&str, &'static str)], raw: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, id)| *id)
}

/// Raw (os, arch) as reported by the running host.
pub fn host_platform() -> (String, String) {
    (
        std::env::consts::OS.to_string(),
        std::env::consts::ARCH.to_string(),
    )
}

pub fn resolve_platform(raw_os: &str, raw_arch: &str) -> InstallResult<TargetDescriptor> {
    tracing::trace!("Resolving platform os='{}' arch='{}'", raw_os, raw_arch);

    match (lookup(OS_TABLE, raw_os), lookup(ARCH_TABLE, raw_arch)) {
        (Some(os_id), Some(arch_id)) => Ok(TargetDescriptor {
            os_id: os_id.to_string(),
            arch_id: arch_id.to_string(),
        }),
        _ => Err(InstallError::UnsupportedPlatform {
            os: raw_os.to_string(),
            arch: raw_arch.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_matrix() {
        let cases = [
            ("darwin", "x64", "darwin", "amd64"),
            ("darwin", "arm64", "darwin", "arm64"),
            ("linux", "x64", "linux", "amd64"),
            ("linux", "arm64", "linux", "arm64"),
            ("macos", "aarch64", "darwin", "arm64"),
            ("linux", "x86_64", "linux", "amd64"),
        ];

        for (os, arch, os_id, arch_id) in cases {
            let target = resolve_platform(os, arch).unwrap();
            assert_eq!(target.os_id, os_id, "os for {}/{}", os, arch);
            assert_eq!(target.arch_id, arch_id, "arch for {}/{}", os, arch);
        }
    }

    #[test]
    fn test_unsupported_pairs() {
        let cases = [
            ("win32", "x64"),
            ("windows", "x86_64"),
            ("linux", "ia32"),
            ("freebsd", "arm64"),
            ("linux", "arm"),
            ("", ""),
            ("Linux", "x64"),
        ];

        for (os, arch) in cases {
            match resolve_platform(os, arch) {
                Err(InstallError::UnsupportedPlatform { os: got_os, arch: got_arch }) => {
                    assert_eq!(got_os, os);
                    assert_eq!(got_arch, arch);
                }
                other => panic!("expected UnsupportedPlatform for {}/{}, got {:?}", os, arch, other),
            }
        }
    }

    #[test]
    fn test_host_platform_is_reported() {
        let (os, arch) = host_platform();
        assert!(!os.is_empty());
        assert!(!arch.is_empty());
    }
}
