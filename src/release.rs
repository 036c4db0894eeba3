//! Release asset naming and URL construction.

use crate::config::ASSET_PREFIX;
use crate::error::{InstallError, InstallResult};
use crate::types::{ReleaseCoordinate, TargetDescriptor};

/// Release versions must be plain semver (`1.2.0`); a leading `v` is tolerated.
pub fn validate_version(version: &str) -> InstallResult<semver::Version> {
    semver::Version::parse(version.trim_start_matches('v')).map_err(|source| {
        InstallError::InvalidVersion {
            version: version.to_string(),
            source,
        }
    })
}

/// File name of the release asset for a target,
/// e.g. `dev-swarm_1.2.0_linux_amd64.tar.gz`.
pub fn asset_name(version: &str, target: &TargetDescriptor) -> String {
    format!(
        "{}_{}_{}_{}.tar.gz",
        ASSET_PREFIX, version, target.os_id, target.arch_id
    )
}

fn base(release: &ReleaseCoordinate) -> &str {
    release.download_base.trim_end_matches('/')
}

/// Direct download URL of the asset for a target.
pub fn download_url(release: &ReleaseCoordinate, target: &TargetDescriptor) -> String {
    format!(
        "{}/{}/releases/download/v{}/{}",
        base(release),
        release.repo,
        release.version,
        asset_name(&release.version, target)
    )
}

/// Release tag page, shown as a hint when a download fails.
pub fn release_page_url(release: &ReleaseCoordinate) -> String {
    format!(
        "{}/{}/releases/tag/v{}",
        base(release),
        release.repo,
        release.version
    )
}
