use flate2::write::GzEncoder;
use flate2::Compression;
use std::process::Command;

/// Build a `.tar.gz` in memory holding regular files with mode 0644.
pub fn tar_gz_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

pub fn has_tar_command() -> bool {
    Command::new("tar")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
