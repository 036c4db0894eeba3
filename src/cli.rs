use clap::Parser;
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // Release builds are tagged; use the tag as-is
    if let Some(tag) = option_env!("DEV_SWARM_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("DEV_SWARM_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("DEV_SWARM_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup to satisfy clap's 'static requirement
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser, Debug)]
#[command(name = "dev-swarm-install")]
#[command(about = "Download and install the prebuilt dev-swarm binary for this platform")]
#[command(version = get_version())]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Directory that receives bin/dev-swarm-binary (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub install_root: Option<PathBuf>,

    /// Print the download URL for this platform and exit without installing
    #[arg(long)]
    pub print_url: bool,
}
