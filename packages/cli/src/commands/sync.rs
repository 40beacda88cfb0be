use super::{report_outcome, Delivery, Target};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use stateweave_synth::{transform, FsModuleLoader, Mode};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Aggregate module to rewrite
    pub target: PathBuf,

    /// Child module to aggregate into the target
    pub child: PathBuf,

    /// What to generate (overrides config)
    #[arg(short, long)]
    pub mode: Option<Mode>,

    /// Output to stdout instead of writing the target
    #[arg(long)]
    pub stdout: bool,

    /// Exit with an error if the target would change
    #[arg(long, conflicts_with = "stdout")]
    pub check: bool,
}

pub fn sync(args: SyncArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let target_path = cwd.join(&args.target);
    let child_path = cwd.join(&args.child);
    debug!(target = %target_path.display(), child = %child_path.display(), "Syncing");

    let mut target = Target::load(&target_path)?;
    let options = config.transform_options(child_path, args.mode);
    let outcome = transform(&mut target.module, &target_path, &options, &FsModuleLoader::new())
        .with_context(|| format!("Failed to update {}", target_path.display()))?;

    if !args.stdout {
        report_outcome(&args.child, outcome);
    }

    target.deliver(
        &target_path,
        &config,
        outcome.modified(),
        Delivery {
            stdout: args.stdout,
            check: args.check,
        },
    )
}
