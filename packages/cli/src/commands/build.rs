use super::{report_outcome, Delivery, Target};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use stateweave_parser::ast::Module;
use stateweave_synth::import_path::is_relative;
use stateweave_synth::{normalize, read_aggregate, transform, CachedLoader, Mode};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

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

pub fn build(args: BuildArgs, cwd: &Path) -> Result<()> {
    let root = normalize(&cwd.join(&args.path));
    let config = Config::load(&root)?;
    let src_dir = config.get_src_dir(&root);

    if !src_dir.exists() {
        return Err(anyhow!("Source directory does not exist: {}", src_dir.display()));
    }

    let target_path = config.get_target_path(&root);
    let mut target = Target::load(&target_path)?;

    let found = find_children(&src_dir, &config.child_pattern, &target_path)?;
    let previous = previous_children(&target.module, &target_path, &config.extensions);
    info!(found = found.len(), previous = previous.len(), "Collected children");

    // Retractions run first so the last rewrite sees only live children
    let all: BTreeSet<PathBuf> = found.union(&previous).cloned().collect();
    let (missing, present): (Vec<PathBuf>, Vec<PathBuf>) =
        all.into_iter().partition(|child| !child.exists());

    if !args.stdout {
        println!(
            "{} {}",
            "🔨 Aggregating".bright_blue().bold(),
            relative_to(&target_path, &root).display()
        );
    }

    let loader = CachedLoader::new();
    let mut modified = false;
    for child in missing.iter().chain(&present) {
        let options = config.transform_options(child.clone(), args.mode);
        let outcome = transform(&mut target.module, &target_path, &options, &loader)
            .with_context(|| format!("Failed to aggregate {}", child.display()))?;
        modified |= outcome.modified();

        if !args.stdout {
            report_outcome(relative_to(child, &src_dir), outcome);
        }
    }

    if present.is_empty() && !missing.is_empty() && !args.stdout {
        println!(
            "  {} {}",
            "⚠️".yellow(),
            "No children left; the aggregate declarations were not rebuilt".yellow()
        );
    }

    target.deliver(
        &target_path,
        &config,
        modified,
        Delivery {
            stdout: args.stdout,
            check: args.check,
        },
    )
}

/// Files under `src_dir` matching `pattern`, excluding the target itself
fn find_children(src_dir: &Path, pattern: &str, target: &Path) -> Result<BTreeSet<PathBuf>> {
    let full_pattern = src_dir.join(pattern);
    let full_pattern = full_pattern.to_string_lossy();
    let mut children = BTreeSet::new();

    for entry in glob::glob(&full_pattern).with_context(|| format!("Invalid child pattern: {}", pattern))? {
        let path = normalize(&entry?);
        if path.is_file() && path != target {
            children.insert(path);
        }
    }

    debug!(pattern = %full_pattern, count = children.len(), "Matched children");
    Ok(children)
}

/// Children the target aggregated on a previous run, resolved back to files.
///
/// A specifier has no extension, so the first configured extension that
/// names an existing file wins. If none does, the child is gone and the path
/// with the first extension is used to retract it.
fn previous_children(module: &Module, target: &Path, extensions: &[String]) -> BTreeSet<PathBuf> {
    let target_dir = target.parent().unwrap_or_else(|| Path::new(""));

    read_aggregate(module)
        .specifiers
        .into_iter()
        .filter(|specifier| is_relative(specifier))
        .map(|specifier| {
            let base = target_dir.join(&specifier).to_string_lossy().into_owned();
            let candidates: Vec<PathBuf> = extensions
                .iter()
                .map(|ext| PathBuf::from(format!("{}{}", base, ext)))
                .collect();
            let chosen = candidates
                .iter()
                .find(|candidate| candidate.is_file())
                .or_else(|| candidates.first())
                .cloned()
                .unwrap_or_else(|| PathBuf::from(&base));
            normalize(&chosen)
        })
        .collect()
}

fn relative_to<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}
