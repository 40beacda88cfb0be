pub mod build;
pub mod init;
pub mod parse;
pub mod sync;

pub use build::{build, BuildArgs};
pub use init::{init, InitArgs};
pub use parse::{parse, ParseArgs};
pub use sync::{sync, SyncArgs};

use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use stateweave_parser::ast::Module;
use stateweave_parser::serialize_with;
use stateweave_synth::Outcome;
use std::fs;
use std::path::Path;

/// Where a rewritten target goes
#[derive(Debug, Clone, Copy, Default)]
pub struct Delivery {
    /// Print the result instead of writing it
    pub stdout: bool,
    /// Fail if the file on disk is out of date
    pub check: bool,
}

/// The target module as it currently exists on disk
pub struct Target {
    pub module: Module,
    /// File contents, `None` when the target does not exist yet
    pub original: Option<String>,
}

impl Target {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                module: Module::new(),
                original: None,
            });
        }

        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let module = parse_source(&source, path)?;
        Ok(Self {
            module,
            original: Some(source),
        })
    }

    /// Print, check or write the rewritten module.
    ///
    /// Nothing is written unless the rewrite changed the tree and the printed
    /// text differs from the file on disk.
    pub fn deliver(&self, path: &Path, config: &Config, modified: bool, delivery: Delivery) -> Result<()> {
        let output = serialize_with(&self.module, config.serializer_options());
        let changed = modified && self.original.as_deref() != Some(output.as_str());

        if delivery.stdout {
            print!("{}", output);
            return Ok(());
        }

        if !changed {
            println!("  {} {} is up to date", "✓".green(), path.display());
            return Ok(());
        }

        if delivery.check {
            return Err(anyhow!("{} is out of date", path.display()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, output).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  {} Wrote {}", "✓".green(), path.display());
        Ok(())
    }
}

/// Parse source text, reporting errors with a line and column
pub fn parse_source(source: &str, path: &Path) -> Result<Module> {
    stateweave_parser::parse(source).map_err(|e| {
        let (line, column) = e.line_col(source);
        anyhow!("{}:{}:{}: {}", path.display(), line, column, e)
    })
}

/// One status line per processed child
pub fn report_outcome(child: &Path, outcome: Outcome) {
    let name = child.display();
    match outcome {
        Outcome::Rewritten => println!("  {} {}", "✓".green(), name),
        Outcome::AlreadyImported => println!("  {} {} {}", "·".dimmed(), name, "already imported".dimmed()),
        Outcome::Retracted { removed: 0 } => {
            println!("  {} {} {}", "·".dimmed(), name, "missing, nothing to retract".dimmed())
        }
        Outcome::Retracted { removed } => println!(
            "  {} {} {}",
            "−".yellow(),
            name,
            format!("missing, retracted {} import(s)", removed).yellow()
        ),
        Outcome::ContractUnsatisfied => println!(
            "  {} {} {}",
            "⚠️".yellow(),
            name,
            "does not export the required State/initialState".yellow()
        ),
        Outcome::NotApplicable => {}
    }
}
