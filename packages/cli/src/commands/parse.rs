use super::parse_source;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use stateweave_parser::explode;
use stateweave_synth::{Contract, Mode};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Module to inspect
    pub file: PathBuf,

    /// Print the full syntax tree as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse(args: ParseArgs, cwd: &Path) -> Result<()> {
    let path = cwd.join(&args.file);
    let source = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let module = parse_source(&source, &path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&module)?);
        return Ok(());
    }

    let exploded = explode(&module);

    println!("{}", "Exports".bold());
    for export in &exploded.exports {
        let external = export.external.as_deref().unwrap_or("*");
        let mut line = format!("  {} {}", kind_label(export.kind.keyword()), external.bright_white());
        if let Some(local) = export.local.as_deref().filter(|local| *local != external) {
            line.push_str(&format!(" (local {})", local));
        }
        if let Some(source) = &export.source {
            line.push_str(&format!(" from '{}'", source));
        }
        println!("{}", line);
    }

    println!("{}", "Imports".bold());
    for import in &exploded.imports {
        let binding = match (&import.imported, &import.local) {
            (Some(imported), Some(local)) if imported != local => format!("{} as {}", imported, local),
            (_, Some(local)) => local.clone(),
            (_, None) => "(side effect)".to_string(),
        };
        println!(
            "  {} {} from '{}'",
            kind_label(import.kind.keyword()),
            binding.bright_white(),
            import.source
        );
    }

    println!("{}", "Contracts".bold());
    for contract in [Contract::State, Contract::InitialState] {
        let mark = if exploded.exports_name(contract.export_name()) {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} {}", mark, contract);
    }
    for mode in Mode::ALL {
        let usable = mode
            .required_contracts()
            .iter()
            .all(|contract| exploded.exports_name(contract.export_name()));
        if usable {
            println!("  {} usable as a child in {} mode", "✓".green(), mode);
        }
    }

    Ok(())
}

fn kind_label(keyword: Option<&str>) -> String {
    format!("{:<6}", keyword.unwrap_or("value")).dimmed().to_string()
}
