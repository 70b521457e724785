//! BOMForge command-line interface.
//!
//! File-handling front end for the BOM tree model: loads and saves
//! `.bom.xml` documents, runs the validation sweep, and prints derived
//! reports. All filesystem access lives here; the model only ever sees XML
//! text.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use bomforge_model::{
    assembly_outline, cost_summary, shopping_list, BomTree, BomValidator, SAMPLE_BOM_XML,
};

mod config;
mod logging;

use config::AppConfig;

#[derive(Parser)]
#[command(
    name = "bomforge",
    version,
    about = "Hierarchical bill-of-materials toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a BOM document and print validation warnings
    Validate {
        file: PathBuf,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the total cost with a per-assembly breakdown
    Cost {
        file: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the aggregated shopping list
    ShoppingList {
        file: PathBuf,
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the indented assembly outline
    Outline {
        file: PathBuf,
        /// Print the outline as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-serialize a document in canonical form
    Fmt {
        file: PathBuf,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Emit the built-in sample document
    Sample {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging)?;

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { file, json } => validate(&file, json),
        Command::Cost { file, json } => cost(&file, json),
        Command::ShoppingList { file, json } => print_shopping_list(&file, json),
        Command::Outline { file, json } => outline(&file, json),
        Command::Fmt { file, output } => fmt_document(&file, output.as_deref()),
        Command::Sample { output } => emit(SAMPLE_BOM_XML, output.as_deref()),
    }
}

fn load(file: &Path) -> Result<BomTree> {
    let xml = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let tree = BomTree::from_xml(&xml)
        .with_context(|| format!("failed to parse {}", file.display()))?;
    info!(file = %file.display(), nodes = tree.node_count(), "loaded BOM");
    Ok(tree)
}

// Warnings never fail the command; only unreadable or malformed input does.
fn validate(file: &Path, json: bool) -> Result<()> {
    let tree = load(file)?;
    let report = BomValidator::new().validate(&tree);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_valid {
        println!(
            "OK: {} parts, {} assemblies, no warnings",
            report.summary.total_parts, report.summary.total_assemblies
        );
        return Ok(());
    }

    for issue in &report.issues {
        match &issue.suggestion {
            Some(suggestion) => println!("warning: {} ({suggestion})", issue.message),
            None => println!("warning: {}", issue.message),
        }
    }
    println!(
        "{} warning(s) across {} parts and {} assemblies",
        report.warning_count, report.summary.total_parts, report.summary.total_assemblies
    );
    Ok(())
}

fn cost(file: &Path, json: bool) -> Result<()> {
    let tree = load(file)?;
    let summary = cost_summary(&tree);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for line in &summary.lines {
        let kind = if line.is_assembly { "assembly" } else { "part" };
        println!(
            "{:<32} {:>10}  ({kind}, {} part(s))",
            line.name,
            format!("${:.2}", line.cost),
            line.part_count
        );
    }
    println!("{:<32} {:>10}", "total", format!("${:.2}", summary.total));
    Ok(())
}

fn print_shopping_list(file: &Path, json: bool) -> Result<()> {
    let tree = load(file)?;
    let list = shopping_list(&tree);

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    for entry in &list.entries {
        let sku = if entry.sku.is_empty() {
            String::new()
        } else {
            format!(" [{}]", entry.sku)
        };
        let suppliers = if entry.suppliers.is_empty() {
            String::new()
        } else {
            format!(" from {}", entry.suppliers.join(", "))
        };
        println!(
            "{:>4} x {}{sku}{suppliers} = {}",
            entry.quantity,
            entry.name,
            format!("${:.2}", entry.extended_cost)
        );
    }
    println!(
        "{} distinct item(s), {} unit(s), total ${:.2}",
        list.distinct_items, list.total_units, list.total_cost
    );
    Ok(())
}

fn outline(file: &Path, json: bool) -> Result<()> {
    let tree = load(file)?;
    let items = assembly_outline(&tree);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for item in items {
        let indent = "  ".repeat(item.depth);
        match item.quantity {
            Some(quantity) => println!(
                "{indent}- {} x{quantity} (${:.2})",
                item.name, item.cost
            ),
            None => println!("{indent}+ {} (${:.2})", item.name, item.cost),
        }
    }
    Ok(())
}

fn fmt_document(file: &Path, output: Option<&Path>) -> Result<()> {
    let tree = load(file)?;
    emit(&tree.to_xml_document(), output)
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(file = %path.display(), "wrote BOM document");
        }
        None => println!("{content}"),
    }
    Ok(())
}
