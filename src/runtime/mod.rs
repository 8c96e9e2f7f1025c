use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use indicatif::ProgressBar;
use log::info;

use crate::config::{SplitConfig, MAX_SEED, MAX_TEST_SIZE, MIN_TEST_SIZE};
use crate::session::Session;
use crate::split::SplitSummary;
use crate::table::Table;

mod manifest;
pub use manifest::SplitManifest;

const PREVIEW_ROWS: usize = 5;
const PREVIEW_CELL_WIDTH: usize = 24;

/// Run the one-shot workflow: load, split with the given configuration,
/// export. Any failure propagates to the caller.
pub fn run_once(file: &Path, config: SplitConfig, output: &Path) -> Result<()> {
    let mut session = Session::new();
    load_with_progress(&mut session, file)?;

    session.configure(config)?;
    let summary = session.split()?.summary.clone();
    report_summary(&summary);
    export(&session, output)?;
    Ok(())
}

/// Run the interactive session: load, preview, prompt for parameters, split
/// on explicit confirmation, export, loop until the user quits.
///
/// A failed split is reported and the loop continues; the session falls back
/// to its pre-split state and the user simply retriggers.
pub fn run_interactive(file: &Path, initial: SplitConfig, output: &Path) -> Result<()> {
    let mut session = Session::new();
    load_with_progress(&mut session, file)?;

    {
        let table = session.table().context("no dataset loaded")?;
        println!(
            "Loaded {} rows x {} columns from {}",
            table.num_rows(),
            table.num_columns(),
            file.display()
        );
        println!("\nData preview (first {} rows):", PREVIEW_ROWS);
        println!("{}", render_preview(table, PREVIEW_ROWS));
    }

    let mut defaults = initial;
    loop {
        let config = {
            let table = session.table().context("no dataset loaded")?;
            prompt_config(table, &defaults)?
        };
        defaults = config.clone();
        session.configure(config)?;

        if !Confirm::new()
            .with_prompt("Split the data now?")
            .default(true)
            .interact()?
        {
            continue;
        }

        match session.split().map(|r| r.summary.clone()) {
            Ok(summary) => {
                report_summary(&summary);
                export(&session, output)?;
            }
            Err(e) => {
                log::error!("split failed: {e:#}");
                println!("✗ An error occurred while splitting the data: {e:#}");
            }
        }

        let next = Select::new()
            .with_prompt("What next?")
            .items(&["Split again with new parameters", "Quit"])
            .default(0)
            .interact()?;
        if next == 1 {
            break;
        }
    }

    Ok(())
}

fn load_with_progress(session: &mut Session, file: &Path) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Reading {}", file.display()));

    let loaded = session
        .load(file)
        .with_context(|| format!("Failed to load dataset: {:?}", file));
    spinner.finish_and_clear();

    let table = loaded?;
    info!(
        "loaded {} rows x {} columns from {:?}",
        table.num_rows(),
        table.num_columns(),
        file
    );
    Ok(())
}

fn prompt_config(table: &Table, defaults: &SplitConfig) -> Result<SplitConfig> {
    let test_size: u8 = Input::new()
        .with_prompt(format!(
            "Test set size in % ({}-{})",
            MIN_TEST_SIZE, MAX_TEST_SIZE
        ))
        .default(defaults.test_size)
        .validate_with(|v: &u8| -> std::result::Result<(), String> {
            if (MIN_TEST_SIZE..=MAX_TEST_SIZE).contains(v) {
                Ok(())
            } else {
                Err(format!(
                    "enter a value between {} and {}",
                    MIN_TEST_SIZE, MAX_TEST_SIZE
                ))
            }
        })
        .interact_text()?;

    let seed: u64 = Input::new()
        .with_prompt(format!("Random seed (0-{})", MAX_SEED))
        .default(defaults.seed)
        .validate_with(|v: &u64| -> std::result::Result<(), String> {
            if *v <= MAX_SEED {
                Ok(())
            } else {
                Err(format!("enter a value between 0 and {}", MAX_SEED))
            }
        })
        .interact_text()?;

    // Only discrete-typed columns can stratify; "(none)" is always offered
    let discrete = table.discrete_columns();
    let mut options: Vec<String> = Vec::with_capacity(discrete.len() + 1);
    options.push("(none)".to_string());
    options.extend(discrete.iter().map(|c| c.to_string()));
    let default_idx = defaults
        .stratify
        .as_deref()
        .and_then(|name| discrete.iter().position(|c| *c == name))
        .map(|i| i + 1)
        .unwrap_or(0);
    let pick = Select::new()
        .with_prompt("Stratification column")
        .items(&options)
        .default(default_idx)
        .interact()?;
    let stratify = if pick == 0 {
        None
    } else {
        Some(discrete[pick - 1].to_string())
    };

    let bundle = Confirm::new()
        .with_prompt("Also bundle both files into a zip archive?")
        .default(defaults.bundle)
        .interact()?;

    Ok(SplitConfig {
        test_size,
        seed,
        stratify,
        bundle,
    })
}

fn report_summary(summary: &SplitSummary) {
    match &summary.stratify {
        Some(column) => println!("✓ Data split with stratification on '{}'", column),
        None => println!("✓ Data split without stratification"),
    }
    println!("  Training set: {} rows", summary.train_rows);
    println!("  Test set: {} rows", summary.test_rows);
    for class in &summary.classes {
        println!(
            "    {}: {} train / {} test (of {})",
            class.class, class.train, class.test, class.total
        );
    }
}

/// Write the artifacts and a manifest into the output directory
fn export(session: &Session, output: &Path) -> Result<()> {
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {:?}", output))?;

    let artifacts = session.artifacts()?;
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        let path = output.join(artifact.name);
        fs::write(&path, &artifact.bytes)
            .with_context(|| format!("Failed to write {:?}", path))?;
        info!("wrote {} ({} bytes)", path.display(), artifact.bytes.len());
        written.push(artifact.name.to_string());
        println!("  ✓ {}", path.display());
    }

    let result = session.result().context("no split has been performed")?;
    let table = session.table().context("no dataset loaded")?;
    let config = session.config().context("no split configuration set")?;
    let manifest = SplitManifest::new(session.source(), table, &result.summary, config, written);
    let manifest_path = output.join("manifest.json");
    manifest.write_to_file(&manifest_path)?;
    println!("  ✓ Manifest written to: {}", manifest_path.display());

    Ok(())
}

fn render_preview(table: &Table, n: usize) -> String {
    let headers: Vec<String> = table
        .column_names()
        .iter()
        .zip(table.dtypes())
        .map(|(name, dtype)| clip(format!("{} <{}>", name, dtype)))
        .collect();
    let rows: Vec<Vec<String>> = table
        .head(n)
        .iter()
        .map(|row| row.iter().map(|v| clip(v.render())).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (j, cell) in row.iter().enumerate() {
            widths[j] = widths[j].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    render_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    render_line(&mut out, &rule, &widths);
    for row in &rows {
        render_line(&mut out, row, &widths);
    }
    if table.num_rows() > n {
        out.push_str(&format!("  ... {} more rows\n", table.num_rows() - n));
    }
    out
}

fn render_line(out: &mut String, cells: &[String], widths: &[usize]) {
    for (cell, width) in cells.iter().zip(widths) {
        out.push_str("  ");
        out.push_str(cell);
        for _ in cell.chars().count()..*width {
            out.push(' ');
        }
    }
    out.push('\n');
}

fn clip(text: String) -> String {
    if text.chars().count() <= PREVIEW_CELL_WIDTH {
        text
    } else {
        let mut clipped: String = text.chars().take(PREVIEW_CELL_WIDTH - 3).collect();
        clipped.push_str("...");
        clipped
    }
}
