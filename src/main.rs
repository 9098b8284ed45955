//! Main entry point for the mhtzip CLI application.
//!
//! The binary owns all file I/O: it reads the inputs, hands them to the
//! background engine, applies the image filters and writes the archive.

use anyhow::{Result, bail};
use clap::Parser;
use std::fmt::Display;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use mhtzip::cli::is_mhtml;
use mhtzip::filter::{is_loose_image, loose_images, select};
use mhtzip::{ArchiveGroup, ArchiveReader, Cli, Engine, Group, Progress, RequestId};

/// Application entry point.
///
/// Lists archives in `-l` mode, otherwise converts the inputs into one archive.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list {
        for path in &cli.files {
            list_files(path, cli.verbose).await?;
        }
        return Ok(());
    }

    let (engine, worker) = Engine::spawn();
    let groups = collect_groups(&engine, &cli).await?;
    if groups.is_empty() {
        bail!("No images found in the given files");
    }

    let archive_groups = apply_filters(groups, &cli);
    let archive = build(&engine, archive_groups, &cli).await?;

    // Closing the last handle lets the worker drain and exit.
    drop(engine);
    worker.await?;

    write_archive(&cli.output, &archive, cli.force).await?;
    if !cli.is_quiet() {
        eprintln!("Wrote {} ({})", cli.output.display(), format_size(archive.len() as u64));
    }

    Ok(())
}

/// Extract every MHTML input and gather loose images into their own group.
///
/// Extraction requests are dispatched concurrently and may complete in any
/// order; responses are put back into input order by request id.
async fn collect_groups(engine: &Engine, cli: &Cli) -> Result<Vec<Group>> {
    let mut pending = JoinSet::new();
    let mut loose = Vec::new();

    for (id, path) in cli.files.iter().enumerate() {
        let name = display_name(path);
        if is_mhtml(path) {
            let engine = engine.clone();
            let path = path.clone();
            pending.spawn(async move {
                let response = async {
                    let bytes = tokio::fs::read(&path).await?;
                    anyhow::Ok(engine.extract(id as RequestId, name.clone(), bytes).await?)
                }
                .await;
                (name, response)
            });
        } else if is_loose_image(&name) {
            match tokio::fs::read(path).await {
                Ok(bytes) => loose.push((name, bytes)),
                Err(e) => skipping(cli, &name, e),
            }
        } else {
            skipping(cli, &name, "not an MHTML file or image");
        }
    }

    let mut extracted = Vec::new();
    while let Some(joined) = pending.join_next().await {
        let (name, response) = joined?;
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                // A file that cannot be read is skipped, not fatal.
                skipping(cli, &name, format!("{:#}", e));
                continue;
            }
        };
        match response.outcome {
            Ok(Some(group)) => {
                if !cli.is_quiet() {
                    eprintln!("  extracting: {} ({} images)", name, group.images.len());
                }
                extracted.push((response.request_id, group));
            }
            Ok(None) => skipping(cli, &name, "no images found"),
            Err(kind) => skipping(cli, &name, kind),
        }
    }

    extracted.sort_by_key(|(id, _)| *id);
    let mut groups: Vec<Group> = extracted.into_iter().map(|(_, group)| group).collect();

    if let Some(group) = loose_images(loose, groups.len() + 1) {
        groups.push(group);
    }

    Ok(groups)
}

/// Report an input left out of the archive unless running with `-qq`.
fn skipping(cli: &Cli, name: &str, reason: impl Display) {
    if !cli.is_very_quiet() {
        eprintln!("Skipping: {} ({})", name, reason);
    }
}

/// Run each group through the image filters and report what was left out.
fn apply_filters(groups: Vec<Group>, cli: &Cli) -> Vec<ArchiveGroup> {
    let options = cli.filter_options();

    groups
        .into_iter()
        .map(|group| {
            let selection = select(group, &options);
            if cli.verbose && !cli.is_quiet() {
                for rejected in &selection.rejected {
                    eprintln!(
                        "  {}: skipped #{} .{} - {}",
                        selection.group.name,
                        rejected.sequence_index,
                        rejected.extension,
                        rejected.reason
                    );
                }
            }
            selection.group
        })
        .collect()
}

/// Build the archive on the engine, printing progress unless quiet.
async fn build(engine: &Engine, groups: Vec<ArchiveGroup>, cli: &Cli) -> Result<Vec<u8>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Progress>();
    let quiet = cli.is_quiet();

    let printer = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            if !quiet {
                eprint!("\r{} ({}%)", progress.label, progress.percent());
            }
        }
        if !quiet {
            eprintln!();
        }
    });

    let archive = engine.build_archive(groups, Some(tx)).await?;
    printer.await?;

    // Never hand out an archive that does not read back cleanly.
    ArchiveReader::new(&archive).verify()?;
    Ok(archive)
}

async fn write_archive(path: &Path, archive: &[u8], force: bool) -> Result<()> {
    if !force && tokio::fs::try_exists(path).await? {
        bail!("{} already exists (use -f to overwrite)", path.display());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, archive).await?;
    Ok(())
}

/// List files in a ZIP archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just file names, one per line
/// - Verbose format (`-lv`): Table with size, CRC and timestamps
async fn list_files(path: &Path, verbose: bool) -> Result<()> {
    let data = tokio::fs::read(path).await?;
    let reader = ArchiveReader::new(&data);
    let entries = reader.list_files()?;

    if !verbose {
        for entry in &entries {
            println!("{}", entry.file_name);
        }
        return Ok(());
    }

    println!(
        "{:>10}  {:>8}  {:>10}  {:>5}  Name",
        "Length", "CRC-32", "Date", "Time"
    );
    println!("{}", "-".repeat(60));

    let mut total = 0u64;
    for entry in &entries {
        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();
        println!(
            "{:>10}  {:08x}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size, entry.crc32, year, month, day, hour, minute, entry.file_name
        );
        total += entry.uncompressed_size;
    }

    println!("{}", "-".repeat(60));
    println!("{:>10}  {:>31}{} files", total, "", entries.len());

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a byte size into a human-readable string.
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
