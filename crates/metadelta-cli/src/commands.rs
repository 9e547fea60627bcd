use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use metadelta_codec::{parse_bytes, serialize_entry};
use metadelta_compose::{compose_dir_to_string, decompose};
use metadelta_diff::{diff_lines, diff_records, flatten, DiffLine, EntryChange, EntryDiff};
use metadelta_identity::IdentityResolver;
use metadelta_package::{ChangeReport, DeltaConfig, DeltaOrchestrator, DeltaRequest, OutcomeKind};
use metadelta_types::Document;
use metadelta_vcs::{GitCli, Revision};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Decompose(args) => cmd_decompose(args, format),
        Command::Compose(args) => cmd_compose(args),
        Command::Diff(args) => cmd_diff(args, format),
        Command::Changeset(args) => cmd_changeset(args, format),
    }
}

fn cmd_decompose(args: DecomposeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let document = read_document(&args.file)?;
    let files = decompose(&document, &args.output)
        .with_context(|| format!("decomposing {}", args.file.display()))?;

    match format {
        OutputFormat::Json => {
            let listing: Vec<_> = files
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "section": f.section,
                        "key": f.key.to_string(),
                        "path": f.path.display().to_string(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Text => {
            println!(
                "{} Decomposed {} into {} entries under {}",
                "✓".green().bold(),
                args.file.display().to_string().yellow(),
                files.len().to_string().bold(),
                args.output.display()
            );
        }
    }
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let text = compose_dir_to_string(&args.input)
        .with_context(|| format!("composing {}", args.input.display()))?;

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &text).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "{} Composed {} into {}",
                "✓".green().bold(),
                args.input.display(),
                path.display().to_string().yellow()
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let old = read_document(&args.old)?;
    let new = read_document(&args.new)?;
    if old.root_tag() != new.root_tag() {
        bail!(
            "root element mismatch: {} is <{}>, {} is <{}>",
            args.old.display(),
            old.root_tag(),
            args.new.display(),
            new.root_tag()
        );
    }

    let resolver = IdentityResolver::for_root_tag(new.root_tag());
    let old_records = flatten(&old, &resolver)?;
    let new_records = flatten(&new, &resolver)?;
    let always: BTreeSet<String> = args.always.into_iter().collect();
    let diff = diff_records(&old_records, &new_records, &always);
    debug!(
        old = old_records.len(),
        new = new_records.len(),
        "diffed {}",
        args.new.display()
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
        OutputFormat::Text => print_entry_diff(&diff),
    }
    Ok(())
}

fn print_entry_diff(diff: &EntryDiff) {
    if diff.is_empty() {
        println!("No changes.");
        return;
    }

    for change in &diff.changed {
        match change {
            EntryChange::Added(record) => {
                println!("  {} {} {}", "added:".green(), record.section, record.key.to_string().yellow());
            }
            EntryChange::Retained(record) => {
                println!("  {} {} {}", "kept:".dimmed(), record.section, record.key.to_string().yellow());
            }
            EntryChange::Modified { old, new } => {
                println!("  {} {} {}", "modified:".cyan(), new.section, new.key.to_string().yellow());
                let lines = diff_lines(
                    &serialize_entry(&old.section, &old.entry),
                    &serialize_entry(&new.section, &new.entry),
                );
                for hunk in &lines.hunks {
                    println!("    {}", format!("@@ -{} +{} @@", hunk.old_start, hunk.new_start).cyan());
                    for line in &hunk.lines {
                        match line {
                            DiffLine::Context(text) => println!("     {}", text.trim_end()),
                            DiffLine::Added(text) => println!("    {}", format!("+{}", text.trim_end()).green()),
                            DiffLine::Removed(text) => println!("    {}", format!("-{}", text.trim_end()).red()),
                        }
                    }
                }
            }
        }
    }
    for record in &diff.removed {
        println!("  {} {} {}", "removed:".red(), record.section, record.key.to_string().yellow());
    }

    println!(
        "\n{} added, {} modified, {} removed",
        diff.additions().to_string().green(),
        diff.modifications().to_string().cyan(),
        diff.removals().to_string().red()
    );
}

fn cmd_changeset(args: ChangesetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => DeltaConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DeltaConfig::discover(&args.repo)?,
    };
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if let Some(source_root) = args.source_root {
        config.source_root = source_root;
    }
    if let Some(api_version) = args.api_version {
        config.api_version = api_version;
    }
    if args.no_manifest {
        config.write_manifest = false;
    }

    let vcs = GitCli::new(&args.repo);
    let orchestrator = DeltaOrchestrator::new(&vcs, config)?;

    let mut request = DeltaRequest::new(Revision::commit(args.from), &args.output);
    if let Some(to) = args.to {
        request = request.with_to(Revision::commit(to));
    }
    if let Some(dir) = &args.destructive {
        request = request.with_destructive(dir);
    }

    let report = orchestrator.run(&request)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report, &request),
    }

    if !report.is_success() {
        bail!("{} path(s) failed", report.failures.len());
    }
    Ok(())
}

fn print_report(report: &ChangeReport, request: &DeltaRequest) {
    println!("Changes {} .. {}", request.from.to_string().yellow(), request.to.to_string().yellow());

    for outcome in &report.outcomes {
        let label = match &outcome.outcome {
            OutcomeKind::Copied => "copied:".green(),
            OutcomeKind::Bundle { .. } => "bundle:".green(),
            OutcomeKind::Compound { .. } => "merged:".cyan(),
            OutcomeKind::Unchanged => "unchanged:".dimmed(),
            OutcomeKind::Deleted => "deleted:".red(),
        };
        let detail = match &outcome.outcome {
            OutcomeKind::Bundle { files } => format!(" ({files} files)"),
            OutcomeKind::Compound {
                added,
                modified,
                retained,
                removed,
            } => format!(" (+{added} ~{modified} ={retained} -{removed})"),
            _ => String::new(),
        };
        println!("  {label} {}{}", outcome.path, detail.dimmed());
    }
    for failure in &report.failures {
        println!("  {} {}: {}", "failed:".red().bold(), failure.path, failure.error);
    }

    let mark = if report.is_success() {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!(
        "\n{mark} {} file(s) written to {}",
        report.written_count().to_string().bold(),
        request.output.display()
    );
    if let Some(dir) = &request.destructive {
        println!(
            "  {} file(s) written to {}",
            report.destructive_count().to_string().bold(),
            dir.display()
        );
    }
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let raw = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_bytes(&raw).with_context(|| format!("parsing {}", path.display()))
}
