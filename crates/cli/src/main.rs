mod render;

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use paramod_core::{
    Dialect, OverlayTree, ParseError, Provenance, apply_axis_map, apply_groups, migrate,
    parse_overlay, parse_param_file, resolve_axis_map, resolve_groups, summarize, to_pretty_json,
    write_param_file,
};
use paramod_descriptor::MachineDescriptor;
use paramod_diagnostics::{self as diag, IssueLog};

use crate::render::{Format, print_summary, render_issues, render_parse_error};

/// Environment variable consulted when no `--database` flag is given.
const DATABASE_ENV: &str = "PARAMOD_DB";

/// Tool identity written into the provenance comment of adapted files.
const TOOL_ID: &str = concat!("paramod ", env!("CARGO_PKG_VERSION"));

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "paramod",
    version,
    about = "Adapt and migrate machine parameter files using overlay databases"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── File transformation (the main workflows) ────────────────────
    /// Adapt a parameter file to one machine using an overlay database.
    Adapt {
        /// Parameter file to adapt.
        file: String,

        /// Machine descriptor, e.g. "HP*6.0*4.6*(opp)".
        #[arg(long, short)]
        machine: String,

        /// Overlay database path. Repeat to merge several databases in
        /// order. Defaults to the PARAMOD_DB environment variable; `$VAR`
        /// and `${VAR}` references are expanded.
        #[arg(long)]
        database: Vec<String>,

        /// Input dialect.
        #[arg(long, value_enum, default_value_t = DialectArg::Auto)]
        dialect: DialectArg,

        /// Rewrite the file in place (the original is kept as `<file>.bak`).
        #[arg(long, short, conflicts_with = "out")]
        write: bool,

        /// Write the adapted file to this path instead of stdout.
        #[arg(long, conflicts_with = "write")]
        out: Option<String>,

        /// Exit nonzero when any issue was logged.
        #[arg(long)]
        strict: bool,
    },

    /// Carry values from an old parameter file into a new-version template.
    Migrate {
        /// Previous parameter file (the values to carry forward).
        old: String,

        /// New-version template file (the structure to keep).
        template: String,

        /// Write the migrated file to this path instead of stdout.
        #[arg(long, conflicts_with = "write")]
        out: Option<String>,

        /// Rewrite the template in place (kept as `<template>.bak`).
        #[arg(long, short, conflicts_with = "out")]
        write: bool,

        /// Launch this diff tool on the old file and the written output.
        /// Requires --write or --out.
        #[arg(long)]
        diff: Option<String>,

        /// Exit nonzero when any issue was logged.
        #[arg(long)]
        strict: bool,
    },

    // ── Inspection ──────────────────────────────────────────────────
    /// Resolve and print the overlay groups that apply to one machine.
    Resolve {
        /// Machine descriptor, e.g. "HP*6.0*4.6*(opp)".
        #[arg(long, short)]
        machine: String,

        /// Overlay database path (repeatable; defaults to PARAMOD_DB).
        #[arg(long)]
        database: Vec<String>,

        /// Regroup the result per axis, as the axis dialect consumes it.
        #[arg(long)]
        axes: bool,
    },

    /// Parse a parameter file and print its structure.
    Parse {
        /// Parameter file to inspect.
        file: String,

        /// Input dialect.
        #[arg(long, value_enum, default_value_t = DialectArg::Auto)]
        dialect: DialectArg,
    },

    /// Parse a machine descriptor and print its canonical form.
    Descriptor {
        /// Descriptor string, e.g. "hp 3.65/4.57 opp tilt".
        input: String,
    },

    // ── Reference ───────────────────────────────────────────────────
    /// Explain an issue code (e.g. PM2101).
    Explain {
        /// Issue code reported by adapt, migrate, resolve, or parse.
        code: String,
    },
}

/// Dialect selection for the `adapt` and `parse` commands.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DialectArg {
    /// Sniff from the file content.
    Auto,
    /// Axis blocks (`[StartXrAxis]` … `[EndXrAxis]`).
    Axis,
    /// One labelled assignment per line.
    Flat,
}

impl DialectArg {
    fn resolve(self, input: &[u8]) -> Dialect {
        match self {
            DialectArg::Auto => Dialect::sniff(input),
            DialectArg::Axis => Dialect::Axis,
            DialectArg::Flat => Dialect::Flat,
        }
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(error) = run(cli.cmd, format) {
        report_failure(&error, format);
        process::exit(1);
    }
}

fn run(cmd: Cmd, format: Format) -> Result<()> {
    match cmd {
        Cmd::Adapt {
            file,
            machine,
            database,
            dialect,
            write,
            out,
            strict,
        } => {
            let issues = cmd_adapt(
                &file,
                &machine,
                &database,
                dialect,
                write,
                out.as_deref(),
                format,
            )?;
            exit_on_issues(strict, &issues);
        }
        Cmd::Migrate {
            old,
            template,
            out,
            write,
            diff,
            strict,
        } => {
            let issues = cmd_migrate(
                &old,
                &template,
                out.as_deref(),
                write,
                diff.as_deref(),
                format,
            )?;
            exit_on_issues(strict, &issues);
        }
        Cmd::Resolve {
            machine,
            database,
            axes,
        } => cmd_resolve(&machine, &database, axes, format)?,
        Cmd::Parse { file, dialect } => cmd_parse(&file, dialect, format)?,
        Cmd::Descriptor { input } => cmd_descriptor(&input, format)?,
        Cmd::Explain { code } => cmd_explain(&code, format)?,
    }

    Ok(())
}

/// Print a failed run: JSON error envelope on stdout, plain line on stderr
/// otherwise.
fn report_failure(error: &anyhow::Error, format: Format) {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "success": false,
                "error": "command_failed",
                "message": format!("{error:#}"),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&out).expect("error envelope serialization cannot fail")
            );
        }
        Format::Pretty => {
            eprintln!("error: {error:#}");
        }
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_adapt(
    file: &str,
    machine: &str,
    databases: &[String],
    dialect: DialectArg,
    write: bool,
    out: Option<&str>,
    format: Format,
) -> Result<IssueLog> {
    let descriptor = MachineDescriptor::parse(machine)
        .with_context(|| format!("invalid machine descriptor '{machine}'"))?;

    let input = fs::read(file).with_context(|| format!("cannot read parameter file '{file}'"))?;
    let dialect = dialect.resolve(&input);

    let buffers = read_databases(databases)?;
    let tree = parse_databases(&buffers, format)?;

    let mut issues = IssueLog::new();
    let mut parsed = parse_param_file(&input, file, dialect, &mut issues)
        .map_err(|error| parse_failure(&input, error, format))?;

    let modified = match dialect {
        Dialect::Axis => {
            let map = resolve_axis_map(&tree, &descriptor, &mut issues);
            apply_axis_map(&mut parsed, &map, &mut issues)
        }
        Dialect::Flat => {
            let groups = resolve_groups(&tree, &descriptor, &mut issues);
            apply_groups(&mut parsed, &groups, &mut issues)
        }
    };

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    let provenance = Provenance {
        tool: TOOL_ID,
        timestamp: &timestamp,
    };
    let output = write_param_file(&parsed, &issues, Some(&provenance));
    let written = write_destination(file, &output, write, out)?;

    match format {
        Format::Json => {
            let mut envelope = serde_json::json!({
                "file": file,
                "machine": descriptor.to_string(),
                "dialect": dialect,
                "modified": modified,
                "written": &written,
                "issues": &issues,
            });
            if written.is_none() {
                envelope["text"] =
                    serde_json::Value::String(String::from_utf8_lossy(&output).into_owned());
            }
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Format::Pretty => {
            if written.is_none() {
                io::stdout().write_all(&output)?;
            }
            render_issues(&issues);
            print_summary(&issues);
            status_line("adapted", written.as_deref().unwrap_or(file), modified);
        }
    }

    Ok(issues)
}

fn cmd_migrate(
    old_path: &str,
    template_path: &str,
    out: Option<&str>,
    write: bool,
    diff: Option<&str>,
    format: Format,
) -> Result<IssueLog> {
    let old_bytes =
        fs::read(old_path).with_context(|| format!("cannot read parameter file '{old_path}'"))?;
    let template_bytes = fs::read(template_path)
        .with_context(|| format!("cannot read template file '{template_path}'"))?;

    let mut issues = IssueLog::new();
    let old = parse_param_file(&old_bytes, old_path, Dialect::Flat, &mut issues)
        .map_err(|error| parse_failure(&old_bytes, error, format))?;
    let mut template = parse_param_file(&template_bytes, template_path, Dialect::Flat, &mut issues)
        .map_err(|error| parse_failure(&template_bytes, error, format))?;

    let modified = migrate(&old, &mut template, &mut issues);

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    let provenance = Provenance {
        tool: TOOL_ID,
        timestamp: &timestamp,
    };
    let output = write_param_file(&template, &issues, Some(&provenance));
    let written = write_destination(template_path, &output, write, out)?;

    if let Some(tool) = diff {
        let target = written
            .as_deref()
            .ok_or_else(|| anyhow!("--diff requires --write or --out"))?;
        // The tool's own exit status is not checked: diff conventionally
        // exits nonzero when the files differ.
        process::Command::new(tool)
            .arg(old_path)
            .arg(target)
            .status()
            .with_context(|| format!("cannot launch diff tool '{tool}'"))?;
    }

    match format {
        Format::Json => {
            let mut envelope = serde_json::json!({
                "old": old_path,
                "template": template_path,
                "modified": modified,
                "written": &written,
                "issues": &issues,
            });
            if written.is_none() {
                envelope["text"] =
                    serde_json::Value::String(String::from_utf8_lossy(&output).into_owned());
            }
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Format::Pretty => {
            if written.is_none() {
                io::stdout().write_all(&output)?;
            }
            render_issues(&issues);
            print_summary(&issues);
            status_line(
                "migrated",
                written.as_deref().unwrap_or(template_path),
                modified,
            );
        }
    }

    Ok(issues)
}

fn cmd_resolve(machine: &str, databases: &[String], axes: bool, format: Format) -> Result<()> {
    let descriptor = MachineDescriptor::parse(machine)
        .with_context(|| format!("invalid machine descriptor '{machine}'"))?;

    let buffers = read_databases(databases)?;
    let tree = parse_databases(&buffers, format)?;

    let mut issues = IssueLog::new();
    if axes {
        let map = resolve_axis_map(&tree, &descriptor, &mut issues);
        match format {
            Format::Json => {
                let envelope = serde_json::json!({
                    "machine": descriptor.to_string(),
                    "axes": map,
                    "issues": issues,
                });
                println!("{}", serde_json::to_string_pretty(&envelope)?);
            }
            Format::Pretty => {
                println!("{}", to_pretty_json(&map));
                render_issues(&issues);
                print_summary(&issues);
            }
        }
    } else {
        let groups = resolve_groups(&tree, &descriptor, &mut issues);
        match format {
            Format::Json => {
                let envelope = serde_json::json!({
                    "machine": descriptor.to_string(),
                    "groups": groups,
                    "issues": issues,
                });
                println!("{}", serde_json::to_string_pretty(&envelope)?);
            }
            Format::Pretty => {
                println!("{}", to_pretty_json(&groups));
                render_issues(&issues);
                print_summary(&issues);
            }
        }
    }

    Ok(())
}

fn cmd_parse(file: &str, dialect: DialectArg, format: Format) -> Result<()> {
    let input = fs::read(file).with_context(|| format!("cannot read parameter file '{file}'"))?;
    let dialect = dialect.resolve(&input);

    let mut issues = IssueLog::new();
    let parsed = parse_param_file(&input, file, dialect, &mut issues)
        .map_err(|error| parse_failure(&input, error, format))?;
    let summary = summarize(&parsed);

    match format {
        Format::Json => {
            let envelope = serde_json::json!({
                "summary": summary,
                "issues": issues,
            });
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Format::Pretty => {
            println!("{}", to_pretty_json(&summary));
            render_issues(&issues);
            print_summary(&issues);
        }
    }

    Ok(())
}

fn cmd_descriptor(input: &str, format: Format) -> Result<()> {
    let descriptor = MachineDescriptor::parse(input)
        .with_context(|| format!("invalid machine descriptor '{input}'"))?;

    match format {
        Format::Json => {
            let envelope = serde_json::json!({
                "input": input,
                "canonical": descriptor.to_string(),
                "descriptor": descriptor,
            });
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Format::Pretty => {
            println!("{descriptor}");
        }
    }

    Ok(())
}

fn cmd_explain(code: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let text = diag::explain(code);
            let out = serde_json::json!({
                "code": code,
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // The explanation is the expected output: stdout, not stderr.
            if let Some(text) = diag::explain(code) {
                use ariadne::Fmt;
                println!("{}: {}", code.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{code}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Exit with code 1 when `--strict` is set and the log is non-empty.
fn exit_on_issues(strict: bool, issues: &IssueLog) {
    if strict && !issues.is_empty() {
        process::exit(1);
    }
}

/// Emit the pretty-mode status line for a completed transform.
fn status_line(verb: &str, destination: &str, modified: usize) {
    let s = if modified == 1 { "" } else { "s" };
    eprintln!("{verb}: {destination} ({modified} field{s} modified)");
}

/// Convert a fatal parse error into the command failure path.
///
/// Pretty mode renders the source-annotated report directly and exits;
/// JSON mode bubbles the error up into the error envelope.
fn parse_failure(source: &[u8], error: ParseError, format: Format) -> anyhow::Error {
    if format == Format::Pretty {
        render_parse_error(source, &error);
        process::exit(1);
    }
    error.into()
}

/// Read every overlay database into memory.
///
/// With no explicit path the `PARAMOD_DB` variable supplies one. Each
/// entry undergoes `$VAR` / `${VAR}` expansion before the read.
fn read_databases(explicit: &[String]) -> Result<Vec<(String, Vec<u8>)>> {
    let raw: Vec<String> = if explicit.is_empty() {
        let value = env::var(DATABASE_ENV).unwrap_or_default();
        if value.trim().is_empty() {
            bail!("no overlay database given: pass --database or set {DATABASE_ENV}");
        }
        vec![value]
    } else {
        explicit.to_vec()
    };

    raw.iter()
        .map(|entry| {
            let path = expand_env(entry);
            let bytes = fs::read(&path)
                .with_context(|| format!("cannot read overlay database '{path}'"))?;
            Ok((path, bytes))
        })
        .collect()
}

/// Parse and merge the database buffers in flag order.
fn parse_databases(buffers: &[(String, Vec<u8>)], format: Format) -> Result<OverlayTree<'_>> {
    let mut merged: Option<OverlayTree<'_>> = None;
    for (path, bytes) in buffers {
        let tree =
            parse_overlay(bytes, path).map_err(|error| parse_failure(bytes, error, format))?;
        merged = Some(match merged {
            None => tree,
            Some(mut base) => {
                base.merge(tree)
                    .with_context(|| format!("cannot merge overlay database '{path}'"))?;
                base
            }
        });
    }
    merged.ok_or_else(|| anyhow!("no overlay database given"))
}

/// Write the produced bytes to `--write` or `--out`, returning the path
/// written, or `None` when the caller should print to stdout instead.
///
/// `--write` copies the original to `<path>.bak` before replacing it.
fn write_destination(
    path: &str,
    bytes: &[u8],
    write: bool,
    out: Option<&str>,
) -> Result<Option<String>> {
    if write {
        let backup = format!("{path}.bak");
        fs::copy(path, &backup)
            .with_context(|| format!("cannot back up '{path}' to '{backup}'"))?;
        fs::write(path, bytes).with_context(|| format!("cannot write '{path}'"))?;
        return Ok(Some(path.to_owned()));
    }
    if let Some(out) = out {
        fs::write(out, bytes).with_context(|| format!("cannot write '{out}'"))?;
        return Ok(Some(out.to_owned()));
    }
    Ok(None)
}

/// Expand `$VAR` and `${VAR}` references against the process environment.
///
/// Unset variables expand to the empty string; a `$` that opens no valid
/// reference is kept literally.
fn expand_env(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];
        let (name, tail) = match rest.strip_prefix('{') {
            Some(body) => match body.find('}') {
                Some(end) => (&body[..end], &body[end + 1..]),
                None => {
                    out.push('$');
                    continue;
                }
            },
            None => {
                let end = rest
                    .find(|c: char| c != '_' && !c.is_ascii_alphanumeric())
                    .unwrap_or(rest.len());
                (&rest[..end], &rest[end..])
            }
        };
        if name.is_empty() {
            out.push('$');
            continue;
        }
        out.push_str(&env::var(name).unwrap_or_default());
        rest = tail;
    }
    out.push_str(rest);
    out
}
