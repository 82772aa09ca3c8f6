use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

mod binary;
mod cli;
mod config;
mod diff;
mod fileinfo;
mod filetype;
mod hash;
mod logging;
mod owner;
mod render;
mod resolve;
mod style;

use cli::RootArgs;
use config::Settings;
use fileinfo::{get_file_info, FileInfo};
use style::Palette;

fn main() -> ExitCode {
    let args = RootArgs::parse();
    logging::init(args.verbose);

    let settings = Settings::from_args(&args);
    let palette = Palette::new(settings.color);

    let outcome = if args.diff {
        cmd_diff(&args.inputs, &settings, &palette)
    } else if args.lib {
        cmd_lib(&args.inputs[0], &settings, &palette)
    } else if args.linked_libs {
        cmd_linked_libs(&args.inputs, &settings, &palette)
    } else {
        cmd_info(&args.inputs, &settings, &palette)
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_diff(inputs: &[String], settings: &Settings, palette: &Palette) -> Result<()> {
    let [first, second] = inputs else {
        anyhow::bail!("--diff requires exactly 2 file arguments");
    };
    let comparison = diff::compare_files(Path::new(first), Path::new(second))
        .context("comparing files")?;
    if settings.json {
        return print_json(&comparison);
    }
    print!("{}", render::format_diff(&comparison, palette));
    Ok(())
}

fn cmd_lib(name: &str, settings: &Settings, palette: &Palette) -> Result<()> {
    let matches = resolve::find_library(name, &settings.library_dirs)?;
    tracing::info!(name, count = matches.len(), "library search finished");

    let mut infos = Vec::with_capacity(matches.len());
    for path in &matches {
        match get_file_info(path, settings.hashes) {
            Ok(info) => infos.push(info),
            Err(err) => report_skipped(path.display(), &err),
        }
    }
    if settings.json {
        return print_json(&infos);
    }

    println!("Found {} library file(s) for '{name}':\n", matches.len());
    print_separated(&infos, |info| render::format_file_info(info, palette));
    Ok(())
}

fn cmd_linked_libs(inputs: &[String], settings: &Settings, palette: &Palette) -> Result<()> {
    let infos = collect_infos(inputs, false);
    if infos.is_empty() {
        anyhow::bail!("No valid files found");
    }
    if settings.json {
        let listing: Vec<LinkedLibraries<'_>> = infos.iter().map(LinkedLibraries::from).collect();
        return print_json(&listing);
    }
    for (idx, info) in infos.iter().enumerate() {
        if idx > 0 {
            println!();
        }
        print!("{}", render::format_linked_libraries_only(info, palette));
    }
    Ok(())
}

fn cmd_info(inputs: &[String], settings: &Settings, palette: &Palette) -> Result<()> {
    let infos = collect_infos(inputs, settings.hashes);
    if infos.is_empty() {
        anyhow::bail!("No valid files found");
    }
    if settings.json {
        return print_json(&infos);
    }
    print_separated(&infos, |info| render::format_file_info(info, palette));
    Ok(())
}

/// Resolve and inspect every input, reporting and skipping the ones that fail.
fn collect_infos(inputs: &[String], with_hashes: bool) -> Vec<FileInfo> {
    let mut infos = Vec::with_capacity(inputs.len());
    for input in inputs {
        let info = resolve::resolve_command(input)
            .and_then(|path| get_file_info(&path, with_hashes));
        match info {
            Ok(info) => infos.push(info),
            Err(err) => report_skipped(input, &err),
        }
    }
    infos
}

fn report_skipped(input: impl std::fmt::Display, err: &anyhow::Error) {
    tracing::debug!(%input, "skipping argument");
    eprintln!("Error: {err:#}");
}

fn print_separated<F>(infos: &[FileInfo], render_one: F)
where
    F: Fn(&FileInfo) -> String,
{
    let separator = render::separator();
    for (idx, info) in infos.iter().enumerate() {
        if idx > 0 {
            println!("{separator}\n");
        }
        print!("{}", render_one(info));
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize JSON output")?;
    println!("{text}");
    Ok(())
}

#[derive(Serialize)]
struct LinkedLibraries<'a> {
    path: &'a Path,
    linked_libraries: &'a [String],
}

impl<'a> From<&'a FileInfo> for LinkedLibraries<'a> {
    fn from(info: &'a FileInfo) -> Self {
        Self {
            path: &info.path,
            linked_libraries: info
                .binary
                .as_ref()
                .map(|binary| binary.linked_libraries.as_slice())
                .unwrap_or_default(),
        }
    }
}
