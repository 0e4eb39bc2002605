use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::Parser;
use dpl::{compile, parse, render, CompileError, Translator, OUTPUT_EXTENSION, SOURCE_EXTENSION};
use yansi::Paint;

mod diagnostic;

/// Compile datapack sources into .mcfunction files.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Source file, or a directory to search for .dpl files.
    #[arg(short, long, default_value = "main.dpl")]
    file: PathBuf,
    /// Replace output files that already exist.
    #[arg(long)]
    overwrite: bool,
    /// Print a line for every compiled file.
    #[arg(short, long)]
    verbose: bool,
    /// Translate lines interactively instead of compiling files.
    #[arg(long, conflicts_with_all = ["file", "overwrite"])]
    repl: bool,
}

fn collect_sources(path: &Path, sources: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    if path.is_dir() {
        let mut entries = fs::read_dir(path)
            .with_context(|| format!("reading directory {}", path.display()))?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();
        for entry in entries {
            collect_sources(&entry, sources)?;
        }
    } else if path
        .extension()
        .is_some_and(|extension| extension == SOURCE_EXTENSION)
    {
        sources.push(path.to_path_buf());
    }
    Ok(())
}

/// Compiles one source next to itself. Returns `false` if it had errors.
fn compile_file(path: &Path, args: &Args) -> anyhow::Result<bool> {
    let output = path.with_extension(OUTPUT_EXTENSION);
    if output.is_dir() {
        bail!("output path {} is a directory", output.display());
    }
    if output.exists() && !args.overwrite {
        bail!(
            "{} already exists, pass --overwrite to replace it",
            output.display()
        );
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let commands = match compile(&source) {
        Ok(commands) => commands,
        Err(error) => {
            diagnostic::report(&path.display().to_string(), &source, &error);
            return Ok(false);
        }
    };

    fs::write(&output, render(&commands))
        .with_context(|| format!("writing {}", output.display()))?;
    if args.verbose {
        eprintln!(
            "{} {} -> {} ({} commands)",
            "compiled".green().bold(),
            path.display(),
            output.display(),
            commands.len()
        );
    }
    Ok(true)
}

fn repl(verbose: bool) -> anyhow::Result<()> {
    let mut readline = rustyline::DefaultEditor::new()?;
    let mut translator = Translator::new();

    while let Ok(input) = readline.readline(">> ") {
        let src = input.as_str();
        if src.trim().is_empty() {
            continue;
        }
        _ = readline.add_history_entry(src);

        let commands = parse(src)
            .map_err(CompileError::from)
            .and_then(|program| Ok(translator.translate_block(&program)?));
        match commands {
            Ok(commands) => {
                for command in commands {
                    println!("{}", command.cyan());
                }
                if verbose {
                    eprintln!(
                        "{} registers free",
                        translator.registers().available().dim()
                    );
                }
            }
            Err(error) => diagnostic::report("repl", src, &error),
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.repl {
        return repl(args.verbose);
    }

    if !args.file.exists() {
        bail!("{} does not exist", args.file.display());
    }
    let mut sources = vec![];
    collect_sources(&args.file, &mut sources)?;
    if sources.is_empty() {
        bail!("no .{SOURCE_EXTENSION} files found at {}", args.file.display());
    }

    let mut failed = 0;
    for source in &sources {
        if !compile_file(source, &args)? {
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} files failed to compile", sources.len());
    }
    Ok(())
}
