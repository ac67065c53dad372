use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use clap::ValueEnum;
use clap_complete::Shell;
use anyhow::{Context, Result};

pub mod cli {
    #![allow(dead_code)]
    include!("src/cli/mod.rs");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/cli/mod.rs");

    let mut vpki = cli::build();

    // Dump help output, for inclusion in docs
    dump_help(vpki.clone()).unwrap();

    generate_shell_completions(&mut vpki).unwrap();
    build_man_page(vpki).unwrap();
}

/// Returns the output directory.
fn out_dir() -> Result<PathBuf> {
    Ok(env::var_os("OUT_DIR")
       .ok_or(std::io::Error::from(std::io::ErrorKind::NotFound))
       .context("OUT_DIR not set")?
       .into())
}

/// Generates shell completions.
fn generate_shell_completions(vpki: &mut clap::Command) -> Result<()> {
    let path = out_dir()?.join("shell-completions");
    fs::create_dir_all(&path)?;

    for shell in Shell::value_variants() {
        clap_complete::generate_to(*shell, vpki, "vpki", &path)?;
    };

    println!("cargo:warning=shell completions written to {}", path.display());
    Ok(())
}

fn dump_help(mut cmd: clap::Command) -> Result<()> {
    cmd = cmd.term_width(80);
    cmd.build();
    let path = out_dir()?.join("vpki-usage.md");
    let mut sink = fs::File::create(&path)
        .with_context(|| format!("trying to create {}", path.display()))?;

    writeln!(sink)?;

    let mut buffer = Vec::new();
    let _ = cmd.write_long_help(&mut buffer);
    let help = std::str::from_utf8(buffer.as_slice())?;

    let mut verbatim = false;
    for line in help.trim_end().split('\n').skip(1) {
        if ! verbatim && line.starts_with("Usage:") {
            writeln!(sink, "```text")?;
            verbatim = true;
        }

        if line.is_empty() {
            writeln!(sink)?;
        } else {
            writeln!(sink, "{}", line.trim_end())?;
        }
    }
    if verbatim {
        writeln!(sink, "```")?;
    }

    Ok(())
}

fn build_man_page(vpki: clap::Command) -> Result<()> {
    let man = clap_mangen::Man::new(vpki);
    let mut buffer: Vec<u8> = Default::default();
    man.render(&mut buffer)?;

    let filename = out_dir()?.join("vpki.1");
    std::fs::write(filename, buffer)?;

    Ok(())
}
