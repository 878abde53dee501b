use clap::CommandFactory;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[allow(dead_code)]
#[path = "src/cli/args.rs"]
mod args;

use args::Cli;

/// Packagers set this to collect man pages outside the build directory
const MAN_DIR_ENV: &str = "PLUGIN_HOST_MAN_DIR";

fn main() -> std::io::Result<()> {
    emit_build_metadata();
    generate_man_pages()?;

    println!("cargo:rerun-if-changed=src/cli/args.rs");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={}", MAN_DIR_ENV);

    Ok(())
}

fn emit_build_metadata() {
    let git_hash = command_stdout("git", &["rev-parse", "--short", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string());
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rustc_version =
        command_stdout(&rustc, &["--version"]).unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=RUSTC_VERSION={}", rustc_version);
    println!("cargo:rerun-if-changed=.git/HEAD");
}

fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Man pages go to `$OUT_DIR/man/man1`, or to `$PLUGIN_HOST_MAN_DIR/man1`
/// when that is set. The source tree is never written.
fn generate_man_pages() -> std::io::Result<()> {
    let root = match env::var_os(MAN_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(env::var_os("OUT_DIR").unwrap_or_else(|| "target".into())).join("man"),
    };
    let dir = root.join("man1");
    fs::create_dir_all(&dir)?;

    render(&Cli::command(), &dir, None)
}

fn render(cmd: &clap::Command, dir: &Path, parent: Option<&str>) -> std::io::Result<()> {
    let name = match parent {
        Some(parent) => format!("{}-{}", parent, cmd.get_name()),
        None => cmd.get_name().to_string(),
    };

    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut page)?;
    fs::write(dir.join(format!("{}.1", name)), page)?;

    for sub in cmd.get_subcommands().filter(|sub| !sub.is_hide_set()) {
        render(sub, dir, Some(&name))?;
    }

    Ok(())
}
