use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for psrx-gpu")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        /// Run only GPU module tests
        #[arg(long)]
        gpu: bool,
        /// Run only DMA module tests
        #[arg(long)]
        dma: bool,
        /// Run only the integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Run benchmarks
    Bench,
    /// Replay a GPU command trace and write the frame
    Replay {
        /// JSON trace file
        trace: String,
        /// Output PPM (defaults to the trace name with .ppm)
        #[arg(short, long)]
        out: Option<String>,
        /// Show the whole VRAM
        #[arg(long)]
        vram: bool,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Pre-commit hook (fmt, clippy, test)
    PreCommit,
    /// Install git hooks
    InstallHooks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_ci(verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test {
            doc,
            gpu,
            dma,
            integration,
        } => run_test(doc, gpu, dma, integration),
        Commands::Bench => run_bench(),
        Commands::Replay {
            trace,
            out,
            vram,
            release,
        } => run_replay(&trace, out.as_deref(), vram, release),
        Commands::PreCommit => run_pre_commit(),
        Commands::InstallHooks => install_hooks(),
    }
}

fn run_ci(verbose: bool) -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;
    run_task("Build", || run_build(false), verbose)?;
    run_task("Test", || run_test(false, false, false, false), verbose)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn cargo(subcommand: &str) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg(subcommand);
    cmd
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = cargo("fmt");
    cmd.arg("--all");
    if check {
        cmd.args(["--", "--check"]);
    }
    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = cargo("clippy");
    cmd.args(["--workspace", "--all-targets"]);
    if fix {
        cmd.args(["--fix", "--allow-dirty"]);
    } else {
        cmd.args(["--", "-D", "warnings"]);
    }
    execute_command(&mut cmd)
}

fn run_build(release: bool) -> Result<()> {
    let mut cmd = cargo("build");
    cmd.arg("--workspace");
    if release {
        cmd.arg("--release");
    }
    execute_command(&mut cmd)
}

fn run_test(doc: bool, gpu: bool, dma: bool, integration: bool) -> Result<()> {
    if doc {
        return execute_command(cargo("test").arg("--doc"));
    }

    if !(gpu || dma || integration) {
        return execute_command(cargo("test").arg("--workspace"));
    }

    let suites: [(bool, &[&str], &str); 3] = [
        (gpu, &["--lib", "core::gpu"], "GPU"),
        (dma, &["--lib", "core::dma"], "DMA"),
        (integration, &["--test", "integration_test"], "Integration"),
    ];

    let mut failed = Vec::new();

    for (enabled, args, name) in suites {
        if !enabled {
            continue;
        }

        println!("{} Running {} tests...", "→".blue(), name.bold());

        match execute_command(cargo("test").args(args)) {
            Ok(_) => println!("{} {} tests passed\n", "✓".green(), name),
            Err(_) => {
                println!("{} {} tests failed\n", "✗".red(), name);
                failed.push(name);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Test suites failed: {}", failed.join(", "))
    }
}

fn run_bench() -> Result<()> {
    execute_command(cargo("bench").args(["--bench", "gpu_bench"]))
}

fn run_replay(trace: &str, out: Option<&str>, vram: bool, release: bool) -> Result<()> {
    if !Path::new(trace).exists() {
        println!("{} Trace not found: {}", "✗".red().bold(), trace.yellow());
        println!();
        println!("A trace is a JSON array of port writes and ticks:");
        println!("  {}", r#"[{"gp1": 0}, {"gp0": 33554432}, {"tick": 0}]"#.cyan());
        anyhow::bail!("Trace file not found: {}", trace);
    }

    let frame = match out {
        Some(path) => path.to_string(),
        None => Path::new(trace)
            .with_extension("ppm")
            .to_string_lossy()
            .into_owned(),
    };

    println!("{}", "=== GPU Trace Replay ===".bold().blue());
    println!("Trace: {}", trace.cyan());
    println!("Frame: {}", frame.cyan());
    println!();

    let mut cmd = cargo("run");
    cmd.args(["--bin", "psrx-gpu"]);

    if release {
        cmd.arg("--release");
    }

    cmd.arg("--").arg(trace).arg("--frame-out").arg(&frame);

    if vram {
        cmd.arg("--vram-viewer");
    }

    let start = Instant::now();
    execute_command(&mut cmd)?;

    println!();
    println!(
        "{} {}",
        "✓ Replay finished in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );

    Ok(())
}

fn run_pre_commit() -> Result<()> {
    println!("{}", "=== Pre-commit Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), false)?;
    run_task("Clippy", || run_clippy(false), false)?;
    run_task("Test", || run_test(false, false, false, false), false)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ Pre-commit checks passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn install_hooks() -> Result<()> {
    use std::fs;

    println!("{}", "Installing git hooks...".bold());

    let hook_content = r#"#!/bin/sh
# Auto-generated by cargo x install-hooks
set -e

cargo x pre-commit
"#;

    let hook_path = ".git/hooks/pre-commit";
    fs::write(hook_path, hook_content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(hook_path, perms)?;
    }

    println!("{}", "✓ Git hooks installed".green());

    Ok(())
}

/// Run one pipeline step, printing a check mark or a cross
fn run_task(name: &str, task: impl FnOnce() -> Result<()>, verbose: bool) -> Result<()> {
    print!("{} {} ... ", "→".blue(), name);
    let start = Instant::now();

    let result = task();
    match &result {
        Ok(()) if verbose => println!(
            "{} ({:.2}s)",
            "✓".green().bold(),
            start.elapsed().as_secs_f64()
        ),
        Ok(()) => println!("{}", "✓".green().bold()),
        Err(_) => println!("{}", "✗".red().bold()),
    }
    result
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit()).status()?;
    anyhow::ensure!(status.success(), "{:?} failed: {}", cmd, status);
    Ok(())
}
