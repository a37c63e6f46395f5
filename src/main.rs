//! BatchScale CLI - Concurrent Batch Image Resizer
//!
//! Command-line front end for the batch resizing pipeline: point it at a
//! source directory, a destination directory, and a scale factor.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use batchscale::{init, init_with_config, CollisionPolicy, Config, Pipeline, ProgressUpdate};

/// BatchScale - Concurrent Batch Image Resizer
#[derive(Parser)]
#[command(
    name = "batchscale",
    version,
    about = "Concurrent batch image resizer for automation workflows",
    long_about = "BatchScale resizes every image in a source directory by a uniform \
                  scale factor, re-encoding the results as JPEG into a destination \
                  directory. Built in Rust for automation workflows, CI/CD pipelines, \
                  and large image volumes.",
    arg_required_else_help = false
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source directory containing images
    #[arg(short, long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Destination directory for resized output
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Uniform scale factor (e.g. 0.5, 2.0)
    #[arg(short, long, value_name = "FACTOR")]
    scale: Option<f64>,

    /// Number of worker threads (default: auto-detect)
    #[arg(short, long, value_name = "COUNT")]
    threads: Option<usize>,

    /// Output filename collision handling
    #[arg(long, value_enum, value_name = "POLICY")]
    collision: Option<CliCollisionPolicy>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show what would be processed without actually processing
    #[arg(long)]
    dry_run: bool,

    /// Output the run result as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Config {
        /// Configuration file to validate
        file: PathBuf,
    },
    /// Generate an example configuration file
    ExampleConfig {
        /// Output file path
        #[arg(short, long, default_value = "batchscale.toml")]
        output: PathBuf,
    },
    /// Show system information and capabilities
    Info,
}

/// CLI-compatible collision policy enum
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliCollisionPolicy {
    Overwrite,
    Error,
    Suffix,
}

impl From<CliCollisionPolicy> for CollisionPolicy {
    fn from(policy: CliCollisionPolicy) -> Self {
        match policy {
            CliCollisionPolicy::Overwrite => CollisionPolicy::Overwrite,
            CliCollisionPolicy::Error => CollisionPolicy::Error,
            CliCollisionPolicy::Suffix => CollisionPolicy::Suffix,
        }
    }
}

#[tokio::main]
async fn main() {
    let mut cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    std::env::set_var("RUST_LOG", log_level);

    if let Some(command) = cli.command.take() {
        if let Err(e) = handle_subcommand(command) {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            process::exit(1);
        }
        return;
    }

    // Load configuration if provided, otherwise initialize with defaults
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    let (input, output, scale) = match (&cli.input, &cli.output, cli.scale) {
        (Some(input), Some(output), Some(scale)) => (input.clone(), output.clone(), scale),
        _ => {
            eprintln!(
                "{}: --input, --output, and --scale are required",
                style("Error").red().bold()
            );
            eprintln!("Run with --help for usage information");
            process::exit(1);
        }
    };

    if let Err(e) = run_batch(&cli, config, input, output, scale).await {
        eprintln!("{}: {:#}", style("Error").red().bold(), e);
        process::exit(1);
    }
}

/// Load and merge configuration with CLI overrides
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = if let Some(ref config_path) = cli.config {
        let config = Config::from_file(config_path)
            .with_context(|| format!("failed to load configuration {:?}", config_path))?;
        init_with_config(&config).context("initialization failed")?;
        info!("Loaded configuration from: {:?}", config_path);
        config
    } else {
        init().context("initialization failed")?;
        Config::default()
    };

    if cli.threads.is_some() {
        config.processing.threads = cli.threads;
    }
    if let Some(policy) = cli.collision {
        config.processing.collision = policy.into();
    }
    config.validate().context("invalid configuration")?;

    Ok(config)
}

/// Run the batch pipeline
async fn run_batch(
    cli: &Cli,
    config: Config,
    input: PathBuf,
    output: PathBuf,
    scale: f64,
) -> anyhow::Result<()> {
    if cli.dry_run {
        let files = batchscale::pipeline::locate::find_images(&input)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        println!("{} files would be processed:", style(files.len()).bold());
        for file in &files {
            println!("  {}", file.display());
        }
        return Ok(());
    }

    let pipeline = Pipeline::with_config(&config);

    // Progress bar rides on the pipeline's broadcast events
    let progress_task = if !cli.json && !cli.quiet {
        let mut rx = pipeline.progress().subscribe();
        Some(tokio::spawn(async move {
            let mut bar: Option<ProgressBar> = None;
            while let Ok(update) = rx.recv().await {
                match update {
                    ProgressUpdate::Started { total_files } => {
                        let pb = ProgressBar::new(total_files);
                        let bar_style = ProgressStyle::default_bar()
                            .template(
                                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] \
                                 {pos}/{len} ({per_sec}, {eta}) {msg}",
                            )
                            .unwrap_or_else(|_| ProgressStyle::default_bar());
                        pb.set_style(bar_style.progress_chars("#>-"));
                        bar = Some(pb);
                    }
                    ProgressUpdate::FileCompleted { file_name, .. } => {
                        if let Some(pb) = &bar {
                            pb.set_message(file_name);
                            pb.inc(1);
                        }
                    }
                    ProgressUpdate::RunCompleted { .. } => {
                        if let Some(pb) = &bar {
                            pb.finish_with_message("Processing complete");
                        }
                        break;
                    }
                }
            }
        }))
    } else {
        None
    };

    let result = pipeline
        .run(&input, &output, scale)
        .await
        .map_err(|e| {
            error!("Run aborted: {}", e);
            anyhow::anyhow!(e.user_message())
        })?;

    if let Some(task) = progress_task {
        let _ = task.await;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    if result.failed > 0 {
        process::exit(2);
    }

    Ok(())
}

/// Handle subcommands
fn handle_subcommand(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Config { file } => {
            let config = Config::from_file(&file)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            config
                .validate()
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            println!(
                "{}: Configuration file is valid",
                style("Success").green().bold()
            );
        }
        Commands::ExampleConfig { output } => {
            let config = Config::default();
            config
                .to_file(&output)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            println!(
                "{}: Generated example configuration: {}",
                style("Success").green().bold(),
                output.display()
            );
        }
        Commands::Info => {
            show_system_info();
        }
    }
    Ok(())
}

/// Show system information
fn show_system_info() {
    use sysinfo::{CpuExt, System, SystemExt};

    println!("{}", style("BatchScale System Information").bold());
    println!();

    println!("{}: {}", style("Version").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    let mut system = System::new_all();
    system.refresh_all();

    println!("{}", style("System:").bold());
    if let Some(name) = system.name() {
        println!("  OS: {}", name);
    }
    println!("  CPUs: {}", system.cpus().len());
    if let Some(cpu) = system.cpus().first() {
        println!(
            "  CPU: {} ({:.2} GHz)",
            cpu.brand(),
            cpu.frequency() as f64 / 1000.0
        );
    }
    println!(
        "  Memory: {:.2} GB total, {:.2} GB available",
        system.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0,
        system.available_memory() as f64 / 1024.0 / 1024.0 / 1024.0
    );
    println!();

    println!("{}", style("Supported Formats:").bold());
    println!("  Input: PNG, JPEG (extensions png, jpg, jpeg)");
    println!("  Output: JPEG");
}

/// Print the run summary
fn print_summary(result: &batchscale::RunResult) {
    println!();
    println!("{}", style("Run Summary:").bold());
    println!("  {}: {}", style("Discovered").blue(), result.discovered);
    println!("  {}: {}", style("Saved").green(), result.saved);
    if result.failed > 0 {
        println!("  {}: {}", style("Failed").red(), result.failed);
    }
    println!(
        "  {}: {:.2}s",
        style("Duration").blue(),
        result.elapsed.as_secs_f64()
    );

    if result.saved > 0 {
        println!(
            "  {}: {:.1} files/sec",
            style("Speed").cyan(),
            result.files_per_second()
        );
    }

    if !result.failures.is_empty() {
        println!();
        println!("{}", style("Failures:").red().bold());
        for failure in &result.failures {
            println!(
                "  {}: {}",
                failure.source_path.display(),
                failure.error
            );
        }
    }
}
