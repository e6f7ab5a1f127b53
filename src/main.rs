//! @ai:module:intent CLI for launching JMH runs and generating descriptors
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jmh_launch::{
    classpath, compat,
    config::LaunchConfig,
    generator::{GeneratorMode, GeneratorOrchestrator},
    launcher::{self, LaunchSpec},
    options,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jmh-launch")]
#[command(about = "Configures and launches JMH benchmark runs and generates benchmark descriptors")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a benchmark run
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Include pattern, overrides the configured list (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Number of measurement iterations
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Number of forks
        #[arg(short, long)]
        fork: Option<u32>,

        /// Result format (text, csv, scsv, json, latex)
        #[arg(long)]
        result_format: Option<String>,
    },

    /// Print the translated harness argument sequence without launching
    Args {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit the sequence as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Generate benchmark descriptors from compiled classes
    Generate {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Generator mode (asm, reflection, default)
        #[arg(short, long)]
        mode: Option<String>,

        /// Class directory to process, overrides the configured list (repeatable)
        #[arg(long)]
        classes_dir: Vec<PathBuf>,

        /// Run the generation tool in a forked JVM instead of in-process
        #[arg(long)]
        external: bool,
    },

    /// Check configuration, classpath and harness compatibility
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "jmh.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jmh_launch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            include,
            iterations,
            fork,
            result_format,
        } => run_benchmarks(config, include, iterations, fork, result_format),
        Commands::Args { config, json } => print_arguments(config, json),
        Commands::Generate {
            config,
            mode,
            classes_dir,
            external,
        } => generate_descriptors(config, mode, classes_dir, external),
        Commands::Validate { config } => validate(config),
        Commands::Init { output } => init_config(output),
    }
}

/// @ai:intent Load the named config, the default jmh.toml, or built-in defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<LaunchConfig> {
    match path {
        Some(path) => LaunchConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let default_path = PathBuf::from("jmh.toml");
            if default_path.exists() {
                LaunchConfig::load(&default_path).context("Failed to load jmh.toml")
            } else {
                Ok(LaunchConfig::default())
            }
        }
    }
}

/// @ai:intent Translate, compose and launch one benchmark run
/// @ai:effects fs:write, io
fn run_benchmarks(
    config: Option<PathBuf>,
    include: Vec<String>,
    iterations: Option<u32>,
    fork: Option<u32>,
    result_format: Option<String>,
) -> Result<()> {
    let mut config = load_or_default_config(config)?;

    if !include.is_empty() {
        config.benchmark.includes = include;
    }
    if let Some(iterations) = iterations {
        config.benchmark.iterations = Some(iterations);
    }
    if let Some(fork) = fork {
        config.benchmark.fork = Some(fork);
    }
    if let Some(result_format) = result_format {
        config.benchmark.result_format = result_format;
    }

    let results_file = config
        .benchmark
        .resolved_results_file(&config.paths.results_dir)?;
    let arguments = options::collect_arguments(&config.benchmark, &results_file)?;

    let test_classpath = config
        .benchmark
        .include_tests
        .then_some(config.paths.test_classpath.as_slice());
    let mut run_classpath = classpath::compose(
        &config.paths.jmh_classpath,
        &config.paths.benchmark_jar,
        test_classpath,
    )?;

    if config.generator.generated_resources_dir.is_dir() {
        let shim = compat::select_compat(&config.benchmark.jmh_version)?;
        shim.inject_descriptors(&mut run_classpath, &config.generator.generated_resources_dir)?;
        tracing::info!("Injected generated descriptors via \"{}\" shim", shim.id());
    } else {
        tracing::debug!("No generated descriptors found; the harness will scan on its own");
    }

    let mut spec = LaunchSpec::benchmark(
        run_classpath,
        arguments,
        config.paths.scratch_dir.clone(),
        config.paths.java_executable.clone(),
    );
    spec.environment = config.benchmark.environment.clone();
    spec.output_files.push(results_file.clone());
    if let Some(human_output) = &config.benchmark.human_output_file {
        spec.output_files.push(human_output.clone());
    }

    launcher::launch(&spec).context("Benchmark run failed")?;
    tracing::info!("Results written to {}", results_file.display());
    Ok(())
}

/// @ai:intent Print the argument sequence the harness would receive
/// @ai:effects fs:read
fn print_arguments(config: Option<PathBuf>, json: bool) -> Result<()> {
    let config = load_or_default_config(config)?;
    let results_file = config
        .benchmark
        .resolved_results_file(&config.paths.results_dir)?;
    let arguments = options::collect_arguments(&config.benchmark, &results_file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&arguments)?);
    } else {
        for argument in arguments {
            println!("{argument}");
        }
    }
    Ok(())
}

/// @ai:intent Run the descriptor generation pass, in-process or as the
///            external generation tool in a forked JVM
/// @ai:effects fs:write
fn generate_descriptors(
    config: Option<PathBuf>,
    mode: Option<String>,
    classes_dirs: Vec<PathBuf>,
    external: bool,
) -> Result<()> {
    let config = load_or_default_config(config)?;

    let mode = GeneratorMode::parse(mode.as_deref().unwrap_or(&config.generator.mode))?;
    let classes_dirs = if classes_dirs.is_empty() {
        config.generator.classes_dirs.clone()
    } else {
        classes_dirs
    };
    if classes_dirs.is_empty() {
        anyhow::bail!("No class directories configured; set generator.classes_dirs or pass --classes-dir");
    }

    if external {
        let tool_classpath =
            classpath::compose_tool(&config.paths.jmh_classpath, &config.generator.classpath)?;
        for classes_dir in &classes_dirs {
            let spec = LaunchSpec::generator(
                tool_classpath.clone(),
                classes_dir,
                &config.generator.generated_sources_dir,
                &config.generator.generated_resources_dir,
                mode.as_str(),
                config.paths.scratch_dir.clone(),
                config.paths.java_executable.clone(),
            );
            launcher::launch(&spec).with_context(|| {
                format!("Descriptor generation failed for {}", classes_dir.display())
            })?;
        }
        return Ok(());
    }

    let orchestrator = GeneratorOrchestrator::new(
        mode,
        config.generator.classpath.clone(),
        config.generator.generated_sources_dir.clone(),
        config.generator.generated_resources_dir.clone(),
    );
    let report = orchestrator.generate(&classes_dirs)?;

    tracing::info!(
        "Generated {} descriptors from {} classes",
        report.descriptors.len(),
        report.classes_processed
    );
    Ok(())
}

/// @ai:intent Validate config, classpath and harness compatibility without launching
/// @ai:effects fs:read
fn validate(config: Option<PathBuf>) -> Result<()> {
    let config = load_or_default_config(config)?;

    let results_file = config
        .benchmark
        .resolved_results_file(&config.paths.results_dir)?;
    options::collect_arguments(&config.benchmark, &results_file)
        .context("Option translation failed")?;

    let test_classpath = config
        .benchmark
        .include_tests
        .then_some(config.paths.test_classpath.as_slice());
    classpath::compose(
        &config.paths.jmh_classpath,
        &config.paths.benchmark_jar,
        test_classpath,
    )
    .context("Classpath composition failed")?;

    compat::select_compat(&config.benchmark.jmh_version)
        .context("Harness compatibility probe failed")?;

    GeneratorMode::parse(&config.generator.mode).context("Generator mode is invalid")?;

    tracing::info!("Configuration is valid");
    Ok(())
}

/// @ai:intent Write a default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = LaunchConfig::default();
    config.save(&output)?;
    tracing::info!("Default configuration written to {}", output.display());
    Ok(())
}
