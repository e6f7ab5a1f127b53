//! @ai:module:intent Spawn the harness or the descriptor generation tool as a process
//! @ai:module:layer infrastructure
//! @ai:module:public_api LaunchSpec, launch, HARNESS_MAIN_CLASS, GENERATOR_MAIN_CLASS
//! @ai:module:stateless false

use crate::classpath;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Entry point of the benchmark harness.
pub const HARNESS_MAIN_CLASS: &str = "org.openjdk.jmh.Main";

/// Entry point of the bytecode descriptor generation tool.
pub const GENERATOR_MAIN_CLASS: &str = "org.openjdk.jmh.generators.bytecode.JmhBytecodeGenerator";

/// @ai:intent Everything needed to spawn one isolated harness process
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub executable: PathBuf,
    pub classpath: Vec<PathBuf>,
    pub main_class: String,
    pub args: Vec<String>,
    pub scratch_dir: PathBuf,
    pub environment: BTreeMap<String, String>,
    /// Files whose parent directories must exist before the subprocess
    /// starts writing to them.
    pub output_files: Vec<PathBuf>,
}

impl LaunchSpec {
    /// @ai:intent Spec for a benchmark run against org.openjdk.jmh.Main
    /// @ai:effects pure
    pub fn benchmark(
        classpath: Vec<PathBuf>,
        args: Vec<String>,
        scratch_dir: PathBuf,
        executable: Option<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.unwrap_or_else(|| PathBuf::from("java")),
            classpath,
            main_class: HARNESS_MAIN_CLASS.to_string(),
            args,
            scratch_dir,
            environment: BTreeMap::new(),
            output_files: Vec::new(),
        }
    }

    /// @ai:intent Spec for the generation tool: the four positional
    ///            arguments are the tool's whole protocol
    /// @ai:effects pure
    pub fn generator(
        classpath: Vec<PathBuf>,
        classes_dir: &Path,
        generated_sources_dir: &Path,
        generated_resources_dir: &Path,
        mode: &str,
        scratch_dir: PathBuf,
        executable: Option<PathBuf>,
    ) -> Self {
        let args = vec![
            classes_dir.to_string_lossy().into_owned(),
            generated_sources_dir.to_string_lossy().into_owned(),
            generated_resources_dir.to_string_lossy().into_owned(),
            mode.to_string(),
        ];
        Self {
            executable: executable.unwrap_or_else(|| PathBuf::from("java")),
            classpath,
            main_class: GENERATOR_MAIN_CLASS.to_string(),
            args,
            scratch_dir,
            environment: BTreeMap::new(),
            output_files: Vec::new(),
        }
    }

    /// @ai:intent Full argument vector as handed to the executable
    /// @ai:effects pure
    pub fn command_arguments(&self) -> Result<Vec<String>> {
        let mut arguments = Vec::with_capacity(self.args.len() + 4);
        arguments.push(format!(
            "-Djava.io.tmpdir={}",
            self.scratch_dir.display()
        ));
        arguments.push("-cp".to_string());
        arguments.push(classpath::join(&self.classpath)?.to_string_lossy().into_owned());
        arguments.push(self.main_class.clone());
        arguments.extend(self.args.iter().cloned());
        Ok(arguments)
    }
}

/// @ai:intent Spawn the process and block until it terminates. Output file
///            parents and the scratch directory are created first so the
///            subprocess never races directory creation. A non-zero exit is
///            surfaced with its code; a benchmark run may already have
///            produced partial output, so there is no retry.
/// @ai:effects fs:write, io
pub fn launch(spec: &LaunchSpec) -> Result<()> {
    std::fs::create_dir_all(&spec.scratch_dir)?;
    for output in &spec.output_files {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let arguments = spec.command_arguments()?;
    tracing::info!(
        "Launching {} {}",
        spec.executable.display(),
        arguments.join(" ")
    );

    let status = Command::new(&spec.executable)
        .args(&arguments)
        .env("TMPDIR", &spec.scratch_dir)
        .envs(&spec.environment)
        .status()
        .map_err(|source| Error::Spawn {
            executable: spec.executable.clone(),
            source,
        })?;

    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(Error::HarnessExit { code }),
        // Terminated by a signal; there is no code to report.
        None => Err(Error::HarnessExit { code: -1 }),
    }
}
