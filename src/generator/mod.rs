//! @ai:module:intent Generate harness-readable benchmark descriptors from compiled classes
//! @ai:module:layer application
//! @ai:module:public_api GeneratorOrchestrator, GeneratorMode, GenerationReport

pub mod classfile;
pub mod descriptor;
pub mod scope;

#[cfg(test)]
pub(crate) mod fixture;

pub use descriptor::BenchmarkDescriptor;
pub use scope::ResolutionScope;

use crate::error::{Error, Result};
use crate::generator::classfile::ClassFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// @ai:intent Analysis strategy, selected once per pass by mode string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorMode {
    /// Scan class file structure directly, never loading anything.
    Asm,
    /// Load each discovered type through an isolated resolution scope.
    Reflection,
}

/// The fallback the "default" sentinel resolves to. Static scanning is
/// preferred: it tolerates classes whose initializers cannot run here.
pub const DEFAULT_GENERATOR_MODE: GeneratorMode = GeneratorMode::Asm;

impl GeneratorMode {
    /// @ai:intent Parse the external mode string, case-insensitively
    /// @ai:effects pure
    pub fn parse(value: &str) -> Result<Self> {
        let lower = value.to_ascii_lowercase();
        match lower.as_str() {
            "asm" => Ok(GeneratorMode::Asm),
            "reflection" => Ok(GeneratorMode::Reflection),
            "default" => Ok(DEFAULT_GENERATOR_MODE),
            _ => Err(Error::InvalidOption {
                field: "generator.mode",
                value: value.to_string(),
                expected: "one of asm, reflection, default",
            }),
        }
    }

    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorMode::Asm => "asm",
            GeneratorMode::Reflection => "reflection",
        }
    }
}

/// @ai:intent Outcome of a successful generation pass
#[derive(Debug)]
pub struct GenerationReport {
    pub classes_processed: usize,
    pub descriptors: Vec<BenchmarkDescriptor>,
}

/// @ai:intent Both strategies deliver parsed classes through this one
///            contract; extraction and generation never know which ran
trait AnalysisSource {
    fn collect(&self, root: &Path, classes: &[PathBuf]) -> Result<Vec<ClassFile>>;
}

/// @ai:intent Static strategy: read the binary structure straight from disk
struct BytecodeSource;

impl AnalysisSource for BytecodeSource {
    /// @ai:effects fs:read
    fn collect(&self, _root: &Path, classes: &[PathBuf]) -> Result<Vec<ClassFile>> {
        let mut parsed = Vec::with_capacity(classes.len());
        for path in classes {
            let bytes = std::fs::read(path).map_err(|source| Error::FileRead {
                path: path.clone(),
                source,
            })?;
            let class = classfile::parse(&bytes).map_err(|reason| Error::ClassFormat {
                path: path.clone(),
                reason,
            })?;
            parsed.push(class);
        }
        Ok(parsed)
    }
}

/// @ai:intent Reflective strategy: convert paths back to type names and load
///            each through the pass's resolution scope. A single load
///            failure kills the pass: metadata cannot be trusted once type
///            resolution has failed.
struct ReflectionSource {
    resolution_scope: Arc<ResolutionScope>,
}

impl AnalysisSource for ReflectionSource {
    /// @ai:effects fs:read
    fn collect(&self, root: &Path, classes: &[PathBuf]) -> Result<Vec<ClassFile>> {
        let mut parsed = Vec::with_capacity(classes.len());
        for path in classes {
            let type_name =
                scope::path_to_type_name(root, path).ok_or_else(|| Error::ClassLoad {
                    name: path.display().to_string(),
                    reason: format!("not under class directory {}", root.display()),
                })?;
            parsed.push(self.resolution_scope.load(&type_name)?);
        }
        Ok(parsed)
    }
}

/// @ai:intent Runs the Clean → Discover → Analyze → Generate → Finalize
///            pipeline over one or more class directories
pub struct GeneratorOrchestrator {
    mode: GeneratorMode,
    classpath: Vec<PathBuf>,
    generated_sources_dir: PathBuf,
    generated_resources_dir: PathBuf,
}

impl GeneratorOrchestrator {
    /// @ai:effects pure
    pub fn new(
        mode: GeneratorMode,
        classpath: Vec<PathBuf>,
        generated_sources_dir: PathBuf,
        generated_resources_dir: PathBuf,
    ) -> Self {
        Self {
            mode,
            classpath,
            generated_sources_dir,
            generated_resources_dir,
        }
    }

    /// @ai:intent Run one generation pass. Prior generated output is deleted
    ///            first so reruns never see stale artifacts. Metadata errors
    ///            are collected across every directory and raised as one
    ///            aggregate failure after all directories were inspected.
    /// @ai:effects fs:write
    pub fn generate(&self, classes_dirs: &[PathBuf]) -> Result<GenerationReport> {
        cleanup(&self.generated_sources_dir)?;
        cleanup(&self.generated_resources_dir)?;
        std::fs::create_dir_all(&self.generated_sources_dir)?;
        std::fs::create_dir_all(&self.generated_resources_dir)?;

        // The reflective scope spans classpath plus every class directory,
        // and stays the thread's ambient context for the whole pass.
        let (source, _guard): (Box<dyn AnalysisSource>, Option<scope::ScopeGuard>) =
            match self.mode {
                GeneratorMode::Asm => (Box::new(BytecodeSource), None),
                GeneratorMode::Reflection => {
                    let roots = self
                        .classpath
                        .iter()
                        .chain(classes_dirs.iter())
                        .cloned()
                        .collect::<Vec<_>>();
                    let resolution_scope = Arc::new(ResolutionScope::new(roots));
                    let guard = Arc::clone(&resolution_scope).install();
                    (
                        Box::new(ReflectionSource { resolution_scope }),
                        Some(guard),
                    )
                }
            };

        let mut descriptors = Vec::new();
        let mut errors = Vec::new();
        let mut classes_processed = 0;

        for classes_dir in classes_dirs {
            let classes = discover_class_files(classes_dir);
            tracing::info!(
                "Processing {} classes from {} with \"{}\" generator",
                classes.len(),
                classes_dir.display(),
                self.mode.as_str()
            );

            let parsed = source.collect(classes_dir, &classes)?;
            classes_processed += parsed.len();

            for class in &parsed {
                descriptors.extend(descriptor::extract(class, &mut errors));
            }
        }

        descriptors.sort();
        descriptors.dedup();

        tracing::info!(
            "Writing out generated sources to {} and resources to {}",
            self.generated_sources_dir.display(),
            self.generated_resources_dir.display()
        );
        descriptor::write_resources(&self.generated_resources_dir, &descriptors)?;
        descriptor::write_sources(&self.generated_sources_dir, &descriptors)?;

        if !errors.is_empty() {
            return Err(Error::Generation(errors));
        }

        Ok(GenerationReport {
            classes_processed,
            descriptors,
        })
    }
}

/// @ai:intent Enumerate class files under a directory, in stable order
/// @ai:effects fs:read
fn discover_class_files(classes_dir: &Path) -> Vec<PathBuf> {
    let mut classes: Vec<PathBuf> = WalkDir::new(classes_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| ext == "class")
                .unwrap_or(false)
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();
    classes.sort();
    classes
}

/// @ai:intent Recursively delete prior generated output; absence is fine
/// @ai:effects fs:write
fn cleanup(directory: &Path) -> Result<()> {
    match std::fs::remove_dir_all(directory) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
