//! @ai:module:intent Configuration structs for JMH launch and generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api LaunchConfig, HarnessOptions, PathConfig, GeneratorConfig, Threads
//! @ai:module:stateless true

use crate::options::validate;
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// @ai:intent Main configuration for a JMH launch
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub benchmark: HarnessOptions,
    pub paths: PathConfig,
    pub generator: GeneratorConfig,
}

/// @ai:intent All user-facing benchmark run settings understood by the harness
///            Every field is independently optional; absent fields emit no argument
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessOptions {
    pub jmh_version: String,
    pub include_tests: bool,
    #[serde(deserialize_with = "string_or_list")]
    pub includes: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub excludes: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub benchmark_mode: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fork: Option<u32>,
    pub fail_on_error: bool,
    pub force_gc: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jvm: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub jvm_args: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub jvm_args_append: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub jvm_args_prepend: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_output_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations_per_invocation: Option<u32>,
    pub benchmark_parameters: BTreeMap<String, Vec<String>>,
    #[serde(deserialize_with = "string_or_list")]
    pub profilers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_on_iteration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_extension: Option<String>,
    pub result_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synchronize_iterations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<Threads>,
    pub thread_groups: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warmup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warmup_batch_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warmup_forks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warmup_iterations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warmup_mode: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub warmup_benchmarks: Vec<String>,
    pub environment: BTreeMap<String, String>,
}

/// @ai:intent Filesystem locations for the launch: artifact, classpaths, output
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub benchmark_jar: PathBuf,
    pub jmh_classpath: Vec<PathBuf>,
    pub test_classpath: Vec<PathBuf>,
    pub results_dir: PathBuf,
    pub scratch_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_executable: Option<PathBuf>,
}

/// @ai:intent Settings for the benchmark descriptor generation pass
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub mode: String,
    pub classes_dirs: Vec<PathBuf>,
    pub classpath: Vec<PathBuf>,
    pub generated_sources_dir: PathBuf,
    pub generated_resources_dir: PathBuf,
}

/// @ai:intent Thread count: a fixed number or the harness literal "max"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ThreadsRepr", into = "ThreadsRepr")]
pub enum Threads {
    Count(u32),
    Max,
}

/// @ai:intent Wire shape of the threads setting at the TOML boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ThreadsRepr {
    Count(u32),
    Name(String),
}

impl TryFrom<ThreadsRepr> for Threads {
    type Error = String;

    fn try_from(repr: ThreadsRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            ThreadsRepr::Count(n) => Ok(Threads::Count(n)),
            ThreadsRepr::Name(s) if s.eq_ignore_ascii_case("max") => Ok(Threads::Max),
            ThreadsRepr::Name(s) => Err(format!(
                "invalid thread count \"{s}\" (expected an integer or \"max\")"
            )),
        }
    }
}

impl From<Threads> for ThreadsRepr {
    fn from(threads: Threads) -> Self {
        match threads {
            Threads::Count(n) => ThreadsRepr::Count(n),
            Threads::Max => ThreadsRepr::Name("max".to_string()),
        }
    }
}

impl Threads {
    /// @ai:intent Render the value as the harness expects it on the command line
    /// @ai:effects pure
    pub fn as_argument(&self) -> String {
        match self {
            Threads::Count(n) => n.to_string(),
            Threads::Max => "max".to_string(),
        }
    }
}

/// @ai:intent Accept both the canonical list form and the deprecated
///            single-string form, converting eagerly to the list
/// @ai:effects pure
fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            jmh_version: default_jmh_version(),
            include_tests: true,
            includes: Vec::new(),
            excludes: Vec::new(),
            benchmark_mode: Vec::new(),
            iterations: None,
            batch_size: None,
            fork: None,
            fail_on_error: false,
            force_gc: false,
            jvm: None,
            jvm_args: Vec::new(),
            jvm_args_append: Vec::new(),
            jvm_args_prepend: Vec::new(),
            human_output_file: None,
            operations_per_invocation: None,
            benchmark_parameters: BTreeMap::new(),
            profilers: Vec::new(),
            time_on_iteration: None,
            result_extension: None,
            result_format: default_result_format(),
            results_file: None,
            synchronize_iterations: None,
            threads: None,
            thread_groups: Vec::new(),
            time_unit: None,
            verbosity: None,
            timeout: None,
            warmup: None,
            warmup_batch_size: None,
            warmup_forks: None,
            warmup_iterations: None,
            warmup_mode: None,
            warmup_benchmarks: Vec::new(),
            environment: BTreeMap::new(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            benchmark_jar: PathBuf::from("build/libs/benchmarks.jar"),
            jmh_classpath: Vec::new(),
            test_classpath: Vec::new(),
            results_dir: PathBuf::from("build/results/jmh"),
            scratch_dir: PathBuf::from("build/tmp/jmh"),
            java_executable: None,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: "default".to_string(),
            classes_dirs: Vec::new(),
            classpath: Vec::new(),
            generated_sources_dir: PathBuf::from("build/jmh-generated-sources"),
            generated_resources_dir: PathBuf::from("build/jmh-generated-resources"),
        }
    }
}

fn default_jmh_version() -> String {
    "1.28".to_string()
}

fn default_result_format() -> String {
    "text".to_string()
}

impl LaunchConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl HarnessOptions {
    /// @ai:intent Resolve the results file: explicit path, or
    ///            <results_dir>/results.<ext> with the extension derived
    ///            from the result format
    /// @ai:effects pure
    pub fn resolved_results_file(&self, results_dir: &Path) -> Result<PathBuf> {
        if let Some(explicit) = &self.results_file {
            return Ok(explicit.clone());
        }
        let extension = match &self.result_extension {
            Some(explicit) => explicit.clone(),
            None => {
                let format = validate::normalize_result_format("result_format", &self.result_format)?;
                validate::extension_for(&format).to_string()
            }
        };
        Ok(results_dir.join(format!("results.{extension}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_harness_conventions() {
        let options = HarnessOptions::default();
        assert_eq!(options.jmh_version, "1.28");
        assert_eq!(options.result_format, "text");
        assert!(!options.fail_on_error);
        assert!(!options.force_gc);
        assert!(options.include_tests);
        assert!(options.iterations.is_none());
    }

    #[test]
    fn test_results_file_extension_follows_format() {
        let mut options = HarnessOptions::default();
        let dir = Path::new("build/results/jmh");

        assert_eq!(
            options.resolved_results_file(dir).unwrap(),
            dir.join("results.txt")
        );

        options.result_format = "json".to_string();
        assert_eq!(
            options.resolved_results_file(dir).unwrap(),
            dir.join("results.json")
        );

        options.result_format = "csv".to_string();
        assert_eq!(
            options.resolved_results_file(dir).unwrap(),
            dir.join("results.csv")
        );

        options.result_format = "latex".to_string();
        assert_eq!(
            options.resolved_results_file(dir).unwrap(),
            dir.join("results.tex")
        );
    }

    #[test]
    fn test_explicit_results_file_wins_over_format() {
        let mut options = HarnessOptions::default();
        options.results_file = Some(PathBuf::from("out/bench.json"));

        let resolved = options
            .resolved_results_file(Path::new("build/results/jmh"))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("out/bench.json"));
    }

    #[test]
    fn test_legacy_single_string_patterns_become_lists() {
        let config: LaunchConfig = toml::from_str(
            r#"
[benchmark]
includes = "MyBenchmark"
jvm_args = "-Xmx512m"
"#,
        )
        .unwrap();

        assert_eq!(config.benchmark.includes, vec!["MyBenchmark"]);
        assert_eq!(config.benchmark.jvm_args, vec!["-Xmx512m"]);
    }

    #[test]
    fn test_threads_accepts_count_and_max_literal() {
        let config: LaunchConfig = toml::from_str(
            r#"
[benchmark]
threads = 4
"#,
        )
        .unwrap();
        assert_eq!(config.benchmark.threads, Some(Threads::Count(4)));

        let config: LaunchConfig = toml::from_str(
            r#"
[benchmark]
threads = "max"
"#,
        )
        .unwrap();
        assert_eq!(config.benchmark.threads, Some(Threads::Max));

        let result: std::result::Result<LaunchConfig, _> = toml::from_str(
            r#"
[benchmark]
threads = "half"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = LaunchConfig::default();
        config.benchmark.includes = vec!["Bench1".to_string(), "Bench2".to_string()];
        config.benchmark.iterations = Some(5);
        config.benchmark.threads = Some(Threads::Max);
        config
            .benchmark
            .benchmark_parameters
            .insert("size".to_string(), vec!["10".to_string(), "100".to_string()]);

        let text = toml::to_string_pretty(&config).unwrap();
        let reloaded: LaunchConfig = toml::from_str(&text).unwrap();

        assert_eq!(reloaded.benchmark.includes, config.benchmark.includes);
        assert_eq!(reloaded.benchmark.iterations, Some(5));
        assert_eq!(reloaded.benchmark.threads, Some(Threads::Max));
        assert_eq!(
            reloaded.benchmark.benchmark_parameters,
            config.benchmark.benchmark_parameters
        );
    }
}
