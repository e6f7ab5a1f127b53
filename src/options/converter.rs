//! @ai:module:intent Convert harness options into the ordered JMH argument sequence
//! @ai:module:layer domain
//! @ai:module:public_api collect_arguments
//! @ai:module:stateless true

use crate::config::HarnessOptions;
use crate::error::Result;
use crate::options::validate::{self, ProfilerSpec};
use std::path::Path;

/// @ai:intent Translate a configuration into the argument sequence understood
///            by org.openjdk.jmh.Main. The flag order matches the order JMH
///            prints with -help and is part of the process ABI: the same
///            options must always produce byte-identical sequences.
/// @ai:pre results_file has been resolved from the result format
/// @ai:effects pure
pub fn collect_arguments(options: &HarnessOptions, results_file: &Path) -> Result<Vec<String>> {
    let mut args = Vec::new();

    add_pattern_list(&mut args, &options.includes, "");
    add_int(&mut args, options.iterations, "i");
    add_benchmark_modes(&mut args, &options.benchmark_mode)?;
    add_int(&mut args, options.batch_size, "bs");
    add_pattern_list(&mut args, &options.excludes, "e");
    add_int(&mut args, options.fork, "f");
    add_bool(&mut args, Some(options.fail_on_error), "foe");
    add_bool(&mut args, Some(options.force_gc), "gc");
    add_string(&mut args, options.jvm.as_deref(), "jvm");
    add_pattern_list(&mut args, &options.jvm_args, "jvmArgs");
    add_pattern_list(&mut args, &options.jvm_args_append, "jvmArgsAppend");
    add_pattern_list(&mut args, &options.jvm_args_prepend, "jvmArgsPrepend");
    add_file(&mut args, options.human_output_file.as_deref(), "o")?;
    add_int(&mut args, options.operations_per_invocation, "opi");
    add_parameters(&mut args, options);
    add_profilers(&mut args, &options.profilers)?;
    add_duration(&mut args, options.time_on_iteration.as_deref(), "r", "time_on_iteration")?;
    add_result_format(&mut args, &options.result_format)?;
    add_file(&mut args, Some(results_file), "rff")?;
    add_bool(&mut args, options.synchronize_iterations, "si");
    if let Some(threads) = &options.threads {
        args.push("-t".to_string());
        args.push(threads.as_argument());
    }
    add_thread_groups(&mut args, &options.thread_groups);
    add_duration(&mut args, options.timeout.as_deref(), "to", "timeout")?;
    add_time_unit(&mut args, options.time_unit.as_deref())?;
    add_verbosity(&mut args, options.verbosity.as_deref())?;
    add_duration(&mut args, options.warmup.as_deref(), "w", "warmup")?;
    add_int(&mut args, options.warmup_batch_size, "wbs");
    add_int(&mut args, options.warmup_forks, "wf");
    add_int(&mut args, options.warmup_iterations, "wi");
    add_warmup_mode(&mut args, options.warmup_mode.as_deref())?;
    add_pattern_list(&mut args, &options.warmup_benchmarks, "wmb");

    Ok(args)
}

/// @ai:intent Emit a list as one comma-joined token; an empty flag name means
///            the positional include patterns
/// @ai:effects pure
fn add_pattern_list(args: &mut Vec<String>, values: &[String], option: &str) {
    if values.is_empty() {
        return;
    }
    if !option.is_empty() {
        args.push(format!("-{option}"));
    }
    args.push(values.join(","));
}

/// @ai:effects pure
fn add_string(args: &mut Vec<String>, value: Option<&str>, option: &str) {
    if let Some(value) = value {
        args.push(format!("-{option}"));
        args.push(value.to_string());
    }
}

/// @ai:effects pure
fn add_int(args: &mut Vec<String>, value: Option<u32>, option: &str) {
    if let Some(value) = value {
        args.push(format!("-{option}"));
        args.push(value.to_string());
    }
}

/// @ai:intent Booleans travel as "1"/"0", never "true"/"false"
/// @ai:effects pure
fn add_bool(args: &mut Vec<String>, value: Option<bool>, option: &str) {
    if let Some(value) = value {
        args.push(format!("-{option}"));
        args.push(if value { "1" } else { "0" }.to_string());
    }
}

/// @ai:effects pure
fn add_file(args: &mut Vec<String>, value: Option<&Path>, option: &str) -> Result<()> {
    if let Some(path) = value {
        let absolute = std::path::absolute(path)?;
        args.push(format!("-{option}"));
        args.push(absolute.to_string_lossy().into_owned());
    }
    Ok(())
}

/// @ai:effects pure
fn add_benchmark_modes(args: &mut Vec<String>, modes: &[String]) -> Result<()> {
    if modes.is_empty() {
        return Ok(());
    }
    let normalized = modes
        .iter()
        .map(|mode| validate::normalize_benchmark_mode("benchmark_mode", mode))
        .collect::<Result<Vec<_>>>()?;
    args.push("-bm".to_string());
    args.push(normalized.join(","));
    Ok(())
}

/// @ai:intent One -p token pair per key=value, keys in natural order,
///            values in their declared order
/// @ai:effects pure
fn add_parameters(args: &mut Vec<String>, options: &HarnessOptions) {
    for (key, values) in &options.benchmark_parameters {
        for value in values {
            args.push("-p".to_string());
            args.push(format!("{key}={value}"));
        }
    }
}

/// @ai:intent -prof is repeatable: one flag per spec, validated before emission
/// @ai:effects pure
fn add_profilers(args: &mut Vec<String>, profilers: &[String]) -> Result<()> {
    for spec in profilers {
        ProfilerSpec::parse("profilers", spec)?;
        args.push("-prof".to_string());
        args.push(spec.clone());
    }
    Ok(())
}

/// @ai:intent Durations are validated here but emitted verbatim; the harness
///            parses the same grammar on its side
/// @ai:effects pure
fn add_duration(
    args: &mut Vec<String>,
    value: Option<&str>,
    option: &str,
    field: &'static str,
) -> Result<()> {
    if let Some(value) = value {
        validate::validate_duration(field, value)?;
        args.push(format!("-{option}"));
        args.push(value.to_string());
    }
    Ok(())
}

/// @ai:effects pure
fn add_result_format(args: &mut Vec<String>, format: &str) -> Result<()> {
    let normalized = validate::normalize_result_format("result_format", format)?;
    args.push("-rf".to_string());
    args.push(normalized);
    Ok(())
}

/// @ai:effects pure
fn add_thread_groups(args: &mut Vec<String>, groups: &[u32]) {
    if groups.is_empty() {
        return;
    }
    args.push("-tg".to_string());
    args.push(
        groups
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(","),
    );
}

/// @ai:effects pure
fn add_time_unit(args: &mut Vec<String>, value: Option<&str>) -> Result<()> {
    if let Some(value) = value {
        let normalized = validate::normalize_time_unit("time_unit", value)?;
        args.push("-tu".to_string());
        args.push(normalized);
    }
    Ok(())
}

/// @ai:effects pure
fn add_verbosity(args: &mut Vec<String>, value: Option<&str>) -> Result<()> {
    if let Some(value) = value {
        let normalized = validate::normalize_verbosity("verbosity", value)?;
        args.push("-v".to_string());
        args.push(normalized);
    }
    Ok(())
}

/// @ai:effects pure
fn add_warmup_mode(args: &mut Vec<String>, value: Option<&str>) -> Result<()> {
    if let Some(value) = value {
        let normalized = validate::normalize_warmup_mode("warmup_mode", value)?;
        args.push("-wm".to_string());
        args.push(normalized);
    }
    Ok(())
}
