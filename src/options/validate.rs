//! @ai:module:intent Closed vocabularies and value validation for harness options
//! @ai:module:layer domain
//! @ai:module:public_api normalize_benchmark_mode, normalize_time_unit, normalize_verbosity, normalize_warmup_mode, normalize_result_format, extension_for, validate_duration, ProfilerSpec
//! @ai:module:stateless true

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

/// @ai:intent Benchmark modes: canonical shorthand plus the long alias JMH accepts
const BENCHMARK_MODES: &[(&str, &str)] = &[
    ("thrpt", "throughput"),
    ("avgt", "averagetime"),
    ("sample", "sampletime"),
    ("ss", "singleshottime"),
    ("all", "all"),
];

const TIME_UNITS: &[&str] = &["ns", "us", "ms", "s", "m", "h"];

const VERBOSITY_MODES: &[&str] = &["SILENT", "NORMAL", "EXTRA"];

const WARMUP_MODES: &[&str] = &["INDI", "BULK", "BULK_INDI"];

/// @ai:intent Result formats with their file extensions ("cvs" in an old
///            plugin generation was a typo for "csv")
const RESULT_FORMATS: &[(&str, &str)] = &[
    ("text", "txt"),
    ("csv", "csv"),
    ("scsv", "scsv"),
    ("json", "json"),
    ("latex", "tex"),
];

/// @ai:intent Normalize a benchmark mode to the shorthand the harness prints in -help
/// @ai:effects pure
pub fn normalize_benchmark_mode(field: &'static str, value: &str) -> Result<String> {
    let lower = value.to_ascii_lowercase();
    for (shorthand, long) in BENCHMARK_MODES {
        if lower == *shorthand || lower == *long {
            return Ok((*shorthand).to_string());
        }
    }
    Err(Error::InvalidOption {
        field,
        value: value.to_string(),
        expected: "one of thrpt, avgt, sample, ss, all",
    })
}

/// @ai:intent Normalize a time unit to its lowercase abbreviation
/// @ai:effects pure
pub fn normalize_time_unit(field: &'static str, value: &str) -> Result<String> {
    let lower = value.to_ascii_lowercase();
    if TIME_UNITS.contains(&lower.as_str()) {
        return Ok(lower);
    }
    Err(Error::InvalidOption {
        field,
        value: value.to_string(),
        expected: "one of ns, us, ms, s, m, h",
    })
}

/// @ai:intent Normalize a verbosity mode to the uppercase form JMH parses
/// @ai:effects pure
pub fn normalize_verbosity(field: &'static str, value: &str) -> Result<String> {
    let upper = value.to_ascii_uppercase();
    if VERBOSITY_MODES.contains(&upper.as_str()) {
        return Ok(upper);
    }
    Err(Error::InvalidOption {
        field,
        value: value.to_string(),
        expected: "one of SILENT, NORMAL, EXTRA",
    })
}

/// @ai:intent Normalize a warmup mode to the uppercase form JMH parses
/// @ai:effects pure
pub fn normalize_warmup_mode(field: &'static str, value: &str) -> Result<String> {
    let upper = value.to_ascii_uppercase();
    if WARMUP_MODES.contains(&upper.as_str()) {
        return Ok(upper);
    }
    Err(Error::InvalidOption {
        field,
        value: value.to_string(),
        expected: "one of INDI, BULK, BULK_INDI",
    })
}

/// @ai:intent Normalize a result format to its lowercase canonical name
/// @ai:effects pure
pub fn normalize_result_format(field: &'static str, value: &str) -> Result<String> {
    let lower = value.to_ascii_lowercase();
    if RESULT_FORMATS.iter().any(|(format, _)| *format == lower) {
        return Ok(lower);
    }
    Err(Error::InvalidOption {
        field,
        value: value.to_string(),
        expected: "one of text, csv, scsv, json, latex",
    })
}

/// @ai:intent File extension for a normalized result format
/// @ai:pre format has been normalized by normalize_result_format
/// @ai:effects pure
pub fn extension_for(format: &str) -> &'static str {
    RESULT_FORMATS
        .iter()
        .find(|(name, _)| *name == format)
        .map(|(_, ext)| *ext)
        .unwrap_or("txt")
}

/// @ai:intent Validate a magnitude+unit duration string such as "10s".
///            A missing unit means seconds. The raw string is what gets
///            emitted; the harness reparses it on its side.
/// @ai:effects pure
pub fn validate_duration(field: &'static str, value: &str) -> Result<()> {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    let pattern = DURATION.get_or_init(|| {
        Regex::new(r"(?i)^\s*\d+\s*(ns|us|ms|s|m|min|h|hr)?\s*$").expect("duration pattern")
    });

    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(Error::InvalidDuration {
            field,
            value: value.to_string(),
        })
    }
}

/// @ai:intent A profiler request: engine name plus its raw parameter string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilerSpec {
    pub name: String,
    pub params: String,
}

impl ProfilerSpec {
    /// @ai:intent Split a profiler spec on the first colon; no colon means no params
    /// @ai:effects pure
    pub fn parse(field: &'static str, spec: &str) -> Result<Self> {
        let (name, params) = match spec.split_once(':') {
            Some((name, params)) => (name, params),
            None => (spec, ""),
        };

        if name.is_empty() {
            return Err(Error::InvalidOption {
                field,
                value: spec.to_string(),
                expected: "name[:param1=value1,...]",
            });
        }

        Ok(Self {
            name: name.to_string(),
            params: params.to_string(),
        })
    }
}
