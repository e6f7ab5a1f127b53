//! @ai:module:intent Compose the classpath for an isolated harness process
//! @ai:module:layer infrastructure
//! @ai:module:public_api compose, join
//! @ai:module:stateless true

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// @ai:intent Compose the run classpath: harness runtime first, then the
///            benchmark artifact, then optional test-scope entries. The
///            harness resolves same-named resources by first match, so the
///            order is part of the contract. Duplicates keep their first
///            position. Missing entries fail here, not at launch time.
/// @ai:effects fs:read
pub fn compose(
    jmh_classpath: &[PathBuf],
    benchmark_artifact: &Path,
    test_classpath: Option<&[PathBuf]>,
) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = Vec::new();

    for entry in jmh_classpath {
        push_entry(&mut entries, entry)?;
    }
    push_entry(&mut entries, benchmark_artifact)?;
    if let Some(test_entries) = test_classpath {
        for entry in test_entries {
            push_entry(&mut entries, entry)?;
        }
    }

    Ok(entries)
}

/// @ai:effects fs:read
fn push_entry(entries: &mut Vec<PathBuf>, entry: &Path) -> Result<()> {
    if !entry.exists() {
        return Err(Error::MissingClasspathEntry(entry.to_path_buf()));
    }
    if !entries.iter().any(|existing| existing == entry) {
        entries.push(entry.to_path_buf());
    }
    Ok(())
}

/// @ai:intent Compose the generation tool classpath: harness runtime first,
///            then the analysis classpath, same dedup and existence rules
/// @ai:effects fs:read
pub fn compose_tool(
    jmh_classpath: &[PathBuf],
    analysis_classpath: &[PathBuf],
) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in jmh_classpath.iter().chain(analysis_classpath.iter()) {
        push_entry(&mut entries, entry)?;
    }
    Ok(entries)
}

/// @ai:intent Join entries with the platform path separator for -cp
/// @ai:effects pure
pub fn join(entries: &[PathBuf]) -> Result<OsString> {
    std::env::join_paths(entries)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_composition_order_is_runtime_artifact_test() {
        let temp = TempDir::new().unwrap();
        let runtime = touch(temp.path(), "jmh-core.jar");
        let artifact = touch(temp.path(), "benchmarks.jar");
        let test_dep = touch(temp.path(), "junit.jar");

        let entries = compose(
            &[runtime.clone()],
            &artifact,
            Some(&[test_dep.clone()]),
        )
        .unwrap();

        assert_eq!(entries, vec![runtime, artifact, test_dep]);
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let temp = TempDir::new().unwrap();
        let runtime = touch(temp.path(), "jmh-core.jar");
        let artifact = touch(temp.path(), "benchmarks.jar");

        let entries = compose(
            &[runtime.clone(), artifact.clone()],
            &artifact,
            Some(&[runtime.clone()]),
        )
        .unwrap();

        assert_eq!(entries, vec![runtime, artifact]);
    }

    #[test]
    fn test_missing_entry_fails_before_launch() {
        let temp = TempDir::new().unwrap();
        let artifact = touch(temp.path(), "benchmarks.jar");
        let missing = temp.path().join("nope.jar");

        let err = compose(&[missing.clone()], &artifact, None).unwrap_err();
        match err {
            Error::MissingClasspathEntry(path) => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tool_classpath_keeps_runtime_first() {
        let temp = TempDir::new().unwrap();
        let runtime = touch(temp.path(), "jmh-generator-bytecode.jar");
        let analysis = touch(temp.path(), "benchmark-deps.jar");

        let entries =
            compose_tool(&[runtime.clone()], &[analysis.clone(), runtime.clone()]).unwrap();
        assert_eq!(entries, vec![runtime, analysis]);
    }

    #[test]
    fn test_join_uses_platform_separator() {
        let temp = TempDir::new().unwrap();
        let a = touch(temp.path(), "a.jar");
        let b = touch(temp.path(), "b.jar");

        let joined = join(&[a.clone(), b.clone()]).unwrap();
        let text = joined.to_string_lossy().into_owned();
        assert!(text.contains("a.jar"));
        assert!(text.contains("b.jar"));

        #[cfg(unix)]
        assert_eq!(
            text,
            format!("{}:{}", a.display(), b.display())
        );
    }
}
