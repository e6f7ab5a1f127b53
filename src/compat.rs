//! @ai:module:intent Version-gated injection of precomputed discovery metadata
//! @ai:module:layer application
//! @ai:module:public_api HarnessCompat, select_compat, SUPPORTED_VERSIONS
//!
//! Earlier plugin generations overwrote private fields of the harness runner
//! to hand it pre-parsed benchmark lists. That coupling is gone: each
//! supported harness version range gets one shim behind this trait, chosen
//! by probing the version string, and an unsupported version fails fast
//! instead of attempting best-effort field coercion.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Oldest harness line the descriptor-injection shim understands.
pub const SUPPORTED_VERSIONS: &str = "1.21 or newer";

const MINIMUM_VERSION: (u32, u32) = (1, 21);

/// @ai:intent Adapts one harness version range to accept precomputed
///            benchmark descriptors
pub trait HarnessCompat: std::fmt::Debug {
    /// Shim identifier, for diagnostics.
    fn id(&self) -> &'static str;

    /// @ai:intent Make the harness consume the descriptors under
    ///            `generated_resources_dir` instead of rescanning
    fn inject_descriptors(
        &self,
        classpath: &mut Vec<PathBuf>,
        generated_resources_dir: &Path,
    ) -> Result<()>;
}

/// @ai:intent Modern harnesses read META-INF/BenchmarkList from the first
///            classpath entry that provides it, so injection is a matter of
///            classpath ordering
#[derive(Debug)]
struct ResourceDescriptorCompat;

impl HarnessCompat for ResourceDescriptorCompat {
    fn id(&self) -> &'static str {
        "resource-descriptor"
    }

    fn inject_descriptors(
        &self,
        classpath: &mut Vec<PathBuf>,
        generated_resources_dir: &Path,
    ) -> Result<()> {
        if !generated_resources_dir.is_dir() {
            return Err(Error::MissingClasspathEntry(
                generated_resources_dir.to_path_buf(),
            ));
        }
        let entry = generated_resources_dir.to_path_buf();
        classpath.retain(|existing| *existing != entry);
        classpath.insert(0, entry);
        Ok(())
    }
}

/// @ai:intent Probe the harness version and pick the matching shim; no
///            match is a hard version-mismatch failure
/// @ai:effects pure
pub fn select_compat(version: &str) -> Result<Box<dyn HarnessCompat>> {
    let parsed = parse_version(version).ok_or_else(|| Error::VersionMismatch {
        version: version.to_string(),
        supported: SUPPORTED_VERSIONS,
    })?;

    if parsed >= MINIMUM_VERSION {
        tracing::debug!("Selected \"resource-descriptor\" shim for JMH {version}");
        Ok(Box::new(ResourceDescriptorCompat))
    } else {
        Err(Error::VersionMismatch {
            version: version.to_string(),
            supported: SUPPORTED_VERSIONS,
        })
    }
}

/// @ai:intent Major.minor prefix of a version string; trailing qualifiers
///            like ".1" or "-SNAPSHOT" are ignored
/// @ai:effects pure
fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split(['.', '-']);
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_supported_version_selects_resource_shim() {
        assert_eq!(select_compat("1.28").unwrap().id(), "resource-descriptor");
        assert_eq!(select_compat("1.21").unwrap().id(), "resource-descriptor");
        assert_eq!(
            select_compat("1.36-SNAPSHOT").unwrap().id(),
            "resource-descriptor"
        );
    }

    #[test]
    fn test_old_or_unparseable_version_fails_fast() {
        for version in ["1.19", "0.9", "latest", ""] {
            let err = select_compat(version).unwrap_err();
            match err {
                Error::VersionMismatch { version: v, .. } => assert_eq!(v, version),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_injection_prepends_resources_dir() {
        let temp = TempDir::new().unwrap();
        let resources = temp.path().join("generated-resources");
        std::fs::create_dir_all(&resources).unwrap();

        let shim = select_compat("1.28").unwrap();
        let mut classpath = vec![temp.path().join("jmh-core.jar")];
        shim.inject_descriptors(&mut classpath, &resources).unwrap();

        assert_eq!(classpath[0], resources);
        assert_eq!(classpath.len(), 2);
    }

    #[test]
    fn test_injection_requires_existing_resources_dir() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("never-generated");

        let shim = select_compat("1.28").unwrap();
        let mut classpath = Vec::new();
        let err = shim
            .inject_descriptors(&mut classpath, &missing)
            .unwrap_err();
        assert!(matches!(err, Error::MissingClasspathEntry(_)));
    }
}
