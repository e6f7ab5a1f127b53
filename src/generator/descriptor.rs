//! @ai:module:intent Extract benchmark metadata and write generated artifacts
//! @ai:module:layer domain
//! @ai:module:public_api BenchmarkDescriptor, extract, write_resources, write_sources

use crate::error::Result;
use crate::generator::classfile::{ClassFile, ACC_FINAL, ACC_PUBLIC, ACC_STATIC};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const BENCHMARK_ANNOTATION: &str = "Lorg/openjdk/jmh/annotations/Benchmark;";
pub const PARAM_ANNOTATION: &str = "Lorg/openjdk/jmh/annotations/Param;";

/// Resource the harness reads to discover benchmarks without scanning.
pub const DESCRIPTOR_RESOURCE: &str = "META-INF/BenchmarkList";

/// @ai:intent One discovered benchmark method. Both analysis strategies
///            produce this same shape; generation never knows which
///            strategy ran.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BenchmarkDescriptor {
    /// Fully-qualified dotted class name.
    pub class_name: String,
    pub method: String,
}

impl BenchmarkDescriptor {
    /// @ai:intent Descriptor line as persisted in the resource file
    /// @ai:effects pure
    pub fn as_line(&self) -> String {
        format!("{}.{}", self.class_name, self.method)
    }
}

/// @ai:intent Collect benchmark descriptors from one parsed class and append
///            any metadata violations to the shared error list. Violations
///            never abort extraction: the whole discovery set is always
///            inspected so one invocation reports everything at once.
/// @ai:effects pure
pub fn extract(class: &ClassFile, errors: &mut Vec<String>) -> Vec<BenchmarkDescriptor> {
    let benchmark_methods: Vec<_> = class
        .methods
        .iter()
        .filter(|m| m.has_annotation(BENCHMARK_ANNOTATION))
        .collect();

    if benchmark_methods.is_empty() {
        return Vec::new();
    }

    let class_name = class.dotted_name();

    if class.access & ACC_PUBLIC == 0 {
        errors.push(format!("benchmark class {class_name} should be public"));
    }

    for field in &class.fields {
        if field.has_annotation(PARAM_ANNOTATION) && field.access & ACC_FINAL != 0 {
            errors.push(format!(
                "@Param field {class_name}.{} should not be final",
                field.name
            ));
        }
    }

    let mut descriptors = Vec::with_capacity(benchmark_methods.len());
    for method in benchmark_methods {
        if method.access & ACC_PUBLIC == 0 {
            errors.push(format!(
                "benchmark method {class_name}.{}() should be public",
                method.name
            ));
        }
        if method.access & ACC_STATIC != 0 {
            errors.push(format!(
                "benchmark method {class_name}.{}() should not be static",
                method.name
            ));
        }
        descriptors.push(BenchmarkDescriptor {
            class_name: class_name.clone(),
            method: method.name.clone(),
        });
    }

    descriptors
}

/// @ai:intent Write the descriptor resource, one sorted line per benchmark
/// @ai:effects fs:write
pub fn write_resources(resources_dir: &Path, descriptors: &[BenchmarkDescriptor]) -> Result<PathBuf> {
    let path = resources_dir.join(DESCRIPTOR_RESOURCE);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut content = String::new();
    for descriptor in descriptors {
        content.push_str(&descriptor.as_line());
        content.push('\n');
    }
    std::fs::write(&path, content)?;
    Ok(path)
}

/// @ai:intent Write one generated source per benchmark class listing its
///            benchmark methods, under the class's own package
/// @ai:effects fs:write
pub fn write_sources(sources_dir: &Path, descriptors: &[BenchmarkDescriptor]) -> Result<()> {
    let mut by_class: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for descriptor in descriptors {
        by_class
            .entry(descriptor.class_name.as_str())
            .or_default()
            .push(descriptor.method.as_str());
    }

    for (class_name, methods) in by_class {
        let (package, simple_name) = match class_name.rsplit_once('.') {
            Some((package, simple)) => (Some(package), simple),
            None => (None, class_name),
        };

        let mut directory = sources_dir.to_path_buf();
        if let Some(package) = package {
            for segment in package.split('.') {
                directory.push(segment);
            }
        }
        std::fs::create_dir_all(&directory)?;

        let mut source = String::new();
        if let Some(package) = package {
            source.push_str(&format!("package {package};\n\n"));
        }
        source.push_str(&format!(
            "/** Generated benchmark index for {class_name}. Do not edit. */\n"
        ));
        source.push_str(&format!("public final class {simple_name}_BenchmarkInfo {{\n"));
        source.push_str("    public static final String[] BENCHMARKS = {\n");
        for method in methods {
            source.push_str(&format!("        \"{method}\",\n"));
        }
        source.push_str("    };\n");
        source.push_str(&format!("    private {simple_name}_BenchmarkInfo() {{}}\n"));
        source.push_str("}\n");

        std::fs::write(
            directory.join(format!("{simple_name}_BenchmarkInfo.java")),
            source,
        )?;
    }

    Ok(())
}
