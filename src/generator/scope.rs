//! @ai:module:intent Isolated, disposable type-resolution scope for analysis
//! @ai:module:layer infrastructure
//! @ai:module:public_api ResolutionScope, ScopeGuard, ambient, path_to_type_name

use crate::error::{Error, Result};
use crate::generator::classfile::{self, ClassFile};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

thread_local! {
    static AMBIENT: RefCell<Vec<Arc<ResolutionScope>>> = const { RefCell::new(Vec::new()) };
}

/// @ai:intent Resolves fully-qualified type names against a fixed set of
///            root directories. Roots are searched in order; the first
///            match wins. The scope never touches any process-wide default.
#[derive(Debug)]
pub struct ResolutionScope {
    roots: Vec<PathBuf>,
}

impl ResolutionScope {
    /// @ai:intent Build a scope over the given roots, first occurrence wins
    /// @ai:effects pure
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut deduped: Vec<PathBuf> = Vec::new();
        for root in roots {
            if !deduped.iter().any(|existing| *existing == root) {
                deduped.push(root);
            }
        }
        Self { roots: deduped }
    }

    /// @ai:effects pure
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// @ai:intent Locate the class file defining a dotted type name
    /// @ai:effects fs:read
    pub fn locate(&self, type_name: &str) -> Option<PathBuf> {
        let relative: PathBuf = type_name.split('.').collect::<PathBuf>().with_extension("class");
        self.roots
            .iter()
            .map(|root| root.join(&relative))
            .find(|candidate| candidate.is_file())
    }

    /// @ai:intent Load a type through this scope. Any failure is reported
    ///            for the specific class; the caller decides whether the
    ///            whole pass dies (it does, for reflective analysis).
    /// @ai:effects fs:read
    pub fn load(&self, type_name: &str) -> Result<ClassFile> {
        let path = self.locate(type_name).ok_or_else(|| Error::ClassLoad {
            name: type_name.to_string(),
            reason: "not found in resolution scope".to_string(),
        })?;

        let bytes = std::fs::read(&path).map_err(|e| Error::ClassLoad {
            name: type_name.to_string(),
            reason: e.to_string(),
        })?;

        let class = classfile::parse(&bytes).map_err(|reason| Error::ClassLoad {
            name: type_name.to_string(),
            reason,
        })?;

        if class.dotted_name() != type_name {
            return Err(Error::ClassLoad {
                name: type_name.to_string(),
                reason: format!("class file defines {} instead", class.dotted_name()),
            });
        }

        Ok(class)
    }

    /// @ai:intent Install this scope as the thread's ambient resolution
    ///            context. The returned guard restores the previous context
    ///            when dropped, on every exit path.
    /// @ai:effects io
    pub fn install(self: Arc<Self>) -> ScopeGuard {
        AMBIENT.with(|stack| stack.borrow_mut().push(self));
        ScopeGuard {
            _not_send: PhantomData,
        }
    }
}

/// @ai:intent The currently installed ambient scope of this thread, if any
/// @ai:effects io
pub fn ambient() -> Option<Arc<ResolutionScope>> {
    AMBIENT.with(|stack| stack.borrow().last().cloned())
}

/// @ai:intent Restores the thread's previous ambient scope on drop
pub struct ScopeGuard {
    // Tied to the installing thread; the ambient stack is thread-local.
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        AMBIENT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// @ai:intent Convert a class file path under a root back into the
///            fully-qualified dotted type name
/// @ai:effects pure
pub fn path_to_type_name(root: &Path, class_file: &Path) -> Option<String> {
    let relative = class_file.strip_prefix(root).ok()?;
    let without_extension = relative.with_extension("");
    let mut name = String::new();
    for component in without_extension.components() {
        if !name.is_empty() {
            name.push('.');
        }
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::classfile::ACC_PUBLIC;
    use crate::generator::fixture::TestClass;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_class(root: &Path, internal_name: &str) -> PathBuf {
        let bytes = TestClass::new(internal_name)
            .method("run", ACC_PUBLIC, &[])
            .build();
        let path = root.join(format!("{internal_name}.class"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_path_to_type_name_conversion() {
        let root = Path::new("/build/classes");
        let class_file = Path::new("/build/classes/com/example/FooBench.class");
        assert_eq!(
            path_to_type_name(root, class_file),
            Some("com.example.FooBench".to_string())
        );

        assert_eq!(path_to_type_name(Path::new("/other"), class_file), None);
    }

    #[test]
    fn test_load_resolves_through_roots_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_class(first.path(), "com/example/Shared");
        write_class(second.path(), "com/example/Shared");
        write_class(second.path(), "com/example/OnlySecond");

        let scope = ResolutionScope::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);

        let located = scope.locate("com.example.Shared").unwrap();
        assert!(located.starts_with(first.path()));

        let loaded = scope.load("com.example.OnlySecond").unwrap();
        assert_eq!(loaded.dotted_name(), "com.example.OnlySecond");
    }

    #[test]
    fn test_load_missing_type_fails() {
        let temp = TempDir::new().unwrap();
        let scope = ResolutionScope::new(vec![temp.path().to_path_buf()]);

        let err = scope.load("com.example.Absent").unwrap_err();
        assert!(err.to_string().contains("com.example.Absent"));
    }

    #[test]
    fn test_load_rejects_misplaced_class_file() {
        let temp = TempDir::new().unwrap();
        let bytes = TestClass::new("com/example/Actual")
            .method("run", ACC_PUBLIC, &[])
            .build();
        let path = temp.path().join("com/example/Claimed.class");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let scope = ResolutionScope::new(vec![temp.path().to_path_buf()]);
        let err = scope.load("com.example.Claimed").unwrap_err();
        assert!(err.to_string().contains("com.example.Actual"));
    }

    #[test]
    fn test_ambient_scope_is_restored_on_drop() {
        assert!(ambient().is_none());

        let outer = Arc::new(ResolutionScope::new(vec![PathBuf::from("/outer")]));
        let guard = Arc::clone(&outer).install();
        assert_eq!(ambient().unwrap().roots(), outer.roots());

        {
            let inner = Arc::new(ResolutionScope::new(vec![PathBuf::from("/inner")]));
            let _inner_guard = Arc::clone(&inner).install();
            assert_eq!(ambient().unwrap().roots(), inner.roots());
        }

        assert_eq!(ambient().unwrap().roots(), outer.roots());
        drop(guard);
        assert!(ambient().is_none());
    }
}
