//! Pipeline orchestrator: load-from-file, cache lookup, reference
//! gathering, the two-phase compile, entry-point extraction, and callable
//! construction.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::backend::{Compiled, CompileBackend};
use crate::cache::FunctionCache;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::reference::{PackageLookup, ReferenceTable};
use crate::transform;
use crate::value::Callable;

/// Suffixes identifying a file-backed source, matched case-insensitively.
pub const SOURCE_SUFFIXES: [&str; 2] = [".cs", ".csx"];

const DEFAULT_TYPE_NAME: &str = "Startup";
const DEFAULT_METHOD_NAME: &str = "Invoke";

/// One compilation request. Immutable per invocation.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Source text, or the path of a source file recognized by suffix.
    pub source: String,
    pub type_name: String,
    pub method_name: String,
    /// References supplied explicitly alongside the source.
    pub references: Vec<String>,
    /// Side-channel map resolving package-style references, used by the
    /// modern back end.
    pub package_lookup: PackageLookup,
}

impl CompileRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            type_name: DEFAULT_TYPE_NAME.to_string(),
            method_name: DEFAULT_METHOD_NAME.to_string(),
            references: Vec::new(),
            package_lookup: PackageLookup::new(),
        }
    }

    pub fn with_entry_point(
        mut self,
        type_name: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        self.type_name = type_name.into();
        self.method_name = method_name.into();
        self
    }

    pub fn with_references<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references = references.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_package_lookup(mut self, lookup: PackageLookup) -> Self {
        self.package_lookup = lookup;
        self
    }
}

/// Owns the end-to-end compile sequence. Stores are injected so no ambient
/// global state is involved; create the compiler once at process start and
/// share it.
pub struct FunctionCompiler {
    settings: Settings,
    backend: Arc<dyn CompileBackend>,
    cache: Arc<FunctionCache>,
    references: Arc<ReferenceTable>,
}

impl FunctionCompiler {
    pub fn new(settings: Settings, backend: Arc<dyn CompileBackend>) -> Self {
        Self::with_stores(
            settings,
            backend,
            Arc::new(FunctionCache::new()),
            Arc::new(ReferenceTable::new()),
        )
    }

    pub fn with_stores(
        settings: Settings,
        backend: Arc<dyn CompileBackend>,
        cache: Arc<FunctionCache>,
        references: Arc<ReferenceTable>,
    ) -> Self {
        Self {
            settings,
            backend,
            cache,
            references,
        }
    }

    /// Runtime reference table populated by legacy compiles, consulted by
    /// the host's lazy library resolution.
    pub fn reference_table(&self) -> &Arc<ReferenceTable> {
        &self.references
    }

    pub fn cache(&self) -> &Arc<FunctionCache> {
        &self.cache
    }

    /// Compile a request into an asynchronously callable function.
    pub fn compile_func(&self, request: &CompileRequest) -> Result<Callable> {
        self.settings.trace(|| "compile_func - starting".to_string());
        self.settings.trace(|| {
            format!(
                "compile_func - type: {}, method: {}, explicit references: {}",
                request.type_name,
                request.method_name,
                request.references.len()
            )
        });

        let source = self.load_source(&request.source)?;

        if !self.settings.cache_enabled {
            return self.build(request, &source);
        }

        self.settings
            .trace(|| format!("compile_func - cache size: {}", self.cache.len()));
        if let Some(callable) = self.cache.get(&source) {
            self.settings
                .trace(|| "compile_func - serving callable from cache".to_string());
            return Ok(callable);
        }

        self.cache
            .get_or_compile(&source, || self.build(request, &source))
    }

    /// Replace a source value naming an existing source file with the file's
    /// contents; anything else passes through unchanged.
    fn load_source(&self, source: &str) -> Result<String> {
        let named_file = SOURCE_SUFFIXES.iter().any(|suffix| {
            source
                .get(source.len().wrapping_sub(suffix.len())..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
        });
        if !named_file {
            return Ok(source.to_string());
        }
        let path = Path::new(source);
        self.settings
            .trace(|| format!("compile_func - reading source from {}", path.display()));
        fs::read_to_string(path).map_err(|error| Error::SourceRead {
            path: path.to_path_buf(),
            source: error,
        })
    }

    fn build(&self, request: &CompileRequest, source: &str) -> Result<Callable> {
        self.settings
            .trace(|| "compile_func - not cached, compiling".to_string());

        let mut references = self.backend.baseline_references();
        references.extend(request.references.iter().cloned());

        let (stripped, directives) = transform::extract_references(source);
        references.extend(directives);

        // First interpretation: the source is a complete library.
        let attempt =
            self.backend
                .try_compile(&stripped, &references, &request.package_lookup)?;
        let unit = match attempt {
            Compiled::Unit(unit) => unit,
            Compiled::Failed {
                diagnostics: library_errors,
            } => {
                // Second interpretation: the source is a bare async
                // expression; wrap it in the library scaffold.
                let (body, usings) = transform::extract_usings(&stripped);
                let wrapped = transform::synthesize_wrapper(&usings, &body);
                self.settings.trace(|| {
                    format!("compile_func - trying as an async expression:\n{wrapped}")
                });
                match self.backend.try_compile(
                    &wrapped,
                    &references,
                    &request.package_lookup,
                )? {
                    Compiled::Unit(unit) => unit,
                    Compiled::Failed {
                        diagnostics: expression_errors,
                    } => {
                        return Err(Error::CompilationFailed {
                            library_errors,
                            expression_errors,
                        });
                    }
                }
            }
        };

        self.backend
            .record_references(unit.as_ref(), &references, &self.references);

        let method = unit
            .find_method(&request.type_name, &request.method_name)
            .ok_or_else(|| Error::EntryPointNotFound {
                type_name: request.type_name.clone(),
                method_name: request.method_name.clone(),
                unit: unit.identity(),
            })?;

        Ok(Callable::from_handle(method))
    }
}
