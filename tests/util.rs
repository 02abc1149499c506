//! Fake compiler back ends driving the pipeline in integration tests.
//!
//! The stub "language" is deliberately tiny: a source compiles as a library
//! when it declares `public class`, fails with a syntax diagnostic when it
//! contains `%%%`, and otherwise fails with a missing-class diagnostic.
//! Methods are discovered by scanning for `public async Task<object> Name(`
//! declarations, mirroring a public-instance-method lookup.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use funcforge::backend::{
    BinaryLoader, BinaryUnit, CompilerError, EmitDiagnostic, EmittingCompiler, LegacyOptions,
    OptimizationLevel, Severity, WholeProcessCompiler,
};
use funcforge::reference::{PackageLookup, ResolvedReference};
use funcforge::value::MethodHandle;
use serde_json::json;

pub const STUB_UNIT_IDENTITY: &str = "stub-unit";

/// Loaded artifact produced by both stub compilers. Entry points are found
/// by scanning the compiled source for public async method declarations.
pub struct StubUnit {
    source: String,
}

impl StubUnit {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl BinaryUnit for StubUnit {
    fn identity(&self) -> String {
        STUB_UNIT_IDENTITY.to_string()
    }

    fn find_method(&self, type_name: &str, method_name: &str) -> Option<MethodHandle> {
        if !self.source.contains(&format!("class {type_name}")) {
            return None;
        }
        let declaration = format!("public async Task<object> {method_name}(");
        if !self.source.contains(&declaration) {
            return None;
        }
        Some(Arc::new(move |input| {
            Box::pin(async move { Ok(json!({ "echo": input })) })
        }))
    }
}

fn accepts(source: &str) -> Result<(), (String, String)> {
    if source.contains("%%%") {
        Err((
            "CS1002".to_string(),
            "invalid expression near '%%%'".to_string(),
        ))
    } else if source.contains("public class") {
        Ok(())
    } else {
        Err((
            "CS1001".to_string(),
            "class declaration expected".to_string(),
        ))
    }
}

/// Everything one compile invocation received, captured for assertions.
#[derive(Debug, Clone)]
pub struct CompileJob {
    pub source: String,
    pub references: Vec<String>,
    pub resolved: Vec<ResolvedReference>,
    pub debug_info: bool,
    pub temp_dir: Option<PathBuf>,
}

/// Whole-process compiler stub for the legacy back end.
#[derive(Default)]
pub struct StubWholeProcessCompiler {
    pub compiles: AtomicUsize,
    pub jobs: Mutex<Vec<CompileJob>>,
}

impl StubWholeProcessCompiler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    pub fn jobs(&self) -> Vec<CompileJob> {
        self.jobs.lock().unwrap().clone()
    }
}

impl WholeProcessCompiler for StubWholeProcessCompiler {
    fn compile(
        &self,
        source: &str,
        references: &[String],
        options: &LegacyOptions,
    ) -> Result<Arc<dyn BinaryUnit>, Vec<CompilerError>> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().unwrap().push(CompileJob {
            source: source.to_string(),
            references: references.to_vec(),
            resolved: Vec::new(),
            debug_info: options.debug_info,
            temp_dir: options.temp_dir.clone(),
        });
        match accepts(source) {
            Ok(()) => Ok(Arc::new(StubUnit::new(source))),
            Err((id, message)) => Err(vec![CompilerError {
                message: format!("{id}: {message}"),
            }]),
        }
    }
}

/// Emitting compiler stub for the modern back end. Emitted bytes are the
/// source text itself; the loader below turns them back into a unit.
#[derive(Default)]
pub struct StubEmittingCompiler {
    pub compiles: AtomicUsize,
    pub jobs: Mutex<Vec<CompileJob>>,
}

impl StubEmittingCompiler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    pub fn jobs(&self) -> Vec<CompileJob> {
        self.jobs.lock().unwrap().clone()
    }
}

impl EmittingCompiler for StubEmittingCompiler {
    fn emit(
        &self,
        source: &str,
        references: &[ResolvedReference],
        _optimization: OptimizationLevel,
    ) -> Result<Vec<u8>, Vec<EmitDiagnostic>> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().unwrap().push(CompileJob {
            source: source.to_string(),
            references: Vec::new(),
            resolved: references.to_vec(),
            debug_info: false,
            temp_dir: None,
        });
        match accepts(source) {
            Ok(()) => Ok(source.as_bytes().to_vec()),
            Err((id, message)) => Err(vec![EmitDiagnostic {
                id,
                severity: Severity::Error,
                message,
                warning_as_error: false,
            }]),
        }
    }
}

pub fn stub_loader() -> BinaryLoader {
    Arc::new(|bytes: &[u8]| {
        let source = std::str::from_utf8(bytes)
            .map_err(|_| anyhow::anyhow!("emitted buffer is not valid text"))?;
        Ok(Arc::new(StubUnit::new(source)) as Arc<dyn BinaryUnit>)
    })
}

/// Lookup table resolving the modern back end's baseline reference names,
/// plus any extra entries a test needs.
pub fn lookup_with_baselines(extra: &[(&str, &str)]) -> PackageLookup {
    let mut lookup = PackageLookup::new();
    for name in [
        "System.Runtime",
        "System.Threading.Tasks",
        "Microsoft.CSharp",
    ] {
        lookup.insert(name.to_string(), PathBuf::from(format!("/runtime/{name}.dll")));
    }
    for (name, path) in extra {
        lookup.insert(name.to_string(), PathBuf::from(path));
    }
    lookup
}

/// A minimal source that compiles as a library with the default entry point.
pub const LIBRARY_SOURCE: &str = "public class Startup\n{\n    public async Task<object> Invoke(object input)\n    {\n        return input;\n    }\n}\n";

/// A bare async expression: fails as a library, succeeds once wrapped.
pub const EXPRESSION_SOURCE: &str = "async (input) => { return input; }";
