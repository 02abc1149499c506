//! Compile-strategy contract shared by the two compiler back ends, plus the
//! seams through which the host injects the actual compiler and binary
//! loader.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::reference::{PackageLookup, ReferenceTable, ResolvedReference};
use crate::value::MethodHandle;

pub mod inmemory;
pub mod legacy;

pub use inmemory::InMemoryBackend;
pub use legacy::LegacyBackend;

/// An opaque loaded compiled artifact exposing named entry points.
///
/// `find_method` returns `None` when the requested method does not exist or
/// is not a public instance method; the lookup happens once per compile and
/// the returned handle dispatches directly thereafter.
pub trait BinaryUnit: Send + Sync {
    /// Stable identity of the unit, used as the key of the runtime
    /// reference table.
    fn identity(&self) -> String;

    fn find_method(&self, type_name: &str, method_name: &str) -> Option<MethodHandle>;
}

/// Callback turning an emitted byte buffer into a loaded binary unit. The
/// host decides how binaries are loaded and isolated.
pub type BinaryLoader = Arc<dyn Fn(&[u8]) -> anyhow::Result<Arc<dyn BinaryUnit>> + Send + Sync>;

/// One error reported by the whole-process compiler.
#[derive(Debug, Clone)]
pub struct CompilerError {
    pub message: String,
}

/// Options forwarded to the whole-process compiler on every invocation.
#[derive(Debug, Clone, Default)]
pub struct LegacyOptions {
    pub debug_info: bool,
    /// Directory for intermediate files, when overridden.
    pub temp_dir: Option<PathBuf>,
}

/// Single-shot, whole-process compiler black box used by the legacy back
/// end. Reference names are passed through verbatim; the compiler manages
/// its own baseline libraries.
pub trait WholeProcessCompiler: Send + Sync {
    fn compile(
        &self,
        source: &str,
        references: &[String],
        options: &LegacyOptions,
    ) -> std::result::Result<Arc<dyn BinaryUnit>, Vec<CompilerError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Hidden,
    Info,
    Warning,
    Error,
}

/// One diagnostic reported by the emitting compiler.
#[derive(Debug, Clone)]
pub struct EmitDiagnostic {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub warning_as_error: bool,
}

impl EmitDiagnostic {
    /// Whether this diagnostic survives the failure filter: errors,
    /// warnings, and warnings escalated to errors are reported; the rest
    /// are dropped.
    pub fn is_reportable(&self) -> bool {
        self.warning_as_error || matches!(self.severity, Severity::Error | Severity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationLevel {
    Debug,
    Release,
}

/// In-memory emitting compiler black box used by the modern back end:
/// parses the source, compiles it against the resolved references, and
/// emits a loadable byte buffer.
pub trait EmittingCompiler: Send + Sync {
    fn emit(
        &self,
        source: &str,
        references: &[ResolvedReference],
        optimization: OptimizationLevel,
    ) -> std::result::Result<Vec<u8>, Vec<EmitDiagnostic>>;
}

/// Outcome of one compile attempt. Diagnostics are a recoverable outcome
/// (the orchestrator falls back to the expression wrapper); only resolution
/// and loader failures surface as hard errors.
pub enum Compiled {
    Unit(Arc<dyn BinaryUnit>),
    Failed { diagnostics: String },
}

impl std::fmt::Debug for Compiled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compiled::Unit(unit) => f.debug_tuple("Unit").field(&unit.identity()).finish(),
            Compiled::Failed { diagnostics } => f
                .debug_struct("Failed")
                .field("diagnostics", diagnostics)
                .finish(),
        }
    }
}

/// The contract both back ends implement. The orchestrator treats the two
/// implementations interchangeably.
pub trait CompileBackend: Send + Sync {
    /// Reference names every request starts from, before explicit and
    /// directive references are appended.
    fn baseline_references(&self) -> Vec<String>;

    fn try_compile(
        &self,
        source: &str,
        references: &[String],
        lookup: &PackageLookup,
    ) -> Result<Compiled>;

    /// Post-compile hook recording the unit's references for lazy runtime
    /// resolution. Only the legacy back end needs this; the default is a
    /// no-op.
    fn record_references(
        &self,
        _unit: &dyn BinaryUnit,
        _references: &[String],
        _table: &ReferenceTable,
    ) {
    }
}
