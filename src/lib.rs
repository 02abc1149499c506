//! funcforge compiles source text into cached, asynchronously callable
//! functions at process runtime.
//!
//! The pipeline tries the source as a self-contained library first and
//! falls back to wrapping it as an inline async expression; references are
//! resolved across file paths, bare runtime names, and package-managed
//! names; results are cached by exact source identity. Two compiler back
//! ends (a legacy whole-process compiler and a modern in-memory emitting
//! compiler) share the pipeline through one strategy contract, with the
//! actual compiler and binary loader injected by the host.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reference;
pub mod transform;
pub mod value;

pub use backend::{CompileBackend, InMemoryBackend, LegacyBackend};
pub use cache::FunctionCache;
pub use config::Settings;
pub use error::{Error, Result};
pub use pipeline::{CompileRequest, FunctionCompiler};
pub use reference::{ReferenceResolver, ReferenceTable, ResolvedReference};
pub use value::{Callable, Value};
