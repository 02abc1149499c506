use std::io;
use std::path::PathBuf;

/// Terminal failures raised out of a `compile_func` call.
///
/// None of these are retried or recovered internally; a request either
/// yields a usable callable or exactly one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A named reference could not be mapped to a binary location.
    #[error("Unable to resolve reference to {name}.")]
    UnresolvedReference { name: String },

    /// Both the library and the expression-wrapper interpretations failed.
    /// Carries the diagnostics of each attempt, clearly labeled.
    #[error(
        "Unable to compile source code.\n\
         ----> Errors when compiling as a library:\n{library_errors}\n\
         ----> Errors when compiling as an async expression:\n{expression_errors}"
    )]
    CompilationFailed {
        library_errors: String,
        expression_errors: String,
    },

    /// The compiled unit lacks the requested public instance method.
    #[error(
        "Unable to access the method to wrap. Make sure it is a public instance method.\n\
         Type: {type_name}, Method: {method_name}, Unit: {unit}"
    )]
    EntryPointNotFound {
        type_name: String,
        method_name: String,
        unit: String,
    },

    /// A file-backed source could not be read.
    #[error("Failed reading source file '{}': {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The injected binary loader rejected an emitted byte buffer.
    #[error("Binary loader failed: {0}")]
    Loader(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
