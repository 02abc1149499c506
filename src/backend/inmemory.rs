//! Modern back end: resolves every reference up front, emits directly to an
//! in-memory byte buffer, and hands the buffer to the injected loader.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::reference::{PackageLookup, ReferenceResolver, ResolvedReference};

use super::{
    BinaryLoader, Compiled, CompileBackend, EmittingCompiler, OptimizationLevel,
};

/// Reference names seeded into every request handled by this back end.
pub const BASELINE_REFERENCES: [&str; 3] =
    ["System.Runtime", "System.Threading.Tasks", "Microsoft.CSharp"];

pub struct InMemoryBackend {
    compiler: Arc<dyn EmittingCompiler>,
    loader: BinaryLoader,
    resolver: ReferenceResolver,
    settings: Settings,
}

impl InMemoryBackend {
    pub fn new(
        compiler: Arc<dyn EmittingCompiler>,
        loader: BinaryLoader,
        resolver: ReferenceResolver,
        settings: &Settings,
    ) -> Self {
        Self {
            compiler,
            loader,
            resolver,
            settings: settings.clone(),
        }
    }
}

impl CompileBackend for InMemoryBackend {
    fn baseline_references(&self) -> Vec<String> {
        BASELINE_REFERENCES.iter().map(|s| s.to_string()).collect()
    }

    fn try_compile(
        &self,
        source: &str,
        references: &[String],
        lookup: &PackageLookup,
    ) -> Result<Compiled> {
        self.settings
            .trace(|| format!("resolving {} references", references.len()));

        // Fail fast: an unresolvable reference aborts the whole request
        // rather than producing a diagnostic to fall back from.
        let mut resolved: Vec<ResolvedReference> = Vec::new();
        for token in references {
            let entries = self.resolver.resolve(token, lookup)?;
            for entry in &entries {
                self.settings.trace(|| {
                    format!("reference {} resolved to {}", token, entry.location.display())
                });
            }
            resolved.extend(entries);
        }

        let optimization = if self.settings.debug {
            OptimizationLevel::Debug
        } else {
            OptimizationLevel::Release
        };

        match self.compiler.emit(source, &resolved, optimization) {
            Ok(buffer) => {
                let unit = (self.loader)(&buffer).map_err(Error::Loader)?;
                self.settings.trace(|| "compilation completed".to_string());
                Ok(Compiled::Unit(unit))
            }
            Err(diagnostics) => {
                let diagnostics = diagnostics
                    .iter()
                    .filter(|diagnostic| diagnostic.is_reportable())
                    .map(|diagnostic| format!("{}: {}", diagnostic.id, diagnostic.message))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.settings
                    .trace(|| format!("compilation failed:\n{diagnostics}"));
                Ok(Compiled::Failed { diagnostics })
            }
        }
    }
}
