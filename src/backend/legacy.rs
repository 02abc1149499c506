//! Legacy back end: hands source and reference names directly to a
//! whole-process, single-shot compiler.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::Result;
use crate::reference::{PackageLookup, ReferenceTable};

use super::{BinaryUnit, Compiled, CompileBackend, LegacyOptions, WholeProcessCompiler};

pub struct LegacyBackend {
    compiler: Arc<dyn WholeProcessCompiler>,
    settings: Settings,
}

impl LegacyBackend {
    pub fn new(compiler: Arc<dyn WholeProcessCompiler>, settings: &Settings) -> Self {
        Self {
            compiler,
            settings: settings.clone(),
        }
    }
}

impl CompileBackend for LegacyBackend {
    /// The whole-process compiler manages its baseline libraries internally.
    fn baseline_references(&self) -> Vec<String> {
        Vec::new()
    }

    fn try_compile(
        &self,
        source: &str,
        references: &[String],
        _lookup: &PackageLookup,
    ) -> Result<Compiled> {
        let options = LegacyOptions {
            debug_info: self.settings.debug,
            temp_dir: self.settings.temp_dir.clone(),
        };
        match self.compiler.compile(source, references, &options) {
            Ok(unit) => Ok(Compiled::Unit(unit)),
            Err(errors) => {
                let diagnostics = errors
                    .iter()
                    .map(|error| error.message.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                self.settings
                    .trace(|| format!("legacy compile failed:\n{diagnostics}"));
                Ok(Compiled::Failed { diagnostics })
            }
        }
    }

    /// Record the unit's references so the runtime can resolve them lazily
    /// at invocation time. Best effort: references that do not exist as
    /// files under the project root are skipped.
    fn record_references(
        &self,
        unit: &dyn BinaryUnit,
        references: &[String],
        table: &ReferenceTable,
    ) {
        let identity = unit.identity();
        for token in references {
            let candidate = if std::path::Path::new(token).is_absolute() {
                std::path::PathBuf::from(token)
            } else {
                self.settings.project_root.join(token)
            };
            if candidate.is_file() {
                if let Some(name) = candidate.file_stem().and_then(|stem| stem.to_str()) {
                    table.record(&identity, name, &candidate);
                }
            }
        }
    }
}
