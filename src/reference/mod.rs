//! Reference resolution: turning reference tokens (file paths, bare runtime
//! names, package-scoped names) into concrete binary locations, plus the
//! process-wide table used for lazy runtime reference lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Error, Result};

/// File suffix identifying a binary reference token, matched case-insensitively.
pub const BINARY_SUFFIX: &str = ".dll";

/// How a reference token was resolved to its binary location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Resolved directly on the file system (explicit path or a file
    /// co-located under the project root).
    File,
    /// Resolved through the package lookup table.
    Package,
    /// Fixed baseline library registered alongside a package resolution.
    Baseline,
}

/// A reference token paired with the binary location it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub token: String,
    pub location: PathBuf,
    pub kind: ReferenceKind,
}

/// Map from bare reference names to pre-resolved binary paths, supplied by
/// the host as a side channel for package-managed references.
pub type PackageLookup = HashMap<String, PathBuf>;

/// Resolves reference tokens against the project root and a package lookup
/// table. File-system hits shadow lookup-table entries of the same name.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    project_root: PathBuf,
    baselines: Vec<ResolvedReference>,
}

impl ReferenceResolver {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            baselines: Vec::new(),
        }
    }

    /// Register the two fixed baseline libraries (core runtime and dynamic
    /// typing support) added alongside every package-table resolution.
    pub fn with_baselines(
        mut self,
        core_runtime: impl Into<PathBuf>,
        dynamic_support: impl Into<PathBuf>,
    ) -> Self {
        self.baselines = vec![
            ResolvedReference {
                token: "<core-runtime>".to_string(),
                location: core_runtime.into(),
                kind: ReferenceKind::Baseline,
            },
            ResolvedReference {
                token: "<dynamic-support>".to_string(),
                location: dynamic_support.into(),
                kind: ReferenceKind::Baseline,
            },
        ];
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Resolve one token. A file-system hit yields a single reference; a
    /// lookup-table hit yields the resolved reference followed by the
    /// configured baselines. A lookup miss is fatal and names the bare
    /// reference.
    pub fn resolve(&self, token: &str, lookup: &PackageLookup) -> Result<Vec<ResolvedReference>> {
        if has_binary_suffix(token) {
            if token.chars().any(std::path::is_separator) {
                let location = if Path::new(token).is_absolute() {
                    PathBuf::from(token)
                } else {
                    self.project_root.join(token)
                };
                return Ok(vec![ResolvedReference {
                    token: token.to_string(),
                    location,
                    kind: ReferenceKind::File,
                }]);
            }

            let candidate = self.project_root.join(token);
            if candidate.is_file() {
                return Ok(vec![ResolvedReference {
                    token: token.to_string(),
                    location: candidate,
                    kind: ReferenceKind::File,
                }]);
            }
        }

        let bare = strip_binary_suffix(token);
        let Some(location) = lookup.get(bare) else {
            return Err(Error::UnresolvedReference {
                name: bare.to_string(),
            });
        };

        let mut resolved = vec![ResolvedReference {
            token: token.to_string(),
            location: location.clone(),
            kind: ReferenceKind::Package,
        }];
        resolved.extend(self.baselines.iter().cloned());
        Ok(resolved)
    }
}

/// Bare name of a token, with any binary suffix removed.
pub fn strip_binary_suffix(token: &str) -> &str {
    if has_binary_suffix(token) {
        &token[..token.len() - BINARY_SUFFIX.len()]
    } else {
        token
    }
}

fn has_binary_suffix(token: &str) -> bool {
    token
        .get(token.len().wrapping_sub(BINARY_SUFFIX.len())..)
        .is_some_and(|tail| tail.eq_ignore_ascii_case(BINARY_SUFFIX))
}

/// Process-wide, append-only table recording which references each compiled
/// unit was built against. The legacy runtime resolves library-to-library
/// references lazily at invocation time, so the orchestrator records every
/// successful legacy compile here. Entries are never pruned.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    units: Mutex<HashMap<String, HashMap<String, PathBuf>>>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one loaded reference for a compiled unit. Safe for concurrent
    /// writers compiling different sources.
    pub fn record(&self, unit_identity: &str, name: &str, location: &Path) {
        self.units
            .lock()
            .entry(unit_identity.to_string())
            .or_default()
            .insert(name.to_string(), location.to_path_buf());
    }

    /// Look up a reference by bare name in the context of the unit that
    /// requested it.
    pub fn resolve_runtime(&self, unit_identity: &str, name: &str) -> Option<PathBuf> {
        self.units.lock().get(unit_identity)?.get(name).cloned()
    }

    pub fn unit_count(&self) -> usize {
        self.units.lock().len()
    }
}
