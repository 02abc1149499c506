use std::env;
use std::path::PathBuf;

pub const ENV_CACHE: &str = "FUNCFORGE_CACHE";
pub const ENV_DEBUG: &str = "FUNCFORGE_DEBUG";
pub const ENV_APP_ROOT: &str = "FUNCFORGE_APP_ROOT";
pub const ENV_TEMP_DIR: &str = "FUNCFORGE_TEMP_DIR";

/// Runtime flags controlling caching, tracing, and file-system roots.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cache_enabled: bool,
    pub debug: bool,
    pub project_root: PathBuf,
    /// Intermediate-files directory override, honored by the legacy back end.
    pub temp_dir: Option<PathBuf>,
}

impl Settings {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_enabled: false,
            debug: false,
            project_root: project_root.into(),
            temp_dir: None,
        }
    }

    /// Read settings from the process environment. A flag variable counts as
    /// set when it is present and non-empty.
    pub fn from_env() -> Self {
        let project_root = env::var(ENV_APP_ROOT)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        Self {
            cache_enabled: flag(ENV_CACHE),
            debug: flag(ENV_DEBUG),
            project_root,
            temp_dir: env::var(ENV_TEMP_DIR)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Emit a trace line when verbose debugging is enabled. The message
    /// closure only runs when tracing is on.
    pub(crate) fn trace(&self, message: impl FnOnce() -> String) {
        if self.debug {
            eprintln!("[funcforge] {}", message());
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(".")
    }
}

fn flag(name: &str) -> bool {
    env::var(name).map(|v| !v.is_empty()).unwrap_or(false)
}
