//! Process-lifetime function cache keyed by exact source identity.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::Result;
use crate::value::Callable;

/// Maps original, untransformed source text to its compiled callable.
///
/// Keys are never normalized and entries are never evicted. Concurrent
/// requests bearing identical source serialize behind the first compile and
/// converge on one callable.
#[derive(Default)]
pub struct FunctionCache {
    slots: Mutex<HashMap<String, Arc<OnceCell<Callable>>>>,
}

impl FunctionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct source texts with a stored callable.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, source: &str) -> Option<Callable> {
        self.slots.lock().get(source)?.get().cloned()
    }

    /// Return the cached callable for `source`, or run `compile` exactly
    /// once to produce and store it. A failed compile leaves the slot empty
    /// so a later request may retry.
    pub fn get_or_compile(
        &self,
        source: &str,
        compile: impl FnOnce() -> Result<Callable>,
    ) -> Result<Callable> {
        let slot = self
            .slots
            .lock()
            .entry(source.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        slot.get_or_try_init(compile).map(|callable| callable.clone())
    }
}
