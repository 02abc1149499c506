use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Opaque value exchanged with compiled functions.
pub type Value = serde_json::Value;

/// Boxed future resolving to an opaque output value or a failure.
pub type BoxedValueFuture = Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>>;

/// Handle to a single entry-point method of a compiled binary unit.
pub type MethodHandle = Arc<dyn Fn(Value) -> BoxedValueFuture + Send + Sync>;

/// An asynchronously callable function produced by the pipeline.
///
/// Cloning is cheap; clones share the same underlying method handle, so a
/// cached callable and every caller holding it dispatch to the same compiled
/// code.
#[derive(Clone)]
pub struct Callable {
    handle: MethodHandle,
}

impl Callable {
    pub fn from_handle(handle: MethodHandle) -> Self {
        Self { handle }
    }

    /// Invoke the compiled function with one input value and await its result.
    pub async fn invoke(&self, input: Value) -> anyhow::Result<Value> {
        (self.handle)(input).await
    }

    /// Whether two callables share the same underlying compiled method.
    pub fn same_function(a: &Callable, b: &Callable) -> bool {
        Arc::ptr_eq(&a.handle, &b.handle)
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callable").finish_non_exhaustive()
    }
}
