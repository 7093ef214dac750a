//! Bind-value storage.

use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A clone-friendly bind value.
#[derive(Clone)]
pub struct Param(Arc<dyn ToSql + Send + Sync>);

impl Param {
    /// Create a new parameter from any ToSql value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // ToSql requires Debug, so the bound value itself is printable.
        f.debug_tuple("Param").field(&self.0).finish()
    }
}

/// Parameter refs compatible with `tokio-postgres`, in placeholder order.
pub fn params_ref(params: &[Param]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(Param::as_ref).collect()
}
