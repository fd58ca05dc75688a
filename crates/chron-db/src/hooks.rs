//! Interface between a host data layer and the version recorder.
//!
//! The host owns its mutation pipeline. After an insert or update has been
//! committed it calls the matching hook with a [`MutationEvent`]. Hooks return
//! nothing: whatever happens inside them, the host's result stands.

use chron_core::context::OperationContext;
use chron_core::record::Record;

/// A committed mutation, as handed to the hooks.
#[derive(Clone, Copy)]
pub struct MutationEvent<'a> {
    /// Rows the host statement actually affected.
    pub rows_affected: u64,
    /// The record after the mutation, identity included.
    pub record: &'a dyn Record,
    /// Context of the operation, carrying the actor.
    pub context: &'a OperationContext,
}

impl<'a> MutationEvent<'a> {
    #[must_use]
    pub fn new(rows_affected: u64, record: &'a dyn Record, context: &'a OperationContext) -> Self {
        Self {
            rows_affected,
            record,
            context,
        }
    }

    /// Type name of the mutated record.
    #[must_use]
    pub fn record_type(&self) -> &'static str {
        self.record.schema().name
    }
}

impl std::fmt::Debug for MutationEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationEvent")
            .field("record_type", &self.record_type())
            .field("rows_affected", &self.rows_affected)
            .field("context", &self.context)
            .finish()
    }
}

/// Callbacks a host data layer invokes after each committed mutation.
#[allow(async_fn_in_trait)]
pub trait MutationHooks {
    async fn after_insert(&self, event: &MutationEvent<'_>);
    async fn after_update(&self, event: &MutationEvent<'_>);
}
