//! Per-operation context and actor resolution.
//!
//! The request layer builds an [`OperationContext`] for every mutation it
//! issues and passes it explicitly into the host data layer, which hands it to
//! the version recorder. The acting principal travels under [`ACTOR_KEY`].

use std::collections::BTreeMap;

use serde_json::Value;

/// Key under which the acting principal is stored in an operation context.
pub const ACTOR_KEY: &str = "chronicle:current_actor";

/// Scoped key/value bag attached to a single mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationContext {
    values: BTreeMap<String, Value>,
}

impl OperationContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Context carrying `actor` as the acting principal.
    #[must_use]
    pub fn for_actor(actor: impl Into<Value>) -> Self {
        Self::new().with(ACTOR_KEY, actor)
    }
}

/// Build the operation context for a request.
///
/// `request` holds whatever the request layer attached upstream. If it carries
/// a user id under `current_user_key`, that id is stamped under [`ACTOR_KEY`]
/// for the recorder. Without one the context simply has no actor.
#[must_use]
pub fn inject_actor(request: &OperationContext, current_user_key: &str) -> OperationContext {
    let mut ctx = request.clone();
    if let Some(user_id) = request.get(current_user_key).filter(|v| !v.is_null()) {
        ctx.set(ACTOR_KEY, user_id.clone());
    }
    ctx
}

/// The actor attached to `ctx`, if any.
///
/// Strings are returned verbatim, numbers and booleans in their display form.
/// Null, empty strings and structured values count as no actor.
#[must_use]
pub fn resolve_actor(ctx: &OperationContext) -> Option<String> {
    match ctx.get(ACTOR_KEY)? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Actor rendered for the `actor` column: empty when none was attached.
#[must_use]
pub fn actor_or_empty(ctx: &OperationContext) -> String {
    resolve_actor(ctx).unwrap_or_default()
}
