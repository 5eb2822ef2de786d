//! Failures reported by an [`Introspector`](super::Introspector)
//!
//! Every introspection fault is treated as fatal for the current redraw pass
//! only: the pass is abandoned and the view falls back to its idle message.

use super::ObjectId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntrospectionError {
    /// The debug target terminated or disconnected mid-query
    #[error("debug target '{0}' is no longer available")]
    TargetGone(String),

    /// The thread resumed and can no longer be inspected
    #[error("thread '{0}' is not suspended")]
    ThreadNotSuspended(String),

    /// The frame handle is stale (the stack changed since it was listed)
    #[error("stack frame {0} is no longer valid")]
    InvalidFrame(u64),

    /// The object was collected or never existed
    #[error("no live object with id {0}")]
    UnknownObject(ObjectId),

    /// The introspection service itself is unreachable
    #[error("introspection service unavailable: {0}")]
    Unavailable(String),
}
