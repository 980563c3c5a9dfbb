//! Structured audit logging.
//!
//! Lookups emit `tracing` events under the `vtlookup::audit` target so they
//! can be routed separately from diagnostic logs.

mod events;

pub use events::{
    emit_lookup_completed, emit_lookup_failed, emit_lookup_skipped, emit_lookup_started,
    outcome_label,
};
