//! Property-based tests for ordering, reconciliation and archive sniffing.
//!
//! Run with: `cargo test --test property`

mod reconcile_laws;
