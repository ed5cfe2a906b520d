//! Integration tests for media facet classification.
//!
//! Run with: `cargo test --test integration`

mod archive_blobs;
mod config_loading;
mod support;
