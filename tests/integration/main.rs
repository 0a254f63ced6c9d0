//! End-to-end integration tests across all layers.

mod scenarios;
