//! Test and demo harness utilities.
//!
//! Synthetic captures are used by unit tests, the integration tests under
//! `tests/` and the `synth` CLI subcommand.

pub mod synthetic;
