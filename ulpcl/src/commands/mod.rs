//! Command implementations for the `ulpcl` CLI.

pub mod compile;
