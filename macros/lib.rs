//! Re-exports the solver-options proc-macros so downstream crates depend on
//! a single `macros` crate rather than reaching into `options` directly.

pub use options::{build_option_enum, build_options, explicit_options, use_option};
