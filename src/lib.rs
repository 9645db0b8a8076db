// src/lib.rs - Library interface for the measurement bench

pub mod bench;
pub mod constants;
pub mod data_analysis;
pub mod data_input;
pub mod error;
pub mod export;
pub mod font_config;
pub mod plot_functions;

// Crate version, preferring a git-derived version when the build provides one.
pub fn crate_version() -> &'static str {
    option_env!("VERGEN_GIT_SEMVER").unwrap_or(env!("CARGO_PKG_VERSION"))
}
