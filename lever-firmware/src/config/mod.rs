//! Build-time configuration
//!
//! `build.rs` validates `lever.toml` and generates [`LEVER_CONFIG`]; an
//! invalid file fails the build, so no runtime parsing is needed.

use lever_core::config::LeverConfig;

include!(concat!(env!("OUT_DIR"), "/lever_config.rs"));
