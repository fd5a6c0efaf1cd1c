//! System requirements validation.
//!
//! This module provides functions to check that the host can start containers
//! before the server begins accepting calls.

mod requirements;

pub use requirements::{SystemRequirements, check_all, check_image, check_runtime, startup_check};
