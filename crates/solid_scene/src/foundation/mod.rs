//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the scene:
//! - Math types and operations
//! - Frame timing and the shared clock handed from cameras to their children
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
