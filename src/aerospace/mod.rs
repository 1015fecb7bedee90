//! AeroSpace-specific implementations.
//!
//! This module provides the concrete backend for the
//! [`WindowManager`](crate::traits::WindowManager) trait, powered by the
//! `aerospace` command-line client.
//!
//! Nothing outside this module should know AeroSpace's argument shapes or
//! output formats.

pub mod cli;
