//! **aerospace-alfred**: an Alfred script filter for the AeroSpace window
//! manager.
//!
//! Each invocation takes the text typed into Alfred, asks the `aerospace`
//! CLI for the current workspaces, windows or key bindings, and prints one
//! JSON payload of selectable items.  A second binary,
//! `aerospace-alfred-perform`, carries out the action of the item the user
//! picked.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::CommandRunner`] runs external programs, so nothing is
//!   coupled to real child processes.
//! * [`traits::WindowManager`] reports window-manager state and performs
//!   actions, so query routing is not coupled to AeroSpace's CLI syntax.
//!
//! Concrete implementations live in [`process`] (child processes) and
//! [`aerospace`] (the `aerospace` CLI).  [`command::Query`] is the query
//! grammar, [`dispatch::Dispatcher`] routes queries to the pure functions in
//! [`builders`], and [`icon`] finds application icons with a persistent
//! cache.

pub mod aerospace;
pub mod builders;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod feedback;
pub mod icon;
pub mod perform;
pub mod process;
pub mod traits;

#[cfg(test)]
mod test_utils;
