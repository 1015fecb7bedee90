//! Executes the action carried by a selected item.
//!
//! Alfred exports an item's `variables` to the run script as environment
//! variables.  [`Invocation::from_vars`] reads them back into a typed
//! request and [`perform`] carries it out through the
//! [`WindowManager`] trait.

use crate::command::{Action, Direction, UnknownName};
use crate::traits::WindowManager;
use log::info;

/// Errors produced while performing an action.
#[derive(Debug, thiserror::Error)]
pub enum PerformError {
    /// A variable the action needs was not set (or empty).
    #[error("missing variable: {0}")]
    MissingVariable(&'static str),
    #[error("invalid action: {0}")]
    InvalidAction(UnknownName),
    #[error("invalid direction: {0}")]
    InvalidDirection(UnknownName),
    /// The window manager rejected the command.
    #[error("window manager error: {0}")]
    WindowManager(String),
}

/// A fully validated request, ready to be performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    FocusWorkspace { workspace: String },
    MoveFocused { workspace: String, follow: bool },
    MoveWindow {
        window_id: String,
        workspace: String,
        follow: bool,
    },
    FocusWindow { window_id: String },
    MoveFocusedDirection(Direction),
    SwapFocusedDirection(Direction),
}

impl Invocation {
    /// Build an invocation from item variables.
    ///
    /// `var` looks up a variable by name (`action`, `workspace`,
    /// `window_id`, `direction`); empty values count as missing.
    pub fn from_vars<F>(var: F) -> Result<Self, PerformError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| {
            var(name)
                .filter(|v| !v.is_empty())
                .ok_or(PerformError::MissingVariable(name))
        };
        let action: Action = get("action")?
            .parse()
            .map_err(PerformError::InvalidAction)?;
        let direction = || -> Result<Direction, PerformError> {
            get("direction")?
                .parse()
                .map_err(PerformError::InvalidDirection)
        };

        Ok(match action {
            Action::FocusWorkspace => Invocation::FocusWorkspace {
                workspace: get("workspace")?,
            },
            Action::MoveFocusedToWorkspace | Action::MoveFocusedToWorkspaceFollow => {
                Invocation::MoveFocused {
                    workspace: get("workspace")?,
                    follow: action == Action::MoveFocusedToWorkspaceFollow,
                }
            }
            Action::MoveWindowToWorkspace | Action::MoveWindowToWorkspaceFollow => {
                Invocation::MoveWindow {
                    window_id: get("window_id")?,
                    workspace: get("workspace")?,
                    follow: action == Action::MoveWindowToWorkspaceFollow,
                }
            }
            Action::FocusWindow => Invocation::FocusWindow {
                window_id: get("window_id")?,
            },
            Action::MoveFocusedDirection => Invocation::MoveFocusedDirection(direction()?),
            Action::SwapFocusedDirection => Invocation::SwapFocusedDirection(direction()?),
        })
    }
}

/// Carry out `invocation` on `wm`.
pub fn perform<W: WindowManager>(wm: &W, invocation: &Invocation) -> Result<(), PerformError> {
    info!("performing {:?}", invocation);
    let result = match invocation {
        Invocation::FocusWorkspace { workspace } => wm.focus_workspace(workspace),
        Invocation::MoveFocused { workspace, follow } => {
            wm.move_focused_to_workspace(workspace, *follow)
        }
        Invocation::MoveWindow {
            window_id,
            workspace,
            follow,
        } => wm.move_window_to_workspace(window_id, workspace, *follow),
        Invocation::FocusWindow { window_id } => wm.focus_window(window_id),
        Invocation::MoveFocusedDirection(direction) => wm.move_focused(*direction),
        Invocation::SwapFocusedDirection(direction) => wm.swap_focused(*direction),
    };
    result.map_err(|e| PerformError::WindowManager(e.to_string()))
}
