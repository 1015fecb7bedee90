//! Queries and types used throughout aerospace-alfred.
//!
//! This module defines the vocabulary that all components share:
//! [`Query`] describes every command the script filter understands,
//! [`Action`] and [`Direction`] describe what a selected item does, and
//! [`WindowInfo`] / [`KeyBinding`] / [`Workspace`] carry the state fetched
//! from the window manager.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Direction for layout moves and swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// All directions, in the order they are offered to the user.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = UnknownName;

    /// Parse a direction string (case-insensitive, surrounding whitespace
    /// ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(UnknownName(s.to_string())),
        }
    }
}

/// Every action a launcher item can carry in its `action` variable.
///
/// The serialized names are the contract with the workflow's run script
/// (see [`perform`](crate::perform)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Switch to a workspace.
    FocusWorkspace,
    /// Move the focused window to a workspace, staying where we are.
    MoveFocusedToWorkspace,
    /// Move the focused window to a workspace and switch there with it.
    MoveFocusedToWorkspaceFollow,
    /// Move a specific window (by id) to a workspace.
    MoveWindowToWorkspace,
    /// Move a specific window to a workspace and follow it.
    MoveWindowToWorkspaceFollow,
    /// Focus a specific window.
    FocusWindow,
    /// Move the focused window within the layout.
    MoveFocusedDirection,
    /// Swap the focused window with its neighbour.
    SwapFocusedDirection,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::FocusWorkspace => "focus-workspace",
            Action::MoveFocusedToWorkspace => "move-focused-to-workspace",
            Action::MoveFocusedToWorkspaceFollow => "move-focused-to-workspace-follow",
            Action::MoveWindowToWorkspace => "move-window-to-workspace",
            Action::MoveWindowToWorkspaceFollow => "move-window-to-workspace-follow",
            Action::FocusWindow => "focus-window",
            Action::MoveFocusedDirection => "move-focused-direction",
            Action::SwapFocusedDirection => "swap-focused-direction",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "focus-workspace" => Ok(Action::FocusWorkspace),
            "move-focused-to-workspace" => Ok(Action::MoveFocusedToWorkspace),
            "move-focused-to-workspace-follow" => Ok(Action::MoveFocusedToWorkspaceFollow),
            "move-window-to-workspace" => Ok(Action::MoveWindowToWorkspace),
            "move-window-to-workspace-follow" => Ok(Action::MoveWindowToWorkspaceFollow),
            "focus-window" => Ok(Action::FocusWindow),
            "move-focused-direction" => Ok(Action::MoveFocusedDirection),
            "swap-focused-direction" => Ok(Action::SwapFocusedDirection),
            _ => Err(UnknownName(s.to_string())),
        }
    }
}

/// A string that names no known [`Action`] or [`Direction`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name: {0:?}")]
pub struct UnknownName(pub String);

/// One window as reported by `aerospace list-windows`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowInfo {
    /// Window id, `None` when the column was empty or not a number.
    pub id: Option<u64>,
    pub bundle_id: String,
    pub app_name: String,
    pub title: String,
    /// Name of the workspace the window lives on.
    pub workspace: String,
}

/// One entry of the main-mode binding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    /// Key combination, e.g. `"alt-shift-1"`.
    pub hotkey: String,
    /// Human-readable description of what the key does.
    pub action: String,
}

/// A workspace and how many windows it currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub name: String,
    pub window_count: usize,
}

/// Tokens that open the key-binding cheat sheet.
const HOTKEY_TOKENS: [&str; 6] = ["command", "commands", "hotkey", "hotkeys", "keys", "help"];

/// Every command the script filter understands.
///
/// Produced by [`Query::parse`] from the raw text the user typed and
/// consumed by the [`Dispatcher`](crate::dispatch::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Show the key-binding table, filtered by `filter`.
    Hotkeys { filter: String },

    /// Pick a workspace to move the focused window to.
    Move { filter: String },

    /// Pick a workspace to move window `window_id` to.
    MoveWindow { window_id: String, filter: String },

    /// Show the action menu of `target` if it names a workspace exactly,
    /// otherwise a list of workspaces to drill into.
    Actions {
        target: Option<String>,
        filter: String,
    },

    /// Show the layout move / swap menu.
    Arrange,

    /// Either the windows of the workspace named by the first token, or
    /// the workspace list filtered by the whole query.  Which one depends
    /// on live state, so it is resolved by the dispatcher.
    Default { raw: String },
}

impl Query {
    /// Parse the raw query.
    ///
    /// Routing only looks at the first whitespace-delimited token; the
    /// remainder (trimmed) becomes the filter.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let Some((token, remainder)) = split_first_token(raw) else {
            return Query::Default { raw: String::new() };
        };

        match token {
            t if HOTKEY_TOKENS.contains(&t) => Query::Hotkeys {
                filter: remainder.to_string(),
            },
            "move" => Query::Move {
                filter: remainder.to_string(),
            },
            "move-window" => match split_first_token(remainder) {
                Some((window_id, filter)) => Query::MoveWindow {
                    window_id: window_id.to_string(),
                    filter: filter.to_string(),
                },
                None => Query::Default {
                    raw: raw.to_string(),
                },
            },
            "action" | "actions" => Query::Actions {
                target: split_first_token(remainder).map(|(t, _)| t.to_string()),
                filter: remainder.to_string(),
            },
            "arrange" => Query::Arrange,
            _ => Query::Default {
                raw: raw.to_string(),
            },
        }
    }
}

/// Split off the first whitespace-delimited token.
///
/// Returns `None` for an empty (or all-whitespace) string.  The remainder
/// has surrounding whitespace removed.
pub fn split_first_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], s[end..].trim())),
        None => Some((s, "")),
    }
}
