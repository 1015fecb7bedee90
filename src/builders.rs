//! Pure functions that turn fetched state into launcher [`Item`]s.
//!
//! Nothing here talks to the outside world; icon lookups are injected as a
//! closure so the window list can be built and tested without `mdfind`.
//!
//! All filters are case-insensitive substring matches, an empty filter
//! matches everything, and items keep the order of their input.

use crate::command::{Action, Direction, KeyBinding, WindowInfo, Workspace};
use crate::feedback::{Icon, Item, Modifier, Mods, Text, Variables};
use std::path::PathBuf;

/// Case-insensitive substring match; an empty query matches everything.
pub fn matches(query: &str, haystack: &str) -> bool {
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

/// What selecting a workspace item does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceMode {
    /// Switch to the workspace.  ⌘ moves the focused window there, ⌥ moves
    /// it and follows.
    Browse,
    /// Move the focused window there.  ⌥ follows.
    MoveFocused,
    /// Move the given window there.  ⌥ follows.
    MoveWindow { window_id: String },
}

/// How a workspace list is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceListing {
    pub mode: WorkspaceMode,
    /// Also list workspaces without windows.
    pub include_empty: bool,
    /// Set `autocomplete` to `"<name> "` so Tab drills into the windows.
    pub autocomplete: bool,
}

fn window_count_label(count: usize) -> String {
    match count {
        0 => "empty".to_string(),
        1 => "1 window".to_string(),
        n => format!("{} windows", n),
    }
}

fn follow_focused(name: &str) -> Modifier {
    Modifier {
        subtitle: format!("Move focused window to workspace {} and follow", name),
        arg: name.to_string(),
        variables: Variables::new(Action::MoveFocusedToWorkspaceFollow).workspace(name),
    }
}

/// One item per matching workspace.
pub fn workspace_items(workspaces: &[Workspace], query: &str, listing: &WorkspaceListing) -> Vec<Item> {
    workspaces
        .iter()
        .filter(|ws| matches(query, &ws.name))
        .filter(|ws| listing.include_empty || ws.window_count > 0)
        .map(|ws| {
            let name = ws.name.as_str();
            let (variables, mods) = match &listing.mode {
                WorkspaceMode::Browse => (
                    Variables::new(Action::FocusWorkspace).workspace(name),
                    Mods {
                        cmd: Some(Modifier {
                            subtitle: format!("Move focused window to workspace {}", name),
                            arg: name.to_string(),
                            variables: Variables::new(Action::MoveFocusedToWorkspace)
                                .workspace(name),
                        }),
                        alt: Some(follow_focused(name)),
                    },
                ),
                WorkspaceMode::MoveFocused => (
                    Variables::new(Action::MoveFocusedToWorkspace).workspace(name),
                    Mods {
                        cmd: None,
                        alt: Some(follow_focused(name)),
                    },
                ),
                WorkspaceMode::MoveWindow { window_id } => (
                    Variables::new(Action::MoveWindowToWorkspace)
                        .workspace(name)
                        .window_id(window_id.as_str()),
                    Mods {
                        cmd: None,
                        alt: Some(Modifier {
                            subtitle: format!("Move window to workspace {} and follow", name),
                            arg: name.to_string(),
                            variables: Variables::new(Action::MoveWindowToWorkspaceFollow)
                                .workspace(name)
                                .window_id(window_id.as_str()),
                        }),
                    },
                ),
            };

            let item = Item::new(format!("Workspace {}", name))
                .subtitle(window_count_label(ws.window_count))
                .arg(name)
                .uid(format!("workspace-{}", name))
                .variables(variables)
                .mods(mods);
            if listing.autocomplete {
                item.autocomplete(format!("{} ", name))
            } else {
                item
            }
        })
        .collect()
}

/// Workspace list used by `action` when no workspace was named exactly:
/// each entry drills into that workspace's action menu instead of acting.
pub fn action_list_items(workspaces: &[Workspace], query: &str) -> Vec<Item> {
    let listing = WorkspaceListing {
        mode: WorkspaceMode::Browse,
        include_empty: true,
        autocomplete: false,
    };
    workspace_items(workspaces, query, &listing)
        .into_iter()
        .map(|item| {
            let name = item.arg.clone().unwrap_or_default();
            item.subtitle("Actions for this workspace")
                .autocomplete(format!("action {} ", name))
                .valid(false)
        })
        .collect()
}

/// One item per matching window of `workspace`.
///
/// `icon_for` maps a bundle id to the application path used as the icon.
pub fn window_items<'a, I, F>(workspace: &str, windows: I, query: &str, mut icon_for: F) -> Vec<Item>
where
    I: IntoIterator<Item = &'a WindowInfo>,
    F: FnMut(&str) -> Option<PathBuf>,
{
    let mut items = Vec::new();
    for window in windows {
        let app_name = if window.app_name.is_empty() {
            "Unknown App"
        } else {
            window.app_name.as_str()
        };
        if !matches(query, &format!("{} {}", app_name, window.title)) {
            continue;
        }

        let has_title = !window.title.is_empty();
        let title = if has_title { window.title.as_str() } else { app_name };
        let mut subtitle = (if has_title { app_name } else { "Window" }).to_string();
        let id = window.id.map(|id| id.to_string());
        if let Some(id) = &id {
            subtitle.push_str(&format!(" - ID {}", id));
        }

        let id_or_empty = id.clone().unwrap_or_default();
        let mut item = Item::new(title)
            .subtitle(subtitle)
            .arg(id_or_empty.as_str())
            .variables(
                Variables::new(Action::FocusWindow)
                    .workspace(workspace)
                    .window_id(id_or_empty),
            );
        if let Some(id) = &id {
            item = item
                .autocomplete(format!("move-window {} ", id))
                .uid(format!("window-{}", id));
        }
        item.icon = icon_for(&window.bundle_id).map(Icon::file_icon);
        items.push(item);
    }
    items
}

/// The fixed action menu for one workspace.
pub fn workspace_action_items(workspace: &str) -> Vec<Item> {
    vec![
        Item::new(format!("Focus workspace {}", workspace))
            .subtitle("Switch to this workspace")
            .arg(workspace)
            .variables(Variables::new(Action::FocusWorkspace).workspace(workspace)),
        Item::new(format!("Move focused window to {}", workspace))
            .subtitle("Move focused window only")
            .arg(workspace)
            .variables(Variables::new(Action::MoveFocusedToWorkspace).workspace(workspace)),
        Item::new(format!("Move focused window to {} and follow", workspace))
            .subtitle("Move window and switch to destination")
            .arg(workspace)
            .variables(Variables::new(Action::MoveFocusedToWorkspaceFollow).workspace(workspace)),
        Item::new(format!("List windows in workspace {}", workspace))
            .subtitle("Drill into workspace windows")
            .autocomplete(format!("{} ", workspace))
            .valid(false),
    ]
}

/// Move and swap the focused window in each direction.
pub fn arrange_items() -> Vec<Item> {
    let moves = Direction::ALL.into_iter().map(|dir| {
        Item::new(format!("Move focused window {}", dir))
            .subtitle("Reorder window within layout")
            .arg(dir.to_string())
            .variables(Variables::new(Action::MoveFocusedDirection).direction(dir))
    });
    let swaps = Direction::ALL.into_iter().map(|dir| {
        Item::new(format!("Swap focused window {}", dir))
            .subtitle("Swap with adjacent window")
            .arg(dir.to_string())
            .variables(Variables::new(Action::SwapFocusedDirection).direction(dir))
    });
    moves.chain(swaps).collect()
}

/// One item per matching key binding; copying yields the hotkey.
pub fn hotkey_items(bindings: &[KeyBinding], query: &str) -> Vec<Item> {
    bindings
        .iter()
        .filter(|b| matches(query, &format!("{} {}", b.action, b.hotkey)))
        .map(|b| Item {
            text: Some(Text {
                copy: b.hotkey.clone(),
                largetype: b.hotkey.clone(),
            }),
            ..Item::new(b.action.as_str())
                .subtitle(b.hotkey.as_str())
                .arg(b.hotkey.as_str())
        })
        .collect()
}
