//! The orchestrator that ties queries, the window manager and the item
//! builders together.
//!
//! [`Dispatcher`] takes a parsed [`Query`], fetches whatever live state that
//! query needs from the [`WindowManager`], and renders exactly one
//! [`Feedback`] payload.  Fetch failures never escape: they become a single
//! non-actionable error item and a non-zero exit code.

use crate::builders::{
    action_list_items, arrange_items, hotkey_items, window_items, workspace_action_items,
    workspace_items, WorkspaceListing, WorkspaceMode,
};
use crate::command::{split_first_token, Query, WindowInfo, Workspace};
use crate::feedback::{Feedback, Item};
use crate::icon::{now_epoch, IconCache, IconResolver};
use crate::traits::{CommandRunner, WindowManager};
use log::{debug, error};
use std::collections::HashMap;

/// Title of the error item shown when workspaces or windows can't be read.
pub const WORKSPACE_QUERY_FAILED: &str = "AeroSpace workspace query failed";

/// Title of the error item shown when the binding table can't be read.
pub const BINDINGS_QUERY_FAILED: &str = "Failed to load AeroSpace keybindings";

/// Result of handling one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub feedback: Feedback,
    /// Process exit code: `0` on success, `1` when a fetch failed.
    pub exit_code: i32,
}

impl Outcome {
    fn ok(feedback: Feedback) -> Self {
        Self {
            feedback,
            exit_code: 0,
        }
    }

    fn failed(title: &str, detail: impl std::fmt::Display) -> Self {
        error!("{}: {}", title, detail);
        Self {
            feedback: Feedback::error(title, detail.to_string()),
            exit_code: 1,
        }
    }
}

/// Workspaces and windows as fetched at the start of a query.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    workspaces: Vec<Workspace>,
    windows: Vec<WindowInfo>,
}

impl Snapshot {
    /// Combine workspace names with the window list, counting windows per
    /// workspace.  Windows on workspaces not in `names` are kept but never
    /// listed.
    pub fn new(names: Vec<String>, windows: Vec<WindowInfo>) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for window in &windows {
            if !window.workspace.is_empty() {
                *counts.entry(window.workspace.as_str()).or_default() += 1;
            }
        }
        let workspaces = names
            .into_iter()
            .map(|name| {
                let window_count = counts.get(name.as_str()).copied().unwrap_or(0);
                Workspace { name, window_count }
            })
            .collect();
        Self {
            workspaces,
            windows,
        }
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    /// Whether `name` is exactly the name of a known workspace.
    pub fn contains(&self, name: &str) -> bool {
        self.workspaces.iter().any(|ws| ws.name == name)
    }

    /// Windows on workspace `name`, in fetch order.
    pub fn windows_in<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a WindowInfo> + 'a {
        self.windows.iter().filter(move |w| w.workspace == name)
    }
}

/// Routes queries to item builders.
///
/// Generic over the [`WindowManager`] and over the [`CommandRunner`] used
/// for icon lookups, so both can be replaced in tests.  `icons` is `None`
/// when icon lookups are disabled.
pub struct Dispatcher<W: WindowManager, R: CommandRunner> {
    wm: W,
    icons: Option<IconResolver<R>>,
    cache: IconCache,
}

impl<W: WindowManager, R: CommandRunner> Dispatcher<W, R> {
    /// Create a dispatcher.  `cache` is the icon cache loaded at startup.
    pub fn new(wm: W, icons: Option<IconResolver<R>>, cache: IconCache) -> Self {
        Self { wm, icons, cache }
    }

    /// The icon cache, including entries added while handling queries.
    pub fn icon_cache(&self) -> &IconCache {
        &self.cache
    }

    /// Handle one query and produce its payload.
    pub fn handle(&mut self, query: &Query) -> Outcome {
        debug!("handling {:?}", query);
        match query {
            Query::Hotkeys { filter } => match self.wm.bindings() {
                Ok(bindings) => Outcome::ok(Feedback::new(hotkey_items(&bindings, filter))),
                Err(e) => Outcome::failed(BINDINGS_QUERY_FAILED, e),
            },
            Query::Arrange => Outcome::ok(Feedback::new(arrange_items())),
            Query::Move { filter } => self.with_snapshot(|_, snapshot| {
                workspace_items(
                    snapshot.workspaces(),
                    filter,
                    &WorkspaceListing {
                        mode: WorkspaceMode::MoveFocused,
                        include_empty: true,
                        autocomplete: false,
                    },
                )
            }),
            Query::MoveWindow { window_id, filter } => self.with_snapshot(|_, snapshot| {
                workspace_items(
                    snapshot.workspaces(),
                    filter,
                    &WorkspaceListing {
                        mode: WorkspaceMode::MoveWindow {
                            window_id: window_id.clone(),
                        },
                        include_empty: true,
                        autocomplete: false,
                    },
                )
            }),
            Query::Actions { target, filter } => {
                self.with_snapshot(|_, snapshot| match target {
                    Some(ws) if snapshot.contains(ws) => workspace_action_items(ws),
                    _ => action_list_items(snapshot.workspaces(), filter),
                })
            }
            Query::Default { raw } => self.with_snapshot(|this, snapshot| this.browse(snapshot, raw)),
        }
    }

    fn snapshot(&self) -> Result<Snapshot, W::Error> {
        let names = self.wm.workspaces()?;
        let windows = self.wm.windows()?;
        Ok(Snapshot::new(names, windows))
    }

    /// Fetch workspaces and windows, then build items from them.  A failed
    /// fetch replaces the items with the workspace error entry.
    fn with_snapshot<F>(&mut self, render: F) -> Outcome
    where
        F: FnOnce(&mut Self, &Snapshot) -> Vec<Item>,
    {
        match self.snapshot() {
            Ok(snapshot) => Outcome::ok(Feedback::new(render(self, &snapshot))),
            Err(e) => Outcome::failed(WORKSPACE_QUERY_FAILED, e),
        }
    }

    /// A leading exact workspace name lists that workspace's windows;
    /// anything else filters the non-empty workspaces.
    fn browse(&mut self, snapshot: &Snapshot, raw: &str) -> Vec<Item> {
        match split_first_token(raw) {
            Some((token, remainder)) if snapshot.contains(token) => {
                self.window_list(snapshot, token, remainder)
            }
            _ => workspace_items(
                snapshot.workspaces(),
                raw,
                &WorkspaceListing {
                    mode: WorkspaceMode::Browse,
                    include_empty: false,
                    autocomplete: true,
                },
            ),
        }
    }

    fn window_list(
        &mut self,
        snapshot: &Snapshot,
        workspace: &str,
        filter: &str,
    ) -> Vec<Item> {
        let icons = &self.icons;
        let cache = &mut self.cache;
        let now = now_epoch();
        window_items(workspace, snapshot.windows_in(workspace), filter, |bundle_id| {
            icons
                .as_ref()
                .and_then(|resolver| resolver.resolve(bundle_id, cache, now))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Action, Direction, KeyBinding};
    use crate::icon::DEFAULT_TTL_SECS;
    use crate::test_utils::ScriptedRunner;
    use serde_json::json;
    use std::cell::Cell;

    //  Stub WindowManager

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct StubError(String);

    /// Serves fixed state and counts fetches.
    #[derive(Default)]
    struct StubWm {
        workspaces: Vec<String>,
        windows: Vec<WindowInfo>,
        bindings: Vec<KeyBinding>,
        fail_workspaces: bool,
        fail_bindings: bool,
        fetches: Cell<usize>,
    }

    impl WindowManager for StubWm {
        type Error = StubError;

        fn workspaces(&self) -> Result<Vec<String>, StubError> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail_workspaces {
                return Err(StubError("aerospace exited with exit status 1: not running".into()));
            }
            Ok(self.workspaces.clone())
        }

        fn windows(&self) -> Result<Vec<WindowInfo>, StubError> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(self.windows.clone())
        }

        fn bindings(&self) -> Result<Vec<KeyBinding>, StubError> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail_bindings {
                return Err(StubError("malformed output".into()));
            }
            Ok(self.bindings.clone())
        }

        fn focus_workspace(&self, _: &str) -> Result<(), StubError> {
            Ok(())
        }

        fn move_focused_to_workspace(&self, _: &str, _: bool) -> Result<(), StubError> {
            Ok(())
        }

        fn move_window_to_workspace(&self, _: &str, _: &str, _: bool) -> Result<(), StubError> {
            Ok(())
        }

        fn focus_window(&self, _: &str) -> Result<(), StubError> {
            Ok(())
        }

        fn move_focused(&self, _: Direction) -> Result<(), StubError> {
            Ok(())
        }

        fn swap_focused(&self, _: Direction) -> Result<(), StubError> {
            Ok(())
        }
    }

    fn win(id: u64, bundle: &str, app: &str, title: &str, ws: &str) -> WindowInfo {
        WindowInfo {
            id: Some(id),
            bundle_id: bundle.into(),
            app_name: app.into(),
            title: title.into(),
            workspace: ws.into(),
        }
    }

    fn stub() -> StubWm {
        StubWm {
            workspaces: vec!["1".into(), "2".into()],
            windows: vec![
                win(10, "com.apple.Safari", "Safari", "Apple", "1"),
                win(11, "com.apple.Terminal", "Terminal", "zsh", "1"),
            ],
            ..StubWm::default()
        }
    }

    fn run(wm: StubWm, query: &str) -> Outcome {
        let mut d: Dispatcher<StubWm, ScriptedRunner> = Dispatcher::new(wm, None, IconCache::new());
        d.handle(&Query::parse(query))
    }

    fn titles(outcome: &Outcome) -> Vec<&str> {
        outcome.feedback.items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn snapshot_counts_windows() {
        let s = Snapshot::new(
            vec!["1".into(), "2".into()],
            vec![
                win(1, "", "", "", "1"),
                win(2, "", "", "", "1"),
                win(3, "", "", "", "9"),
                win(4, "", "", "", ""),
            ],
        );
        let counts: Vec<_> = s.workspaces().iter().map(|w| w.window_count).collect();
        assert_eq!(counts, vec![2, 0]);
        assert!(s.contains("1"));
        assert!(!s.contains("9"));
        assert_eq!(s.windows_in("1").count(), 2);
    }

    #[test]
    fn empty_query_lists_non_empty_workspaces() {
        let out = run(stub(), "");
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.feedback.items.len(), 1);
        let item = &out.feedback.items[0];
        assert_eq!(item.title, "Workspace 1");
        assert_eq!(item.subtitle.as_deref(), Some("2 windows"));
        assert_eq!(item.autocomplete.as_deref(), Some("1 "));
    }

    #[test]
    fn move_window_query_carries_window_id() {
        let wm = StubWm {
            workspaces: vec!["1".into(), "2".into(), "10".into()],
            ..stub()
        };
        let out = run(wm, "move-window 42 1");
        assert_eq!(titles(&out), vec!["Workspace 1", "Workspace 10"]);
        for item in &out.feedback.items {
            let vars = item.variables.as_ref().unwrap();
            assert_eq!(vars.action, Action::MoveWindowToWorkspace);
            assert_eq!(vars.window_id.as_deref(), Some("42"));
        }
    }

    #[test]
    fn move_includes_empty_workspaces() {
        let out = run(stub(), "move");
        assert_eq!(titles(&out), vec!["Workspace 1", "Workspace 2"]);
        assert_eq!(out.feedback.items[1].subtitle.as_deref(), Some("empty"));
        assert!(out
            .feedback
            .items
            .iter()
            .all(|i| i.action() == Some(Action::MoveFocusedToWorkspace)));
    }

    #[test]
    fn arrange_needs_no_state() {
        let wm = StubWm {
            fail_workspaces: true,
            ..stub()
        };
        let mut d: Dispatcher<StubWm, ScriptedRunner> = Dispatcher::new(wm, None, IconCache::new());
        let out = d.handle(&Query::Arrange);
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.feedback.items.len(), 8);
        let moves = out
            .feedback
            .items
            .iter()
            .filter(|i| i.action() == Some(Action::MoveFocusedDirection))
            .count();
        assert_eq!(moves, 4);
        assert_eq!(d.wm.fetches.get(), 0);
    }

    #[test]
    fn workspace_fetch_failure_becomes_error_item() {
        let wm = StubWm {
            fail_workspaces: true,
            ..stub()
        };
        let out = run(wm, "");
        assert_eq!(out.exit_code, 1);
        assert_eq!(
            serde_json::to_value(&out.feedback).unwrap(),
            json!({"items": [{
                "title": "AeroSpace workspace query failed",
                "subtitle": "aerospace exited with exit status 1: not running",
                "valid": false
            }]})
        );
    }

    #[test]
    fn binding_fetch_failure_becomes_error_item() {
        let wm = StubWm {
            fail_bindings: true,
            ..stub()
        };
        let out = run(wm, "keys");
        assert_eq!(out.exit_code, 1);
        assert_eq!(titles(&out), vec![BINDINGS_QUERY_FAILED]);
        assert_eq!(out.feedback.items[0].valid, Some(false));
    }

    #[test]
    fn hotkeys_are_filtered_by_remainder() {
        let wm = StubWm {
            bindings: vec![
                KeyBinding {
                    hotkey: "alt-1".into(),
                    action: "workspace 1".into(),
                },
                KeyBinding {
                    hotkey: "alt-j".into(),
                    action: "focus down".into(),
                },
            ],
            ..stub()
        };
        let out = run(wm, "help focus");
        assert_eq!(out.exit_code, 0);
        assert_eq!(titles(&out), vec!["focus down"]);
    }

    #[test]
    fn action_with_known_workspace_shows_menu() {
        let out = run(stub(), "action 1");
        assert_eq!(
            titles(&out),
            vec![
                "Focus workspace 1",
                "Move focused window to 1",
                "Move focused window to 1 and follow",
                "List windows in workspace 1",
            ]
        );
    }

    #[test]
    fn action_without_exact_match_lists_drill_ins() {
        let out = run(stub(), "actions");
        assert_eq!(titles(&out), vec!["Workspace 1", "Workspace 2"]);
        assert!(out.feedback.items.iter().all(|i| i.valid == Some(false)));
        assert_eq!(
            out.feedback.items[1].autocomplete.as_deref(),
            Some("action 2 ")
        );
    }

    #[test]
    fn workspace_token_lists_its_windows() {
        let out = run(stub(), "1 term");
        assert_eq!(titles(&out), vec!["zsh"]);
        let vars = out.feedback.items[0].variables.as_ref().unwrap();
        assert_eq!(vars.action, Action::FocusWindow);
        assert_eq!(vars.workspace.as_deref(), Some("1"));
        assert_eq!(vars.window_id.as_deref(), Some("11"));
    }

    #[test]
    fn empty_workspace_token_lists_nothing() {
        let out = run(stub(), "2");
        assert_eq!(out.exit_code, 0);
        assert!(out.feedback.items.is_empty());
    }

    #[test]
    fn unknown_token_filters_workspaces() {
        let out = run(stub(), "nope");
        assert_eq!(out.exit_code, 0);
        assert!(out.feedback.items.is_empty());
    }

    #[test]
    fn flag_like_query_still_renders_one_payload() {
        let wm = stub();
        let mut d: Dispatcher<StubWm, ScriptedRunner> = Dispatcher::new(wm, None, IconCache::new());
        let out = d.handle(&Query::parse("--perform"));
        assert_eq!(out.exit_code, 0);
        assert_eq!(serde_json::to_value(&out.feedback).unwrap(), json!({"items": []}));
        // Workspaces and windows were fetched like any other browse query.
        assert_eq!(d.wm.fetches.get(), 2);
    }

    #[test]
    fn move_window_without_id_falls_back_to_browse() {
        let out = run(stub(), "move-window");
        assert_eq!(out.exit_code, 0);
        assert!(out.feedback.items.is_empty());
    }

    #[test]
    fn window_icons_resolved_once_per_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("Safari.app");
        std::fs::create_dir(&app).unwrap();
        let app = app.to_string_lossy().into_owned();

        let runner = ScriptedRunner::new()
            .stdout("mdfind", "kMDItemCFBundleIdentifier == 'com.apple.Safari'", &app)
            .fail("mdfind", "", 1, "no index")
            .fail("osascript", "", 1, "no app");
        let wm = StubWm {
            windows: vec![
                win(10, "com.apple.Safari", "Safari", "Apple", "1"),
                win(12, "com.apple.Safari", "Safari", "News", "1"),
                win(11, "com.apple.Terminal", "Terminal", "zsh", "1"),
            ],
            ..stub()
        };
        let mut d = Dispatcher::new(
            wm,
            Some(IconResolver::new(&runner, DEFAULT_TTL_SECS)),
            IconCache::new(),
        );
        let out = d.handle(&Query::parse("1"));

        let icons: Vec<_> = out
            .feedback
            .items
            .iter()
            .map(|i| i.icon.as_ref().map(|icon| icon.path.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(icons, vec![Some(app.clone()), Some(app), None]);
        assert_eq!(runner.count("mdfind"), 2);
        assert_eq!(runner.count("osascript"), 1);
        assert!(d.icon_cache().is_dirty());
        assert_eq!(d.icon_cache().len(), 2);
    }

    #[test]
    fn disabled_icons_leave_cache_untouched() {
        let mut d: Dispatcher<StubWm, ScriptedRunner> =
            Dispatcher::new(stub(), None, IconCache::new());
        let out = d.handle(&Query::parse("1"));
        assert_eq!(out.feedback.items.len(), 2);
        assert!(out.feedback.items.iter().all(|i| i.icon.is_none()));
        assert!(!d.icon_cache().is_dirty());
    }
}
