//! [`WindowManager`] implementation backed by the `aerospace` CLI.
//!
//! Every method spawns one short-lived `aerospace` process through a
//! [`CommandRunner`] and parses what it prints.  Two output formats are
//! involved: JSON (workspaces, key bindings) and tab-delimited columns
//! (windows).

use crate::command::{Direction, KeyBinding, WindowInfo};
use crate::process::CommandError;
use crate::traits::{CommandRunner, WindowManager};
use serde::Deserialize;
use serde_json::Value;

/// Column layout requested from `aerospace list-windows`.
pub const WINDOW_FORMAT: &str =
    "%{window-id}\t%{app-bundle-id}\t%{app-name}\t%{window-title}\t%{workspace}";

/// Number of columns in [`WINDOW_FORMAT`].
const WINDOW_COLUMNS: usize = 5;

/// Errors that can occur when querying AeroSpace.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The `aerospace` process failed.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// The process succeeded but printed something that is not the
    /// expected JSON.
    #[error("malformed output: {0}")]
    MalformedOutput(#[from] serde_json::Error),
}

/// AeroSpace-backed window manager.
pub struct AerospaceCli<R> {
    runner: R,
    binary: String,
}

impl<R: CommandRunner> AerospaceCli<R> {
    /// Create a client that invokes `binary` (usually just `"aerospace"`)
    /// through `runner`.
    pub fn new(runner: R, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, FetchError> {
        Ok(self.runner.run(&self.binary, args)?)
    }

    fn dispatch(&self, args: &[&str]) -> Result<(), FetchError> {
        self.run(args).map(|_| ())
    }
}

//  Output parsers

/// Subset of one entry printed by `list-workspaces --json`.
#[derive(Deserialize)]
struct WorkspaceJson {
    #[serde(default)]
    workspace: Option<String>,
}

/// Parse `list-workspaces --json` output, dropping entries without a name.
pub fn parse_workspaces(json: &str) -> Result<Vec<String>, serde_json::Error> {
    let entries: Vec<WorkspaceJson> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .filter_map(|e| e.workspace)
        .filter(|name| !name.is_empty())
        .collect())
}

/// Parse `list-windows --format` output produced with [`WINDOW_FORMAT`].
///
/// Blank lines are skipped.  The last column keeps any extra tabs, and
/// missing trailing columns read as empty strings.  A window id that is
/// empty or not a number becomes `None`.
pub fn parse_windows(output: &str) -> Vec<WindowInfo> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut cols = line.splitn(WINDOW_COLUMNS, '\t');
            let mut next = || cols.next().unwrap_or_default().to_string();
            let id = next();
            WindowInfo {
                id: id.trim().parse().ok(),
                bundle_id: next(),
                app_name: next(),
                title: next(),
                workspace: next(),
            }
        })
        .collect()
}

/// Parse `config --get mode.main.binding --json` output.
///
/// Keys keep the order they appear in.  A binding bound to several
/// commands is shown with the commands joined by `"; "`.
pub fn parse_bindings(json: &str) -> Result<Vec<KeyBinding>, serde_json::Error> {
    let table: serde_json::Map<String, Value> = serde_json::from_str(json)?;
    Ok(table
        .into_iter()
        .map(|(hotkey, action)| KeyBinding {
            hotkey,
            action: describe_binding(&action),
        })
        .collect())
}

fn describe_binding(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .map(describe_binding)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

//  WindowManager implementation

impl<R: CommandRunner> WindowManager for AerospaceCli<R> {
    type Error = FetchError;

    fn workspaces(&self) -> Result<Vec<String>, Self::Error> {
        let json = self.run(&["list-workspaces", "--all", "--json"])?;
        Ok(parse_workspaces(&json)?)
    }

    fn windows(&self) -> Result<Vec<WindowInfo>, Self::Error> {
        let out = self.run(&["list-windows", "--all", "--format", WINDOW_FORMAT])?;
        Ok(parse_windows(&out))
    }

    fn bindings(&self) -> Result<Vec<KeyBinding>, Self::Error> {
        let json = self.run(&["config", "--get", "mode.main.binding", "--json"])?;
        Ok(parse_bindings(&json)?)
    }

    fn focus_workspace(&self, workspace: &str) -> Result<(), Self::Error> {
        self.dispatch(&["workspace", workspace])
    }

    fn move_focused_to_workspace(
        &self,
        workspace: &str,
        follow: bool,
    ) -> Result<(), Self::Error> {
        if follow {
            self.dispatch(&["move-node-to-workspace", "--focus-follows-window", workspace])
        } else {
            self.dispatch(&["move-node-to-workspace", workspace])
        }
    }

    fn move_window_to_workspace(
        &self,
        window_id: &str,
        workspace: &str,
        follow: bool,
    ) -> Result<(), Self::Error> {
        let mut args = vec!["move-node-to-workspace", "--window-id", window_id];
        if follow {
            args.push("--focus-follows-window");
        }
        args.push(workspace);
        self.dispatch(&args)
    }

    fn focus_window(&self, window_id: &str) -> Result<(), Self::Error> {
        self.dispatch(&["focus", "--window-id", window_id])
    }

    fn move_focused(&self, direction: Direction) -> Result<(), Self::Error> {
        self.dispatch(&["move", &direction.to_string()])
    }

    fn swap_focused(&self, direction: Direction) -> Result<(), Self::Error> {
        self.dispatch(&["swap", &direction.to_string()])
    }
}
