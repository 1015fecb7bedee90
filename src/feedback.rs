//! Alfred script-filter payload.
//!
//! Every invocation prints exactly one [`Feedback`] object.  Optional fields
//! are omitted from the JSON when unset, so an item only carries the keys
//! it actually uses.

use crate::command::{Action, Direction};
use serde::Serialize;
use std::path::PathBuf;

/// Top-level payload: `{"items": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Feedback {
    pub items: Vec<Item>,
}

impl Feedback {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// A payload holding a single non-actionable error entry.
    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(vec![Item::new(title).subtitle(detail).valid(false)])
    }
}

/// One row in Alfred's result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Item {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Variables>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mods: Option<Mods>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Text>,
}

impl Item {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn autocomplete(mut self, autocomplete: impl Into<String>) -> Self {
        self.autocomplete = Some(autocomplete.into());
        self
    }

    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn mods(mut self, mods: Mods) -> Self {
        self.mods = Some(mods);
        self
    }

    pub fn valid(mut self, valid: bool) -> Self {
        self.valid = Some(valid);
        self
    }

    /// The `action` variable, if this item carries one.
    #[cfg(test)]
    pub(crate) fn action(&self) -> Option<Action> {
        self.variables.as_ref().map(|v| v.action)
    }
}

/// Variables Alfred passes on to the workflow's run action.
///
/// `action` is always present; the rest depend on the action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variables {
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl Variables {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            workspace: None,
            window_id: None,
            direction: None,
        }
    }

    pub fn workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    pub fn window_id(mut self, window_id: impl Into<String>) -> Self {
        self.window_id = Some(window_id.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Alternate actions shown while a modifier key is held.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mods {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Modifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<Modifier>,
}

/// The variant of an item selected with a modifier key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Modifier {
    pub subtitle: String,
    pub arg: String,
    pub variables: Variables,
}

/// Icon reference; `fileicon` makes Alfred use the icon of the file at
/// `path`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Icon {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: PathBuf,
}

impl Icon {
    pub fn file_icon(path: PathBuf) -> Self {
        Self {
            kind: "fileicon".into(),
            path,
        }
    }
}

/// Text used for Copy (⌘C) and Large Type (⌘L).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub copy: String,
    pub largetype: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_payload_shape() {
        let fb = Feedback::error("AeroSpace workspace query failed", "boom");
        assert_eq!(
            serde_json::to_value(&fb).unwrap(),
            json!({"items": [{
                "title": "AeroSpace workspace query failed",
                "subtitle": "boom",
                "valid": false
            }]})
        );
    }

    #[test]
    fn empty_feedback_still_has_items() {
        assert_eq!(
            serde_json::to_string(&Feedback::default()).unwrap(),
            r#"{"items":[]}"#
        );
    }

    #[test]
    fn full_item_shape() {
        let item = Item {
            icon: Some(Icon::file_icon(PathBuf::from("/Applications/Safari.app"))),
            text: Some(Text {
                copy: "alt-1".into(),
                largetype: "alt-1".into(),
            }),
            ..Item::new("t")
                .subtitle("s")
                .arg("a")
                .uid("u")
                .autocomplete("ac ")
                .variables(Variables::new(Action::FocusWindow).workspace("1").window_id("7"))
                .mods(Mods {
                    cmd: None,
                    alt: Some(Modifier {
                        subtitle: "m".into(),
                        arg: "a".into(),
                        variables: Variables::new(Action::SwapFocusedDirection)
                            .direction(Direction::Up),
                    }),
                })
                .valid(true)
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({
                "title": "t",
                "subtitle": "s",
                "arg": "a",
                "uid": "u",
                "autocomplete": "ac ",
                "variables": {"action": "focus-window", "workspace": "1", "window_id": "7"},
                "mods": {"alt": {
                    "subtitle": "m",
                    "arg": "a",
                    "variables": {"action": "swap-focused-direction", "direction": "up"}
                }},
                "icon": {"type": "fileicon", "path": "/Applications/Safari.app"},
                "valid": true,
                "text": {"copy": "alt-1", "largetype": "alt-1"}
            })
        );
    }
}
