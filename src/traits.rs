//! Core traits that decouple aerospace-alfred from the processes it talks
//! to.
//!
//! The [`Dispatcher`](crate::dispatch::Dispatcher) and the
//! [`IconResolver`](crate::icon::IconResolver) only depend on these
//! abstractions, so tests can replace AeroSpace, `mdfind` and `osascript`
//! with in-memory doubles.

use crate::command::{Direction, KeyBinding, WindowInfo};
use crate::process::CommandError;

/// Runs an external program and returns its standard output.
///
/// Implementations must fail with [`CommandError`] when the program cannot
/// be started or exits unsuccessfully.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        (**self).run(program, args)
    }
}

/// Abstraction over a window manager that can report its state and carry
/// out the actions offered to the user.
///
/// The concrete implementation shells out to the AeroSpace CLI; tests use a
/// stub that serves fixed data.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Names of all workspaces, in the window manager's order.
    fn workspaces(&self) -> Result<Vec<String>, Self::Error>;

    /// Every window on every workspace.
    fn windows(&self) -> Result<Vec<WindowInfo>, Self::Error>;

    /// The main-mode key-binding table, in configuration order.
    fn bindings(&self) -> Result<Vec<KeyBinding>, Self::Error>;

    /// Switch to `workspace`.
    fn focus_workspace(&self, workspace: &str) -> Result<(), Self::Error>;

    /// Move the focused window to `workspace`.  With `follow`, focus moves
    /// along with the window.
    fn move_focused_to_workspace(&self, workspace: &str, follow: bool)
        -> Result<(), Self::Error>;

    /// Move window `window_id` to `workspace`, optionally following it.
    fn move_window_to_workspace(
        &self,
        window_id: &str,
        workspace: &str,
        follow: bool,
    ) -> Result<(), Self::Error>;

    /// Focus window `window_id`.
    fn focus_window(&self, window_id: &str) -> Result<(), Self::Error>;

    /// Move the focused window one step within the layout.
    fn move_focused(&self, direction: Direction) -> Result<(), Self::Error>;

    /// Swap the focused window with its neighbour in `direction`.
    fn swap_focused(&self, direction: Direction) -> Result<(), Self::Error>;
}
