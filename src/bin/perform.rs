//! Run action for the workflow: carries out the item the user selected.
//!
//! Alfred exports the selected item's variables (`action`, `workspace`,
//! `window_id`, `direction`) into the environment.  This binary reads them
//! and issues one `aerospace` command.  Exits `1` on a missing or invalid
//! variable or a failed command.
//!
//! Run with:
//!     action=focus-workspace workspace=1 aerospace-alfred-perform

use aerospace_alfred::aerospace::cli::AerospaceCli;
use aerospace_alfred::config::Config;
use aerospace_alfred::perform::{perform, Invocation};
use aerospace_alfred::process::SystemRunner;
use log::error;

fn main() {
    env_logger::init();

    let config = Config::load_or_default();
    let wm = AerospaceCli::new(SystemRunner::new(), config.aerospace.binary.as_str());
    let result = Invocation::from_vars(|name| std::env::var(name).ok())
        .and_then(|invocation| perform(&wm, &invocation));
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
