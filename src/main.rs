//! Entry point for **aerospace-alfred**, the script filter.
//!
//! Every argument is part of the user's query: the words are joined with
//! spaces and parsed as one query, so nothing the user types can switch
//! modes.  Prints exactly one JSON payload on stdout and exits with `1` if
//! AeroSpace could not be queried.  Selected items are carried out by the
//! separate `aerospace-alfred-perform` binary.
//!
//! Logs go to stderr (`RUST_LOG=debug` for details), which Alfred shows in
//! its workflow debugger.

use aerospace_alfred::aerospace::cli::AerospaceCli;
use aerospace_alfred::command::Query;
use aerospace_alfred::config::Config;
use aerospace_alfred::dispatch::{Dispatcher, Outcome};
use aerospace_alfred::feedback::Feedback;
use aerospace_alfred::icon::{cache_path, IconCache, IconResolver};
use aerospace_alfred::process::SystemRunner;
use log::{error, warn};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::load_or_default();
    std::process::exit(run_filter(&config, &args.join(" ")));
}

fn run_filter(config: &Config, raw_query: &str) -> i32 {
    let query = Query::parse(raw_query);
    let wm = AerospaceCli::new(SystemRunner::new(), config.aerospace.binary.as_str());

    let icons = &config.icons;
    let cache_file = if icons.enabled {
        cache_path(icons.cache_dir.as_deref())
    } else {
        None
    };
    if icons.enabled && cache_file.is_none() {
        warn!("no home directory, icon lookups will not be cached");
    }
    let resolver = icons
        .enabled
        .then(|| IconResolver::new(SystemRunner::new(), icons.ttl_secs));
    let cache = cache_file
        .as_deref()
        .map(IconCache::load)
        .unwrap_or_default();

    let mut dispatcher = Dispatcher::new(wm, resolver, cache);
    let Outcome { feedback, exit_code } = dispatcher.handle(&query);

    print_feedback(&feedback);
    if let Some(path) = &cache_file {
        dispatcher.icon_cache().save_if_dirty(path);
    }
    exit_code
}

/// Write the payload to stdout.  Serializing plain strings can't fail, but
/// if it ever does the user still gets one valid payload.
fn print_feedback(feedback: &Feedback) {
    match serde_json::to_string(feedback) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("failed to serialize feedback: {}", e);
            println!(r#"{{"items":[]}}"#);
        }
    }
}
