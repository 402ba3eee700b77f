mod event_loop_tests;
mod watcher_tests;

use std::path::Path;

use crate::state::AppState;

/// App state over a config file in `dir` with the given lines
pub(crate) fn state_with_config(dir: &Path, contents: &str) -> AppState {
    let path = dir.join("config.ini");
    std::fs::write(&path, contents).unwrap();
    AppState::load(path)
}
