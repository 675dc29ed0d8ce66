//! Build metadata, stamped in at compile time by the release pipeline.

use tracing::info;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const COMMIT: &str = match option_env!("GAMESERVER_COMMIT") {
    Some(commit) => commit,
    None => "none",
};

pub const BUILD_DATE: &str = match option_env!("GAMESERVER_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

pub const BUILT_BY: &str = match option_env!("GAMESERVER_BUILT_BY") {
    Some(built_by) => built_by,
    None => "local",
};

pub fn log_build_info() {
    info!(
        version = VERSION,
        commit = COMMIT,
        date = BUILD_DATE,
        built_by = BUILT_BY,
        "Starting GameServer Controller"
    );
}
