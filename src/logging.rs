// src/logging.rs
// Logger setup. The per-file / per-link trace goes through `log`; the final
// report is printed by main.rs regardless of the level chosen here.

use log::LevelFilter;

/// Picks the level from the -v / -q flags. `RUST_LOG` can still refine it.
pub fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

pub fn init_logger(verbose: bool, quiet: bool) {
    let level = level_for(verbose, quiet);

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    log::debug!("Logger initialized with level: {level:?}");
}
