//! Diagnostic logging for the simulation.
//!
//! This is not to be confused with _reporting_: reports record model output as CSV, logging
//! describes what the simulation is doing while it runs. The module re-exports the five logging
//! macros `error!`, `warn!`, `info!`, `debug!` and `trace!`, where `error!` has the highest
//! priority and `trace!` the lowest.
//!
//! Logging is _disabled_ by default. The command line option `--log-level` turns it on, and so
//! do the functions below:
//!
//!  - `enable_logging()`: turns on all log messages
//!  - `disable_logging()`: turns off all log messages
//!  - `set_log_level(level: LevelFilter)`: enables only log messages with priority at least `level`
//!
//! Messages can also be filtered per module with `set_module_filter()`, `set_module_filters()`
//! and `remove_module_filter()`:
//!
//! ```rust
//! use contagion::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! // Saturation changes are logged at `info`.
//! set_log_level(LevelFilter::Info);
//! // Every tick is logged at `trace`.
//! set_module_filter("contagion::simulation", LevelFilter::Trace);
//! ```
//!
//! The same configuration can be given as a single string, the format `--log-level` accepts:
//!
//! ```rust
//! contagion::log::set_log_levels("info,contagion::simulation=trace").unwrap();
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(all(feature = "logging", feature = "progress_bar"))]
mod progress_bar_encoder;

#[cfg(not(feature = "logging"))]
mod null_logger;

pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::SimulationError;
#[cfg(feature = "logging")]
use log4rs::Handle;
use std::sync::LazyLock;
use std::sync::{Mutex, MutexGuard};

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// A level filter for every message whose target starts with `module`
/// (e.g. `"contagion::contact"`).
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    module: String,
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Global level, per-module levels and the handle to the installed logger.
///
/// Loggers are installed process-wide, so only the instance behind `LOG_CONFIGURATION` exists.
/// The public API is a set of free functions that lock it.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// Applies to targets without a module filter. `LevelFilter::Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_configurations: HashMap<String, ModuleLogConfiguration>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations: HashMap::new(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    pub(in crate::log) fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.to_string()) {
            Entry::Occupied(mut entry) => {
                let module_config = entry.get_mut();
                if module_config.level == level {
                    return false;
                }
                module_config.level = level;
            }
            Entry::Vacant(entry) => {
                entry.insert((module, level).into());
            }
        }
        true
    }

    pub(in crate::log) fn set_module_filters<S: AsRef<str>>(
        &mut self,
        module_filters: &[(S, LevelFilter)],
    ) {
        let mut mutated = false;
        for (module, level) in module_filters {
            mutated |= self.insert_module_filter(module.as_ref(), *level);
        }
        if mutated {
            self.set_config();
        }
    }

    pub(in crate::log) fn remove_module_filter(&mut self, module: &str) {
        if self.module_configurations.remove(module).is_some() {
            self.set_config();
        }
    }
}

/// A parsed `--log-level` value: an optional global level and any number of module filters.
#[derive(Debug, Default, PartialEq)]
pub struct LogLevels {
    pub global: Option<LevelFilter>,
    pub modules: Vec<(String, LevelFilter)>,
}

/// Parses a comma separated list of `level` and `module=level` entries, e.g.
/// `"info,contagion::contact=trace"`. Level names are case insensitive.
///
/// # Errors
///
/// Returns `SimulationError::InvalidParameters` for unknown level names, empty module paths or
/// more than one global level.
pub fn parse_log_levels(directives: &str) -> Result<LogLevels, SimulationError> {
    fn parse_level(level: &str) -> Result<LevelFilter, SimulationError> {
        LevelFilter::from_str(level.trim()).map_err(|_| {
            SimulationError::InvalidParameters(format!("unknown log level '{}'", level.trim()))
        })
    }

    let mut levels = LogLevels::default();
    for entry in directives.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        if let Some((module, level)) = entry.split_once('=') {
            let module = module.trim();
            if module.is_empty() {
                return Err(SimulationError::InvalidParameters(format!(
                    "missing module path in log filter '{entry}'"
                )));
            }
            levels.modules.push((module.to_string(), parse_level(level)?));
        } else if levels.global.replace(parse_level(entry)?).is_some() {
            return Err(SimulationError::InvalidParameters(format!(
                "more than one global log level in '{directives}'"
            )));
        }
    }
    Ok(levels)
}

// The public API

/// Enables the logger with no global level filter / full logging. Equivalent to
/// `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. A global filter level of `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    get_log_configuration().set_log_level(level);
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level_filter: LevelFilter) {
    get_log_configuration().set_module_filters(&[(module_path, level_filter)]);
}

/// Removes a module-specific level filter for the given module path. The global level filter will
/// apply to the module.
pub fn remove_module_filter(module_path: &str) {
    get_log_configuration().remove_module_filter(module_path);
}

/// Sets the level filters for a set of modules in bulk.
pub fn set_module_filters<S: AsRef<str>>(module_filters: &[(S, LevelFilter)]) {
    get_log_configuration().set_module_filters(module_filters);
}

/// Parses `directives` with [`parse_log_levels`] and applies it. Without a global entry the global
/// level becomes `info` when module filters are given, so `contagion::contact=trace` alone
/// still produces output.
///
/// # Errors
///
/// Returns the parse error; the configuration is left unchanged in that case.
pub fn set_log_levels(directives: &str) -> Result<(), SimulationError> {
    let levels = parse_log_levels(directives)?;
    let mut log_configuration = get_log_configuration();
    log_configuration.set_module_filters(&levels.modules);
    let global = match levels.global {
        Some(level) => level,
        None if levels.modules.is_empty() => return Ok(()),
        None => LevelFilter::Info,
    };
    log_configuration.set_log_level(global);
    Ok(())
}

/// Fetches a mutable reference to the global `LogConfiguration`.
fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}
