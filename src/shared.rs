//! Process-wide business hours validator
//!
//! Library callers can build their own `BusinessHoursValidator` and pass it
//! around. This module is for consumers that want one shared instance: it is
//! created from the environment on first access and can be dropped with
//! [`reinitialize`] so the next access re-reads the configuration.

use once_cell::sync::OnceCell;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::{BusinessHoursConfig, ConfigUpdate};
use crate::validator::BusinessHoursValidator;

/// Global instance; `None` until first access or after `reinitialize`
static VALIDATOR: OnceCell<Mutex<Option<BusinessHoursValidator>>> = OnceCell::new();

fn slot() -> MutexGuard<'static, Option<BusinessHoursValidator>> {
    let cell = VALIDATOR.get_or_init(|| Mutex::new(None));
    // No caller code runs under the lock; a poisoned Option is still whole
    cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn create() -> BusinessHoursValidator {
    let config = match BusinessHoursConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid business hours environment, using defaults: {:#}", e);
            BusinessHoursConfig::default()
        }
    };
    let validator = BusinessHoursValidator::new(config);
    info!("Business hours validator created: {}", validator.describe());
    validator
}

/// Run `f` against a snapshot of the shared validator, creating it on first use.
///
/// The lock is released before `f` runs, so `f` may call back into this
/// module; updates it makes show up on the next access, not in its snapshot.
pub fn with_validator<R>(f: impl FnOnce(&BusinessHoursValidator) -> R) -> R {
    let validator = slot().get_or_insert_with(create).clone();
    f(&validator)
}

/// Merge a partial update into the shared validator's config.
pub fn update_config(update: ConfigUpdate) {
    let mut guard = slot();
    guard.get_or_insert_with(create).update_config(update);
}

/// Snapshot of the shared validator's current config.
pub fn current_config() -> BusinessHoursConfig {
    slot().get_or_insert_with(create).config().clone()
}

/// Drop the shared validator. The next access builds a fresh one from the
/// environment. Meant for test setup; do not race it against live queries.
pub fn reinitialize() {
    let mut guard = slot();
    if guard.take().is_some() {
        info!("Business hours validator reset");
    }
}
