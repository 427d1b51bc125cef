//! Process-wide default adapters.
//!
//! Used by every binding that does not supply its own adapter list. Starts as
//! a single [`EnvAdapter`] without prefix. Replacing the defaults only
//! affects config classes bound afterwards.

use crate::{
    adapter::{EnvAdapter, SharedAdapter},
    error::ConfigError,
};
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

static DEFAULT_ADAPTERS: LazyLock<ArcSwap<Vec<SharedAdapter>>> =
    LazyLock::new(|| ArcSwap::from_pointee(initial()));

fn initial() -> Vec<SharedAdapter> {
    vec![Arc::new(EnvAdapter::new())]
}

/// Replaces the default adapters wholesale
///
/// Fails without touching the registry when `adapters` is empty.
pub fn set_defaults<I>(adapters: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = SharedAdapter>,
{
    let adapters: Vec<SharedAdapter> = adapters.into_iter().collect();
    if adapters.is_empty() {
        return Err(ConfigError::NoDefaultAdapters);
    }
    tracing::debug!(count = adapters.len(), "replacing default adapters");
    DEFAULT_ADAPTERS.store(Arc::new(adapters));
    Ok(())
}

/// Current default adapters
#[inline]
pub fn defaults() -> Vec<SharedAdapter> {
    DEFAULT_ADAPTERS.load().as_ref().clone()
}

/// Restores the initial single environment adapter
pub fn reset_defaults() {
    DEFAULT_ADAPTERS.store(Arc::new(initial()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MapAdapter;
    use serial_test::serial;

    #[test]
    #[serial(registry)]
    fn test_initial_value_is_env_adapter() {
        reset_defaults();
        let adapters = defaults();
        assert_eq!(adapters.len(), 1);
        assert_eq!(adapters[0].name(), "EnvAdapter");
    }

    #[test]
    #[serial(registry)]
    fn test_empty_defaults_rejected_and_registry_unchanged() {
        reset_defaults();
        let err = set_defaults(Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::NoDefaultAdapters));
        assert_eq!(defaults()[0].name(), "EnvAdapter");
    }

    #[test]
    #[serial(registry)]
    fn test_set_defaults_replaces_wholesale() {
        reset_defaults();
        let map: SharedAdapter = Arc::new(MapAdapter::new());
        set_defaults([Arc::clone(&map), Arc::clone(&map)]).unwrap();

        let adapters = defaults();
        assert_eq!(adapters.len(), 2);
        assert!(adapters.iter().all(|a| a.name() == "MapAdapter"));
        reset_defaults();
    }
}
