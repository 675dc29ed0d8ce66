//! Process configuration read from the environment.

use crate::error::ControllerError;
use std::time::Duration;

pub const DEFAULT_CONCURRENCY: u16 = 4;
pub const DEFAULT_DEBOUNCE_SECS: u64 = 1;

/// Runtime settings for the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Namespace to watch; all namespaces when unset
    pub namespace: Option<String>,
    /// Maximum number of GameServers reconciled at once
    pub concurrency: u16,
    /// Quiet period after the last event before a GameServer is reconciled
    pub debounce: Duration,
}

impl Settings {
    /// Reads `WATCH_NAMESPACE`, `RECONCILE_CONCURRENCY` and `RECONCILE_DEBOUNCE_SECS`.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ControllerError> {
        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());

        let concurrency = match lookup("RECONCILE_CONCURRENCY") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ControllerError::InvalidConfig(format!(
                        "RECONCILE_CONCURRENCY must be a positive integer, got {value:?}"
                    ))
                })?,
            None => DEFAULT_CONCURRENCY,
        };

        let debounce_secs = match lookup("RECONCILE_DEBOUNCE_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| {
                ControllerError::InvalidConfig(format!(
                    "RECONCILE_DEBOUNCE_SECS must be a number of seconds, got {value:?}"
                ))
            })?,
            None => DEFAULT_DEBOUNCE_SECS,
        };

        Ok(Self {
            namespace,
            concurrency,
            debounce: Duration::from_secs(debounce_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ControllerError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();

        assert_eq!(settings.namespace, None);
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.debounce, Duration::from_secs(1));
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("WATCH_NAMESPACE", "games"),
            ("RECONCILE_CONCURRENCY", "8"),
            ("RECONCILE_DEBOUNCE_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(settings.namespace.as_deref(), Some("games"));
        assert_eq!(settings.concurrency, 8);
        assert_eq!(settings.debounce, Duration::ZERO);
    }

    #[test]
    fn test_blank_namespace_means_all() {
        assert_eq!(settings(&[("WATCH_NAMESPACE", " ")]).unwrap().namespace, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            settings(&[("RECONCILE_CONCURRENCY", "0")]),
            Err(ControllerError::InvalidConfig(_))
        ));
        assert!(matches!(
            settings(&[("RECONCILE_CONCURRENCY", "many")]),
            Err(ControllerError::InvalidConfig(_))
        ));
        assert!(matches!(
            settings(&[("RECONCILE_DEBOUNCE_SECS", "-1")]),
            Err(ControllerError::InvalidConfig(_))
        ));
    }
}
