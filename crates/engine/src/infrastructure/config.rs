//! Engine configuration from the environment.
//!
//! | Variable                   | Default | Meaning                                   |
//! |----------------------------|---------|-------------------------------------------|
//! | `ITEMFLOW_MAX_CHAIN_DEPTH` | `8`     | Deepest nested dispatch a handler may cause |
//! | `ITEMFLOW_NOTIFY_ERRORS`   | `true`  | Send rule failures to the notifier        |
//! | `ITEMFLOW_LOCAL_USER`      | unset   | Session user this client runs as          |

use itemflow_domain::UserId;

pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Knobs the dispatcher reads on every firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    pub max_chain_depth: usize,
    pub notify_errors: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            notify_errors: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub dispatch: DispatchSettings,
    pub local_user: Option<UserId>,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys take their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(value) = get("ITEMFLOW_MAX_CHAIN_DEPTH") {
            config.dispatch.max_chain_depth = value
                .parse()
                .map_err(|e| ConfigError::invalid("ITEMFLOW_MAX_CHAIN_DEPTH", &value, e))?;
        }

        if let Some(value) = get("ITEMFLOW_NOTIFY_ERRORS") {
            config.dispatch.notify_errors = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::invalid(
                        "ITEMFLOW_NOTIFY_ERRORS",
                        &value,
                        "expected a boolean",
                    ))
                }
            };
        }

        if let Some(value) = get("ITEMFLOW_LOCAL_USER") {
            config.local_user = Some(
                value
                    .parse()
                    .map_err(|e| ConfigError::invalid("ITEMFLOW_LOCAL_USER", &value, e))?,
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.dispatch.max_chain_depth, DEFAULT_MAX_CHAIN_DEPTH);
        assert!(config.dispatch.notify_errors);
    }

    #[test]
    fn reads_all_variables() {
        let user = UserId::new();
        let user_text = user.to_string();
        let config = EngineConfig::from_lookup(lookup(&[
            ("ITEMFLOW_MAX_CHAIN_DEPTH", "3"),
            ("ITEMFLOW_NOTIFY_ERRORS", "off"),
            ("ITEMFLOW_LOCAL_USER", &user_text),
        ]))
        .unwrap();

        assert_eq!(config.dispatch.max_chain_depth, 3);
        assert!(!config.dispatch.notify_errors);
        assert_eq!(config.local_user, Some(user));
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = EngineConfig::from_lookup(lookup(&[("ITEMFLOW_MAX_CHAIN_DEPTH", "deep")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ITEMFLOW_MAX_CHAIN_DEPTH", .. }));

        let err = EngineConfig::from_lookup(lookup(&[("ITEMFLOW_NOTIFY_ERRORS", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("ITEMFLOW_NOTIFY_ERRORS"));
    }
}
