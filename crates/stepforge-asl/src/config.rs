use crate::{ErrorCodeRegistry, OmitOptions};

/// Knobs for turning a workflow into ASL JSON.
#[derive(Clone, Debug, PartialEq)]
pub struct SerializeConfig {
    pub omit: OmitOptions,
    pub error_codes: ErrorCodeRegistry,
    /// Reject `Next`/`Default`/catch targets that do not name a state of the same graph.
    pub check_next_targets: bool,
    /// Reject states that cannot be reached from `StartAt`.
    pub check_reachability: bool,
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            omit: OmitOptions::default(),
            error_codes: ErrorCodeRegistry::default(),
            check_next_targets: true,
            check_reachability: true,
        }
    }
}

impl SerializeConfig {
    /// Only the per-state checks and `StartAt` resolution; graph closure is
    /// left to the execution service.
    pub fn lenient() -> Self {
        Self {
            check_next_targets: false,
            check_reachability: false,
            ..Self::default()
        }
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_codes.register(code);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_config_defaults_enable_every_check() {
        let config = SerializeConfig::default();
        assert!(config.omit.exclude_none);
        assert!(config.omit.exclude_empty_string);
        assert!(config.omit.exclude_empty_collection);
        assert!(config.check_next_targets);
        assert!(config.check_reachability);
        assert!(config.error_codes.contains("States.ALL"));
    }

    #[test]
    fn serialize_config_lenient_disables_graph_closure_checks() {
        let config = SerializeConfig::lenient().with_error_code("MyApp.Throttled");
        assert!(!config.check_next_targets);
        assert!(!config.check_reachability);
        assert!(config.error_codes.contains("MyApp.Throttled"));
    }
}
