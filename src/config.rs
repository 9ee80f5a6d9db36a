use serde::{Deserialize, Serialize};

/// Tunables shared by the graph based matchers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Upper bound on augmentations per solve. `None` uses the number of
    /// request nodes, which is exactly what a well formed instance needs.
    #[serde(default)]
    pub max_iterations: Option<usize>,
}

impl MatcherConfig {
    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self {
            max_iterations: Some(max_iterations),
        }
    }

    pub(crate) fn iteration_bound(&self, requests: usize) -> usize {
        self.max_iterations.unwrap_or(requests)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_bound_is_request_count() {
        assert_eq!(MatcherConfig::default().iteration_bound(12), 12);
    }

    #[test]
    fn missing_cap_deserializes_to_default() {
        let config: MatcherConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MatcherConfig::default());

        let config: MatcherConfig = serde_json::from_str(r#"{"max_iterations":4}"#).unwrap();
        assert_eq!(config, MatcherConfig::with_max_iterations(4));
        assert_eq!(
            serde_json::to_string(&config).unwrap(),
            r#"{"max_iterations":4}"#
        );
    }

    #[test]
    fn explicit_bound_wins() {
        assert_eq!(MatcherConfig::with_max_iterations(3).iteration_bound(12), 3);
    }
}
