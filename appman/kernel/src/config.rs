//! Manager configuration

use crate::Phase;

/// Configuration for a [`Manager`](crate::Manager).
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Instance name used in log lines
    pub name: &'static str,
    /// Called every time the scheduler cursor wraps back to the first
    /// application, with the phase in force for the next rotation
    pub rotation_hook: Option<fn(Phase)>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            name: "APPMAN",
            rotation_hook: None,
        }
    }
}

impl ManagerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }
}

/// Builder for ergonomic manager configuration construction.
#[derive(Debug, Clone, Default)]
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    /// Sets the instance name.
    pub fn name(mut self, name: &'static str) -> Self {
        self.config.name = name;
        self
    }

    /// Sets the rotation hook.
    pub fn rotation_hook(mut self, hook: fn(Phase)) -> Self {
        self.config.rotation_hook = Some(hook);
        self
    }

    /// Builds the manager configuration.
    pub fn build(self) -> ManagerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hook(_phase: Phase) {}

    #[test]
    fn test_builder() {
        let config = ManagerConfig::builder()
            .name("BODY")
            .rotation_hook(hook)
            .build();
        assert_eq!(config.name, "BODY");
        assert!(config.rotation_hook.is_some());

        let default = ManagerConfig::default();
        assert_eq!(default.name, "APPMAN");
        assert!(default.rotation_hook.is_none());
    }
}
