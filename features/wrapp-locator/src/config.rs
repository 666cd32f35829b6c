/// Settings of a load, fixed before it starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Fail the load when a component ends without an instance
    ///
    /// Default: `false`, such components are logged and left out of the registry
    fail_on_null_instance: bool,

    /// Fail the load when a wiring hook names a component which is not registered
    ///
    /// Default: `false`, the affected target is skipped and the failure reported
    strict_wiring: bool,
}

impl LoaderConfig {
    /// Creates the default, lenient configuration
    ///
    /// Defaults:
    /// - fail_on_null_instance: `false`
    /// - strict_wiring: `false`
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on every check
    pub fn strict() -> Self {
        Self {
            fail_on_null_instance: true,
            strict_wiring: true,
        }
    }

    pub fn with_fail_on_null_instance(mut self, fail: bool) -> Self {
        self.fail_on_null_instance = fail;
        self
    }

    pub fn with_strict_wiring(mut self, strict: bool) -> Self {
        self.strict_wiring = strict;
        self
    }

    pub fn fail_on_null_instance(&self) -> bool {
        self.fail_on_null_instance
    }

    pub fn strict_wiring(&self) -> bool {
        self.strict_wiring
    }
}
