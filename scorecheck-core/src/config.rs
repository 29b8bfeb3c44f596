//! Evaluation configuration

use crate::error::{Error, Result};
use crate::matcher::{validate_tolerance, Matcher, StrategyKind, DEFAULT_TOLERANCE_SECONDS};
use serde::{Deserialize, Serialize};

/// Settings for one evaluation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Maximum timestamp difference for a candidate pair, in seconds
    pub tolerance_seconds: f64,
    /// Assignment strategy
    pub strategy: StrategyKind,
    /// Skip malformed event records instead of failing the run
    pub lenient: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
            strategy: StrategyKind::Greedy,
            lenient: false,
        }
    }
}

impl EvalConfig {
    /// Create a configuration builder
    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_tolerance(self.tolerance_seconds).map_err(|_| {
            Error::Config(format!(
                "tolerance_seconds must be a finite non-negative number, got {}",
                self.tolerance_seconds
            ))
        })
    }

    /// Matcher for these settings
    pub fn matcher(&self) -> Result<Matcher> {
        self.validate()?;
        Ok(Matcher::new(self.tolerance_seconds)?.with_strategy(self.strategy))
    }
}

/// Fluent builder for [`EvalConfig`]
#[derive(Debug, Default)]
pub struct EvalConfigBuilder {
    tolerance_seconds: Option<f64>,
    strategy: Option<StrategyKind>,
    lenient: Option<bool>,
}

impl EvalConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tolerance window in seconds
    pub fn tolerance_seconds(mut self, seconds: f64) -> Self {
        self.tolerance_seconds = Some(seconds);
        self
    }

    /// Set the assignment strategy
    pub fn strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Set the assignment strategy by name
    pub fn strategy_name(mut self, name: &str) -> Result<Self> {
        self.strategy = Some(name.parse()?);
        Ok(self)
    }

    /// Skip malformed records instead of failing
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = Some(lenient);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EvalConfig> {
        let mut config = EvalConfig::default();

        if let Some(seconds) = self.tolerance_seconds {
            config.tolerance_seconds = seconds;
        }

        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }

        if let Some(lenient) = self.lenient {
            config.lenient = lenient;
        }

        config.validate()?;
        Ok(config)
    }
}
