//! Model parameters and their JSON loader.
//!
//! Every field has a default matching the classic 900×600, 500-agent setup, so a parameters
//! file only needs to name what it changes:
//!
//! ```json
//! {
//!     "population_size": 1000,
//!     "infection_probability": 80,
//!     "policy": ["isolation"]
//! }
//! ```
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::geometry::Bounds;

/// A behavior-altering policy switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Infected agents stay where they are.
    Isolation,
    /// Accepted and stored but not consulted by any rule.
    SocialDistancing,
}

impl Policy {
    const ALL: [Policy; 2] = [Policy::Isolation, Policy::SocialDistancing];

    const fn bit(self) -> u8 {
        match self {
            Policy::Isolation => 0b01,
            Policy::SocialDistancing => 0b10,
        }
    }
}

/// Bit set of enabled policies. Serialized as a list of policy names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Policy>", into = "Vec<Policy>")]
pub struct PolicyFlags(u8);

impl PolicyFlags {
    #[must_use]
    pub const fn empty() -> Self {
        PolicyFlags(0)
    }

    #[must_use]
    pub fn contains(self, policy: Policy) -> bool {
        self.0 & policy.bit() != 0
    }

    pub fn insert(&mut self, policy: Policy) {
        self.0 |= policy.bit();
    }

    pub fn remove(&mut self, policy: Policy) {
        self.0 &= !policy.bit();
    }

    #[must_use]
    pub fn with(mut self, policy: Policy) -> Self {
        self.insert(policy);
        self
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<Vec<Policy>> for PolicyFlags {
    fn from(policies: Vec<Policy>) -> Self {
        policies
            .into_iter()
            .fold(PolicyFlags::empty(), PolicyFlags::with)
    }
}

impl From<PolicyFlags> for Vec<Policy> {
    fn from(flags: PolicyFlags) -> Self {
        Policy::ALL
            .into_iter()
            .filter(|&policy| flags.contains(policy))
            .collect()
    }
}

/// Everything the model needs besides a random source.
///
/// Rates and probabilities are whole percentages in `0..=100`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    pub population_size: usize,
    pub width: i32,
    pub height: i32,
    /// Countdown an agent starts with when it becomes infected.
    pub infection_duration: i32,
    pub infection_probability: u32,
    pub fatality_rate: u32,
    /// Fatality rate used while the previous tick ended saturated.
    pub saturated_fatality_rate: u32,
    /// Maximum distance at which two agents are in contact.
    pub proximity_threshold: f64,
    /// Saturation starts at `population_size / saturation_divisor` infected agents.
    pub saturation_divisor: usize,
    pub initial_infected_percent: u32,
    /// Per-axis displacement is drawn from `-max_displacement..=max_displacement`.
    pub max_displacement: i32,
    pub policy: PolicyFlags,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            population_size: 500,
            width: 900,
            height: 600,
            infection_duration: 200,
            infection_probability: 50,
            fatality_rate: 10,
            saturated_fatality_rate: 20,
            proximity_threshold: 50.0,
            saturation_divisor: 5,
            initial_infected_percent: 5,
            max_displacement: 5,
            policy: PolicyFlags::empty(),
        }
    }
}

impl Parameters {
    /// Reads parameters from a JSON file and validates them.
    ///
    /// # Errors
    ///
    /// Returns a `SimulationError` if the file cannot be read, is not valid JSON for
    /// `Parameters`, or fails [`Parameters::validate`].
    pub fn from_file(path: &Path) -> Result<Parameters, SimulationError> {
        let contents = fs::read_to_string(path)?;
        let parameters: Parameters = serde_json::from_str(&contents)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// # Errors
    ///
    /// Returns `SimulationError::InvalidParameters` naming the first offending field.
    pub fn validate(&self) -> Result<(), SimulationError> {
        fn invalid(message: &str) -> Result<(), SimulationError> {
            Err(SimulationError::InvalidParameters(message.to_string()))
        }

        if self.population_size == 0 {
            return invalid("population_size must be at least 1");
        }
        if self.width <= 0 || self.height <= 0 {
            return invalid("width and height must be positive");
        }
        if self.infection_duration < 1 {
            return invalid("infection_duration must be at least 1");
        }
        for (name, value) in [
            ("infection_probability", self.infection_probability),
            ("fatality_rate", self.fatality_rate),
            ("saturated_fatality_rate", self.saturated_fatality_rate),
            ("initial_infected_percent", self.initial_infected_percent),
        ] {
            if value > 100 {
                return Err(SimulationError::InvalidParameters(format!(
                    "{name} must be a percentage in 0..=100, got {value}"
                )));
            }
        }
        if self.proximity_threshold.is_nan() || self.proximity_threshold < 0.0 {
            return invalid("proximity_threshold must be a non-negative number");
        }
        if self.saturation_divisor == 0 {
            return invalid("saturation_divisor must be at least 1");
        }
        if self.max_displacement < 0 {
            return invalid("max_displacement must not be negative");
        }
        Ok(())
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Infected count at or above which the health system is saturated.
    #[must_use]
    pub fn saturation_threshold(&self) -> usize {
        self.population_size / self.saturation_divisor
    }

    #[must_use]
    pub fn isolation(&self) -> bool {
        self.policy.contains(Policy::Isolation)
    }
}
