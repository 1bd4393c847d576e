use serde::Serialize;
use strum::{EnumCount, EnumIter, IntoStaticStr};

/// Health state of an agent.
///
/// `Susceptible` and `Infected` are the active states; `Immune` and `Deceased` are terminal and
/// never change again.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, EnumIter, EnumCount, IntoStaticStr,
)]
#[repr(u8)]
pub enum InfectionStatus {
    #[strum(serialize = "VULNERABLE")]
    Susceptible = 0,
    #[strum(serialize = "INFECTED")]
    Infected = 1,
    #[strum(serialize = "IMMUNE")]
    Immune = 2,
    #[strum(serialize = "DEAD")]
    Deceased = 3,
}

impl InfectionStatus {
    /// Display label, e.g. for legends drawn by a renderer.
    #[must_use]
    pub fn label(self) -> &'static str {
        self.into()
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, InfectionStatus::Susceptible | InfectionStatus::Infected)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}
