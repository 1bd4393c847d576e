//! Disease state transitions applied to a pair of agents in contact.
//!
//! For each contacting pair the statuses are read once on entry. Each side that is infected on
//! entry loses one unit of countdown and, when the countdown runs out, dies or becomes immune.
//! Then, if on entry exactly one side was infected and the other susceptible, the susceptible
//! side may catch the infection. An agent touching several others in one tick is counted down
//! once per contact.
use crate::population::Agent;
use crate::random::RandomSource;
use crate::status::InfectionStatus;

/// Per-tick rates the transition rules read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionRates {
    pub infection_probability: u32,
    /// The normal or the saturated rate, picked once per tick.
    pub fatality_rate: u32,
    pub infection_duration: i32,
}

/// Status changes produced during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransitionTally {
    pub infections: usize,
    pub recoveries: usize,
    pub deaths: usize,
}

impl TransitionTally {
    fn record(&mut self, outcome: InfectionStatus) {
        match outcome {
            InfectionStatus::Infected => self.infections += 1,
            InfectionStatus::Immune => self.recoveries += 1,
            InfectionStatus::Deceased => self.deaths += 1,
            InfectionStatus::Susceptible => {}
        }
    }
}

/// Advances the countdown of an infected agent and resolves it once it runs out.
///
/// Returns the terminal status the agent moved to, if any. Agents in other states are left alone.
pub fn progress_infection<R: RandomSource + ?Sized>(
    agent: &mut Agent,
    rates: &TransitionRates,
    rng: &mut R,
) -> Option<InfectionStatus> {
    if agent.status != InfectionStatus::Infected {
        return None;
    }
    agent.remaining_infection_days -= 1;
    if agent.remaining_infection_days > 0 {
        return None;
    }
    let outcome = if rng.sample_percent() < rates.fatality_rate {
        InfectionStatus::Deceased
    } else {
        InfectionStatus::Immune
    };
    agent.status = outcome;
    // The countdown only means something while infected.
    agent.remaining_infection_days = rates.infection_duration;
    Some(outcome)
}

/// Tries to infect a susceptible agent. Returns whether the infection took.
pub fn transmit<R: RandomSource + ?Sized>(
    target: &mut Agent,
    rates: &TransitionRates,
    rng: &mut R,
) -> bool {
    if target.status != InfectionStatus::Susceptible {
        return false;
    }
    if rng.sample_percent() >= rates.infection_probability {
        return false;
    }
    target.status = InfectionStatus::Infected;
    target.remaining_infection_days = rates.infection_duration;
    true
}

/// Applies recovery/death and transmission to the contacting pair `(i, j)`.
///
/// # Panics
///
/// Panics if `i` or `j` is out of bounds or `i == j`.
pub fn resolve_contact<R: RandomSource + ?Sized>(
    agents: &mut [Agent],
    i: usize,
    j: usize,
    rates: &TransitionRates,
    rng: &mut R,
    tally: &mut TransitionTally,
) {
    assert_ne!(i, j, "an agent cannot be in contact with itself");
    let on_entry = (agents[i].status, agents[j].status);

    for index in [i, j] {
        if let Some(outcome) = progress_infection(&mut agents[index], rates, rng) {
            tally.record(outcome);
        }
    }

    let target = match on_entry {
        (InfectionStatus::Infected, InfectionStatus::Susceptible) => j,
        (InfectionStatus::Susceptible, InfectionStatus::Infected) => i,
        _ => return,
    };
    if transmit(&mut agents[target], rates, rng) {
        tally.record(InfectionStatus::Infected);
    }
}
