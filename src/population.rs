use std::ops::Index;

use strum::{EnumCount, IntoEnumIterator};

use crate::geometry::Location;
use crate::parameters::Parameters;
use crate::random::RandomSource;
use crate::status::InfectionStatus;

/// One simulated individual.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Agent {
    pub(crate) location: Location,
    pub(crate) status: InfectionStatus,
    pub(crate) remaining_infection_days: i32,
}

impl Agent {
    #[must_use]
    pub fn new(location: Location, status: InfectionStatus, remaining_infection_days: i32) -> Self {
        Agent {
            location,
            status,
            remaining_infection_days,
        }
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    #[must_use]
    pub fn status(&self) -> InfectionStatus {
        self.status
    }

    /// The infection countdown, present only while the agent is infected.
    #[must_use]
    pub fn remaining_infection_days(&self) -> Option<i32> {
        (self.status == InfectionStatus::Infected).then_some(self.remaining_infection_days)
    }
}

/// Number of agents in each status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts([usize; InfectionStatus::COUNT]);

impl StatusCounts {
    /// Counts from scratch.
    #[must_use]
    pub fn tally(agents: &[Agent]) -> Self {
        let mut counts = StatusCounts::default();
        for agent in agents {
            counts.0[agent.status.index()] += 1;
        }
        counts
    }

    #[must_use]
    pub fn count(&self, status: InfectionStatus) -> usize {
        self.0[status.index()]
    }

    #[must_use]
    pub fn infected(&self) -> usize {
        self.count(InfectionStatus::Infected)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InfectionStatus, usize)> + '_ {
        InfectionStatus::iter().map(|status| (status, self.count(status)))
    }
}

impl Index<InfectionStatus> for StatusCounts {
    type Output = usize;

    fn index(&self, status: InfectionStatus) -> &usize {
        &self.0[status.index()]
    }
}

/// Fixed-size store of agents plus their status counts.
///
/// The slice is allocated once; agents are never added or removed, dead ones included.
#[derive(Clone, Debug)]
pub struct Population {
    agents: Box<[Agent]>,
    counts: StatusCounts,
}

impl Population {
    /// Places `population_size` agents uniformly at random inside the area; each one starts
    /// infected with `initial_infected_percent` probability.
    pub fn generate<R: RandomSource>(parameters: &Parameters, rng: &mut R) -> Self {
        let agents = (0..parameters.population_size)
            .map(|_| {
                let location = Location::new(
                    rng.sample_range(0..=parameters.width - 1),
                    rng.sample_range(0..=parameters.height - 1),
                );
                let status = if rng.sample_percent() < parameters.initial_infected_percent {
                    InfectionStatus::Infected
                } else {
                    InfectionStatus::Susceptible
                };
                Agent::new(location, status, parameters.infection_duration)
            })
            .collect::<Vec<_>>();
        Population::from_agents(agents)
    }

    /// Wraps explicitly constructed agents.
    #[must_use]
    pub fn from_agents(agents: Vec<Agent>) -> Self {
        let agents = agents.into_boxed_slice();
        let counts = StatusCounts::tally(&agents);
        Population { agents, counts }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[must_use]
    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        self.counts
    }

    pub(crate) fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub(crate) fn set_counts(&mut self, counts: StatusCounts) {
        debug_assert_eq!(counts.total(), self.agents.len());
        self.counts = counts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    #[test]
    fn generated_population_has_requested_size_and_counts() {
        let parameters = Parameters {
            population_size: 250,
            ..Parameters::default()
        };
        let population = Population::generate(&parameters, &mut SeededRandom::new(3));
        assert_eq!(population.len(), 250);
        assert_eq!(population.counts().total(), 250);
        assert_eq!(population.counts(), StatusCounts::tally(population.agents()));
        let bounds = parameters.bounds();
        for agent in population.agents() {
            assert!(bounds.contains(agent.location()));
            assert!(agent.location().x < parameters.width);
            assert!(agent.location().y < parameters.height);
            assert!(matches!(
                agent.status(),
                InfectionStatus::Susceptible | InfectionStatus::Infected
            ));
        }
    }

    #[test]
    fn initial_infection_follows_percent_draws() {
        let parameters = Parameters {
            population_size: 4,
            initial_infected_percent: 5,
            ..Parameters::default()
        };
        // Draws below 5 infect.
        let mut rng = ScriptedRandom::new(vec![10], vec![4, 5, 0, 99]);
        let population = Population::generate(&parameters, &mut rng);
        let statuses: Vec<_> = population.agents().iter().map(Agent::status).collect();
        assert_eq!(
            statuses,
            vec![
                InfectionStatus::Infected,
                InfectionStatus::Susceptible,
                InfectionStatus::Infected,
                InfectionStatus::Susceptible,
            ]
        );
        assert_eq!(population.counts().infected(), 2);
    }

    #[test]
    fn every_agent_starts_with_the_full_countdown() {
        let parameters = Parameters {
            population_size: 3,
            infection_duration: 17,
            ..Parameters::default()
        };
        let mut rng = ScriptedRandom::new(vec![1], vec![0, 50, 0]);
        let population = Population::generate(&parameters, &mut rng);
        for agent in population.agents() {
            assert_eq!(agent.remaining_infection_days, 17);
        }
        assert_eq!(population.agent(0).unwrap().remaining_infection_days(), Some(17));
        assert_eq!(population.agent(1).unwrap().remaining_infection_days(), None);
        assert!(population.agent(3).is_none());
    }

    #[test]
    fn counts_index_by_status() {
        let agents = vec![
            Agent::new(Location::new(0, 0), InfectionStatus::Deceased, 1),
            Agent::new(Location::new(0, 0), InfectionStatus::Immune, 1),
            Agent::new(Location::new(0, 0), InfectionStatus::Immune, 1),
        ];
        let counts = StatusCounts::tally(&agents);
        assert_eq!(counts[InfectionStatus::Immune], 2);
        assert_eq!(counts[InfectionStatus::Deceased], 1);
        assert_eq!(counts[InfectionStatus::Susceptible], 0);
        let listed: Vec<_> = counts.iter().collect();
        assert_eq!(
            listed,
            vec![
                (InfectionStatus::Susceptible, 0),
                (InfectionStatus::Infected, 0),
                (InfectionStatus::Immune, 2),
                (InfectionStatus::Deceased, 1),
            ]
        );
    }
}
