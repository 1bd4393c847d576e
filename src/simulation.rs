//! The step driver.
//!
//! A [`Simulation`] owns the whole model state and advances it one tick at a time:
//!
//! 1. If the previous tick left no infected agents, the run is finished and nothing happens.
//! 2. The proximity scan hands every contacting pair to the transition rules, in pair order.
//! 3. Agents move and the status counts are tallied again.
//! 4. The saturation flag is recomputed from the new counts. It is only read on the next tick.
//! 5. The infected count is appended to the history.
//!
//! Pausing is up to the caller: the simulation only moves when `step` is called.
use crate::contact::for_each_contact;
use crate::error::SimulationError;
use crate::history::History;
use crate::log::{debug, info, trace};
use crate::movement::move_agents;
use crate::parameters::Parameters;
use crate::population::{Agent, Population, StatusCounts};
use crate::random::{RandomSource, SeededRandom};
use crate::transition::{resolve_contact, TransitionRates, TransitionTally};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// No infected agents were left at the start of a tick. Only a reset leaves this state.
    Finished,
}

/// Everything a reset replaces.
#[derive(Clone, Debug)]
struct SimulationState {
    population: Population,
    saturated: bool,
    history: History,
    tick: usize,
    run_state: RunState,
    last_tally: TransitionTally,
}

impl SimulationState {
    fn from_population(population: Population) -> Self {
        SimulationState {
            population,
            saturated: false,
            history: History::seeded(),
            tick: 0,
            run_state: RunState::Running,
            last_tally: TransitionTally::default(),
        }
    }
}

pub struct Simulation<R: RandomSource = SeededRandom> {
    parameters: Parameters,
    rng: R,
    state: SimulationState,
}

impl<R: RandomSource> Simulation<R> {
    /// Validates `parameters` and generates a fresh population from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidParameters` if the parameters fail validation.
    pub fn new(parameters: Parameters, mut rng: R) -> Result<Self, SimulationError> {
        parameters.validate()?;
        let population = Population::generate(&parameters, &mut rng);
        debug!(
            "Initialized population of {} with {} infected",
            population.len(),
            population.counts().infected()
        );
        Ok(Simulation {
            parameters,
            rng,
            state: SimulationState::from_population(population),
        })
    }

    /// Starts from explicitly placed agents instead of a generated population.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidParameters` if the parameters fail validation,
    /// `population_size` does not match the number of agents, an agent lies outside the
    /// bounds, or an infected agent's countdown is not in `1..=infection_duration`.
    pub fn from_population(
        parameters: Parameters,
        population: Population,
        rng: R,
    ) -> Result<Self, SimulationError> {
        parameters.validate()?;
        if population.len() != parameters.population_size {
            return Err(SimulationError::InvalidParameters(format!(
                "population_size is {} but {} agents were supplied",
                parameters.population_size,
                population.len()
            )));
        }
        let bounds = parameters.bounds();
        for (index, agent) in population.agents().iter().enumerate() {
            if !bounds.contains(agent.location()) {
                return Err(SimulationError::InvalidParameters(format!(
                    "agent {index} at {:?} lies outside {}x{}",
                    agent.location(),
                    parameters.width,
                    parameters.height
                )));
            }
            if let Some(days) = agent.remaining_infection_days() {
                if !(1..=parameters.infection_duration).contains(&days) {
                    return Err(SimulationError::InvalidParameters(format!(
                        "agent {index} has {days} infection days left, expected 1..={}",
                        parameters.infection_duration
                    )));
                }
            }
        }
        Ok(Simulation {
            parameters,
            rng,
            state: SimulationState::from_population(population),
        })
    }

    /// Advances one tick and returns the resulting run state. A call that returns
    /// `RunState::Finished` did not change the population or the history.
    pub fn step(&mut self) -> RunState {
        if self.state.run_state == RunState::Finished {
            return RunState::Finished;
        }
        if self.state.population.counts().infected() == 0 {
            debug!(
                "No infected agents left after {} ticks; finishing",
                self.state.tick
            );
            self.state.run_state = RunState::Finished;
            return RunState::Finished;
        }

        let rates = TransitionRates {
            infection_probability: self.parameters.infection_probability,
            fatality_rate: if self.state.saturated {
                self.parameters.saturated_fatality_rate
            } else {
                self.parameters.fatality_rate
            },
            infection_duration: self.parameters.infection_duration,
        };

        let locations: Vec<_> = self
            .state
            .population
            .agents()
            .iter()
            .map(Agent::location)
            .collect();
        let mut tally = TransitionTally::default();
        let agents = self.state.population.agents_mut();
        let rng = &mut self.rng;
        for_each_contact(&locations, self.parameters.proximity_threshold, |i, j| {
            resolve_contact(agents, i, j, &rates, rng, &mut tally);
        });

        let counts = move_agents(agents, &self.parameters, &mut self.rng);
        self.state.population.set_counts(counts);

        let saturated = counts.infected() >= self.parameters.saturation_threshold();
        if saturated != self.state.saturated {
            info!(
                "Tick {}: health system {} ({} infected, threshold {})",
                self.state.tick + 1,
                if saturated { "saturated" } else { "recovered" },
                counts.infected(),
                self.parameters.saturation_threshold()
            );
        }
        self.state.saturated = saturated;

        self.state.history.record(counts.infected());
        self.state.tick += 1;
        self.state.last_tally = tally;
        trace!(
            "Tick {}: {:?}, {} new infections, {} recoveries, {} deaths",
            self.state.tick,
            counts,
            tally.infections,
            tally.recoveries,
            tally.deaths
        );
        RunState::Running
    }

    /// Steps until the run finishes or `max_ticks` ticks have completed, calling `on_tick`
    /// after every completed tick. Returns the number of ticks completed.
    pub fn run<F>(&mut self, max_ticks: usize, mut on_tick: F) -> usize
    where
        F: FnMut(&Self),
    {
        let mut completed = 0;
        while completed < max_ticks && self.step() == RunState::Running {
            completed += 1;
            on_tick(self);
        }
        completed
    }

    /// Regenerates the population from the current random stream and truncates the history
    /// to its seed sample.
    pub fn reset(&mut self) {
        let population = Population::generate(&self.parameters, &mut self.rng);
        self.state = SimulationState::from_population(population);
        debug!(
            "Reset population of {} with {} infected",
            self.state.population.len(),
            self.state.population.counts().infected()
        );
    }

    /// Like [`Simulation::reset`], drawing from a new random source.
    pub fn reset_with(&mut self, rng: R) {
        self.rng = rng;
        self.reset();
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.state.population
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        self.state.population.agents()
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        self.state.population.counts()
    }

    /// Whether the last completed tick ended at or above the saturation threshold.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.state.saturated
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.state.history
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.run_state == RunState::Finished
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state.run_state
    }

    /// Number of completed ticks since the last reset.
    #[must_use]
    pub fn tick(&self) -> usize {
        self.state.tick
    }

    /// Status changes made during the last completed tick.
    #[must_use]
    pub fn last_tally(&self) -> TransitionTally {
        self.state.last_tally
    }

    #[must_use]
    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}
