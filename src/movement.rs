use crate::geometry::{Bounds, Location};
use crate::parameters::Parameters;
use crate::population::{Agent, StatusCounts};
use crate::random::RandomSource;
use crate::status::InfectionStatus;

/// Moves `location` by `(dx, dy)` and clamps the result into `bounds`.
#[must_use]
pub fn displace(location: Location, dx: i32, dy: i32, bounds: Bounds) -> Location {
    bounds.clamp(Location::new(
        location.x.saturating_add(dx),
        location.y.saturating_add(dy),
    ))
}

/// Whether the movement rules let this agent move.
#[must_use]
pub fn can_move(agent: &Agent, isolation: bool) -> bool {
    match agent.status {
        InfectionStatus::Deceased => false,
        InfectionStatus::Infected => !isolation,
        InfectionStatus::Susceptible | InfectionStatus::Immune => true,
    }
}

/// The movement phase: every agent allowed to move takes an independent random step on each
/// axis, and the status counts are tallied in the same pass.
pub fn move_agents<R: RandomSource + ?Sized>(
    agents: &mut [Agent],
    parameters: &Parameters,
    rng: &mut R,
) -> StatusCounts {
    let bounds = parameters.bounds();
    let step = parameters.max_displacement;
    let isolation = parameters.isolation();

    for agent in agents.iter_mut() {
        if !can_move(agent, isolation) {
            continue;
        }
        let dx = rng.sample_range(-step..=step);
        let dy = rng.sample_range(-step..=step);
        agent.location = displace(agent.location, dx, dy, bounds);
    }

    StatusCounts::tally(agents)
}
