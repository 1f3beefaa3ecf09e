//! Combat and mating between agents that ended the move close together.
//!
//! Both phases run against an index rebuilt from post-movement positions.
//! Dead agents stay in the slice until the kernel sweeps them afterwards, so
//! slot numbers remain valid throughout.

use hashbrown::HashMap;
use log::debug;
use ordered_float::OrderedFloat;

use crate::agent::{Agent, AgentId, Variant};
use crate::events::{EventSink, SimEvent};
use crate::factory::SpawnRequest;
use crate::numeric::ms_to_seconds;
use crate::spatial::SpatialIndex;
use crate::vector_math::Vector2;
use crate::{KILL_REPRODUCTION_FACTOR, MATING_DISTANCE, MATING_PROGRESS_PER_SECOND};

/// Read-only view resolving index entries back to slice slots.
#[derive(Clone, Copy)]
pub(crate) struct Proximity<'a> {
    pub(crate) index: &'a dyn SpatialIndex,
    pub(crate) slots: &'a HashMap<AgentId, usize>,
}

impl Proximity<'_> {
    /// Slots of agents strictly within `radius` of `point`.
    fn around(&self, point: Vector2, radius: f64) -> Vec<usize> {
        let mut found = Vec::new();
        self.index.for_each_within(point, radius, &mut |entry| {
            if let Some(&slot) = self.slots.get(&entry.id) {
                found.push(slot);
            }
        });
        found
    }
}

/// Lets every ready predator strike its nearest prey in range.
///
/// Returns the births earned by kills that completed a reproduction cycle.
pub(crate) fn resolve_combat<S: EventSink>(
    agents: &mut [Agent],
    near: Proximity<'_>,
    sink: &mut S,
) -> Vec<SpawnRequest> {
    let mut births = Vec::new();
    for hunter_slot in 0..agents.len() {
        let Some((hunter_position, attack)) = agents
            .get(hunter_slot)
            .filter(|hunter| hunter.is_alive())
            .and_then(|hunter| hunter.attack().map(|attack| (hunter.position, *attack)))
        else {
            continue;
        };
        if !attack.is_ready() {
            continue;
        }

        let target = near
            .around(hunter_position, attack.range)
            .into_iter()
            .filter_map(|slot| agents.get(slot).map(|prey| (slot, prey)))
            .filter(|(_, prey)| prey.variant() == Variant::Prey && prey.is_alive())
            .min_by_key(|(_, prey)| OrderedFloat(prey.position.distance(hunter_position)))
            .map(|(slot, _)| slot);
        let Some(victim) = target.and_then(|slot| agents.get_mut(slot)) else {
            continue;
        };

        let killed = victim.take_damage(attack.damage);
        let victim_max_health = victim.stats.max_health;
        sink.emit(SimEvent::BoidDamaged {
            agent_id: victim.id,
            damage: attack.damage,
            remaining_health: victim.stats.health,
        });
        let victim_id = victim.id;

        let Some(hunter) = agents.get_mut(hunter_slot) else {
            continue;
        };
        if let Some(stats) = hunter.attack_mut() {
            stats.start_cooldown();
        }
        if killed {
            debug!("{} killed {victim_id}", hunter.id);
            if hunter.increase_reproduction(victim_max_health * KILL_REPRODUCTION_FACTOR) {
                births.push(SpawnRequest {
                    variant: hunter.variant(),
                    position: hunter.position,
                    parent1: hunter.id,
                    parent2: None,
                });
            }
        }
    }
    births
}

/// Pairs each agent with its nearest eligible mate and advances progress.
///
/// An agent mates at most once per tick. One birth is requested per pair
/// when either partner completes its cycle.
pub(crate) fn resolve_mating(
    agents: &mut [Agent],
    near: Proximity<'_>,
    dt_ms: f64,
) -> Vec<SpawnRequest> {
    let progress = MATING_PROGRESS_PER_SECOND * ms_to_seconds(dt_ms);
    let mut paired = vec![false; agents.len()];
    let mut births = Vec::new();

    for slot in 0..agents.len() {
        if paired.get(slot).copied().unwrap_or(true) {
            continue;
        }
        let Some(agent) = agents
            .get(slot)
            .filter(|agent| agent.is_alive() && agent.can_reproduce())
        else {
            continue;
        };

        let partner = near
            .around(agent.position, MATING_DISTANCE)
            .into_iter()
            .filter(|&other| other != slot && !paired.get(other).copied().unwrap_or(true))
            .filter_map(|other| agents.get(other).map(|mate| (other, mate)))
            .filter(|(_, mate)| is_compatible(agent, mate))
            .min_by_key(|(_, mate)| OrderedFloat(mate.position.distance(agent.position)))
            .map(|(other, _)| other);
        let Some(partner) = partner else {
            continue;
        };

        for taken in [slot, partner] {
            if let Some(flag) = paired.get_mut(taken) {
                *flag = true;
            }
        }
        if let Some(request) = mate_pair(agents, slot, partner, progress) {
            births.push(request);
        }
    }
    births
}

fn is_compatible(agent: &Agent, mate: &Agent) -> bool {
    mate.is_alive()
        && mate.can_reproduce()
        && mate.variant() == agent.variant()
        && mate.stats.sex == agent.stats.sex.opposite()
}

fn mate_pair(
    agents: &mut [Agent],
    first: usize,
    second: usize,
    progress: f64,
) -> Option<SpawnRequest> {
    let (first_id, first_position, first_done) = agents
        .get_mut(first)
        .map(|a| (a.id, a.position, a.increase_reproduction(progress)))?;
    let (second_id, second_position, second_done, variant) = agents
        .get_mut(second)
        .map(|a| (a.id, a.position, a.increase_reproduction(progress), a.variant()))?;
    if !(first_done || second_done) {
        return None;
    }
    let (parent1, parent2) = if first_done {
        (first_id, second_id)
    } else {
        (second_id, first_id)
    };
    debug!("{parent1} and {parent2} produced offspring");
    Some(SpawnRequest {
        variant,
        position: (first_position + second_position) * 0.5,
        parent1,
        parent2: Some(parent2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{MovementLimits, Role, Sex};
    use crate::events::EventBuffer;
    use crate::spatial::Quadtree;
    use rstest::rstest;

    fn boid(id: u64, variant: Variant, sex: Sex, x: f64, y: f64) -> Agent {
        Agent::new(
            AgentId(id),
            Role::for_variant(variant),
            sex,
            Vector2::new(x, y),
            MovementLimits::default(),
        )
    }

    fn indexed(agents: &[Agent]) -> (Quadtree, HashMap<AgentId, usize>) {
        let mut tree = Quadtree::new(800.0, 600.0).expect("valid bounds");
        tree.rebuild(agents);
        let slots = agents.iter().enumerate().map(|(slot, a)| (a.id, slot)).collect();
        (tree, slots)
    }

    #[rstest]
    fn predator_strikes_nearest_prey_and_cools_down() {
        let mut agents = vec![
            boid(1, Variant::Predator, Sex::Male, 100.0, 100.0),
            boid(2, Variant::Prey, Sex::Male, 110.0, 100.0),
            boid(3, Variant::Prey, Sex::Male, 105.0, 100.0),
        ];
        let (tree, slots) = indexed(&agents);
        let mut events = EventBuffer::new();
        let near = Proximity { index: &tree, slots: &slots };

        let births = resolve_combat(&mut agents, near, &mut events);
        assert!(births.is_empty());
        assert_eq!(
            events.events(),
            &[SimEvent::BoidDamaged {
                agent_id: AgentId(3),
                damage: 20.0,
                remaining_health: 80.0,
            }]
        );
        assert!(agents.first().and_then(Agent::attack).is_some_and(|a| !a.is_ready()));

        // Still cooling down.
        resolve_combat(&mut agents, near, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[rstest]
    fn kills_credit_reproduction() {
        let mut agents = vec![
            boid(1, Variant::Predator, Sex::Female, 100.0, 100.0),
            boid(2, Variant::Prey, Sex::Male, 104.0, 100.0),
        ];
        if let Some(prey) = agents.get_mut(1) {
            prey.stats.health = 5.0;
        }
        if let Some(hunter) = agents.first_mut() {
            hunter.stats.reproduction_progress = 60.0;
        }
        let (tree, slots) = indexed(&agents);
        let mut events = EventBuffer::new();
        let births = resolve_combat(&mut agents, Proximity { index: &tree, slots: &slots }, &mut events);
        assert_eq!(births.len(), 1);
        assert_eq!(births.first().map(|b| (b.parent1, b.parent2)), Some((AgentId(1), None)));
        assert!(agents.get(1).is_some_and(|prey| !prey.is_alive()));
    }

    #[rstest]
    fn mating_requires_opposite_sex_of_same_variant() {
        let mut agents = vec![
            boid(1, Variant::Prey, Sex::Male, 100.0, 100.0),
            boid(2, Variant::Prey, Sex::Male, 105.0, 100.0),
            boid(3, Variant::Predator, Sex::Female, 100.0, 105.0),
        ];
        let (tree, slots) = indexed(&agents);
        resolve_mating(&mut agents, Proximity { index: &tree, slots: &slots }, 1000.0);
        assert!(agents
            .iter()
            .all(|a| a.stats.reproduction_progress.abs() < f64::EPSILON));
    }

    #[rstest]
    fn four_seconds_together_produce_one_offspring() {
        let mut agents = vec![
            boid(1, Variant::Prey, Sex::Male, 100.0, 100.0),
            boid(2, Variant::Prey, Sex::Female, 110.0, 100.0),
        ];
        let (tree, slots) = indexed(&agents);
        let near = Proximity { index: &tree, slots: &slots };
        let births: Vec<SpawnRequest> = (0..4)
            .flat_map(|_| resolve_mating(&mut agents, near, 1000.0))
            .collect();
        assert_eq!(births.len(), 1);
        let birth = births.first().expect("one birth");
        assert_eq!(birth.variant, Variant::Prey);
        assert!((birth.position - Vector2::new(105.0, 100.0)).length() < 1e-9);
        assert!(birth.parent2.is_some());
        assert!(agents.iter().all(|a| a.stats.reproductions == 1));
    }

    #[rstest]
    fn each_agent_mates_once_per_tick() {
        let mut agents = vec![
            boid(1, Variant::Prey, Sex::Female, 100.0, 100.0),
            boid(2, Variant::Prey, Sex::Male, 105.0, 100.0),
            boid(3, Variant::Prey, Sex::Male, 95.0, 100.0),
        ];
        let (tree, slots) = indexed(&agents);
        resolve_mating(&mut agents, Proximity { index: &tree, slots: &slots }, 1000.0);
        let progressed = agents
            .iter()
            .filter(|a| a.stats.reproduction_progress > 0.0)
            .count();
        assert_eq!(progressed, 2);
    }
}
