//! Seeded world populations.
//!
//! Every entity gets a `Position`. Roughly half also move, a quarter carry `Health`, and a
//! tenth are tagged `"enemy"`, so queries see realistic partial overlap.

use cadence_engine::ecs::{Entity, UNTAGGED, World, WorldId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::components::{Health, Lifetime, Position, Velocity};

pub const DEFAULT_SEED: u64 = 12345;

/// Configuration for a populated world.
#[derive(Debug, Clone, Copy)]
pub struct PopulationConfig {
    /// Number of entities to create.
    pub entity_count: usize,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            entity_count: 10_000,
            seed: DEFAULT_SEED,
        }
    }
}

/// Build a world populated according to `config`, returning it with the created entities in
/// creation order.
pub fn populate(config: PopulationConfig) -> (World, Vec<Entity>) {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut world = World::new(WorldId::new(0));
    let mut entities = Vec::with_capacity(config.entity_count);

    for _ in 0..config.entity_count {
        let entity = if rng.gen_bool(0.1) {
            world.create_entity(["enemy"])
        } else {
            world.create_entity(UNTAGGED)
        };
        world.add_component(entity, random_position(&mut rng));
        if rng.gen_bool(0.5) {
            world.add_component(
                entity,
                Velocity {
                    x: rng.gen_range(-10.0..10.0),
                    y: rng.gen_range(-10.0..10.0),
                    z: rng.gen_range(-10.0..10.0),
                },
            );
        }
        if rng.gen_bool(0.25) {
            world.add_component(entity, Health::default());
        }
        if rng.gen_bool(0.2) {
            world.add_component(entity, Lifetime(rng.gen_range(0.5..5.0)));
        }
        entities.push(entity);
    }

    (world, entities)
}

fn random_position(rng: &mut ChaCha8Rng) -> Position {
    Position {
        x: rng.gen_range(-100.0..100.0),
        y: rng.gen_range(-100.0..100.0),
        z: rng.gen_range(-100.0..100.0),
    }
}
