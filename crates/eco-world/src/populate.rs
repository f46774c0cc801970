//! Initial population.

use crate::world::World;
use eco_core::{EntityId, Location, Reproduction, Sex, Species, SpawnTable, SpeciesTable};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Ids of everything placed by [`populate`], in placement order
#[derive(Debug, Clone, Default)]
pub struct Rosters {
    pub animals: Vec<EntityId>,
    pub plants: Vec<EntityId>,
}

/// Fill an empty world cell by cell in row-major order.
///
/// Each cell gets one draw against the animal table and an independent draw
/// against the environment table. Animals start at a random age below their
/// maximum, with a random sex for sexual species.
pub fn populate(
    world: &mut World,
    spawn: &SpawnTable,
    species: &SpeciesTable,
    rng: &mut ChaCha8Rng,
) -> Rosters {
    let mut rosters = Rosters::default();
    let locations: Vec<Location> = world.animal_field().locations().collect();

    for location in locations {
        if let Some(kind) = spawn.pick_animal(rng) {
            if let Some(params) = species.animal(kind) {
                let sex = match params.reproduction {
                    Reproduction::Sexual => Some(Sex::random(rng)),
                    Reproduction::Asexual => None,
                };
                let age = rng.gen_range(0..params.max_age.max(1));
                rosters
                    .animals
                    .push(world.spawn_animal(kind, location, params, sex, age));
            }
        }

        match spawn.pick_environment(rng) {
            Some(Species::Water) => {
                world.add_water(location);
            }
            Some(kind) => {
                if let Some(params) = species.plant(kind) {
                    rosters.plants.push(world.spawn_plant(kind, location, params));
                }
            }
            None => {}
        }
    }

    debug!(
        event = "populated",
        animals = rosters.animals.len(),
        plants = rosters.plants.len(),
        "Initial population placed"
    );
    rosters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organism::Living;
    use eco_core::{Layer, SpawnChance};
    use rand::SeedableRng;

    #[test]
    fn test_certain_spawn_fills_every_cell() {
        let mut world = World::new(3, 4);
        let spawn = SpawnTable {
            animals: vec![SpawnChance::new(Species::Turtle, 1.0)],
            environment: vec![SpawnChance::new(Species::Bush, 1.0)],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let rosters = populate(&mut world, &spawn, &SpeciesTable::default(), &mut rng);

        assert_eq!(rosters.animals.len(), 12);
        assert_eq!(rosters.plants.len(), 12);
        assert_eq!(world.animal_field().occupied_count(), 12);
        assert!(world.animals().all(|a| a.sex.is_none() && a.age < 250));
    }

    #[test]
    fn test_empty_table_spawns_nothing() {
        let mut world = World::new(4, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let rosters = populate(&mut world, &SpawnTable::empty(), &SpeciesTable::default(), &mut rng);

        assert!(rosters.animals.is_empty());
        assert!(rosters.plants.is_empty());
        assert_eq!(world.environment_field().occupied_count(), 0);
    }

    #[test]
    fn test_water_is_not_in_plant_roster() {
        let mut world = World::new(2, 2);
        let spawn = SpawnTable {
            animals: vec![],
            environment: vec![SpawnChance::new(Species::Water, 1.0)],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let rosters = populate(&mut world, &spawn, &SpeciesTable::default(), &mut rng);

        assert!(rosters.plants.is_empty());
        assert_eq!(world.water().count(), 4);
        assert!(world
            .occupancy(Layer::Environment)
            .iter()
            .all(|cell| *cell == Some(Species::Water)));
    }

    #[test]
    fn test_sexual_species_get_a_sex() {
        let mut world = World::new(6, 6);
        let spawn = SpawnTable {
            animals: vec![SpawnChance::new(Species::Gastonia, 1.0)],
            environment: vec![],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        populate(&mut world, &spawn, &SpeciesTable::default(), &mut rng);

        assert!(world.animals().all(|a| a.sex.is_some()));
        assert!(world.animals().any(|a| a.sex == Some(Sex::Male)));
        assert!(world.animals().any(|a| a.sex == Some(Sex::Female)));
        assert!(world.animals().all(|a| a.species() == Species::Gastonia));
    }
}
