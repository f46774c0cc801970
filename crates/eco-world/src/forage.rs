//! Diets and the food search.

use crate::organism::Forager;
use crate::world::World;
use eco_core::{Layer, Location, Species, SpeciesTable};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};

/// Which species each eater may eat, keyed by species tag
#[derive(Debug, Clone, Default)]
pub struct DietTable {
    edible: HashMap<Species, HashSet<Species>>,
}

impl DietTable {
    pub fn from_species(table: &SpeciesTable) -> Self {
        let edible = table
            .animals
            .iter()
            .filter_map(|(species, params)| {
                params
                    .feeding
                    .as_ref()
                    .map(|feeding| (*species, feeding.diet.iter().copied().collect()))
            })
            .collect();
        Self { edible }
    }

    pub fn can_eat(&self, eater: Species, prey: Species) -> bool {
        self.edible
            .get(&eater)
            .is_some_and(|diet| diet.contains(&prey))
    }
}

/// Look for food, first on the eater's own environment cell, then among its
/// neighbours on the animal field.
///
/// The first live, edible organism found is killed and the forager's level is
/// raised to its food value. Returns the prey's cell when an adjacent animal
/// was eaten, and `None` when the meal was on the eater's own cell or nothing
/// was found.
pub fn find_food(
    world: &mut World,
    diets: &DietTable,
    eater: Species,
    location: Location,
    forager: &mut Forager,
    rng: &mut ChaCha8Rng,
) -> Option<Location> {
    let edible = |prey: Species| diets.can_eat(eater, prey);

    if let Some(food_value) = world.eat_at(Layer::Environment, location, edible) {
        forager.eat(food_value);
        return None;
    }

    let adjacent = world.animal_field().adjacent_locations(location, rng);
    for candidate in adjacent {
        if let Some(food_value) = world.eat_at(Layer::Animal, candidate, edible) {
            forager.eat(food_value);
            return Some(candidate);
        }
    }

    None
}
