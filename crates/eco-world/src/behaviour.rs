//! Per-tick behaviour shared by every species.
//!
//! Animals run one template: age, hunger and thirst, the activity gate,
//! drinking, birth, feeding, then a move or death by overcrowding. Plants age
//! and spread seeds. What differs between species comes from their
//! parameters.

use crate::forage::{find_food, DietTable};
use crate::organism::{Animal, DeathCause, Living, Plant};
use crate::world::World;
use eco_core::{
    Conditions, EntityId, PlantParams, Reproduction, Sex, SpeciesParams, SpeciesTable, Weather,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Rules that stay fixed for a whole run
#[derive(Debug, Clone)]
pub struct Ecology {
    pub species: SpeciesTable,
    pub diets: DietTable,
}

impl Ecology {
    pub fn new(species: SpeciesTable) -> Self {
        let diets = DietTable::from_species(&species);
        Self { species, diets }
    }
}

impl Default for Ecology {
    fn default() -> Self {
        Self::new(SpeciesTable::default())
    }
}

impl Animal {
    /// Advance this animal by one tick.
    ///
    /// The animal must be out of the world's store while it acts. Newborns
    /// are placed on the field right away and their ids pushed to `newborns`.
    pub fn act(
        &mut self,
        world: &mut World,
        ecology: &Ecology,
        conditions: Conditions,
        rng: &mut ChaCha8Rng,
        newborns: &mut Vec<EntityId>,
    ) {
        let Some(params) = ecology.species.animal(self.species()) else {
            return;
        };
        if !self.is_alive() {
            return;
        }

        self.age += 1;
        if self.age > params.max_age {
            self.die(world, DeathCause::OldAge);
            return;
        }
        if self.forager.as_mut().is_some_and(|forager| forager.hunger()) {
            self.die(world, DeathCause::Starvation);
            return;
        }
        if self.thirst.as_mut().is_some_and(|thirst| thirst.dry()) {
            self.die(world, DeathCause::Thirst);
            return;
        }

        if !params.activity.permits(conditions.time_of_day) {
            return;
        }
        let Some(location) = self.location() else {
            return;
        };

        if self.thirst.is_some() && world.is_water(location) {
            if let Some(thirst) = self.thirst.as_mut() {
                thirst.drink();
            }
        }

        if self.gives_birth() && params.birth_window.permits(conditions.time_of_day) {
            self.give_birth(world, params, conditions, rng, newborns);
        }

        let mut target = None;
        if let (Some(feeding), Some(forager)) = (params.feeding.as_ref(), self.forager.as_mut()) {
            if forager.is_hungry(feeding.hunger_threshold)
                && (conditions.weather != Weather::Foggy
                    || rng.gen::<f64>() < feeding.fog_feed_probability)
            {
                let prey_cell = find_food(
                    world,
                    &ecology.diets,
                    self.organism.species,
                    location,
                    forager,
                    rng,
                );
                if feeding.relocate_on_kill {
                    target = prey_cell;
                }
            }
        }

        let target = target.or_else(|| world.animal_field().free_adjacent_location(location, rng));
        match target {
            Some(next) => {
                trace!(id = %self.id(), from = %location, to = %next, "Animal moved");
                self.organism.set_location(world.animal_field_mut(), next);
            }
            None => self.die(world, DeathCause::Overcrowding),
        }
    }

    fn die(&mut self, world: &mut World, cause: DeathCause) {
        self.organism.set_dead(world.animal_field_mut(), cause);
    }

    /// Whether an adjacent animal of the same species can father a litter
    fn has_partner(&self, world: &World, params: &SpeciesParams, rng: &mut ChaCha8Rng) -> bool {
        let Some(location) = self.location() else {
            return false;
        };
        world
            .animal_field()
            .adjacent_locations(location, rng)
            .into_iter()
            .filter_map(|next| world.animal_field().object_at(next))
            .filter_map(|id| world.animal(id))
            .any(|other| {
                other.is_alive()
                    && other.species() == self.species()
                    && other.sex == Some(Sex::Male)
                    && other.can_breed(params)
            })
    }

    /// Litter size for this tick; zero when the roll fails
    fn breed(&self, params: &SpeciesParams, conditions: Conditions, rng: &mut ChaCha8Rng) -> u32 {
        let probability = params.breeding_probability.resolve(&conditions);
        if self.can_breed(params) && rng.gen::<f64>() < probability {
            rng.gen_range(1..=params.max_litter_size)
        } else {
            0
        }
    }

    fn give_birth(
        &self,
        world: &mut World,
        params: &SpeciesParams,
        conditions: Conditions,
        rng: &mut ChaCha8Rng,
        newborns: &mut Vec<EntityId>,
    ) {
        let Some(location) = self.location() else {
            return;
        };
        if params.reproduction == Reproduction::Sexual && !self.has_partner(world, params, rng) {
            return;
        }

        let births = self.breed(params, conditions, rng);
        if births == 0 {
            return;
        }

        let free = world.animal_field().free_adjacent_locations(location, rng);
        for cell in free.into_iter().take(births as usize) {
            let sex = match params.reproduction {
                Reproduction::Sexual => Some(Sex::random(rng)),
                Reproduction::Asexual => None,
            };
            let id = world.spawn_animal(self.species(), cell, params, sex, 0);
            newborns.push(id);
        }
    }
}

impl Plant {
    /// Advance this plant by one tick, pushing seedlings to `seedlings`
    pub fn act(
        &mut self,
        world: &mut World,
        params: &PlantParams,
        conditions: Conditions,
        rng: &mut ChaCha8Rng,
        seedlings: &mut Vec<EntityId>,
    ) {
        if !self.is_alive() {
            return;
        }

        self.age += 1;
        if self.age > params.max_age {
            self.organism
                .set_dead(world.environment_field_mut(), DeathCause::OldAge);
            return;
        }

        let Some(location) = self.location() else {
            return;
        };
        let spreads = self.spread(params, conditions, rng);
        if spreads == 0 {
            return;
        }
        let free = world
            .environment_field()
            .free_adjacent_locations(location, rng);
        for cell in free.into_iter().take(spreads as usize) {
            seedlings.push(world.spawn_plant(self.species(), cell, params));
        }
    }

    fn spread(&self, params: &PlantParams, conditions: Conditions, rng: &mut ChaCha8Rng) -> u32 {
        let probability = params.spread_probability.resolve(&conditions);
        if self.age >= params.spread_age && rng.gen::<f64>() < probability {
            rng.gen_range(1..=params.max_spread)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::{Activity, Location, ProbabilityTable, Species, TimeOfDay};
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    fn night() -> Conditions {
        Conditions::new(TimeOfDay::Night, Weather::Clear)
    }

    fn day() -> Conditions {
        Conditions::new(TimeOfDay::Day, Weather::Clear)
    }

    /// Always active, always breeds, big litters, no thirst
    fn fertile(mut params: SpeciesParams) -> SpeciesParams {
        params.activity = Activity::Always;
        params.birth_window = Activity::Always;
        params.breeding_age = 0;
        params.breeding_probability = ProbabilityTable::constant(1.0);
        params.max_litter_size = 1;
        params.thirst = None;
        params
    }

    fn ecology_with(species: Species, params: SpeciesParams) -> Ecology {
        let mut table = SpeciesTable::default();
        table.animals.insert(species, params);
        Ecology::new(table)
    }

    fn act(world: &mut World, ecology: &Ecology, id: EntityId, conditions: Conditions) -> Vec<EntityId> {
        let mut rng = rng();
        let mut newborns = Vec::new();
        let mut animal = world.take_animal(id).unwrap();
        animal.act(world, ecology, conditions, &mut rng, &mut newborns);
        world.return_animal(animal);
        newborns
    }

    #[test]
    fn test_old_age_death() {
        let ecology = Ecology::default();
        let mut world = World::new(5, 5);
        let params = SpeciesParams::yinlong();
        let id = world.spawn_animal(
            Species::Yinlong,
            Location::new(2, 2),
            &params,
            Some(Sex::Male),
            params.max_age,
        );

        act(&mut world, &ecology, id, day());

        let yinlong = world.animal(id).unwrap();
        assert!(!yinlong.is_alive());
        assert_eq!(yinlong.organism.cause_of_death(), Some(DeathCause::OldAge));
        assert_eq!(world.animal_field().occupied_count(), 0);
    }

    #[test]
    fn test_starvation_death() {
        let ecology = Ecology::default();
        let mut world = World::new(5, 5);
        let id = world.spawn_animal(
            Species::Gastonia,
            Location::new(2, 2),
            &SpeciesParams::gastonia(),
            Some(Sex::Male),
            0,
        );
        world.animal_mut(id).unwrap().forager.as_mut().unwrap().food_level = 1;

        act(&mut world, &ecology, id, day());

        let cause = world.animal(id).unwrap().organism.cause_of_death();
        assert_eq!(cause, Some(DeathCause::Starvation));
    }

    #[test]
    fn test_thirst_death_and_drinking() {
        let ecology = Ecology::default();
        let mut world = World::new(5, 5);
        let params = SpeciesParams::turtle();

        let thirsty = world.spawn_animal(Species::Turtle, Location::new(0, 0), &params, None, 0);
        world.animal_mut(thirsty).unwrap().thirst.as_mut().unwrap().level = 1;
        act(&mut world, &ecology, thirsty, day());
        assert_eq!(
            world.animal(thirsty).unwrap().organism.cause_of_death(),
            Some(DeathCause::Thirst)
        );

        world.add_water(Location::new(4, 4));
        let drinker = world.spawn_animal(Species::Turtle, Location::new(4, 4), &params, None, 0);
        world.animal_mut(drinker).unwrap().thirst.as_mut().unwrap().level = 5;
        act(&mut world, &ecology, drinker, day());
        let turtle = world.animal(drinker).unwrap();
        assert!(turtle.is_alive());
        assert_eq!(turtle.thirst.unwrap().level, 15);
    }

    #[test]
    fn test_activity_gate_keeps_animal_still() {
        let ecology = Ecology::default();
        let mut world = World::new(5, 5);
        let start = Location::new(2, 2);
        // Ceratosaurus only acts at night
        let id = world.spawn_animal(
            Species::Ceratosaurus,
            start,
            &SpeciesParams::ceratosaurus(),
            Some(Sex::Male),
            10,
        );

        act(&mut world, &ecology, id, day());
        let cerato = world.animal(id).unwrap();
        assert_eq!(cerato.location(), Some(start));
        assert_eq!(cerato.age, 11);

        act(&mut world, &ecology, id, night());
        assert_ne!(world.animal(id).unwrap().location(), Some(start));
    }

    #[test]
    fn test_no_partner_no_offspring() {
        let ecology = ecology_with(Species::Yinlong, fertile(SpeciesParams::yinlong()));
        let mut world = World::new(5, 5);
        let params = ecology.species.animal(Species::Yinlong).unwrap().clone();

        let mother = world.spawn_animal(Species::Yinlong, Location::new(2, 2), &params, Some(Sex::Female), 30);
        // A female neighbour and a male of another species do not count
        world.spawn_animal(Species::Yinlong, Location::new(1, 1), &params, Some(Sex::Female), 30);
        world.spawn_animal(
            Species::Gastonia,
            Location::new(3, 3),
            &SpeciesParams::gastonia(),
            Some(Sex::Male),
            30,
        );

        let newborns = act(&mut world, &ecology, mother, day());
        assert!(newborns.is_empty());
    }

    #[test]
    fn test_partner_too_young_blocks_birth() {
        let mut params = fertile(SpeciesParams::yinlong());
        params.breeding_age = 20;
        let ecology = ecology_with(Species::Yinlong, params.clone());
        let mut world = World::new(5, 5);

        let mother = world.spawn_animal(Species::Yinlong, Location::new(2, 2), &params, Some(Sex::Female), 30);
        world.spawn_animal(Species::Yinlong, Location::new(2, 3), &params, Some(Sex::Male), 5);

        assert!(act(&mut world, &ecology, mother, day()).is_empty());
    }

    #[test]
    fn test_mother_too_young_blocks_birth() {
        let mut params = fertile(SpeciesParams::yinlong());
        params.breeding_age = 20;
        let ecology = ecology_with(Species::Yinlong, params.clone());
        let mut world = World::new(5, 5);

        let mother = world.spawn_animal(Species::Yinlong, Location::new(2, 2), &params, Some(Sex::Female), 3);
        world.spawn_animal(Species::Yinlong, Location::new(2, 3), &params, Some(Sex::Male), 30);

        assert!(act(&mut world, &ecology, mother, day()).is_empty());
    }

    #[test]
    fn test_partner_enables_birth() {
        let ecology = ecology_with(Species::Yinlong, fertile(SpeciesParams::yinlong()));
        let mut world = World::new(5, 5);
        let params = ecology.species.animal(Species::Yinlong).unwrap().clone();

        let mother = world.spawn_animal(Species::Yinlong, Location::new(2, 2), &params, Some(Sex::Female), 30);
        world.spawn_animal(Species::Yinlong, Location::new(2, 3), &params, Some(Sex::Male), 30);

        let newborns = act(&mut world, &ecology, mother, day());
        assert_eq!(newborns.len(), 1);
        let young = world.animal(newborns[0]).unwrap();
        assert_eq!(young.age, 0);
        assert_eq!(young.species(), Species::Yinlong);
        assert!(young.sex.is_some());
        assert_eq!(world.animal_field().object_at(young.location().unwrap()), Some(young.id()));
    }

    #[test]
    fn test_litter_bounded_by_free_space() {
        let mut params = fertile(SpeciesParams::turtle());
        params.max_litter_size = 3;

        // A 2x2 field: the mother has three neighbours, two of them taken
        let mut world = World::new(2, 2);
        let mother = world.spawn_animal(Species::Turtle, Location::new(0, 0), &params, None, 10);
        world.spawn_animal(Species::Turtle, Location::new(0, 1), &params, None, 10);
        world.spawn_animal(Species::Turtle, Location::new(1, 0), &params, None, 10);

        let mut rng = rng();
        let mut newborns = Vec::new();
        let turtle = world.take_animal(mother).unwrap();
        // Advance the rng until the roll asks for a full litter
        let mut requested = 0;
        for _ in 0..50 {
            let mut trial = rng.clone();
            if turtle.breed(&params, day(), &mut trial) == 3 {
                requested = 3;
                break;
            }
            rng.gen::<u64>();
        }
        assert_eq!(requested, 3);

        turtle.give_birth(&mut world, &params, day(), &mut rng, &mut newborns);
        world.return_animal(turtle);

        assert_eq!(newborns.len(), 1);
        assert_eq!(world.animal(newborns[0]).unwrap().location(), Some(Location::new(1, 1)));
    }

    #[test]
    fn test_turtle_births_only_at_night() {
        let mut params = SpeciesParams::turtle();
        params.breeding_probability = ProbabilityTable::constant(1.0);
        params.thirst = None;
        let ecology = ecology_with(Species::Turtle, params.clone());
        let mut world = World::new(5, 5);
        let mother = world.spawn_animal(Species::Turtle, Location::new(2, 2), &params, None, 10);

        assert!(act(&mut world, &ecology, mother, day()).is_empty());
        assert_eq!(act(&mut world, &ecology, mother, night()).len(), 1);
    }

    #[test]
    fn test_overcrowding_death() {
        let ecology = Ecology::default();
        let mut world = World::new(1, 1);
        let id = world.spawn_animal(Species::Turtle, Location::new(0, 0), &SpeciesParams::turtle(), None, 0);

        act(&mut world, &ecology, id, day());

        let turtle = world.animal(id).unwrap();
        assert!(!turtle.is_alive());
        assert_eq!(turtle.organism.cause_of_death(), Some(DeathCause::Overcrowding));
        assert_eq!(world.animal_field().occupied_count(), 0);
    }

    #[test]
    fn test_hungry_predator_moves_onto_prey() {
        let ecology = Ecology::default();
        let mut world = World::new(3, 3);
        let prey_loc = Location::new(0, 1);
        let rex = world.spawn_animal(
            Species::TRex,
            Location::new(1, 1),
            &SpeciesParams::trex(),
            Some(Sex::Male),
            100,
        );
        world.animal_mut(rex).unwrap().forager.as_mut().unwrap().food_level = 10;
        let prey = world.spawn_animal(Species::Turtle, prey_loc, &SpeciesParams::turtle(), None, 10);

        act(&mut world, &ecology, rex, day());

        assert!(!world.animal(prey).unwrap().is_alive());
        let rex = world.animal(rex).unwrap();
        assert_eq!(rex.location(), Some(prey_loc));
        assert_eq!(rex.food_level(), Some(30));
        assert_eq!(world.animal_field().object_at(prey_loc), Some(rex.id()));
        assert_eq!(world.animal_field().occupied_count(), 1);
    }

    #[test]
    fn test_trex_does_not_hunt_in_fog() {
        let ecology = Ecology::default();
        let mut world = World::new(3, 3);
        let rex = world.spawn_animal(
            Species::TRex,
            Location::new(1, 1),
            &SpeciesParams::trex(),
            Some(Sex::Male),
            100,
        );
        world.animal_mut(rex).unwrap().forager.as_mut().unwrap().food_level = 10;
        let prey = world.spawn_animal(Species::Turtle, Location::new(0, 1), &SpeciesParams::turtle(), None, 10);

        act(&mut world, &ecology, rex, Conditions::new(TimeOfDay::Day, Weather::Foggy));

        assert!(world.animal(prey).unwrap().is_alive());
        assert_eq!(world.animal(rex).unwrap().food_level(), Some(9));
    }

    #[test]
    fn test_grazer_eats_then_moves_anyway() {
        let ecology = Ecology::default();
        let mut world = World::new(3, 3);
        let start = Location::new(1, 1);
        let bush = world.spawn_plant(Species::Bush, start, &PlantParams::bush());
        let gastonia = world.spawn_animal(
            Species::Gastonia,
            start,
            &SpeciesParams::gastonia(),
            Some(Sex::Male),
            0,
        );
        world.animal_mut(gastonia).unwrap().forager.as_mut().unwrap().food_level = 3;

        act(&mut world, &ecology, gastonia, day());

        assert!(!world.plant(bush).unwrap().is_alive());
        let gastonia = world.animal(gastonia).unwrap();
        assert_eq!(gastonia.food_level(), Some(15));
        assert_ne!(gastonia.location(), Some(start));
    }

    #[test]
    fn test_plant_spreads_into_free_cells() {
        let mut params = PlantParams::bush();
        params.spread_probability = ProbabilityTable::constant(1.0);
        params.max_spread = 1;
        let mut world = World::new(3, 3);
        let id = world.spawn_plant(Species::Bush, Location::new(1, 1), &params);
        world.plant_mut(id).unwrap().age = params.spread_age;

        let mut rng = rng();
        let mut seedlings = Vec::new();
        let mut bush = world.take_plant(id).unwrap();
        bush.act(&mut world, &params, day(), &mut rng, &mut seedlings);
        world.return_plant(bush);

        assert_eq!(seedlings.len(), 1);
        let seedling = world.plant(seedlings[0]).unwrap();
        assert_eq!(seedling.age, 0);
        assert_eq!(world.environment_field().occupied_count(), 2);
    }

    #[test]
    fn test_young_plant_does_not_spread() {
        let mut params = PlantParams::bush();
        params.spread_probability = ProbabilityTable::constant(1.0);
        let mut world = World::new(3, 3);
        let id = world.spawn_plant(Species::Bush, Location::new(1, 1), &params);

        let mut rng = rng();
        let mut seedlings = Vec::new();
        let mut bush = world.take_plant(id).unwrap();
        bush.act(&mut world, &params, day(), &mut rng, &mut seedlings);

        assert!(seedlings.is_empty());
        assert_eq!(bush.age, 1);
    }

    #[test]
    fn test_plant_dies_of_old_age() {
        let params = PlantParams::bush();
        let mut world = World::new(3, 3);
        let loc = Location::new(0, 0);
        let id = world.spawn_plant(Species::Bush, loc, &params);
        world.plant_mut(id).unwrap().age = params.max_age;

        let mut bush = world.take_plant(id).unwrap();
        bush.act(&mut world, &params, day(), &mut rng(), &mut Vec::new());

        assert!(!bush.is_alive());
        assert_eq!(world.environment_field().object_at(loc), None);
    }
}
