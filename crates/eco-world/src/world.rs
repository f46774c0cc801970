//! Entity store and the two overlaid fields.

use crate::field::Field;
use crate::organism::{Animal, DeathCause, Living, Plant};
use eco_core::{EntityId, Layer, Location, PlantParams, Sex, Species, SpeciesParams};
use std::collections::HashMap;
use tracing::trace;

/// Owns every animal, plant and water marker, and the fields they occupy.
///
/// An entity being advanced is taken out of its map for the duration of its
/// turn and returned afterwards; its cell stays bound while it is out.
pub struct World {
    animal_field: Field,
    environment_field: Field,
    animals: HashMap<EntityId, Animal>,
    plants: HashMap<EntityId, Plant>,
    water: HashMap<EntityId, Location>,
    next_id: u64,
}

impl World {
    pub fn new(depth: i32, width: i32) -> Self {
        Self {
            animal_field: Field::new(depth, width),
            environment_field: Field::new(depth, width),
            animals: HashMap::new(),
            plants: HashMap::new(),
            water: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn animal_field(&self) -> &Field {
        &self.animal_field
    }

    pub fn environment_field(&self) -> &Field {
        &self.environment_field
    }

    pub fn field(&self, layer: Layer) -> &Field {
        match layer {
            Layer::Animal => &self.animal_field,
            Layer::Environment => &self.environment_field,
        }
    }

    pub fn animal_field_mut(&mut self) -> &mut Field {
        &mut self.animal_field
    }

    pub fn environment_field_mut(&mut self) -> &mut Field {
        &mut self.environment_field
    }

    pub fn animal(&self, id: EntityId) -> Option<&Animal> {
        self.animals.get(&id)
    }

    pub fn animal_mut(&mut self, id: EntityId) -> Option<&mut Animal> {
        self.animals.get_mut(&id)
    }

    pub fn plant(&self, id: EntityId) -> Option<&Plant> {
        self.plants.get(&id)
    }

    pub fn plant_mut(&mut self, id: EntityId) -> Option<&mut Plant> {
        self.plants.get_mut(&id)
    }

    pub fn animals(&self) -> impl Iterator<Item = &Animal> {
        self.animals.values()
    }

    pub fn plants(&self) -> impl Iterator<Item = &Plant> {
        self.plants.values()
    }

    pub fn water(&self) -> impl Iterator<Item = (EntityId, Location)> + '_ {
        self.water.iter().map(|(id, loc)| (*id, *loc))
    }

    pub fn animal_count(&self) -> usize {
        self.animals.len()
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create an animal and place it at `location` on the animal field
    pub fn spawn_animal(
        &mut self,
        species: Species,
        location: Location,
        params: &SpeciesParams,
        sex: Option<Sex>,
        age: u32,
    ) -> EntityId {
        let id = self.next_id();
        let mut animal = Animal::new(id, species, params, sex, age);
        animal.organism.set_location(&mut self.animal_field, location);
        trace!(id = %id, species = %species, location = %location, "Animal placed");
        self.animals.insert(id, animal);
        id
    }

    /// Create a plant and place it at `location` on the environment field
    pub fn spawn_plant(
        &mut self,
        species: Species,
        location: Location,
        params: &PlantParams,
    ) -> EntityId {
        let id = self.next_id();
        let mut plant = Plant::new(id, species, params.food_value);
        plant.organism.set_location(&mut self.environment_field, location);
        self.plants.insert(id, plant);
        id
    }

    /// Put a water marker at `location` on the environment field
    pub fn add_water(&mut self, location: Location) -> EntityId {
        let id = self.next_id();
        self.environment_field.clear(location);
        self.environment_field.place(id, location);
        self.water.insert(id, location);
        id
    }

    pub fn is_water(&self, location: Location) -> bool {
        self.environment_field
            .object_at(location)
            .is_some_and(|id| self.water.contains_key(&id))
    }

    /// Species of whatever `id` is on `layer`
    pub fn species_of(&self, layer: Layer, id: EntityId) -> Option<Species> {
        match layer {
            Layer::Animal => self.animals.get(&id).map(|a| a.species()),
            Layer::Environment => self
                .plants
                .get(&id)
                .map(|p| p.species())
                .or_else(|| self.water.contains_key(&id).then_some(Species::Water)),
        }
    }

    /// Kill the organism at `location` if it is alive and `edible` accepts
    /// its species. Returns the food value it yields.
    pub fn eat_at(
        &mut self,
        layer: Layer,
        location: Location,
        edible: impl Fn(Species) -> bool,
    ) -> Option<i32> {
        let id = self.field(layer).object_at(location)?;
        let (organism, field) = match layer {
            Layer::Animal => (
                &mut self.animals.get_mut(&id)?.organism,
                &mut self.animal_field,
            ),
            Layer::Environment => (
                &mut self.plants.get_mut(&id)?.organism,
                &mut self.environment_field,
            ),
        };
        if !organism.is_alive() || !edible(organism.species) {
            return None;
        }
        organism.set_dead(field, DeathCause::Eaten);
        Some(organism.food_value())
    }

    /// Take an animal out of the store for its turn
    pub fn take_animal(&mut self, id: EntityId) -> Option<Animal> {
        self.animals.remove(&id)
    }

    pub fn return_animal(&mut self, animal: Animal) {
        self.animals.insert(animal.id(), animal);
    }

    pub fn take_plant(&mut self, id: EntityId) -> Option<Plant> {
        self.plants.remove(&id)
    }

    pub fn return_plant(&mut self, plant: Plant) {
        self.plants.insert(plant.id(), plant);
    }

    /// Drop dead animals from the store and hand them back
    pub fn remove_dead_animals(&mut self) -> Vec<Animal> {
        let dead: Vec<EntityId> = self
            .animals
            .iter()
            .filter(|(_, animal)| !animal.is_alive())
            .map(|(id, _)| *id)
            .collect();
        dead.into_iter()
            .filter_map(|id| self.animals.remove(&id))
            .collect()
    }

    pub fn remove_dead_plants(&mut self) -> Vec<Plant> {
        let dead: Vec<EntityId> = self
            .plants
            .iter()
            .filter(|(_, plant)| !plant.is_alive())
            .map(|(id, _)| *id)
            .collect();
        dead.into_iter()
            .filter_map(|id| self.plants.remove(&id))
            .collect()
    }

    /// Species in every cell of `layer`, row-major
    pub fn occupancy(&self, layer: Layer) -> Vec<Option<Species>> {
        let field = self.field(layer);
        field
            .locations()
            .map(|loc| {
                field
                    .object_at(loc)
                    .and_then(|id| self.species_of(layer, id))
            })
            .collect()
    }

    /// Remove everything from both fields
    pub fn clear(&mut self) {
        self.animal_field.clear_all();
        self.environment_field.clear_all();
        self.animals.clear();
        self.plants.clear();
        self.water.clear();
    }
}
