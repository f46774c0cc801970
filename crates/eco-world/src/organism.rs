//! Organism state: the shared living core plus animal and plant refinements.

use crate::field::Field;
use eco_core::{EntityId, Location, Sex, Species, SpeciesParams};
use serde::{Deserialize, Serialize};

/// Why an organism died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Starvation,
    Thirst,
    Overcrowding,
    Eaten,
}

/// Alive flag, food value and field placement shared by every organism.
///
/// `location` is `Some` exactly while the organism is alive and placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    pub id: EntityId,
    pub species: Species,
    food_value: i32,
    alive: bool,
    location: Option<Location>,
    cause_of_death: Option<DeathCause>,
}

impl Organism {
    pub fn new(id: EntityId, species: Species, food_value: i32) -> Self {
        Self {
            id,
            species,
            food_value,
            alive: true,
            location: None,
            cause_of_death: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn food_value(&self) -> i32 {
        self.food_value
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn cause_of_death(&self) -> Option<DeathCause> {
        self.cause_of_death
    }

    /// Move to `location` on `field`, vacating the current cell first
    pub fn set_location(&mut self, field: &mut Field, location: Location) {
        if let Some(old) = self.location {
            field.clear(old);
        }
        self.location = Some(location);
        field.place(self.id, location);
    }

    /// Kill the organism and release its cell.
    ///
    /// Returns `false` if it was already dead; nothing changes in that case.
    pub fn set_dead(&mut self, field: &mut Field, cause: DeathCause) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.cause_of_death = Some(cause);
        if let Some(location) = self.location.take() {
            field.clear(location);
        }
        true
    }
}

/// Access to the living core of an animal or plant
pub trait Living {
    fn organism(&self) -> &Organism;

    fn id(&self) -> EntityId {
        self.organism().id
    }

    fn species(&self) -> Species {
        self.organism().species
    }

    fn is_alive(&self) -> bool {
        self.organism().is_alive()
    }

    fn location(&self) -> Option<Location> {
        self.organism().location()
    }
}

/// Hunger counter of an animal that eats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forager {
    pub food_level: i32,
}

impl Forager {
    pub fn new(food_level: i32) -> Self {
        Self { food_level }
    }

    /// One tick of hunger. Returns `true` once the animal has starved.
    pub fn hunger(&mut self) -> bool {
        self.food_level -= 1;
        self.food_level <= 0
    }

    /// Eating tops the level up to the prey's value; it never lowers it
    pub fn eat(&mut self, food_value: i32) {
        self.food_level = self.food_level.max(food_value);
    }

    pub fn is_hungry(&self, threshold: i32) -> bool {
        self.food_level < threshold
    }
}

/// Thirst counter of an animal that drinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thirst {
    pub level: i32,
    pub max: i32,
}

impl Thirst {
    pub fn new(max: i32) -> Self {
        Self { level: max, max }
    }

    /// One tick of thirst. Returns `true` once the animal has died of it.
    pub fn dry(&mut self) -> bool {
        self.level -= 1;
        self.level <= 0
    }

    pub fn drink(&mut self) {
        self.level = self.max;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub organism: Organism,
    pub age: u32,
    /// `None` for species that reproduce without a partner
    pub sex: Option<Sex>,
    pub forager: Option<Forager>,
    pub thirst: Option<Thirst>,
}

impl Animal {
    /// A detached animal; place it with [`Organism::set_location`]
    pub fn new(
        id: EntityId,
        species: Species,
        params: &SpeciesParams,
        sex: Option<Sex>,
        age: u32,
    ) -> Self {
        Self {
            organism: Organism::new(id, species, params.food_value),
            age,
            sex,
            forager: params
                .feeding
                .as_ref()
                .map(|feeding| Forager::new(feeding.initial_food_level)),
            thirst: params.thirst.map(|thirst| Thirst::new(thirst.max_thirst)),
        }
    }

    /// Whether this animal is the one that gives birth
    pub fn gives_birth(&self) -> bool {
        self.sex.map_or(true, |sex| sex.gives_birth())
    }

    pub fn can_breed(&self, params: &SpeciesParams) -> bool {
        self.age >= params.breeding_age
    }

    pub fn food_level(&self) -> Option<i32> {
        self.forager.map(|forager| forager.food_level)
    }
}

impl Living for Animal {
    fn organism(&self) -> &Organism {
        &self.organism
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub organism: Organism,
    pub age: u32,
}

impl Plant {
    pub fn new(id: EntityId, species: Species, food_value: i32) -> Self {
        Self {
            organism: Organism::new(id, species, food_value),
            age: 0,
        }
    }
}

impl Living for Plant {
    fn organism(&self) -> &Organism {
        &self.organism
    }
}
