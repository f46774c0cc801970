//! Per-species behaviour parameters.
//!
//! Every animal runs the same per-tick template; the differences between
//! species live entirely in [`SpeciesParams`]. Plants get [`PlantParams`].

use crate::types::{Conditions, Species, TimeOfDay, Weather};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A probability that may vary with weather and time of day.
///
/// Resolution order is weather override, then day/night override, then base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    pub base: f64,
    #[serde(default)]
    pub day: Option<f64>,
    #[serde(default)]
    pub night: Option<f64>,
    #[serde(default)]
    pub weather: BTreeMap<Weather, f64>,
}

impl ProbabilityTable {
    pub fn constant(base: f64) -> Self {
        Self {
            base,
            day: None,
            night: None,
            weather: BTreeMap::new(),
        }
    }

    pub fn day_night(day: f64, night: f64) -> Self {
        Self {
            base: night,
            day: Some(day),
            night: Some(night),
            weather: BTreeMap::new(),
        }
    }

    pub fn with_weather(mut self, weather: Weather, probability: f64) -> Self {
        self.weather.insert(weather, probability);
        self
    }

    pub fn resolve(&self, conditions: &Conditions) -> f64 {
        if let Some(p) = self.weather.get(&conditions.weather) {
            return *p;
        }
        let by_time = match conditions.time_of_day {
            TimeOfDay::Day => self.day,
            TimeOfDay::Night => self.night,
        };
        by_time.unwrap_or(self.base)
    }

    /// Every probability this table can resolve to
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        std::iter::once(self.base)
            .chain(self.day)
            .chain(self.night)
            .chain(self.weather.values().copied())
    }
}

/// Which part of the day an activity is allowed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    Always,
    DayOnly,
    NightOnly,
}

impl Activity {
    pub fn permits(&self, time_of_day: TimeOfDay) -> bool {
        match self {
            Activity::Always => true,
            Activity::DayOnly => time_of_day == TimeOfDay::Day,
            Activity::NightOnly => time_of_day == TimeOfDay::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reproduction {
    /// A female needs an adjacent male of breeding age
    Sexual,
    /// Every individual may give birth on its own
    Asexual,
}

/// Hunger and diet for species that eat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingParams {
    /// Food level at spawn and at birth
    pub initial_food_level: i32,
    /// The animal looks for food only while its food level is below this
    pub hunger_threshold: i32,
    pub diet: BTreeSet<Species>,
    /// Chance to hunt at all when the weather is foggy
    pub fog_feed_probability: f64,
    /// Whether the animal moves onto the cell of adjacent prey it ate
    pub relocate_on_kill: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirstParams {
    /// Thirst level at spawn, and after drinking
    pub max_thirst: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Food level granted to whatever eats this animal
    pub food_value: i32,
    pub max_age: u32,
    pub breeding_age: u32,
    pub breeding_probability: ProbabilityTable,
    pub max_litter_size: u32,
    pub reproduction: Reproduction,
    /// Gate for everything after aging and hunger
    pub activity: Activity,
    /// Extra gate on giving birth
    pub birth_window: Activity,
    pub feeding: Option<FeedingParams>,
    pub thirst: Option<ThirstParams>,
}

impl SpeciesParams {
    pub fn trex() -> Self {
        Self {
            food_value: 500,
            max_age: 500,
            breeding_age: 60,
            breeding_probability: ProbabilityTable::constant(0.5),
            max_litter_size: 1,
            reproduction: Reproduction::Sexual,
            activity: Activity::DayOnly,
            birth_window: Activity::Always,
            feeding: Some(FeedingParams {
                initial_food_level: 50,
                hunger_threshold: 30,
                diet: BTreeSet::from([
                    Species::Allosaurus,
                    Species::Ceratosaurus,
                    Species::Gastonia,
                    Species::Turtle,
                    Species::Yinlong,
                ]),
                fog_feed_probability: 0.0,
                relocate_on_kill: true,
            }),
            thirst: None,
        }
    }

    pub fn ceratosaurus() -> Self {
        Self {
            food_value: 90,
            max_age: 500,
            breeding_age: 40,
            breeding_probability: ProbabilityTable::constant(0.4),
            max_litter_size: 2,
            reproduction: Reproduction::Sexual,
            activity: Activity::NightOnly,
            birth_window: Activity::Always,
            feeding: Some(FeedingParams {
                initial_food_level: 35,
                hunger_threshold: 35,
                diet: BTreeSet::from([Species::Gastonia, Species::Yinlong, Species::Turtle]),
                fog_feed_probability: 1.0,
                relocate_on_kill: true,
            }),
            thirst: Some(ThirstParams { max_thirst: 30 }),
        }
    }

    pub fn allosaurus() -> Self {
        Self {
            food_value: 60,
            max_age: 500,
            breeding_age: 40,
            breeding_probability: ProbabilityTable::constant(0.4),
            max_litter_size: 1,
            reproduction: Reproduction::Sexual,
            activity: Activity::Always,
            birth_window: Activity::Always,
            feeding: Some(FeedingParams {
                initial_food_level: 35,
                hunger_threshold: 35,
                diet: BTreeSet::from([Species::Turtle, Species::Gastonia, Species::Yinlong]),
                fog_feed_probability: 0.6,
                relocate_on_kill: true,
            }),
            thirst: None,
        }
    }

    pub fn turtle() -> Self {
        Self {
            food_value: 30,
            max_age: 250,
            breeding_age: 5,
            breeding_probability: ProbabilityTable::constant(0.09)
                .with_weather(Weather::Snowing, 0.05),
            max_litter_size: 1,
            reproduction: Reproduction::Asexual,
            activity: Activity::Always,
            birth_window: Activity::NightOnly,
            feeding: None,
            thirst: Some(ThirstParams { max_thirst: 15 }),
        }
    }

    pub fn gastonia() -> Self {
        Self {
            food_value: 50,
            max_age: 250,
            breeding_age: 20,
            breeding_probability: ProbabilityTable::day_night(0.3, 0.4),
            max_litter_size: 1,
            reproduction: Reproduction::Sexual,
            activity: Activity::Always,
            birth_window: Activity::Always,
            feeding: Some(grazer_feeding()),
            thirst: None,
        }
    }

    pub fn yinlong() -> Self {
        Self {
            food_value: 50,
            max_age: 250,
            breeding_age: 20,
            breeding_probability: ProbabilityTable::constant(0.4),
            max_litter_size: 1,
            reproduction: Reproduction::Sexual,
            activity: Activity::Always,
            birth_window: Activity::Always,
            feeding: Some(grazer_feeding()),
            thirst: None,
        }
    }

    pub fn defaults_for(species: Species) -> Option<Self> {
        match species {
            Species::TRex => Some(Self::trex()),
            Species::Ceratosaurus => Some(Self::ceratosaurus()),
            Species::Allosaurus => Some(Self::allosaurus()),
            Species::Turtle => Some(Self::turtle()),
            Species::Gastonia => Some(Self::gastonia()),
            Species::Yinlong => Some(Self::yinlong()),
            Species::Bush | Species::Water => None,
        }
    }
}

fn grazer_feeding() -> FeedingParams {
    FeedingParams {
        initial_food_level: 20,
        hunger_threshold: 10,
        diet: BTreeSet::from([Species::Bush]),
        fog_feed_probability: 1.0,
        relocate_on_kill: false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantParams {
    pub food_value: i32,
    pub max_age: u32,
    /// Age from which the plant spreads seeds
    pub spread_age: u32,
    pub spread_probability: ProbabilityTable,
    pub max_spread: u32,
}

impl PlantParams {
    pub fn bush() -> Self {
        Self {
            food_value: 15,
            max_age: 15,
            spread_age: 5,
            spread_probability: ProbabilityTable::constant(0.7)
                .with_weather(Weather::Raining, 0.9)
                .with_weather(Weather::Snowing, 0.1),
            max_spread: 5,
        }
    }
}

/// Parameters for every species in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTable {
    pub animals: BTreeMap<Species, SpeciesParams>,
    pub plants: BTreeMap<Species, PlantParams>,
}

impl Default for SpeciesTable {
    fn default() -> Self {
        let animals = Species::ANIMALS
            .iter()
            .filter_map(|s| SpeciesParams::defaults_for(*s).map(|p| (*s, p)))
            .collect();
        let plants = BTreeMap::from([(Species::Bush, PlantParams::bush())]);
        Self { animals, plants }
    }
}

impl SpeciesTable {
    pub fn animal(&self, species: Species) -> Option<&SpeciesParams> {
        self.animals.get(&species)
    }

    pub fn plant(&self, species: Species) -> Option<&PlantParams> {
        self.plants.get(&species)
    }

    /// Food value of an edible species, if it is one
    pub fn food_value(&self, species: Species) -> Option<i32> {
        self.animal(species)
            .map(|p| p.food_value)
            .or_else(|| self.plant(species).map(|p| p.food_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(time_of_day: TimeOfDay, weather: Weather) -> Conditions {
        Conditions::new(time_of_day, weather)
    }

    #[test]
    fn test_probability_resolution_order() {
        let table = ProbabilityTable::day_night(0.3, 0.4).with_weather(Weather::Snowing, 0.05);

        assert_eq!(table.resolve(&conditions(TimeOfDay::Day, Weather::Clear)), 0.3);
        assert_eq!(table.resolve(&conditions(TimeOfDay::Night, Weather::Clear)), 0.4);
        assert_eq!(table.resolve(&conditions(TimeOfDay::Day, Weather::Snowing)), 0.05);
    }

    #[test]
    fn test_bush_spread_follows_weather() {
        let bush = PlantParams::bush();
        let p = |w| bush.spread_probability.resolve(&conditions(TimeOfDay::Day, w));
        assert_eq!(p(Weather::Raining), 0.9);
        assert_eq!(p(Weather::Snowing), 0.1);
        assert_eq!(p(Weather::Foggy), 0.7);
    }

    #[test]
    fn test_activity_gates() {
        assert!(Activity::Always.permits(TimeOfDay::Night));
        assert!(Activity::DayOnly.permits(TimeOfDay::Day));
        assert!(!Activity::DayOnly.permits(TimeOfDay::Night));
        assert!(!Activity::NightOnly.permits(TimeOfDay::Day));
    }

    #[test]
    fn test_default_table_covers_all_animals() {
        let table = SpeciesTable::default();
        for species in Species::ANIMALS {
            assert!(table.animal(species).is_some(), "missing {}", species);
        }
        assert_eq!(table.food_value(Species::Bush), Some(15));
        assert_eq!(table.food_value(Species::Water), None);
    }

    #[test]
    fn test_only_turtle_is_asexual() {
        let table = SpeciesTable::default();
        for (species, params) in &table.animals {
            let expected = if *species == Species::Turtle {
                Reproduction::Asexual
            } else {
                Reproduction::Sexual
            };
            assert_eq!(params.reproduction, expected);
        }
    }
}
