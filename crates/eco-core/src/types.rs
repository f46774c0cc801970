//! Core type definitions for the simulation.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for anything that can sit on a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cell on a field, addressed by row then column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub row: i32,
    pub col: i32,
}

impl Location {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The two overlaid fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Animal,
    Environment,
}

/// Species tag for every kind of field occupant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    TRex,
    Ceratosaurus,
    Allosaurus,
    Turtle,
    Gastonia,
    Yinlong,
    Bush,
    Water,
}

impl Species {
    pub const ANIMALS: [Species; 6] = [
        Species::TRex,
        Species::Ceratosaurus,
        Species::Allosaurus,
        Species::Turtle,
        Species::Gastonia,
        Species::Yinlong,
    ];

    pub const ENVIRONMENT: [Species; 2] = [Species::Bush, Species::Water];

    pub fn layer(&self) -> Layer {
        match self {
            Species::Bush | Species::Water => Layer::Environment,
            _ => Layer::Animal,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Species::TRex => "TRex",
            Species::Ceratosaurus => "Ceratosaurus",
            Species::Allosaurus => "Allosaurus",
            Species::Turtle => "Turtle",
            Species::Gastonia => "Gastonia",
            Species::Yinlong => "Yinlong",
            Species::Bush => "Bush",
            Species::Water => "Water",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sex of an animal. Only females give birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Fair coin flip, used for wild-spawned animals and newborns
    pub fn random(rng: &mut ChaCha8Rng) -> Self {
        if rng.gen_bool(0.5) {
            Sex::Male
        } else {
            Sex::Female
        }
    }

    pub fn gives_birth(&self) -> bool {
        matches!(self, Sex::Female)
    }
}

/// Weather for a single tick
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Weather {
    Foggy,
    Raining,
    Snowing,
    #[default]
    Clear,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weather::Foggy => "foggy",
            Weather::Raining => "raining",
            Weather::Snowing => "snowing",
            Weather::Clear => "clear",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    /// Even steps are day, odd steps are night
    pub fn from_step(step: u64) -> Self {
        if step % 2 == 0 {
            TimeOfDay::Day
        } else {
            TimeOfDay::Night
        }
    }
}

/// Ambient conditions handed to every organism during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditions {
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
}

impl Conditions {
    pub fn new(time_of_day: TimeOfDay, weather: Weather) -> Self {
        Self {
            time_of_day,
            weather,
        }
    }
}
