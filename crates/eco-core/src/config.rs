//! Configuration types for the simulation.

use crate::error::Result;
use crate::species::SpeciesTable;
use crate::types::{Species, Weather};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

pub const DEFAULT_DEPTH: i32 = 80;
pub const DEFAULT_WIDTH: i32 = 120;
/// Largest number of cells a field may have
pub const MAX_CELLS: u64 = 1 << 22;

/// Chance that a species is spawned in a given cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnChance {
    pub species: Species,
    pub probability: f64,
}

impl SpawnChance {
    pub fn new(species: Species, probability: f64) -> Self {
        Self {
            species,
            probability,
        }
    }
}

/// Per-cell spawn probabilities.
///
/// Each list is walked in order with a fresh draw per entry; the first hit
/// wins. The animal and environment lists are drawn independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnTable {
    pub animals: Vec<SpawnChance>,
    pub environment: Vec<SpawnChance>,
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self {
            animals: vec![
                SpawnChance::new(Species::TRex, 0.005),
                SpawnChance::new(Species::Ceratosaurus, 0.03),
                SpawnChance::new(Species::Allosaurus, 0.02),
                SpawnChance::new(Species::Turtle, 0.08),
                SpawnChance::new(Species::Gastonia, 0.08),
                SpawnChance::new(Species::Yinlong, 0.08),
            ],
            environment: vec![
                SpawnChance::new(Species::Bush, 0.3),
                SpawnChance::new(Species::Water, 0.2),
            ],
        }
    }
}

impl SpawnTable {
    /// An empty table, for hand-built scenarios
    pub fn empty() -> Self {
        Self {
            animals: Vec::new(),
            environment: Vec::new(),
        }
    }

    pub fn pick_animal(&self, rng: &mut ChaCha8Rng) -> Option<Species> {
        first_hit(&self.animals, rng)
    }

    pub fn pick_environment(&self, rng: &mut ChaCha8Rng) -> Option<Species> {
        first_hit(&self.environment, rng)
    }
}

fn first_hit(chances: &[SpawnChance], rng: &mut ChaCha8Rng) -> Option<Species> {
    chances
        .iter()
        .find(|chance| rng.gen::<f64>() < chance.probability)
        .map(|chance| chance.species)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherChance {
    pub weather: Weather,
    pub probability: f64,
}

/// Weather distribution, sampled once per tick.
///
/// Walked in order with a fresh draw per entry; falls back to `fallback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub chances: Vec<WeatherChance>,
    pub fallback: Weather,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            chances: vec![
                WeatherChance {
                    weather: Weather::Snowing,
                    probability: 0.05,
                },
                WeatherChance {
                    weather: Weather::Raining,
                    probability: 0.2,
                },
                WeatherChance {
                    weather: Weather::Foggy,
                    probability: 0.07,
                },
            ],
            fallback: Weather::Clear,
        }
    }
}

impl WeatherConfig {
    /// Always the same weather
    pub fn fixed(weather: Weather) -> Self {
        Self {
            chances: Vec::new(),
            fallback: weather,
        }
    }

    pub fn sample(&self, rng: &mut ChaCha8Rng) -> Weather {
        self.chances
            .iter()
            .find(|chance| rng.gen::<f64>() < chance.probability)
            .map(|chance| chance.weather)
            .unwrap_or(self.fallback)
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of rows in both fields
    pub depth: i32,
    /// Number of columns in both fields
    pub width: i32,
    /// Random seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Number of steps for a bounded run
    pub max_steps: u64,
    /// Steps between population summaries in the log
    pub summary_interval: u64,
    pub spawn: SpawnTable,
    pub weather: WeatherConfig,
    pub species: SpeciesTable,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            width: DEFAULT_WIDTH,
            seed: None,
            max_steps: 4000,
            summary_interval: 100,
            spawn: SpawnTable::default(),
            weather: WeatherConfig::default(),
            species: SpeciesTable::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Replace non-positive or oversized dimensions with the defaults
    pub fn normalized(mut self) -> Self {
        if self.depth <= 0 || self.width <= 0 {
            warn!(
                depth = self.depth,
                width = self.width,
                "Field dimensions must be greater than zero, using defaults"
            );
            self.depth = DEFAULT_DEPTH;
            self.width = DEFAULT_WIDTH;
        } else if self.depth as u64 * self.width as u64 > MAX_CELLS {
            warn!(
                depth = self.depth,
                width = self.width,
                max_cells = MAX_CELLS,
                "Field is too large, using defaults"
            );
            self.depth = DEFAULT_DEPTH;
            self.width = DEFAULT_WIDTH;
        }
        self
    }
}
