//! Read-only per-tick snapshots and the view that consumes them.

use crate::world::World;
use eco_core::{Layer, Location, Species, Weather};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occupancy of both fields after a tick, by species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: u64,
    pub weather: Weather,
    pub depth: i32,
    pub width: i32,
    animals: Vec<Option<Species>>,
    environment: Vec<Option<Species>>,
}

impl Snapshot {
    pub fn capture(world: &World, step: u64, weather: Weather) -> Self {
        let field = world.animal_field();
        Self {
            step,
            weather,
            depth: field.depth(),
            width: field.width(),
            animals: world.occupancy(Layer::Animal),
            environment: world.occupancy(Layer::Environment),
        }
    }

    fn index(&self, location: Location) -> Option<usize> {
        let inside = (0..self.depth).contains(&location.row) && (0..self.width).contains(&location.col);
        inside.then(|| location.row as usize * self.width as usize + location.col as usize)
    }

    pub fn animal_at(&self, location: Location) -> Option<Species> {
        self.index(location).and_then(|i| self.animals[i])
    }

    pub fn environment_at(&self, location: Location) -> Option<Species> {
        self.index(location).and_then(|i| self.environment[i])
    }

    /// Row-major species of one layer
    pub fn layer(&self, layer: Layer) -> &[Option<Species>] {
        match layer {
            Layer::Animal => &self.animals,
            Layer::Environment => &self.environment,
        }
    }

    pub fn counts(&self) -> PopulationCounts {
        let mut counts = PopulationCounts::default();
        for species in self.animals.iter().chain(&self.environment).flatten() {
            *counts.by_species.entry(*species).or_insert(0) += 1;
        }
        counts
    }

    /// Viable while at least one animal is alive
    pub fn is_viable(&self) -> bool {
        self.animals.iter().any(Option::is_some)
    }
}

/// Live counts per species
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub by_species: BTreeMap<Species, usize>,
}

impl PopulationCounts {
    pub fn get(&self, species: Species) -> usize {
        self.by_species.get(&species).copied().unwrap_or(0)
    }

    pub fn animals(&self) -> usize {
        Species::ANIMALS.iter().map(|s| self.get(*s)).sum()
    }

    pub fn plants(&self) -> usize {
        self.get(Species::Bush)
    }
}

/// Consumer of the per-tick snapshot.
///
/// Returns whether the run should go on; a bounded run stops at the first
/// `false`.
pub trait SimulationView {
    fn show_status(&mut self, snapshot: &Snapshot) -> bool;
}

/// View that renders nothing and only reports viability
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessView;

impl SimulationView for HeadlessView {
    fn show_status(&mut self, snapshot: &Snapshot) -> bool {
        snapshot.is_viable()
    }
}
