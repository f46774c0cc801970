//! Bounded 2D occupancy grid.
//!
//! A field records which entity sits in which cell; it owns none of them.
//! Two fields are overlaid in a run, one for animals and one for plants and
//! water.

use eco_core::{EntityId, Location};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    depth: i32,
    width: i32,
    cells: Vec<Option<EntityId>>,
}

impl Field {
    /// An empty field. Negative dimensions, or a product that does not fit
    /// in `usize`, give a field with no cells.
    pub fn new(depth: i32, width: i32) -> Self {
        let (depth, width) = (depth.max(0), width.max(0));
        match (depth as usize).checked_mul(width as usize) {
            Some(size) => Self {
                depth,
                width,
                cells: vec![None; size],
            },
            None => Self {
                depth: 0,
                width: 0,
                cells: Vec::new(),
            },
        }
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn contains(&self, location: Location) -> bool {
        (0..self.depth).contains(&location.row) && (0..self.width).contains(&location.col)
    }

    /// Bind `id` to `location`, overwriting any previous occupant.
    ///
    /// Moving an entity requires clearing its old cell first.
    pub fn place(&mut self, id: EntityId, location: Location) {
        debug_assert!(self.contains(location), "place outside field: {}", location);
        if let Some(index) = self.index(location) {
            self.cells[index] = Some(id);
        }
    }

    pub fn clear(&mut self, location: Location) {
        if let Some(index) = self.index(location) {
            self.cells[index] = None;
        }
    }

    /// Empty every cell
    pub fn clear_all(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
    }

    pub fn object_at(&self, location: Location) -> Option<EntityId> {
        self.index(location).and_then(|index| self.cells[index])
    }

    /// In-bounds 8-neighbourhood of `location`, shuffled
    pub fn adjacent_locations(&self, location: Location, rng: &mut ChaCha8Rng) -> Vec<Location> {
        let mut adjacent = Vec::with_capacity(8);
        for d_row in -1..=1 {
            for d_col in -1..=1 {
                if d_row == 0 && d_col == 0 {
                    continue;
                }
                let next = location.offset(d_row, d_col);
                if self.contains(next) {
                    adjacent.push(next);
                }
            }
        }
        adjacent.shuffle(rng);
        adjacent
    }

    /// Unoccupied neighbours of `location`, shuffled
    pub fn free_adjacent_locations(
        &self,
        location: Location,
        rng: &mut ChaCha8Rng,
    ) -> Vec<Location> {
        let mut free = self.adjacent_locations(location, rng);
        free.retain(|next| self.object_at(*next).is_none());
        free
    }

    /// A random unoccupied neighbour, or `None` when the neighbourhood is full
    pub fn free_adjacent_location(
        &self,
        location: Location,
        rng: &mut ChaCha8Rng,
    ) -> Option<Location> {
        self.free_adjacent_locations(location, rng).into_iter().next()
    }

    fn index(&self, location: Location) -> Option<usize> {
        if self.contains(location) {
            Some(location.row as usize * self.width as usize + location.col as usize)
        } else {
            None
        }
    }

    pub fn index_to_location(&self, index: usize) -> Location {
        let width = self.width.max(1) as usize;
        Location::new((index / width) as i32, (index % width) as i32)
    }

    /// Iterator over all locations in row-major order
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_location(i))
    }

    /// Iterator over occupied cells
    pub fn iter(&self) -> impl Iterator<Item = (Location, EntityId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.map(|id| (self.index_to_location(i), id)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}
