//! Grid ecosystem engine.
//!
//! Two overlaid fields hold animals on one layer and plants and water on the
//! other. Every tick each plant and then each animal runs its species'
//! behaviour once.

pub mod behaviour;
pub mod field;
pub mod forage;
pub mod organism;
pub mod populate;
pub mod simulation;
pub mod view;
pub mod world;

pub use behaviour::Ecology;
pub use field::Field;
pub use forage::{find_food, DietTable};
pub use organism::{Animal, DeathCause, Forager, Living, Organism, Plant, Thirst};
pub use populate::{populate, Rosters};
pub use simulation::{RunStats, RunSummary, Simulation, LONG_RUN_STEPS};
pub use view::{HeadlessView, PopulationCounts, SimulationView, Snapshot};
pub use world::World;
