//! Stepping engine for a whole ecosystem.

use crate::behaviour::Ecology;
use crate::organism::{DeathCause, Living};
use crate::populate::{populate, Rosters};
use crate::view::{PopulationCounts, SimulationView, Snapshot};
use crate::world::World;
use eco_core::{
    validate_config, Conditions, EntityId, Error, Layer, Result, SimulationConfig, Species,
    TimeOfDay, Weather,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, trace};

/// Length of [`Simulation::run_long`]
pub const LONG_RUN_STEPS: u64 = 4000;

/// Cumulative event counts since the last reset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub births: u64,
    pub seedlings: u64,
    pub deaths: BTreeMap<DeathCause, u64>,
}

impl RunStats {
    fn record_death(&mut self, cause: Option<DeathCause>) {
        if let Some(cause) = cause {
            *self.deaths.entry(cause).or_insert(0) += 1;
        }
    }

    pub fn deaths_by(&self, cause: DeathCause) -> u64 {
        self.deaths.get(&cause).copied().unwrap_or(0)
    }
}

/// Outcome of a bounded run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Steps actually executed by this run
    pub steps_run: u64,
    pub final_step: u64,
    pub final_weather: Weather,
    pub counts: PopulationCounts,
    pub stats: RunStats,
}

pub struct Simulation {
    world: World,
    ecology: Ecology,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    step: u64,
    weather: Weather,
    animal_roster: Vec<EntityId>,
    plant_roster: Vec<EntityId>,
    stats: RunStats,
}

impl Simulation {
    /// Validate the config, seed the rng and populate both fields
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let config = config.normalized();
        validate_config(&config)?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let world = World::new(config.depth, config.width);
        let ecology = Ecology::new(config.species.clone());

        let mut sim = Self {
            world,
            ecology,
            config,
            rng,
            step: 0,
            weather: Weather::default(),
            animal_roster: Vec::new(),
            plant_roster: Vec::new(),
            stats: RunStats::default(),
        };
        sim.repopulate();

        info!(
            event = "simulation_created",
            depth = sim.config.depth,
            width = sim.config.width,
            seed = ?sim.config.seed,
            animals = sim.animal_roster.len(),
            plants = sim.plant_roster.len(),
            "Simulation created"
        );
        Ok(sim)
    }

    /// Wrap a hand-built world. Every entity already in it joins the rosters
    /// in id order. The species table is validated as in [`Simulation::new`].
    pub fn from_world(world: World, config: SimulationConfig, seed: u64) -> Result<Self> {
        let mut config = config;
        config.depth = world.animal_field().depth();
        config.width = world.animal_field().width();
        config.seed = Some(seed);
        validate_config(&config)?;

        let mut animal_roster: Vec<EntityId> = world.animals().map(|a| a.id()).collect();
        animal_roster.sort();
        let mut plant_roster: Vec<EntityId> = world.plants().map(|p| p.id()).collect();
        plant_roster.sort();

        Ok(Self {
            world,
            ecology: Ecology::new(config.species.clone()),
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            step: 0,
            weather: Weather::default(),
            animal_roster,
            plant_roster,
            stats: RunStats::default(),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.world, self.step, self.weather)
    }

    fn repopulate(&mut self) {
        self.world.clear();
        let Rosters { animals, plants } = populate(
            &mut self.world,
            &self.config.spawn,
            &self.ecology.species,
            &mut self.rng,
        );
        self.animal_roster = animals;
        self.plant_roster = plants;
    }

    /// Clear both fields, repopulate from the spawn table and show the
    /// starting state. The rng carries on from where it was.
    pub fn reset<V: SimulationView + ?Sized>(&mut self, view: &mut V) -> bool {
        self.step = 0;
        self.weather = Weather::default();
        self.stats = RunStats::default();
        self.repopulate();
        debug!(
            event = "simulation_reset",
            animals = self.animal_roster.len(),
            plants = self.plant_roster.len(),
            "Simulation reset"
        );
        view.show_status(&self.snapshot())
    }

    /// Run up to `steps` ticks, stopping once the view reports the
    /// population is no longer viable
    #[instrument(skip(self, view), fields(start_step = self.step))]
    pub fn run<V: SimulationView + ?Sized>(&mut self, steps: u64, view: &mut V) -> RunSummary {
        info!(
            event = "run_started",
            steps = steps,
            animals = self.animal_roster.len(),
            plants = self.plant_roster.len(),
            "Starting simulation for {} steps",
            steps
        );

        let mut steps_run = 0;
        let mut viable = self.snapshot().is_viable();
        while viable && steps_run < steps {
            let snapshot = self.step();
            steps_run += 1;

            let interval = self.config.summary_interval;
            if interval > 0 && self.step % interval == 0 {
                self.emit_population_summary(&snapshot.counts());
            }
            viable = view.show_status(&snapshot);
        }

        if !viable {
            info!(
                event = "population_collapsed",
                step = self.step,
                "No animals left, stopping"
            );
        }

        let summary = self.summary(steps_run);
        info!(
            event = "run_finished",
            steps_run = summary.steps_run,
            final_step = summary.final_step,
            animals = summary.counts.animals(),
            plants = summary.counts.plants(),
            births = summary.stats.births,
            seedlings = summary.stats.seedlings,
            "Simulation finished"
        );
        summary
    }

    pub fn run_long<V: SimulationView + ?Sized>(&mut self, view: &mut V) -> RunSummary {
        self.run(LONG_RUN_STEPS, view)
    }

    pub fn summary(&self, steps_run: u64) -> RunSummary {
        RunSummary {
            steps_run,
            final_step: self.step,
            final_weather: self.weather,
            counts: self.snapshot().counts(),
            stats: self.stats.clone(),
        }
    }

    /// Advance every plant, then every animal, by one tick.
    ///
    /// Entities born during the tick are on the fields at once but only join
    /// the rosters after the walk, so they first act next tick.
    pub fn step(&mut self) -> Snapshot {
        self.step += 1;
        let conditions = Conditions::new(TimeOfDay::from_step(self.step), self.weather);
        trace!(step = self.step, time_of_day = ?conditions.time_of_day, weather = %self.weather, "Step");

        let mut seedlings = Vec::new();
        for id in &self.plant_roster {
            let Some(mut plant) = self.world.take_plant(*id) else {
                continue;
            };
            if let Some(params) = self.ecology.species.plant(plant.species()) {
                plant.act(&mut self.world, params, conditions, &mut self.rng, &mut seedlings);
            }
            self.world.return_plant(plant);
        }
        self.sweep_plants();

        let mut newborns = Vec::new();
        for id in &self.animal_roster {
            let Some(mut animal) = self.world.take_animal(*id) else {
                continue;
            };
            animal.act(&mut self.world, &self.ecology, conditions, &mut self.rng, &mut newborns);
            self.world.return_animal(animal);
        }
        self.sweep_animals();
        // Grazers may have eaten plants during the animal walk
        self.sweep_plants();

        self.weather = self.config.weather.sample(&mut self.rng);

        self.stats.births += newborns.len() as u64;
        self.stats.seedlings += seedlings.len() as u64;
        if !newborns.is_empty() || !seedlings.is_empty() {
            debug!(
                event = "births",
                step = self.step,
                newborns = newborns.len(),
                seedlings = seedlings.len(),
                "New organisms this step"
            );
        }
        let world = &self.world;
        self.animal_roster
            .extend(newborns.into_iter().filter(|id| world.animal(*id).is_some()));
        self.plant_roster
            .extend(seedlings.into_iter().filter(|id| world.plant(*id).is_some()));

        self.snapshot()
    }

    fn sweep_plants(&mut self) {
        let removed = self.world.remove_dead_plants();
        if removed.is_empty() {
            return;
        }
        for plant in &removed {
            trace!(id = %plant.id(), cause = ?plant.organism.cause_of_death(), "Plant removed");
            self.stats.record_death(plant.organism.cause_of_death());
        }
        let world = &self.world;
        self.plant_roster.retain(|id| world.plant(*id).is_some());
    }

    fn sweep_animals(&mut self) {
        let removed = self.world.remove_dead_animals();
        if removed.is_empty() {
            return;
        }
        for animal in &removed {
            debug!(
                event = "death",
                step = self.step,
                id = %animal.id(),
                species = %animal.species(),
                age = animal.age,
                cause = ?animal.organism.cause_of_death(),
                "Animal died"
            );
            self.stats.record_death(animal.organism.cause_of_death());
        }
        let world = &self.world;
        self.animal_roster.retain(|id| world.animal(*id).is_some());
    }

    fn emit_population_summary(&self, counts: &PopulationCounts) {
        let species: Vec<String> = counts
            .by_species
            .iter()
            .filter(|(species, _)| **species != Species::Water)
            .map(|(species, count)| format!("{}={}", species, count))
            .collect();
        info!(
            event = "population_summary",
            step = self.step,
            weather = %self.weather,
            animals = counts.animals(),
            plants = counts.plants(),
            by_species = %species.join(" "),
            "Population summary"
        );
    }

    /// Check that every live entity and its cell point at each other, and
    /// that no cell points at a dead or missing entity
    pub fn verify_occupancy(&self) -> Result<()> {
        let animal_field = self.world.animal_field();
        for animal in self.world.animals() {
            match (animal.is_alive(), animal.location()) {
                (true, Some(loc)) if animal_field.object_at(loc) == Some(animal.id()) => {}
                (true, loc) => {
                    return Err(Error::InvalidState(format!(
                        "live animal {} at {:?} is not bound to its cell",
                        animal.id(),
                        loc
                    )))
                }
                (false, Some(loc)) => {
                    return Err(Error::InvalidState(format!(
                        "dead animal {} still holds {}",
                        animal.id(),
                        loc
                    )))
                }
                (false, None) => {}
            }
        }
        for (loc, id) in animal_field.iter() {
            let live = self.world.animal(id).is_some_and(|a| a.is_alive());
            if !live {
                return Err(Error::InvalidState(format!(
                    "animal cell {} holds {} which is not a live animal",
                    loc, id
                )));
            }
        }

        let environment_field = self.world.environment_field();
        for plant in self.world.plants() {
            if let Some(loc) = plant.location() {
                if environment_field.object_at(loc) != Some(plant.id()) {
                    return Err(Error::InvalidState(format!(
                        "plant {} is not bound to {}",
                        plant.id(),
                        loc
                    )));
                }
            } else if plant.is_alive() {
                return Err(Error::InvalidState(format!(
                    "live plant {} has no location",
                    plant.id()
                )));
            }
        }
        for (loc, id) in environment_field.iter() {
            let live_plant = self.world.plant(id).is_some_and(|p| p.is_alive());
            let water = self.world.species_of(Layer::Environment, id) == Some(Species::Water);
            if !live_plant && !water {
                return Err(Error::InvalidState(format!(
                    "environment cell {} holds {} which is neither a live plant nor water",
                    loc, id
                )));
            }
        }
        Ok(())
    }
}
