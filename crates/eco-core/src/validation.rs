//! Validation for simulation configurations.

use crate::config::{SimulationConfig, SpawnChance};
use crate::error::{Error, Result};
use crate::species::{ProbabilityTable, SpeciesTable};
use crate::types::{Layer, Species};

/// Validate that a configuration is well-formed
pub fn validate_config(config: &SimulationConfig) -> Result<()> {
    validate_species(&config.species)?;
    validate_spawns(&config.spawn.animals, Layer::Animal, &config.species)?;
    validate_spawns(&config.spawn.environment, Layer::Environment, &config.species)?;

    for chance in &config.weather.chances {
        check_probability(chance.probability, &format!("weather {}", chance.weather))?;
    }

    Ok(())
}

fn validate_species(table: &SpeciesTable) -> Result<()> {
    for (species, params) in &table.animals {
        if species.layer() != Layer::Animal {
            return Err(Error::Validation(format!(
                "{} is not an animal but has animal parameters",
                species
            )));
        }
        if params.max_litter_size == 0 {
            return Err(Error::Validation(format!(
                "{} must have a litter size of at least 1",
                species
            )));
        }
        check_table(&params.breeding_probability, &format!("{} breeding", species))?;

        if let Some(feeding) = &params.feeding {
            check_probability(feeding.fog_feed_probability, &format!("{} fog feeding", species))?;
            for prey in &feeding.diet {
                if table.food_value(*prey).is_none() {
                    return Err(Error::Validation(format!(
                        "{} eats {}, which has no food value",
                        species, prey
                    )));
                }
            }
        }
    }

    for (species, params) in &table.plants {
        if *species == Species::Water || species.layer() != Layer::Environment {
            return Err(Error::Validation(format!(
                "{} cannot have plant parameters",
                species
            )));
        }
        if params.max_spread == 0 {
            return Err(Error::Validation(format!(
                "{} must spread at least 1 seed",
                species
            )));
        }
        check_table(&params.spread_probability, &format!("{} spreading", species))?;
    }

    Ok(())
}

fn validate_spawns(chances: &[SpawnChance], layer: Layer, table: &SpeciesTable) -> Result<()> {
    for chance in chances {
        let species = chance.species;
        if species.layer() != layer {
            return Err(Error::Validation(format!(
                "{} cannot be spawned on the {:?} layer",
                species, layer
            )));
        }
        let has_params = match species {
            Species::Water => true,
            Species::Bush => table.plant(species).is_some(),
            _ => table.animal(species).is_some(),
        };
        if !has_params {
            return Err(Error::Validation(format!(
                "{} is spawned but has no parameters",
                species
            )));
        }
        check_probability(chance.probability, &format!("{} spawn", species))?;
    }
    Ok(())
}

fn check_table(table: &ProbabilityTable, what: &str) -> Result<()> {
    table.values().try_for_each(|p| check_probability(p, what))
}

fn check_probability(p: f64, what: &str) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} probability {} is outside [0, 1]",
            what, p
        )))
    }
}
