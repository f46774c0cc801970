//! Text view of a running simulation.

use eco_core::{Layer, Species};
use eco_world::{SimulationView, Snapshot};
use tracing::info;

/// Logs species counts every `interval` steps and can print the animal layer
/// as a character map
pub struct ConsoleView {
    interval: u64,
    render_map: bool,
}

impl ConsoleView {
    pub fn new(interval: u64, render_map: bool) -> Self {
        Self {
            interval,
            render_map,
        }
    }

    /// Map rendering is switched on by `ECO_RENDER=ascii`
    pub fn from_env(interval: u64) -> Self {
        let render_map = std::env::var("ECO_RENDER").is_ok_and(|mode| mode == "ascii");
        Self::new(interval, render_map)
    }

    fn due(&self, step: u64) -> bool {
        step == 0 || (self.interval > 0 && step % self.interval == 0)
    }
}

impl SimulationView for ConsoleView {
    fn show_status(&mut self, snapshot: &Snapshot) -> bool {
        let viable = snapshot.is_viable();
        if self.due(snapshot.step) || !viable {
            let counts = snapshot.counts();
            let line = Species::ANIMALS
                .iter()
                .map(|species| format!("{}: {}", species, counts.get(*species)))
                .collect::<Vec<_>>()
                .join(", ");
            info!(
                step = snapshot.step,
                weather = %snapshot.weather,
                bushes = counts.plants(),
                "{}",
                line
            );
            if self.render_map {
                println!("{}", render_ascii(snapshot));
            }
        }
        viable
    }
}

fn glyph(species: Option<Species>) -> char {
    match species {
        Some(Species::TRex) => 'T',
        Some(Species::Ceratosaurus) => 'C',
        Some(Species::Allosaurus) => 'A',
        Some(Species::Turtle) => 't',
        Some(Species::Gastonia) => 'g',
        Some(Species::Yinlong) => 'y',
        Some(Species::Bush) => '*',
        Some(Species::Water) => '~',
        None => '.',
    }
}

/// One character per cell. Animals hide whatever is beneath them.
pub fn render_ascii(snapshot: &Snapshot) -> String {
    let animals = snapshot.layer(Layer::Animal);
    let environment = snapshot.layer(Layer::Environment);
    let width = snapshot.width.max(1) as usize;

    let mut out = String::with_capacity(animals.len() + animals.len() / width + 32);
    out.push_str(&format!("step {} ({})\n", snapshot.step, snapshot.weather));
    for (row_animals, row_environment) in animals.chunks(width).zip(environment.chunks(width)) {
        for (animal, ground) in row_animals.iter().zip(row_environment) {
            out.push(glyph(animal.or(*ground)));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::{Location, PlantParams, SpeciesParams, Weather};
    use eco_world::World;

    #[test]
    fn test_render_ascii() {
        let mut world = World::new(2, 3);
        world.spawn_animal(Species::Turtle, Location::new(0, 1), &SpeciesParams::turtle(), None, 0);
        world.spawn_plant(Species::Bush, Location::new(0, 1), &PlantParams::bush());
        world.add_water(Location::new(1, 2));

        let map = render_ascii(&Snapshot::capture(&world, 4, Weather::Foggy));
        assert_eq!(map, "step 4 (foggy)\n.t.\n..~\n");
    }

    #[test]
    fn test_console_view_reports_viability() {
        let mut view = ConsoleView::new(10, false);
        let world = World::new(2, 2);
        assert!(!view.show_status(&Snapshot::capture(&world, 3, Weather::Clear)));
    }
}
