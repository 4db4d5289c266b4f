use std::process::ExitCode;

use epiabm::run_with_args;

fn main() -> ExitCode {
    match run_with_args() {
        Ok(simulation) => {
            let population = simulation.population();
            println!(
                "Finished at timestep {} with {} people",
                simulation.context().get_current_timestep(),
                population.total_people()
            );
            for (status, count) in population.compartment_counter().iter() {
                println!("{status}: {count}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("epiabm: {e}");
            ExitCode::FAILURE
        }
    }
}
