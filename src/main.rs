use std::error::Error;
use std::path::PathBuf;
use log::info;

use hypic::setup::{Configuration, InputError, PrettyDuration, ettc};
use hypic::init::ConfigInitializer;
use hypic::patch::Patch;

fn report(i: usize, patch: &Patch) -> String {
    format!(
        "Output {: >4} at t = {: >8.3}, W_em = {:.6e}, W_kin = {:.6e}",
        i, patch.time(), patch.field_energy(), patch.kinetic_energy()
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let path = args
        .get(1)
        .ok_or(InputError::InvalidInputFile("no file supplied"))?;
    let path = PathBuf::from(path);

    let mut input = Configuration::from_file(&path)?;
    input.with_context("constants");

    let setup = ConfigInitializer::new(&input)?;
    let mut patch = Patch::new(&setup)?;

    let total_steps = setup.steps();
    let output_frequency = setup.n_outputs();
    let steps_bt_output = total_steps / output_frequency;
    // whatever does not divide evenly is run before the final output
    let remainder = total_steps - steps_bt_output * output_frequency;

    info!("Running {} steps of {} particles with {} threads...", total_steps, patch.ions().nbr_particles(), rayon::current_num_threads());

    let runtime = std::time::Instant::now();

    for i in 0..output_frequency {
        if i > 0 && steps_bt_output > 0 {
            info!(
                "{}, RT = {}, ETTC = {}...",
                report(i, &patch),
                PrettyDuration::from(runtime.elapsed()),
                PrettyDuration::from(ettc(runtime, i * steps_bt_output, total_steps))
            );
        } else {
            info!("{}...", report(i, &patch));
        }

        for _j in 0..steps_bt_output {
            patch.advance();
        }
    }

    for _j in 0..remainder {
        patch.advance();
    }

    // Output at final time
    info!("{}, RT = {}", report(output_frequency, &patch), PrettyDuration::from(runtime.elapsed()));

    Ok(())
}
