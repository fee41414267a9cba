use anyhow::{bail, Context};
use clap::Parser;
use fmgc_vnav::physics::SimplifiedPerformanceModel;
use fmgc_vnav::pseudo_waypoints::AutoflightAction;
use fmgc_vnav::scenario::Scenario;
use fmgc_vnav::scheduler::TickScheduler;
use fmgc_vnav::{VnavConfig, VnavDriver};
use log::info;
use pretty_env_logger;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

const VERSION: &'static str = env!("FMGC_VNAV_VERSION");

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
#[command(version = VERSION)]
struct Cli {
    /// JSON scenario: legs, transitions, parameters, environment and guidance.
    scenario_path: PathBuf,
    #[clap(short, long)]
    config: Option<PathBuf>,
    #[clap(long, default_value = "0", help = "Number of guidance frames to run after the first computation.")]
    ticks: usize,
    #[clap(long, default_value = "1.")]
    tick_seconds: f64,
    #[clap(long, help = "Write the checkpoints to this CSV file.")]
    csv: Option<PathBuf>,
    #[clap(long, action)]
    show_plot: bool,
    #[clap(long)]
    save_plot: Option<PathBuf>,
}

fn tick_duration(seconds: f64) -> anyhow::Result<Duration> {
    if !(seconds > 0. && seconds.is_finite()) {
        bail!("--tick-seconds must be finite and > 0, got {}", seconds);
    }
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("--tick-seconds {} is out of range", seconds))
}

fn entrypoint() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let scenario = Scenario::from_json_file(&cli.scenario_path)
        .with_context(|| format!("loading scenario {}", cli.scenario_path.display()))?;
    let config = match &cli.config {
        Some(path) => VnavConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => VnavConfig::default(),
    };
    let tick = tick_duration(cli.tick_seconds)?;

    let geometry = Rc::new(scenario.build_geometry()?);
    let mut snapshot = scenario.snapshot();
    let mut driver = VnavDriver::new(config, Rc::new(SimplifiedPerformanceModel::default()));
    let mut scheduler = TickScheduler::<AutoflightAction>::new();

    driver.accept_multiple_leg_geometry(geometry, &snapshot);
    let mut actions = driver.update(&snapshot, &mut scheduler);

    let Some(profile) = driver.current_geometry_profile() else {
        bail!("no vertical profile could be computed for this scenario");
    };

    println!("Checkpoints:");
    for checkpoint in profile.checkpoints() {
        println!(
            "  {:<24} {:>8.1} nm {:>8.0} ft {:>6.0} kt {:>8.0} s {:>9.0} lb",
            format!("{:?}", checkpoint.reason),
            checkpoint.distance_from_start,
            checkpoint.altitude,
            checkpoint.speed,
            checkpoint.seconds_from_present,
            checkpoint.remaining_fuel_on_board
        );
    }

    println!("Predictions at waypoints:");
    for (index, prediction) in profile.compute_predictions_at_waypoints() {
        let ident = profile.geometry().leg(index).map_or("?", |leg| leg.ident());
        println!(
            "  #{:<3} {:<12} {:>8.1} nm {:>8.0} ft {:>6.0} kt alt cstr met: {} spd cstr met: {}",
            index,
            ident,
            prediction.distance_from_start,
            prediction.altitude,
            prediction.speed,
            prediction.is_altitude_constraint_met,
            prediction.is_speed_constraint_met
        );
    }

    for _ in 0..cli.ticks {
        snapshot.environment.zulu_time += cli.tick_seconds;
        actions.extend(driver.update(&snapshot, &mut scheduler));
        actions.extend(scheduler.advance(tick));
    }

    println!("Pseudo waypoints:");
    for pseudo_waypoint in driver.pseudo_waypoints().current_pseudo_waypoints() {
        println!(
            "  {:<16} leg #{:<3} {:>7.2} nm before termination ({:.4}, {:.4})",
            pseudo_waypoint.ident,
            pseudo_waypoint.along_leg_index,
            pseudo_waypoint.distance_from_leg_termination,
            pseudo_waypoint.coordinate.lat,
            pseudo_waypoint.coordinate.long
        );
    }
    for action in &actions {
        println!("Autoflight action: {:?}", action);
    }

    if let Some(path) = &cli.csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        profile.write_checkpoints_csv(file)?;
        info!("Wrote checkpoints to {}", path.display());
    }

    if cli.show_plot || cli.save_plot.is_some() {
        let plot = profile.make_profile_plot();
        if let Some(path) = &cli.save_plot {
            plot.write_html(path);
        }
        if cli.show_plot {
            plot.show();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {:?}", e);
            return ExitCode::FAILURE;
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_duration() {
        assert_eq!(tick_duration(0.5).unwrap(), Duration::from_millis(500));
        assert!(tick_duration(0.).is_err());
        assert!(tick_duration(-1.).is_err());
        assert!(tick_duration(f64::NAN).is_err());
        assert!(tick_duration(f64::INFINITY).is_err());
        assert!(tick_duration(1e300).is_err());
    }
}
