//! Orbitron headless runner
//!
//! Plays a seeded run with a simple autopilot and prints the run summary
//! as JSON. With `--progress`, the summary is folded into a saved record.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use glam::Vec2;

use orbitron::consts::MAX_SUBSTEPS;
use orbitron::progression::ProgressRecord;
use orbitron::sim::{GameEvent, RunSummary, TickInput, World, step};
use orbitron::{ConfigError, RunSettings};

/// Distance at which the autopilot starts backing away
const KITE_RANGE: f32 = 350.0;
/// Distance at which it dashes
const DASH_RANGE: f32 = 90.0;
/// Wall-clock frame fed into the accumulator
const FRAME_DT: f32 = 1.0 / 30.0;

/// Deterministic orbiting-petal survival simulation
#[derive(Parser, Debug)]
#[command(name = "orbitron")]
#[command(version)]
struct Args {
    /// JSON run settings
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this wave starts (overrides the config file)
    #[arg(long)]
    waves: Option<u32>,

    /// JSON data tables replacing the built-in ones
    #[arg(long, value_name = "DATA_FILE")]
    data: Option<PathBuf>,

    /// Progress record to read bonuses from and update after the run
    #[arg(long, value_name = "PROGRESS_FILE")]
    progress: Option<PathBuf>,
}

/// Fixed-step driver with a frame accumulator
struct Runner {
    world: World,
    settings: RunSettings,
    accumulator: f32,
}

impl Runner {
    fn new(world: World, settings: RunSettings) -> Self {
        Self {
            world,
            settings,
            accumulator: 0.0,
        }
    }

    fn done(&self) -> bool {
        self.world.game_over || self.settings.finished(self.world.wave(), self.world.time)
    }

    /// Feed one frame of time and run the steps it covers
    fn frame(&mut self, dt: f32) {
        self.accumulator += dt;
        let timestep = self.settings.timestep;

        let mut substeps = 0;
        while self.accumulator >= timestep && substeps < MAX_SUBSTEPS {
            let input = self.autopilot();
            let effects = step(&mut self.world, timestep, &input);
            self.accumulator -= timestep;
            substeps += 1;

            for event in &effects.events {
                match event {
                    GameEvent::WaveStarted { wave } => log::debug!("Wave {} underway", wave),
                    GameEvent::RequestRejected(reason) => log::debug!("Rejected: {}", reason),
                    _ => {}
                }
            }
            if self.done() {
                break;
            }
        }
    }

    fn autopilot(&self) -> TickInput {
        if !self.settings.kite {
            return TickInput::default();
        }
        let player = self.world.player.pos;
        let nearest = self
            .world
            .enemies
            .iter()
            .filter(|e| !e.dead)
            .map(|e| (e.pos, e.pos.distance(player) - e.radius))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match nearest {
            Some((pos, dist)) if dist < KITE_RANGE => {
                let away = (player - pos).normalize_or(Vec2::X);
                TickInput {
                    move_dir: away,
                    dash: dist < DASH_RANGE,
                    ..Default::default()
                }
            }
            _ => TickInput::default(),
        }
    }
}

fn run(args: &Args) -> Result<RunSummary, ConfigError> {
    let mut settings = match &args.config {
        Some(path) => RunSettings::load(path)?,
        None => RunSettings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(waves) = args.waves {
        settings.max_waves = waves;
    }
    if args.data.is_some() {
        settings.data_path = args.data.clone();
    }
    settings.validate()?;

    let data = Arc::new(settings.game_data()?);
    let mut progress = match &args.progress {
        Some(path) => Some(ProgressRecord::load_or_default(path)?),
        None => None,
    };
    let perm = progress
        .as_ref()
        .map(|p| p.bonuses(&data))
        .unwrap_or_default();

    let options = settings.run_options(&data, perm)?;
    log::info!("Starting run with seed {}", settings.seed);
    let mut runner = Runner::new(World::new(data, options), settings);
    while !runner.done() {
        runner.frame(FRAME_DT);
    }

    let summary = runner.world.summary();
    log::info!(
        "Run over at wave {} (level {}, {} kills, {:.0}s)",
        summary.wave,
        summary.level,
        summary.kills,
        summary.time
    );

    if let (Some(record), Some(path)) = (progress.as_mut(), &args.progress) {
        record.record_run(&summary);
        if let Some((kind, rarity)) = ProgressRecord::best_petal(&summary) {
            if record.keep_petal(kind, rarity) {
                log::info!("Kept {} {} for the next run", rarity.as_str(), kind.as_str());
            }
        }
        record.save(path)?;
    }
    Ok(summary)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to encode summary: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
