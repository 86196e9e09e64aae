//! Reef Arcade headless demo
//!
//! Plays one seeded run on autopilot and prints the summary as JSON.
//! The browser build is driven from JavaScript through `reef_arcade::web`.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use clap::Parser;
    use reef_arcade::consts::SIM_DT;
    use reef_arcade::{Difficulty, GameMode, GameSimulation, HighScores, SimConfig};

    #[derive(Parser, Debug)]
    #[command(name = "reef-arcade")]
    #[command(about = "Run an Ocean Dash or Coral Reef Quest autopilot demo")]
    #[command(version)]
    pub struct Args {
        /// Game to play (ocean_dash or coral_reef)
        #[arg(short, long, default_value = "ocean_dash")]
        pub mode: String,
        /// easy, medium or hard
        #[arg(short, long, default_value = "easy")]
        pub difficulty: String,
        #[arg(short, long, default_value_t = 1)]
        pub seed: u64,
        /// Stop the run after this many simulated seconds
        #[arg(long, default_value_t = 120.0)]
        pub max_secs: f32,
        /// Print gameplay events as they happen
        #[arg(long)]
        pub events: bool,
    }

    pub fn run(args: Args) {
        let mode = GameMode::from_key(&args.mode);
        let difficulty = Difficulty::from_key(&args.difficulty);
        log::info!(
            "Autopilot demo: {} on {} (seed {})",
            mode.as_str(),
            difficulty.as_str(),
            args.seed
        );

        let config = SimConfig::new(mode, difficulty, args.seed).with_callback(|summary| {
            match serde_json::to_string_pretty(summary) {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("Could not serialize summary: {}", e),
            }
        });
        let mut sim = GameSimulation::new(config, HighScores::new());
        sim.set_idle_mode(true);
        sim.start();

        // 60 Hz host frames
        let frame_dt = SIM_DT * 2.0;
        let mut elapsed = 0.0;
        while sim.summary().is_none() && elapsed < args.max_secs {
            sim.update(frame_dt);
            elapsed += frame_dt;
            if args.events {
                for event in sim.take_events() {
                    if let Ok(json) = serde_json::to_string(&event) {
                        println!("{:>8.2}s {}", elapsed, json);
                    }
                }
            }
        }

        if sim.summary().is_none() {
            let state = sim.state();
            log::info!(
                "Autopilot still going after {:.0}s at {} {}, stopping",
                elapsed,
                state.final_score(),
                mode.score_unit()
            );
            sim.stop();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    demo::run(demo::Args::parse());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is reef_arcade::web::init
}
