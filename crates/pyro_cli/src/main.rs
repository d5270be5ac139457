use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pyro_control::{CommandSource, ScriptedOperator};
use pyro_core::{compute_metrics, compute_results, Event, EventLevel, GameState, Level};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "pyro_cli", about = "Pyrolysis Process Game CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a full headless session with the scripted operator.
    Play {
        /// Session seed; random if omitted.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Give up after this many engine ticks.
        #[arg(long, default_value_t = 50_000)]
        max_ticks: u64,
        #[arg(long, default_value_t = 500)]
        print_every: u64,
        #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
        event_level: String,
        /// Plastic percentage the operator dials in.
        #[arg(long, default_value_t = 65)]
        plastic: u8,
        /// Cooling power the operator holds.
        #[arg(long, default_value_t = 70)]
        cooling_power: u8,
        /// Deliberately mis-bin every nth item (exercises the penalty).
        #[arg(long)]
        mistake_every: Option<u32>,
        /// Sample metrics every N ticks (default 60).
        #[arg(long, default_value_t = 60)]
        metrics_every: u64,
        /// Disable run artifacts (metrics CSV, run info, summary JSON).
        #[arg(long)]
        no_metrics: bool,
    },
}

// ---------------------------------------------------------------------------
// Run directory
// ---------------------------------------------------------------------------

fn generate_run_id(seed: u64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    // Manual UTC time formatting to avoid adding a chrono dependency.
    let days = secs / 86400;
    let time_of_day = secs % 86400;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    let (year, month, day) = epoch_days_to_date(days);

    format!("{year:04}{month:02}{day:02}_{hours:02}{minutes:02}{seconds:02}_seed{seed}")
}

fn epoch_days_to_date(mut days: u64) -> (u64, u64, u64) {
    // Algorithm from http://howardhinnant.github.io/date_algorithms.html
    days += 719_468;
    let era = days / 146_097;
    let day_of_era = days % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146_096) / 365;
    let year = year_of_era + era * 400;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };
    (year, month, day)
}

fn create_run_dir(run_id: &str) -> Result<std::path::PathBuf> {
    let dir = std::path::PathBuf::from("runs").join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

fn write_run_info(
    dir: &std::path::Path,
    run_id: &str,
    seed: u64,
    max_ticks: u64,
    metrics_every: u64,
    operator: &ScriptedOperator,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": seed,
        "start_time": run_id.split('_').take(2).collect::<Vec<_>>().join("_"),
        "metrics_every": metrics_every,
        "runner": "pyro_cli",
        "operator": operator,
        "args": {
            "max_ticks": max_ticks,
        }
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Play loop
// ---------------------------------------------------------------------------

struct PlayArgs {
    seed: Option<u64>,
    content_dir: String,
    max_ticks: u64,
    print_every: u64,
    event_level: EventLevel,
    operator: ScriptedOperator,
    metrics_every: u64,
    no_metrics: bool,
}

#[allow(clippy::too_many_lines)]
fn play(args: PlayArgs) -> Result<()> {
    let constants = pyro_content::load_constants(&args.content_dir)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut state = GameState::new(&constants, seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut operator = args.operator;
    let mut next_command_id = 0u64;

    // Set up the per-run artifact directory.
    let mut run_dir = None;
    let mut metrics_writer = None;
    if !args.no_metrics {
        let run_id = generate_run_id(seed);
        let dir = create_run_dir(&run_id)?;
        write_run_info(&dir, &run_id, seed, args.max_ticks, args.metrics_every, &operator)?;
        let writer = pyro_core::MetricsFileWriter::new(&dir)
            .with_context(|| format!("opening metrics CSV in {}", dir.display()))?;
        metrics_writer = Some(writer);
        println!("Run directory: {}", dir.display());
        run_dir = Some(dir);
    }

    println!(
        "Starting session: seed={seed} plastic={}% cooling_power={}",
        operator.plastic_pct, operator.cooling_power,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..args.max_ticks {
        let commands = operator.generate_commands(&state, &constants, &mut next_command_id);
        let events = pyro_core::tick(&mut state, &commands, &constants, &mut rng, args.event_level);

        // Print notable events regardless of print_every.
        for envelope in &events {
            match &envelope.event {
                Event::FeedstockSet {
                    plastic_pct,
                    biomass_pct,
                } => {
                    let strip: String = pyro_core::feedstock_preview(
                        constants.feedstock_preview_particles,
                        *plastic_pct,
                        &mut rng,
                    )
                    .iter()
                    .map(|p| match p {
                        pyro_core::ParticleKind::Plastic => 'P',
                        pyro_core::ParticleKind::Biomass => 'b',
                    })
                    .collect();
                    println!(
                        "Feedstock: {plastic_pct}% plastic / {biomass_pct}% biomass  hopper=[{strip}]"
                    );
                }
                Event::ScoreCommitted { level, score } => {
                    println!(
                        "*** {level} SCORE {:.0}% at tick={:04} ***",
                        score * 100.0,
                        envelope.tick
                    );
                }
                Event::CommandRejected { reason, .. } => {
                    println!("!!! command rejected: {reason}");
                }
                _ => {}
            }
        }

        if state.meta.tick % args.print_every == 0 {
            print_status(&state, &constants);
        }

        if let Some(ref mut writer) = metrics_writer {
            if state.meta.tick % args.metrics_every == 0 {
                let snapshot = compute_metrics(&state, &constants);
                writer.write_row(&snapshot).context("writing metrics row")?;
            }
        }

        if state.level == Level::Results {
            break;
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at tick {}:", state.meta.tick);
    print_status(&state, &constants);

    if state.level == Level::Results {
        let summary = compute_results(&state, &constants);
        println!(
            "Final efficiency {}% | fuel {}% gas {}% char {}% losses {}%",
            summary.final_score,
            summary.fuel_yield,
            summary.gas_yield,
            summary.char_yield,
            summary.losses,
        );
        if let Some(dir) = run_dir {
            let path = dir.join("summary.json");
            let report = serde_json::json!({
                "seed": seed,
                "ticks": state.meta.tick,
                "feedstock": state.feedstock,
                "scores": state.scores,
                "summary": summary,
            });
            let file = std::fs::File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(file, &report)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Summary written to {}", path.display());
        }
    } else {
        println!("Tick budget exhausted before the results screen.");
    }

    if let Some(ref mut writer) = metrics_writer {
        writer.flush().context("final metrics flush")?;
        println!("Metrics written to runs/ directory.");
    }

    Ok(())
}

fn print_status(state: &GameState, constants: &pyro_core::Constants) {
    let m = compute_metrics(state, constants);
    let band = match pyro_core::band_status(m.temperature, constants) {
        pyro_core::BandStatus::TooHot => "hot",
        pyro_core::BandStatus::Optimal => "ok",
        pyro_core::BandStatus::TooCold => "cold",
    };
    println!(
        "[tick={tick:05}  level={level:<7}]  \
         heat={heat:5.1}%  uniformity={uni:4.2}  \
         temp={temp:5.1} ({band})  liquid={liquid:5.1}%  \
         sorted={sorted:2}  mistakes={mistakes:2}",
        tick = m.tick,
        level = m.level,
        heat = m.avg_heat * 100.0,
        uni = m.heat_uniformity,
        temp = m.temperature,
        liquid = m.liquid_level,
        sorted = m.items_sorted,
        mistakes = m.sort_mistakes,
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Play {
            seed,
            content_dir,
            max_ticks,
            print_every,
            event_level,
            plastic,
            cooling_power,
            mistake_every,
            metrics_every,
            no_metrics,
        } => {
            let level = match event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            let mut operator = ScriptedOperator::new(plastic, cooling_power);
            if let Some(n) = mistake_every {
                operator = operator.with_mistake_every(n);
            }
            play(PlayArgs {
                seed,
                content_dir,
                max_ticks,
                print_every,
                event_level: level,
                operator,
                metrics_every,
                no_metrics,
            })?;
        }
    }
    Ok(())
}
