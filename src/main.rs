use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use chordr::config::Config;
use chordr::engine::mistake_stats::{self, MistakeRankOptions, MistakeTrackedRecord};
use chordr::engine::time_stats::{self, TimeTrackedRecord};
use chordr::prompt::{AutoConfirm, ConfirmationPrompt, TerminalPrompt};
use chordr::session::{log, reset};
use chordr::store::json_store::JsonFileStore;
use chordr::store::{cumulative_key, history_key, load_map};

#[derive(Parser)]
#[command(
    name = "chordr",
    version,
    about = "Practice analytics for terminal music drills"
)]
struct Cli {
    #[arg(long, help = "Override the stats data directory")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the worst-scoring items for a time-tracked drill
    Problems {
        drill: String,
        #[arg(long, help = "Minimum attempts before an item is ranked")]
        min_attempts: Option<u32>,
    },
    /// Show the highest mistake-rate items for a mistake-tracked drill
    Mistakes {
        drill: String,
        #[arg(long, help = "Minimum attempts before an item is ranked")]
        min_attempts: Option<u32>,
        #[arg(long, help = "Cap on reported items")]
        max_results: Option<usize>,
        #[arg(
            long,
            help = "Also report items slower on average than this many seconds"
        )]
        slow_threshold: Option<f64>,
    },
    /// Show a drill's session log
    Log { drill: String },
    /// Clear a drill's practice history and cumulative stats
    Reset {
        drill: String,
        #[arg(long, help = "Keep cumulative stats, clear the session log only")]
        history_only: bool,
        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let base_dir = cli
        .data_dir
        .or_else(|| config.data_dir.as_ref().map(PathBuf::from));
    let mut store = match base_dir {
        Some(dir) => JsonFileStore::with_base_dir(dir)?,
        None => JsonFileStore::new()?,
    };

    match cli.command {
        Command::Problems {
            drill,
            min_attempts,
        } => {
            let stats: HashMap<String, TimeTrackedRecord> =
                load_map(&store, &cumulative_key(&drill));
            let areas = time_stats::problem_areas(
                Some(&stats),
                min_attempts.unwrap_or(config.time_min_attempts),
            );
            if areas.is_empty() {
                println!("No problem areas for '{drill}' yet.");
            }
            for area in areas {
                println!(
                    "{:<24} score {:>6.1}  success {:>5.1}%  slow {:>5.1}%  avg {:>5.2}s  ({} attempts)",
                    area.name,
                    area.problem_score,
                    area.success_rate,
                    area.slow_rate,
                    area.avg_time,
                    area.attempts
                );
            }
        }
        Command::Mistakes {
            drill,
            min_attempts,
            max_results,
            slow_threshold,
        } => {
            let stats: HashMap<String, MistakeTrackedRecord> =
                load_map(&store, &cumulative_key(&drill));
            let options = MistakeRankOptions {
                max_results: max_results.unwrap_or(config.mistake_max_results),
                avg_time_threshold: slow_threshold.or(config.slow_time_threshold),
            };
            let areas = mistake_stats::mistake_areas(
                Some(&stats),
                min_attempts.unwrap_or(config.mistake_min_attempts),
                &options,
            );
            if areas.is_empty() {
                println!("No mistake areas for '{drill}' yet.");
            }
            for area in areas {
                println!(
                    "{:<24} missed {:>4.0}%  avg {:>5.2}s  ({} attempts)",
                    area.key,
                    area.mistake_rate * 100.0,
                    area.avg_time,
                    area.attempts
                );
            }
        }
        Command::Log { drill } => {
            let entries = log::entries(&store, &history_key(&drill));
            if entries.is_empty() {
                println!("No sessions logged for '{drill}'.");
            }
            for entry in entries {
                let when = entry.timestamp.with_timezone(&chrono::Local);
                let details: Vec<String> = entry
                    .details
                    .iter()
                    .map(|(field, value)| format!("{field}={value}"))
                    .collect();
                println!("{}  {}", when.format("%Y-%m-%d %H:%M"), details.join("  "));
            }
        }
        Command::Reset {
            drill,
            history_only,
            yes,
        } => {
            let history = history_key(&drill);
            let cumulative = (!history_only).then(|| cumulative_key(&drill));

            let mut terminal = TerminalPrompt;
            let mut auto = AutoConfirm(true);
            let prompt: &mut dyn ConfirmationPrompt =
                if yes { &mut auto } else { &mut terminal };

            let cleared = reset::reset_history(
                &mut store,
                prompt,
                &history,
                cumulative.as_deref(),
                || println!("Practice history for '{drill}' cleared."),
            )?;
            if !cleared {
                println!("Left '{drill}' untouched.");
            }
        }
    }

    Ok(())
}
