//! Slot Machine Driver
//!
//! Usage:
//!   slotmachine pull                - Pull once with the words profile
//!   slotmachine pull --pulls 100    - Run a session and print statistics
//!   slotmachine check eon           - Classify a combination
//!   slotmachine profile --json      - Print the active configuration

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use sm_core::{
    LogPresenter, Machine, MachineBuilder, MachineConfig, Profile, SessionStats, SpinOutcome,
};

#[derive(Parser)]
#[command(name = "slotmachine", about = "Headless slot machine driver")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Built-in profile (words, variant-b)
    #[arg(short, long, default_value = "words")]
    profile: Profile,

    /// JSON or YAML config file, overrides --profile
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    fn load(&self) -> Result<MachineConfig> {
        match &self.config {
            Some(path) => MachineConfig::from_path(path)
                .with_context(|| format!("failed to load config {}", path.display())),
            None => Ok(self.profile.config()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Pull the lever and print the outcomes
    Pull {
        #[command(flatten)]
        config: ConfigArgs,

        /// Override the number of reels
        #[arg(short, long)]
        reels: Option<usize>,

        /// Number of pulls
        #[arg(short = 'n', long, default_value_t = 1)]
        pulls: u64,

        /// RNG seed for a reproducible session
        #[arg(short, long)]
        seed: Option<u64>,

        /// Drive the clock in frames of this many ms instead of jumping
        #[arg(long)]
        frame_ms: Option<f64>,

        /// Print outcomes as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Classify a centre-row combination against the win tables
    Check {
        combination: String,

        #[command(flatten)]
        config: ConfigArgs,

        #[arg(long)]
        json: bool,
    },
    /// Print the active configuration
    Profile {
        #[command(flatten)]
        config: ConfigArgs,

        /// JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Pull {
            config,
            reels,
            pulls,
            seed,
            frame_ms,
            json,
        } => run_pulls(&config, reels, pulls, seed, frame_ms, json),
        Commands::Check {
            combination,
            config,
            json,
        } => check_combination(&config, &combination, json),
        Commands::Profile { config, json } => print_profile(&config, json),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run_pulls(
    args: &ConfigArgs,
    reels: Option<usize>,
    pulls: u64,
    seed: Option<u64>,
    frame_ms: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut config = args.load()?;
    if let Some(reels) = reels {
        config = config.with_reel_count(reels);
    }
    if let Some(frame) = frame_ms {
        if !(frame.is_finite() && frame > 0.0) {
            bail!("--frame-ms must be a positive number, got {frame}");
        }
    }

    let mut builder = MachineBuilder::new(config);
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    let mut machine = builder
        .build_with(LogPresenter::new())
        .context("failed to build machine")?;

    for _ in 0..pulls {
        let outcome = match frame_ms {
            Some(frame) => pull_in_frames(&mut machine, frame)?,
            None => machine
                .pull_and_wait()
                .context("pull did not reach an outcome")?,
        };

        if json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else {
            print_outcome(&outcome);
        }
    }

    if !json && pulls > 1 {
        println!();
        print!("{}", format_stats(machine.stats()));
    }

    Ok(())
}

/// Pull, then advance the clock one frame at a time until the outcome lands
fn pull_in_frames(machine: &mut Machine<LogPresenter>, frame_ms: f64) -> Result<SpinOutcome> {
    if !machine.pull().is_started() {
        bail!("machine is still spinning");
    }
    let mut frames = 0u64;
    loop {
        if let Some(outcome) = machine.advance(frame_ms).pop() {
            log::debug!("outcome after {frames} frames");
            return Ok(outcome);
        }
        if machine.pending_events() == 0 {
            bail!("spin stalled after {frames} frames");
        }
        frames += 1;
    }
}

fn format_stats(stats: &SessionStats) -> String {
    format!(
        "Pulls:        {}\n\
         Regular wins: {}\n\
         Super wins:   {}\n\
         Losses:       {}\n\
         Hit rate:     {:.2}%\n",
        stats.pulls,
        stats.regular_wins,
        stats.super_wins,
        stats.losses,
        stats.hit_rate()
    )
}

fn print_outcome(outcome: &SpinOutcome) {
    println!(
        "#{:<4} {:<8} {:<10} steps {:?} ({:.0}ms)",
        outcome.pull_id,
        outcome.combination,
        outcome.win.label(),
        outcome.steps,
        outcome.duration_ms()
    );
}

fn check_combination(args: &ConfigArgs, combination: &str, json: bool) -> Result<()> {
    let config = args.load()?;
    let tables = config.win_tables()?;
    let win = tables.classify(combination);

    if json {
        let value = serde_json::json!({
            "combination": combination,
            "win": win,
        });
        println!("{value}");
    } else {
        println!("'{combination}': {}", win.label());
    }
    Ok(())
}

fn print_profile(args: &ConfigArgs, json: bool) -> Result<()> {
    let config = args.load()?;
    let text = if json {
        config.to_json_string()?
    } else {
        config.to_yaml_string()?
    };
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_core::{StepRange, WinKind};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("slotmachine").chain(args.iter().copied())).unwrap()
    }

    fn seeded(config: MachineConfig) -> Machine<LogPresenter> {
        MachineBuilder::new(config)
            .seed(17)
            .build_with(LogPresenter::new())
            .unwrap()
    }

    #[test]
    fn test_pull_defaults() {
        let cli = parse(&["pull"]);
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Pull {
                config,
                reels,
                pulls,
                seed,
                frame_ms,
                json,
            } => {
                assert_eq!(config.profile, Profile::Words);
                assert!(config.config.is_none());
                assert_eq!(reels, None);
                assert_eq!(pulls, 1);
                assert_eq!(seed, None);
                assert_eq!(frame_ms, None);
                assert!(!json);
            }
            _ => panic!("expected pull"),
        }
    }

    #[test]
    fn test_pull_flags() {
        let cli = parse(&[
            "-vv", "pull", "--profile", "variant-b", "-r", "5", "-n", "20", "--seed", "9",
            "--frame-ms", "16", "--json",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Pull {
                config,
                reels,
                pulls,
                seed,
                frame_ms,
                json,
            } => {
                assert_eq!(config.profile, Profile::VariantB);
                assert_eq!(reels, Some(5));
                assert_eq!(pulls, 20);
                assert_eq!(seed, Some(9));
                assert_eq!(frame_ms, Some(16.0));
                assert!(json);
            }
            _ => panic!("expected pull"),
        }
    }

    #[test]
    fn test_check_and_profile_commands() {
        match parse(&["check", "eon", "-p", "b", "--json"]).command {
            Commands::Check {
                combination,
                config,
                json,
            } => {
                assert_eq!(combination, "eon");
                assert_eq!(config.profile, Profile::VariantB);
                assert!(json);
            }
            _ => panic!("expected check"),
        }
        assert!(matches!(
            parse(&["profile", "--config", "machine.yaml"]).command,
            Commands::Profile { config, json: false }
                if config.config == Some(PathBuf::from("machine.yaml"))
        ));
    }

    #[test]
    fn test_bad_arguments_rejected() {
        assert!(Cli::try_parse_from(["slotmachine", "pull", "--profile", "c"]).is_err());
        assert!(Cli::try_parse_from(["slotmachine", "pull", "--pulls", "-1"]).is_err());
        assert!(Cli::try_parse_from(["slotmachine", "check"]).is_err());
        assert!(Cli::try_parse_from(["slotmachine"]).is_err());
    }

    #[test]
    fn test_config_file_overrides_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("machine.json");
        let written = MachineConfig::variant_b().with_reel_count(4);
        std::fs::write(&path, written.to_json_string().unwrap()).unwrap();

        let args = ConfigArgs {
            profile: Profile::Words,
            config: Some(path),
        };
        assert_eq!(args.load().unwrap(), written);

        let missing = ConfigArgs {
            profile: Profile::Words,
            config: Some(dir.path().join("absent.yaml")),
        };
        assert!(missing.load().is_err());
    }

    #[test]
    fn test_pull_in_frames_reaches_outcome() {
        let mut machine = seeded(MachineConfig::words().with_steps(StepRange::new(2, 2)));
        let outcome = pull_in_frames(&mut machine, 16.0).unwrap();
        assert_eq!(outcome.steps, vec![2, 2, 2]);
        assert!(!machine.is_running());
        assert!(machine.presenter().trigger_enabled());
    }

    #[test]
    fn test_pull_in_frames_rejects_busy_machine() {
        let mut machine = seeded(MachineConfig::words());
        machine.pull();
        assert!(pull_in_frames(&mut machine, 16.0).is_err());
    }

    #[test]
    fn test_zero_frame_time_rejected() {
        let args = ConfigArgs {
            profile: Profile::Words,
            config: None,
        };
        assert!(run_pulls(&args, None, 1, Some(1), Some(0.0), true).is_err());
        assert!(run_pulls(&args, None, 1, Some(1), Some(f64::NAN), true).is_err());
    }

    #[test]
    fn test_stats_report_separates_win_kinds() {
        let stats = SessionStats {
            pulls: 10,
            regular_wins: 3,
            super_wins: 1,
            losses: 6,
        };
        let report = format_stats(&stats);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "Regular wins: 3");
        assert_eq!(lines[2], "Super wins:   1");
        assert_eq!(lines[4], "Hit rate:     40.00%");
    }

    #[test]
    fn test_check_uses_profile_tables() {
        let args = ConfigArgs {
            profile: Profile::Words,
            config: None,
        };
        let tables = args.load().unwrap().win_tables().unwrap();
        assert_eq!(tables.classify("eee"), WinKind::Super);
        assert!(check_combination(&args, "xyz", true).is_ok());
    }
}
