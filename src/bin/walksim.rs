//! Walksim CLI - run the character core headless

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use walksim::config::SimConfig;
use walksim::game::input::Key;
use walksim::game::{ClipInfo, FrameSink, FrameSnapshot, SimCommand, SkinnedAsset, VariantKind, WalkSim};

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES_PER_SECOND: u64 = 60;
/// Seconds between scripted jumps
const JUMP_INTERVAL: u64 = 2;

#[derive(Parser)]
#[command(name = "walksim")]
#[command(about = "Headless walking simulator character core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted walk and print one snapshot per simulated second
    Run {
        /// Path to a walksim.toml (defaults are used otherwise)
        #[arg(short, long, env = "WALKSIM_CONFIG")]
        config: Option<PathBuf>,
        /// Simulated seconds
        #[arg(short, long, default_value = "10")]
        seconds: u64,
        /// Character to switch to halfway through ("Blocky" or "MilkAnimated")
        #[arg(long)]
        character: Option<String>,
        /// Hold sprint for the whole run
        #[arg(long)]
        sprint: bool,
        /// Print snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Parse a config file and print the effective values
    CheckConfig {
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seconds,
            character,
            sprint,
            json,
        } => run(config, seconds, character, sprint, json),
        Commands::CheckConfig { path } => check_config(&path),
    }
}

fn load_config(path: Option<&Path>) -> SimConfig {
    match path {
        Some(path) => SimConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }),
        None => SimConfig::default(),
    }
}

/// Prints every `every`-th frame to stdout.
struct SnapshotPrinter {
    json: bool,
    every: u64,
}

impl FrameSink for SnapshotPrinter {
    fn render(&mut self, snapshot: &FrameSnapshot) {
        if snapshot.frame % self.every != 0 {
            return;
        }
        if self.json {
            match serde_json::to_string(snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Error: failed to encode snapshot: {}", e),
            }
            return;
        }
        let pos = snapshot.position.unwrap_or_default();
        println!(
            "t={:>5.2}s {:<12} pos=({:>6.2}, {:>5.2}, {:>6.2}) grounded={:<5} stamina={:>5.1}/{:.0} fov={:.1} anim={}",
            snapshot.elapsed,
            snapshot.active.map(|k| k.as_str()).unwrap_or("-"),
            pos[0],
            pos[1],
            pos[2],
            snapshot.grounded,
            snapshot.stamina.current,
            snapshot.stamina.max,
            snapshot.fov,
            snapshot
                .animation
                .map(|a| a.clip_name())
                .unwrap_or("procedural"),
        );
    }
}

fn synthetic_clips() -> Vec<ClipInfo> {
    vec![
        ClipInfo::new("Idle", 2.0),
        ClipInfo::new("Walk", 1.0),
        ClipInfo::new("Run", 0.7),
        ClipInfo::new("Jump", 0.8),
    ]
}

fn run(config: Option<PathBuf>, seconds: u64, character: Option<String>, sprint: bool, json: bool) {
    let config = load_config(config.as_deref());

    let switch_to = character.map(|name| {
        name.parse::<VariantKind>().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        })
    });

    let mut sim = WalkSim::new(config);
    sim.set_frame_sink(Box::new(SnapshotPrinter {
        json,
        every: FRAMES_PER_SECOND,
    }));
    sim.start();
    sim.key_down(Key::Forward);
    if sprint {
        sim.key_down(Key::Sprint);
    }

    let total = seconds * FRAMES_PER_SECOND;
    let halfway = total / 2;
    let commands = sim.command_sender();

    for frame in 0..total {
        if frame == halfway {
            if let Some(kind) = switch_to {
                if kind == VariantKind::Skinned {
                    let _ = commands.send(SimCommand::SkinnedAssetLoaded(SkinnedAsset::with_clips(
                        "MilkAnimated",
                        synthetic_clips(),
                    )));
                }
                let _ = commands.send(SimCommand::SwitchCharacter {
                    variant: kind.as_str().to_string(),
                });
            }
        }

        let jump_frame = frame > 0 && frame % (JUMP_INTERVAL * FRAMES_PER_SECOND) == 0;
        if jump_frame {
            sim.key_down(Key::Jump);
        }
        sim.frame(FRAME_DT);
        if jump_frame {
            sim.key_up(Key::Jump);
        }

        // Re-press sprint once the pool has recovered from exhaustion.
        if sprint && !sim.controls().input().sprinting && sim.stamina().can_sprint() {
            sim.key_up(Key::Sprint);
            sim.key_down(Key::Sprint);
        }
    }

    sim.stop();
    tracing::info!(frames = sim.frame_count(), "run finished");
}

fn check_config(path: &Path) {
    let config = load_config(Some(path));
    match toml::to_string_pretty(&config) {
        Ok(text) => {
            println!("# effective configuration for {}", path.display());
            print!("{}", text);
        }
        Err(e) => {
            eprintln!("Error: failed to render config: {}", e);
            std::process::exit(1);
        }
    }
}
