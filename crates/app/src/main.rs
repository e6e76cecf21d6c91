use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use limbo_core::{
    permutation::four_cycles, Action, AppConfig, Effect, InputState, PointerButton,
    RecordingCanvas, Show, SilentAudio, Tempo, TextureHandle, TextureLoader, KEY_COUNT,
};
use tracing_subscriber::EnvFilter;

fn main() -> limbo_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_headless(&args),
        Commands::Script { config } => print_script(config.as_deref()),
        Commands::Cycles => print_cycles(),
    }
}

fn load_config(path: Option<&Path>) -> limbo_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::from_path(path)
        }
        None => Ok(AppConfig::default()),
    }
}

/// Plays the show at a fixed time step with no window and no sound.
fn run_headless(args: &RunArgs) -> limbo_core::Result<()> {
    let config = load_config(args.config.as_deref())?;
    if matches!(args.choose, Some(key) if key >= KEY_COUNT) {
        return Err(limbo_core::LimboError::Config(format!(
            "--choose must be below {KEY_COUNT}"
        )));
    }

    let mut textures = HeadlessTextures::default();
    let mut show = Show::new(&config, &mut textures, Box::new(SilentAudio::default()))?;
    let mut canvas = RecordingCanvas::new();
    let mut input = InputState::new();

    let dt = 1.0 / args.fps as f32;
    let seconds = args
        .seconds
        .unwrap_or_else(|| show.timeline().total_duration());
    let frames = (seconds * args.fps as f32).ceil() as u64;
    tracing::info!(frames, fps = args.fps, seconds, "starting headless run");

    let mut played = 0;
    for frame in 0..frames {
        if args.skip && frame == 1 {
            input.press(Action::Skip);
        }
        if let Some(key) = args.choose {
            aim_at(&show, &mut input, key);
        }

        if !show.frame(dt, &input, &mut canvas) {
            break;
        }
        played += 1;

        input.end_frame();
        input.release(Action::Skip);
        input.pointer_up(PointerButton::Primary);
    }

    let report = serde_json::json!({
        "frames": played,
        "elapsed_seconds": show.timeline().elapsed(),
        "effect_index": show.timeline().current_index(),
        "tracked_key": show.scene().tracked_key,
        "chosen_key": show.scene().chosen_key,
        "outcome": show.outcome(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Clicks on `key` once the pick is on screen and the orbit has settled.
fn aim_at(show: &Show, input: &mut InputState, key: usize) {
    let picking = show.timeline().current_index() == Some(show.choose_index());
    let settled = show.timeline().current().map_or(false, |e| e.time() >= 1.0);
    if !(picking && settled) || show.scene().chosen_key.is_some() {
        return;
    }
    let scene = show.scene();
    let target = scene.key(key);
    let (projected, _) = scene.layout.project(target.position, target.z);
    input.move_pointer(scene.to_screen(projected));
    input.pointer_down(PointerButton::Primary);
}

fn print_script(path: Option<&Path>) -> limbo_core::Result<()> {
    let config = load_config(path)?;
    config.validate()?;
    let script = limbo_core::script::build(&config.show, Tempo::new(config.audio.bpm));
    let total: f32 = script.effects.iter().map(Effect::duration).sum();
    let listing = serde_json::json!({
        "start": script.start,
        "tracked_key": script.tracked_key,
        "choose_index": script.choose_index,
        "total_seconds": total,
        "effects": script.effects.iter().map(Effect::summary).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

fn print_cycles() -> limbo_core::Result<()> {
    let cycles = four_cycles();
    for cycle in &cycles {
        println!("{cycle}  {}", cycle.permutation());
    }
    tracing::info!(count = cycles.len(), "listed starting cycles");
    Ok(())
}

/// Texture loader for runs without a GPU: every path gets a fresh handle.
#[derive(Debug, Default)]
struct HeadlessTextures {
    next: u32,
}

impl TextureLoader for HeadlessTextures {
    fn load_texture(&mut self, path: &str) -> limbo_core::Result<TextureHandle> {
        self.next += 1;
        tracing::debug!(path, handle = self.next, "texture registered");
        Ok(TextureHandle(self.next))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Follow the key through the shuffle", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play the show headless at a fixed frame rate and report the outcome.
    Run(RunArgs),
    /// Print the built effect script as JSON.
    Script {
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List every four-slot cycle a show can start from.
    Cycles,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Optional JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,
    /// Seconds to simulate. Defaults to the scripted length.
    #[arg(long)]
    seconds: Option<f32>,
    /// Key identity to click once the pick starts.
    #[arg(long)]
    choose: Option<usize>,
    /// Skip straight to the pick after the first frame.
    #[arg(long)]
    skip: bool,
}
