use clap::{Parser, Subcommand};
use holoscene_avatar::FrameHost;
use holoscene_engine::{HeadlessEngine, XrSessionEvent};
use holoscene_input::{InputState, MoveInput, MoveKey, MoveSource};
use holoscene_persist::{AVATAR_URL_KEY, FileRecordStore, RecordStore};
use holoscene_session::{SessionConfig, SessionOrchestrator};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Asset URL the scripted creation frame "exports".
const DEMO_AVATAR_URL: &str = "https://models.example/demo-avatar.glb";

#[derive(Parser)]
#[command(name = "holoscene-cli", about = "Scripted holoscene session driver")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Session config file (YAML); defaults apply when absent
    #[arg(long, default_value = "./holoscene_data/config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and effective configuration
    Info,
    /// Run the avatar-acquisition handshake against scripted frame messages
    Handshake,
    /// Run a full scripted session: acquisition, import, locomotion, XR
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "240")]
        frames: u32,
        /// Include an XR enter/exit round trip mid-run
        #[arg(long)]
        xr: bool,
    },
}

/// Frame host that narrates what a browser page would be doing.
#[derive(Debug, Default)]
struct ConsoleFrameHost;

impl FrameHost for ConsoleFrameHost {
    fn show_frame(&mut self, url: &str) {
        println!("[frame] visible, navigated to {url}");
    }
    fn hide_frame(&mut self) {
        println!("[frame] hidden");
    }
    fn show_cta(&mut self) {
        println!("[cta] 'Load Avatar' shown");
    }
    fn hide_cta(&mut self) {
        println!("[cta] hidden");
    }
    fn post_to_frame(&mut self, message: &str) {
        println!("[frame] <- {message}");
    }
}

fn frame_message(event_name: &str, data: &str) -> String {
    format!(r#"{{"source":"readyplayerme","eventName":"{event_name}","data":{data}}}"#)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = SessionConfig::load(&cli.config)?;

    match cli.command {
        Commands::Info => {
            println!("holoscene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("creator subdomain: {}", config.handshake.subdomain);
            println!("record store: {}", config.handshake.store_path.display());
            println!(
                "locomotion: walk={} run={} slope_limit={}deg step_offset={}",
                config.locomotion.walk_speed,
                config.locomotion.run_speed,
                config.locomotion.slope_limit_degrees,
                config.locomotion.step_offset
            );
            println!("xr enabled: {}", config.xr.enabled);
        }
        Commands::Handshake => run_handshake(config)?,
        Commands::Run { frames, xr } => run_session(config, frames, xr).await?,
    }

    Ok(())
}

/// Drive the handshake alone, with deliberately noisy scripted traffic.
fn run_handshake(config: SessionConfig) -> anyhow::Result<()> {
    let store = FileRecordStore::open(&config.handshake.store_path)?;
    let orchestrator = SessionOrchestrator::new(config);
    let (mut handshake, resolution) =
        orchestrator.begin_acquisition(store, ConsoleFrameHost)?;

    if handshake.resolved_url().is_some() {
        println!("persisted avatar restored; creation frame stays hidden");
    } else {
        handshake.open_creator_frame();

        // The shared message channel sees unrelated traffic too.
        handshake.subscribe("not even json");
        handshake.subscribe(r#"{"source":"devtools","eventName":"ping"}"#);
        handshake.subscribe(&frame_message("v1.frame.ready", "{}"));
        handshake.subscribe(&frame_message("v1.user.set", r#"{"id":"demo-user"}"#));
        handshake.subscribe(&frame_message(
            "v1.avatar.exported",
            &format!(r#"{{"url":"{DEMO_AVATAR_URL}"}}"#),
        ));
        // A duplicate export arrives late; the first resolution wins.
        handshake.subscribe(&frame_message(
            "v1.avatar.exported",
            r#"{"url":"https://models.example/other.glb"}"#,
        ));
    }

    println!("acquisition state: {:?}", handshake.state());
    match handshake.resolved_url() {
        Some(url) => println!("resolved avatar: {url}"),
        None => println!("resolution still pending (scripted messages were all noise?)"),
    }
    drop(resolution);
    Ok(())
}

/// Full bring-up plus a frame loop against the headless engine.
async fn run_session(config: SessionConfig, frames: u32, xr: bool) -> anyhow::Result<()> {
    let store = FileRecordStore::open(&config.handshake.store_path)?;
    let restored = store.get(AVATAR_URL_KEY)?;
    let orchestrator = SessionOrchestrator::new(config);

    let mut engine = HeadlessEngine::new();
    engine.register_bundle(DEMO_AVATAR_URL, HeadlessEngine::standard_rig_bundle());
    if let Some(url) = &restored {
        // Whatever was persisted last run must import this run too.
        engine.register_bundle(url, HeadlessEngine::standard_rig_bundle());
    }

    let (mut handshake, resolution) =
        orchestrator.begin_acquisition(store, ConsoleFrameHost)?;
    if restored.is_none() {
        // First run: script the user finishing the creator flow.
        handshake.open_creator_frame();
        handshake.subscribe(&frame_message("v1.frame.ready", "{}"));
        handshake.subscribe(&frame_message(
            "v1.avatar.exported",
            &format!(r#"{{"url":"{DEMO_AVATAR_URL}"}}"#),
        ));
    } else {
        println!("persisted avatar found, creation frame stays hidden");
    }

    let mut session = orchestrator.run(&mut engine, resolution).await;
    println!(
        "session up: avatar={} xr={}",
        session.avatar_url.as_deref().unwrap_or("<none>"),
        session.xr_enabled
    );

    // Walk forward the whole run; enter XR a third of the way in and leave
    // two thirds of the way in.
    let mut input = InputState::new();
    input.press(MoveKey::Forward);
    let enter_at = frames / 3;
    let exit_at = frames * 2 / 3;

    for frame in 0..frames {
        if xr && frame == enter_at {
            engine.push_xr_event(XrSessionEvent::EnterRequested);
            engine.push_xr_event(XrSessionEvent::SessionActive);
        }
        if xr && frame == exit_at {
            engine.push_xr_event(XrSessionEvent::ExitRequested);
            engine.push_xr_event(XrSessionEvent::SessionEnded);
        }

        let sample = if session
            .locomotion
            .as_ref()
            .is_some_and(|l| l.is_in_xr())
        {
            // First person: stand still, look around with the headset.
            MoveInput::default()
        } else {
            input.sample()
        };
        session.tick(&mut engine, sample);

        if frame % 60 == 0 {
            report(&session, frame);
        }
    }
    report(&session, frames);

    Ok(())
}

fn report(session: &holoscene_session::ActiveSession, frame: u32) {
    match &session.locomotion {
        Some(locomotion) => {
            let p = locomotion.position();
            println!(
                "frame {frame:>4}: phase={:?} mode={:?} clip={:?} pos=({:.2}, {:.2}, {:.2})",
                session.coordinator.phase(),
                locomotion.mode(),
                locomotion.active_clip(),
                p.x,
                p.y,
                p.z
            );
        }
        None => println!("frame {frame:>4}: no avatar (degraded session)"),
    }
}
