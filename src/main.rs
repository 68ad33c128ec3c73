use std::fs::{self, OpenOptions};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glance::app::{App, AppEvent};
use glance::engine::config::LoggingConfig;
use glance::engine::{load_settings, GlanceError};
use glance::storage::{FramePayload, JsonNoteStore};
use glance::ui::{Theme, TuiManager};

const USAGE: &str = "usage: glance [--config FILE] [--payload FILE|-] [FILE]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    payload: Option<String>,
    file: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                args.config = Some(iter.next().ok_or("--config needs a path")?.into());
            }
            "--payload" | "-p" => {
                args.payload = Some(iter.next().ok_or("--payload needs a path or -")?);
            }
            "--help" | "-h" => return Err(USAGE.to_string()),
            _ if args.file.is_none() && !arg.starts_with('-') => args.file = Some(arg),
            _ => return Err(format!("unexpected argument {}\n{}", arg, USAGE)),
        }
    }

    Ok(args)
}

fn init_tracing(config: &LoggingConfig) -> Result<(), GlanceError> {
    if let Some(parent) = config.file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&config.file)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.level.as_str().into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

fn read_payload(source: &str) -> Result<FramePayload, GlanceError> {
    let raw = if source == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        raw
    } else {
        fs::read_to_string(source)?
    };
    Ok(FramePayload::decode(&raw)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    let settings = load_settings(args.config.as_deref())?;
    init_tracing(&settings.logging)?;
    tracing::info!(notes = %settings.storage.notes_path.display(), "starting glance");

    let theme = Theme::from_config(&settings.theme)?;
    let notes = JsonNoteStore::open(&settings.storage.notes_path)?;
    let mut app = App::with_command_speech(settings, Box::new(notes))?;

    if let Some(source) = &args.payload {
        app.load_payload(read_payload(source)?)?;
    }
    if let Some(file) = args.file {
        app.handle_event(AppEvent::LoadFile(file));
    }

    let mut tui = TuiManager::new(theme)?;
    tui.run_event_loop(&mut app)?;

    Ok(())
}
