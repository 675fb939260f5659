use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use readingroom_common::{RoomSettings, SessionIdentity, UserId};
use readingroom_input::{
    Action, CaptureError, IntentHandle, IntentSink, MoveDirection, Platform, PointerCapture,
};
use readingroom_persist::{
    ClubConfig, FileKvStore, HttpKvStore, KvStore, MemoryKvStore, load_club_config,
    save_club_config,
};
use readingroom_presence::MemoryHub;
use readingroom_render::{DebugTextRenderer, Renderer};
use readingroom_room::{RoomSession, catalog};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "readingroom-cli", about = "CLI tool for the virtual reading room")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Room settings JSON file; defaults apply when omitted
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and room constants
    Info,
    /// Walk simulated readers around an in-memory room
    Simulate {
        /// Number of simulated readers besides you
        #[arg(short, long, default_value = "3")]
        users: usize,
        /// Simulated wall-clock seconds
        #[arg(short, long, default_value = "5")]
        seconds: u32,
        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: u32,
        /// RNG seed for colors and walking scripts
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Simulate touch-primary devices
        #[arg(long)]
        touch: bool,
    },
    /// Read or change the club configuration
    Config {
        #[command(flatten)]
        store: StoreArgs,
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Search the shelf catalog by title or author
    Catalog {
        /// Search text; lists every book when omitted
        query: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Update one or more fields
    Set {
        /// Next meeting, YYYY-MM-DDTHH:MM
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    File,
    Http,
    Memory,
}

#[derive(Args)]
struct StoreArgs {
    /// Key-value backend
    #[arg(long, value_enum, default_value_t = Backend::File)]
    store: Backend,
    /// File backend path
    #[arg(long, default_value = "./readingroom_kv.json")]
    path: PathBuf,
    /// HTTP backend base URL
    #[arg(long, env = "READINGROOM_KV_URL")]
    url: Option<String>,
    /// HTTP backend bearer key
    #[arg(long, env = "READINGROOM_KV_KEY", hide_env_values = true)]
    key: Option<String>,
}

impl StoreArgs {
    fn open(&self) -> Result<Box<dyn KvStore>> {
        Ok(match self.store {
            Backend::File => Box::new(
                FileKvStore::open(&self.path)
                    .with_context(|| format!("opening {}", self.path.display()))?,
            ),
            Backend::Http => {
                let url = self.url.clone().context("--url or READINGROOM_KV_URL is required")?;
                let key = self.key.clone().context("--key or READINGROOM_KV_KEY is required")?;
                Box::new(HttpKvStore::new(url, key))
            }
            Backend::Memory => Box::new(MemoryKvStore::new()),
        })
    }
}

/// Pointer capture for headless sessions: always granted.
struct HeadlessCapture;

impl PointerCapture for HeadlessCapture {
    fn lock(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn unlock(&mut self) {}
}

/// A simulated reader and its walking script.
struct Walker {
    session: RoomSession,
    intents: IntentHandle,
    phase: u32,
}

impl Walker {
    /// Pick a new heading and maybe a new direction to look.
    fn reroll(&mut self, rng: &mut StdRng, now: Instant) {
        self.intents.clear();
        let pick = rng.gen_range(0..=MoveDirection::ALL.len());
        if let Some(direction) = MoveDirection::ALL.get(pick) {
            self.intents.move_start(*direction);
        }
        let dx = rng.gen_range(-400.0..400.0);
        self.session.handle_action(&Action::Look { dx, dy: 0.0 }, now);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let settings = match &cli.settings {
        Some(path) => RoomSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => RoomSettings::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("readingroom-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("channel: {}", settings.channel);
            println!(
                "motion: speed={} m/s eye={} m boundary={} m",
                settings.move_speed, settings.eye_height, settings.boundary_radius
            );
            println!(
                "presence: interval={}ms smoothing={} expiry={}",
                settings.broadcast_interval_ms,
                settings.avatar_smoothing,
                settings
                    .presence_expiry_secs
                    .map_or_else(|| "off".to_string(), |s| format!("{s}s"))
            );
            println!("catalog: {} classics", catalog::CLASSICS.len());
        }
        Commands::Simulate {
            users,
            seconds,
            fps,
            seed,
            touch,
        } => simulate(&settings, users, seconds, fps, seed, touch)?,
        Commands::Config { store, action } => {
            let mut kv = store.open()?;
            match action {
                ConfigAction::Show => {
                    let config = load_club_config(kv.as_ref());
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
                ConfigAction::Set { date, title, image } => {
                    let mut config = load_club_config(kv.as_ref());
                    apply_overrides(&mut config, date, title, image);
                    save_club_config(kv.as_mut(), &config)?;
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
            }
        }
        Commands::Catalog { query } => {
            let query = query.unwrap_or_default();
            let hits = catalog::search(&query);
            if hits.is_empty() {
                println!("No books match \"{query}\"");
            }
            for book in hits {
                println!(
                    "{:<14} {:<14} {}  -> {}",
                    book.title,
                    book.author,
                    book.color,
                    catalog::highlight_id(book)
                );
            }
        }
    }

    Ok(())
}

fn apply_overrides(
    config: &mut ClubConfig,
    date: Option<String>,
    title: Option<String>,
    image: Option<String>,
) {
    if let Some(date) = date {
        config.next_meeting_date = date;
    }
    if let Some(title) = title {
        config.current_book_title = title;
    }
    if let Some(image) = image {
        config.current_book_image = image;
    }
}

fn simulate(
    settings: &RoomSettings,
    users: usize,
    seconds: u32,
    fps: u32,
    seed: u64,
    touch: bool,
) -> Result<()> {
    anyhow::ensure!(fps > 0, "--fps must be positive");
    let total_frames = seconds
        .checked_mul(fps)
        .context("--seconds times --fps is too large")?;
    let platform = if touch {
        Platform::touch()
    } else {
        Platform::desktop()
    };
    let hub = MemoryHub::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Instant::now();

    let mut walkers = Vec::with_capacity(users + 1);
    for i in 0..=users {
        let (id, account) = if i == 0 {
            ("you".to_string(), "you@readingroom.local".to_string())
        } else {
            (format!("reader-{i}"), format!("reader{i}@readingroom.local"))
        };
        let identity = SessionIdentity::with_rng(UserId::new(id), account, &mut rng);
        let mut session = RoomSession::new(identity, settings, platform)?;
        session.connect(Box::new(hub.subscribe(&settings.channel)));
        session.set_navigating(true, start);
        walkers.push(Walker {
            intents: session.intent_handle(),
            session,
            phase: rng.gen_range(0..fps),
        });
    }
    tracing::info!(
        readers = walkers.len(),
        seconds,
        fps,
        "simulation started"
    );

    let dt = 1.0 / fps as f32;
    let step = Duration::from_secs_f64(1.0 / f64::from(fps));
    let mut capture = HeadlessCapture;
    let mut now = start;
    for frame in 0..total_frames {
        now += step;
        for walker in &mut walkers {
            if frame % fps == walker.phase {
                walker.reroll(&mut rng, now);
            }
            walker.session.frame(now, dt, &mut capture);
        }
    }

    for walker in &walkers {
        println!(
            "{:<10} {}",
            walker.session.identity().display_name,
            walker.session.summary()
        );
    }
    if let Some(you) = walkers.first() {
        println!();
        print!(
            "{}",
            DebugTextRenderer::new().render(you.session.avatars(), &you.session.render_view())
        );
    }

    for walker in &mut walkers {
        walker.session.teardown(&mut capture);
    }
    println!(
        "\n{} readers, {} frames each on channel `{}`",
        walkers.len(),
        total_frames,
        settings.channel
    );
    Ok(())
}
