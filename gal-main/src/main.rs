use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use gal_core::eyre::Result;
use gal_core::{
    Configuration, Execution, FrameClock, CONFIG_PATH, RESOURCES_BUNDLE, RESOURCES_MANIFEST,
    RESOURCES_ROOT,
};
use gal_resources::{
    BundleSource, Context, DirSource, EventReceiver, LoadMode, LoaderEvent, LoaderHandle,
    LoaderOptions, Registration, Resources, Sources,
};
use tracing::{info, warn};

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
struct Stats {
    loaded: usize,
    failed: usize,
    bytes: usize,
}

struct Pending {
    name: String,
    loader: LoaderHandle,
    events: EventReceiver,
}

impl Pending {
    fn start(ctx: &Arc<Context>, name: String, loader: LoaderHandle) -> Pending {
        let events = loader.subscribe();
        loader.load(ctx, None, LoadMode::Async);
        Pending {
            name,
            loader,
            events,
        }
    }

    fn poll(&self, ctx: &Arc<Context>, stats: &mut Stats, spawned: &mut Vec<Pending>) -> bool {
        for event in self.events.try_iter() {
            match event {
                LoaderEvent::LoadFinished { source } => {
                    let size = self.loader.get().map_or(0, |v| v.size());
                    info!(name = %self.name, %source, size, "loaded");
                    stats.loaded += 1;
                    stats.bytes += size;

                    for (i, child) in self.loader.generated_loaders().into_iter().enumerate() {
                        let name = format!("{}[{}]", self.name, i);
                        spawned.push(Pending::start(ctx, name, child));
                    }
                    return false;
                }
                LoaderEvent::LoadFailed { message, .. } => {
                    warn!(name = %self.name, %message, "failed");
                    stats.failed += 1;
                    return false;
                }
                LoaderEvent::UnloadFinished => {}
            }
        }

        true
    }
}

fn load_config() -> Result<Configuration> {
    let mut config = Configuration::new();
    config.parse_args(std::env::args().skip(1));

    let path = config.get_string(CONFIG_PATH, "config.json");
    if Path::new(&path).is_file() {
        config.load_from_file(&path)?;
        config.parse_args(std::env::args().skip(1));
    }

    Ok(config)
}

fn create_context(config: &Configuration) -> Result<Arc<Context>> {
    let execution = Execution::new(config.max_threads())?;

    let bundle = match config.get_string(RESOURCES_BUNDLE, "") {
        dir if dir.is_empty() => BundleSource::new(),
        dir => BundleSource::from_dir(dir)?,
    };
    let root = config.get_string(RESOURCES_ROOT, ".");
    let sources = Sources::new(DirSource::new(root)?, bundle);

    Ok(Context::new(
        Arc::new(Registration::with_builtin()),
        sources,
        execution,
        LoaderOptions::from_config(config),
    ))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = load_config()?;
    let ctx = create_context(&config)?;
    let resources = Resources::new(ctx.clone());

    let manifest = config.get_string(RESOURCES_MANIFEST, "resources.json");
    if ctx.sources().exists(&manifest) {
        let count = resources.register_manifest(&manifest)?;
        info!(%manifest, count, "resources registered");
    } else {
        warn!(%manifest, "resource manifest not found");
    }

    let mut pending = resources
        .loaders()
        .into_iter()
        .map(|(name, loader)| Pending::start(&ctx, name, loader))
        .collect::<Vec<_>>();

    let mut clock = FrameClock::new(config.fixed_update_interval());
    let mut stats = Stats::default();

    while !pending.is_empty() && clock.runtime() < LOAD_TIMEOUT {
        clock.update();

        while clock.should_fixed_update() {
            let mut spawned = Vec::new();
            pending.retain(|v| v.poll(&ctx, &mut stats, &mut spawned));
            pending.append(&mut spawned);
        }

        std::thread::sleep(clock.fixed_update_interval());
    }

    for v in &pending {
        warn!(name = %v.name, "load did not finish in time");
    }

    info!(
        loaded = stats.loaded,
        failed = stats.failed,
        bytes = stats.bytes,
        frames = clock.frame_count(),
        fps = clock.fps(),
        "done"
    );

    Ok(())
}
