use std::fmt::{self, Debug};
use std::sync::Arc;

use gal_core::ahash::AHashMap;
use gal_core::eyre::Result;
use gal_core::parking_lot::Mutex;
use tracing::{debug, instrument, trace, warn};

use crate::context::Context;
use crate::event::{EventReceiver, EventSenders, LoaderEvent};
use crate::resource::ResourceHandle;
use crate::sync_any::SyncAny;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LoadMode {
    Sync,
    Async,
}

pub trait Loader: SyncAny {
    fn core(&self) -> &LoaderCore;

    fn load_impl(&self, ctx: &Context, source: &str) -> Result<ResourceHandle>;

    fn unload_impl(&self) {}
}

pub struct LoaderCore {
    protocol: String,
    suffix: String,
    resources: Mutex<CacheState>,
    initialized: Mutex<bool>,
    events: Mutex<EventSenders>,
}

#[derive(Default)]
struct CacheState {
    source_url: Option<String>,
    cache: AHashMap<String, ResourceHandle>,
    last: Option<ResourceHandle>,
    generated: Vec<LoaderHandle>,
}

impl LoaderCore {
    pub fn new(protocol: impl Into<String>, suffix: impl Into<String>) -> LoaderCore {
        LoaderCore {
            protocol: protocol.into(),
            suffix: suffix.into(),
            resources: Mutex::new(CacheState::default()),
            initialized: Mutex::new(false),
            events: Mutex::new(EventSenders::new()),
        }
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn source_url(&self) -> Option<String> {
        self.resources.lock().source_url.clone()
    }

    pub fn set_source_url(&self, source: impl Into<String>) {
        self.resources.lock().source_url = Some(source.into());
    }

    pub fn is_initialized(&self) -> bool {
        *self.initialized.lock()
    }

    fn set_initialized(&self, value: bool) {
        *self.initialized.lock() = value;
    }

    pub fn find_cached(&self, source: &str) -> Option<ResourceHandle> {
        self.resources.lock().cache.get(source).cloned()
    }

    fn cache(&self, source: &str, resource: ResourceHandle) {
        if source.is_empty() {
            return;
        }

        let mut state = self.resources.lock();
        state.cache.insert(source.to_owned(), resource.clone());
        state.last = Some(resource);
    }

    fn clear(&self) {
        let mut state = self.resources.lock();
        state.cache.clear();
        state.last = None;
    }

    pub fn generated_loaders(&self) -> Vec<LoaderHandle> {
        self.resources.lock().generated.clone()
    }

    pub fn set_generated_loaders(&self, loaders: Vec<LoaderHandle>) {
        self.resources.lock().generated = loaders;
    }

    fn subscribe(&self) -> EventReceiver {
        self.events.lock().subscribe()
    }

    fn notify(&self, event: LoaderEvent) {
        self.events.lock().send(&event);
    }
}

impl Debug for LoaderCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.resources.lock();
        f.debug_struct("LoaderCore")
            .field("protocol", &self.protocol)
            .field("suffix", &self.suffix)
            .field("source_url", &state.source_url)
            .field("cached", &state.cache.len())
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct LoaderHandle {
    inner: Arc<dyn Loader>,
}

impl LoaderHandle {
    pub fn new<L: Loader>(loader: L) -> LoaderHandle {
        LoaderHandle {
            inner: Arc::new(loader),
        }
    }

    fn core(&self) -> &LoaderCore {
        self.inner.core()
    }

    pub fn protocol(&self) -> &str {
        self.core().protocol()
    }

    pub fn suffix(&self) -> &str {
        self.core().suffix()
    }

    pub fn type_name(&self) -> &'static str {
        (*self.inner).type_name()
    }

    pub fn downcast_ref<L: Loader>(&self) -> Option<&L> {
        (*self.inner).as_any().downcast_ref()
    }

    pub fn ptr_eq(&self, other: &LoaderHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn source_url(&self) -> Option<String> {
        self.core().source_url()
    }

    pub fn set_source_url(&self, source: impl Into<String>) {
        self.core().set_source_url(source)
    }

    pub fn is_initialized(&self) -> bool {
        self.core().is_initialized()
    }

    pub fn get(&self) -> Option<ResourceHandle> {
        self.core().resources.lock().last.clone()
    }

    pub fn cached(&self, source: &str) -> Option<ResourceHandle> {
        self.core().find_cached(source)
    }

    pub fn cached_len(&self) -> usize {
        self.core().resources.lock().cache.len()
    }

    pub fn generated_loaders(&self) -> Vec<LoaderHandle> {
        self.core().generated_loaders()
    }

    pub fn set_generated_loaders(&self, loaders: Vec<LoaderHandle>) {
        self.core().set_generated_loaders(loaders)
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.core().subscribe()
    }

    pub fn load(&self, ctx: &Arc<Context>, source: Option<&str>, mode: LoadMode) -> &LoaderHandle {
        let source = match self.resolve_source(source) {
            Some(v) => v,
            None => return self,
        };

        match mode {
            LoadMode::Sync => {
                self.complete_load(ctx, &source);
            }
            LoadMode::Async => {
                let loader = self.clone();
                let task_ctx = ctx.clone();
                ctx.execution().dispatch(move || {
                    loader.complete_load(&task_ctx, &source);
                });
            }
        }

        self
    }

    pub fn load_now(&self, ctx: &Context, source: Option<&str>) -> Option<ResourceHandle> {
        let source = self.resolve_source(source)?;
        self.complete_load(ctx, &source)
    }

    pub fn unload(&self, ctx: &Arc<Context>, mode: LoadMode) -> &LoaderHandle {
        match mode {
            LoadMode::Sync => self.complete_unload(),
            LoadMode::Async => {
                let loader = self.clone();
                ctx.execution().dispatch(move || loader.complete_unload());
            }
        }

        self
    }

    fn resolve_source(&self, source: Option<&str>) -> Option<String> {
        let source = source
            .map(str::to_owned)
            .or_else(|| self.source_url())
            .filter(|v| !v.is_empty());

        if source.is_none() {
            let message = format!(
                "loader source url is empty for {}:{}",
                self.protocol(),
                self.suffix()
            );
            warn!("{}", message);
            self.core().notify(LoaderEvent::LoadFailed {
                source: None,
                message,
            });
        }

        source
    }

    #[instrument(skip_all, fields(loader = self.type_name(), source = %source))]
    fn complete_load(&self, ctx: &Context, source: &str) -> Option<ResourceHandle> {
        let core = self.core();

        let resource = match core.find_cached(source) {
            Some(resource) => {
                trace!("cache hit");
                resource
            }
            None => match self.inner.load_impl(ctx, source) {
                Ok(resource) => {
                    debug!(size = resource.size(), "resource loaded");
                    resource
                }
                Err(error) => {
                    warn!(?error, "load failed");
                    core.notify(LoaderEvent::LoadFailed {
                        source: Some(source.to_owned()),
                        message: format!("{:#}", error),
                    });
                    return None;
                }
            },
        };

        core.cache(source, resource.clone());
        core.set_initialized(true);
        core.notify(LoaderEvent::LoadFinished {
            source: source.to_owned(),
        });

        Some(resource)
    }

    fn complete_unload(&self) {
        let core = self.core();
        self.inner.unload_impl();
        core.clear();
        core.set_initialized(false);
        trace!(loader = self.type_name(), "unloaded");
        core.notify(LoaderEvent::UnloadFinished);
    }
}

impl Debug for LoaderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}:{})", self.type_name(), self.protocol(), self.suffix())
    }
}
