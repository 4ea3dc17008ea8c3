use std::fmt::{self, Debug, Display};
use std::path::PathBuf;
use std::sync::Arc;

use gal_core::parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use image::{DynamicImage, GenericImageView};
use serde_json::Value;

const AUDIO_BYTES_PER_SECOND: f32 = 44100.0 * 2.0 * 2.0;

pub type ResourceHandle = Arc<Resource>;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourceState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResourceKind {
    Texture { width: u32, height: u32 },
    Audio { duration: f32 },
    Json { data_size: usize },
    Media { data_size: usize },
    Qml { data_size: usize },
}

impl ResourceKind {
    fn size(&self) -> usize {
        match *self {
            ResourceKind::Texture { width, height } => width as usize * height as usize * 4,
            ResourceKind::Audio { duration } => (AUDIO_BYTES_PER_SECOND * duration.max(0.0)) as usize,
            ResourceKind::Json { data_size }
            | ResourceKind::Media { data_size }
            | ResourceKind::Qml { data_size } => data_size,
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MediaUrl {
    Bundled(String),
    File(PathBuf),
}

impl Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaUrl::Bundled(path) => write!(f, "qrc:/{}", path),
            MediaUrl::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}

pub enum Payload {
    Image(DynamicImage),
    Media(MediaUrl),
    Document(Value),
    Text(String),
}

impl Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Image(image) => f.debug_tuple("Image").field(&image.dimensions()).finish(),
            Payload::Media(url) => f.debug_tuple("Media").field(url).finish(),
            Payload::Document(_) => f.write_str("Document(..)"),
            Payload::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
        }
    }
}

pub struct Resource {
    url: String,
    inner: RwLock<ResourceInner>,
}

struct ResourceInner {
    state: ResourceState,
    kind: ResourceKind,
    payload: Option<Box<Payload>>,
}

impl Resource {
    pub fn new(url: impl Into<String>, kind: ResourceKind) -> Resource {
        Resource {
            url: url.into(),
            inner: RwLock::new(ResourceInner {
                state: ResourceState::Unloaded,
                kind,
                payload: None,
            }),
        }
    }

    pub fn texture(url: impl Into<String>) -> Resource {
        Resource::new(url, ResourceKind::Texture { width: 0, height: 0 })
    }

    pub fn audio(url: impl Into<String>) -> Resource {
        Resource::new(url, ResourceKind::Audio { duration: 0.0 })
    }

    pub fn json(url: impl Into<String>) -> Resource {
        Resource::new(url, ResourceKind::Json { data_size: 0 })
    }

    pub fn media(url: impl Into<String>) -> Resource {
        Resource::new(url, ResourceKind::Media { data_size: 0 })
    }

    pub fn qml(url: impl Into<String>) -> Resource {
        Resource::new(url, ResourceKind::Qml { data_size: 0 })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ResourceState {
        self.inner.read().state
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == ResourceState::Loaded
    }

    pub fn set_state(&self, state: ResourceState) {
        self.inner.write().state = state;
    }

    pub fn kind(&self) -> ResourceKind {
        self.inner.read().kind
    }

    pub fn size(&self) -> usize {
        let inner = self.inner.read();
        if inner.state != ResourceState::Loaded {
            return 0;
        }

        inner.kind.size()
    }

    pub fn payload(&self) -> Option<MappedRwLockReadGuard<'_, Payload>> {
        RwLockReadGuard::try_map(self.inner.read(), |inner| inner.payload.as_deref()).ok()
    }

    pub fn set_payload(&self, payload: Payload) {
        self.inner.write().payload = Some(Box::new(payload));
    }

    pub fn take_payload(&self) -> Option<Payload> {
        self.inner.write().payload.take().map(|v| *v)
    }

    pub fn unload(&self) {
        let mut inner = self.inner.write();
        inner.state = ResourceState::Unloaded;
        inner.payload = None;
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self.inner.read().kind {
            ResourceKind::Texture { width, height } => Some((width, height)),
            _ => None,
        }
    }

    pub fn set_dimensions(&self, width: u32, height: u32) -> bool {
        let mut inner = self.inner.write();
        match &mut inner.kind {
            ResourceKind::Texture {
                width: w,
                height: h,
            } => {
                *w = width;
                *h = height;
                true
            }
            _ => false,
        }
    }

    pub fn duration(&self) -> Option<f32> {
        match self.inner.read().kind {
            ResourceKind::Audio { duration } => Some(duration),
            _ => None,
        }
    }

    pub fn set_duration(&self, duration: f32) -> bool {
        let mut inner = self.inner.write();
        match &mut inner.kind {
            ResourceKind::Audio { duration: d } => {
                *d = duration;
                true
            }
            _ => false,
        }
    }

    pub fn set_data_size(&self, size: usize) -> bool {
        let mut inner = self.inner.write();
        match &mut inner.kind {
            ResourceKind::Json { data_size }
            | ResourceKind::Media { data_size }
            | ResourceKind::Qml { data_size } => {
                *data_size = size;
                true
            }
            _ => false,
        }
    }
}

impl Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Resource")
            .field("url", &self.url)
            .field("state", &inner.state)
            .field("kind", &inner.kind)
            .finish_non_exhaustive()
    }
}
