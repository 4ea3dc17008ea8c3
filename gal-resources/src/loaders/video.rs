use std::fmt::{self, Debug};
use std::sync::Arc;

use gal_core::eyre::{bail, eyre, Result, WrapErr};
use gal_core::parking_lot::Mutex;
use tracing::debug;

use crate::context::Context;
use crate::loader::{Loader, LoaderCore};
use crate::location::{Location, FILE, QRC};
use crate::resource::{MediaUrl, Payload, Resource, ResourceHandle, ResourceState};

pub struct VideoLoader {
    core: LoaderCore,
    current: Mutex<Option<MediaUrl>>,
}

impl VideoLoader {
    pub fn new(protocol: impl Into<String>, suffix: impl Into<String>) -> VideoLoader {
        VideoLoader {
            core: LoaderCore::new(protocol, suffix),
            current: Mutex::new(None),
        }
    }

    pub fn current_media(&self) -> Option<MediaUrl> {
        self.current.lock().clone()
    }

    fn media_url(&self, ctx: &Context, source: &str) -> Result<MediaUrl> {
        let location = Location::parse(source);
        match location.protocol.as_str() {
            QRC => Ok(MediaUrl::Bundled(location.path)),
            FILE => {
                if !ctx.sources().exists(source) {
                    bail!("media file does not exist: {}", source);
                }

                let path = ctx
                    .sources()
                    .resolve(source)
                    .ok_or_else(|| eyre!("cannot resolve media path {}", source))?;
                Ok(MediaUrl::File(path))
            }
            other => bail!("unsupported media protocol: {}", other),
        }
    }
}

impl Loader for VideoLoader {
    fn core(&self) -> &LoaderCore {
        &self.core
    }

    fn load_impl(&self, ctx: &Context, source: &str) -> Result<ResourceHandle> {
        let resource = Resource::media(source);
        resource.set_state(ResourceState::Loading);

        let url = self
            .media_url(ctx, source)
            .map_err(|error| {
                resource.set_state(ResourceState::Failed);
                error
            })
            .wrap_err_with(|| format!("failed to load video {}", source))?;

        *self.current.lock() = Some(url.clone());

        // no decoding happens here, so there is nothing to measure yet
        resource.set_data_size(0);
        resource.set_payload(Payload::Media(url));
        resource.set_state(ResourceState::Loaded);

        debug!("media source bound");
        Ok(Arc::new(resource))
    }

    fn unload_impl(&self) {
        *self.current.lock() = None;
    }
}

impl Debug for VideoLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoLoader")
            .field("core", &self.core)
            .field("current", &*self.current.lock())
            .finish()
    }
}
