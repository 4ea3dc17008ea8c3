use std::fmt::{self, Debug};
use std::sync::Arc;

use gal_core::eyre::{bail, Result, WrapErr};
use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::context::Context;
use crate::loader::{Loader, LoaderCore};
use crate::location::suffix_of;
use crate::resource::{Payload, Resource, ResourceHandle, ResourceState};

pub struct BitmapLoader {
    core: LoaderCore,
}

impl BitmapLoader {
    pub fn new(protocol: impl Into<String>, suffix: impl Into<String>) -> BitmapLoader {
        BitmapLoader {
            core: LoaderCore::new(protocol, suffix),
        }
    }

    fn check_suffix(&self, ctx: &Context, source: &str) -> Result<()> {
        let expected = self.core.suffix();
        let actual = suffix_of(source);
        if expected.is_empty() || actual.is_empty() || actual == expected {
            return Ok(());
        }

        if ctx.options().strict_suffix {
            bail!("suffix mismatch: expected .{}, found .{}", expected, actual);
        }

        warn!(expected, %actual, "bitmap suffix mismatch");
        Ok(())
    }

    fn decode(&self, ctx: &Context, source: &str) -> Result<DynamicImage> {
        let bytes = ctx.sources().read_bytes(source)?;
        image::load_from_memory(&bytes).wrap_err("cannot decode image")
    }
}

impl Loader for BitmapLoader {
    fn core(&self) -> &LoaderCore {
        &self.core
    }

    fn load_impl(&self, ctx: &Context, source: &str) -> Result<ResourceHandle> {
        self.check_suffix(ctx, source)?;

        let resource = Resource::texture(source);
        resource.set_state(ResourceState::Loading);

        let image = self
            .decode(ctx, source)
            .map_err(|error| {
                resource.set_state(ResourceState::Failed);
                error
            })
            .wrap_err_with(|| format!("failed to load bitmap {}", source))?;

        let (width, height) = image.dimensions();
        resource.set_dimensions(width, height);
        resource.set_payload(Payload::Image(image));
        resource.set_state(ResourceState::Loaded);

        debug!(width, height, "bitmap decoded");
        Ok(Arc::new(resource))
    }
}

impl Debug for BitmapLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapLoader")
            .field("core", &self.core)
            .finish()
    }
}
