use std::fmt::{self, Debug};
use std::sync::Arc;

use gal_core::eyre::{Result, WrapErr};

use crate::context::Context;
use crate::loader::{Loader, LoaderCore};
use crate::resource::{Payload, Resource, ResourceHandle, ResourceState};

pub struct QmlLoader {
    core: LoaderCore,
}

impl QmlLoader {
    pub fn new(protocol: impl Into<String>, suffix: impl Into<String>) -> QmlLoader {
        QmlLoader {
            core: LoaderCore::new(protocol, suffix),
        }
    }
}

impl Loader for QmlLoader {
    fn core(&self) -> &LoaderCore {
        &self.core
    }

    fn load_impl(&self, ctx: &Context, source: &str) -> Result<ResourceHandle> {
        let resource = Resource::qml(source);
        resource.set_state(ResourceState::Loading);

        let text = ctx
            .sources()
            .read_string(source)
            .map_err(|error| {
                resource.set_state(ResourceState::Failed);
                error
            })
            .wrap_err_with(|| format!("failed to load component {}", source))?;

        resource.set_data_size(text.len());
        resource.set_payload(Payload::Text(text));
        resource.set_state(ResourceState::Loaded);

        Ok(Arc::new(resource))
    }
}

impl Debug for QmlLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QmlLoader")
            .field("core", &self.core)
            .finish()
    }
}
