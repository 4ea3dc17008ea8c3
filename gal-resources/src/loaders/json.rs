use std::fmt::{self, Debug};
use std::sync::Arc;

use gal_core::eyre::{Result, WrapErr};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::context::Context;
use crate::loader::{Loader, LoaderCore, LoaderHandle};
use crate::location::Location;
use crate::property::{Property, PropertyMap};
use crate::resource::{Payload, Resource, ResourceHandle, ResourceState};

pub struct JsonLoader {
    core: LoaderCore,
}

impl JsonLoader {
    pub fn new(protocol: impl Into<String>, suffix: impl Into<String>) -> JsonLoader {
        JsonLoader {
            core: LoaderCore::new(protocol, suffix),
        }
    }

    fn parse(&self, ctx: &Context, source: &str) -> Result<(Value, usize)> {
        let data = ctx.sources().read_bytes(source)?;
        let document = serde_json::from_slice(&data).wrap_err("invalid json")?;
        Ok((document, data.len()))
    }

    fn expand(&self, ctx: &Context, document: &Value) -> Vec<LoaderHandle> {
        let entries = match document.get("loaders") {
            Some(Value::Array(v)) => v,
            Some(_) => {
                warn!("`loaders` is not an array");
                return Vec::new();
            }
            None => return Vec::new(),
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                Value::Object(entry) => generated_loader(ctx, entry),
                _ => {
                    warn!(index, "loader entry is not an object");
                    None
                }
            })
            .collect()
    }
}

fn generated_loader(ctx: &Context, entry: &Map<String, Value>) -> Option<LoaderHandle> {
    let source = match entry.get("source").and_then(Value::as_str) {
        Some(v) if !v.is_empty() => v,
        _ => {
            warn!("loader entry has no source");
            return None;
        }
    };

    let location = Location::parse(source);
    let protocol = entry
        .get("protocol")
        .and_then(Value::as_str)
        .unwrap_or(location.protocol.as_str());
    let suffix = entry
        .get("suffix")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .unwrap_or_else(|| location.suffix.clone());

    let properties = entry
        .iter()
        .filter_map(|(key, value)| Some((key.clone(), Property::from_json(value)?)))
        .collect::<PropertyMap>();

    let loader = ctx
        .registration()
        .create_loader(protocol, &suffix, &properties)?;
    loader.set_source_url(source);
    Some(loader)
}

impl Loader for JsonLoader {
    fn core(&self) -> &LoaderCore {
        &self.core
    }

    fn load_impl(&self, ctx: &Context, source: &str) -> Result<ResourceHandle> {
        let resource = Resource::json(source);
        resource.set_state(ResourceState::Loading);

        let (document, data_size) = self
            .parse(ctx, source)
            .map_err(|error| {
                resource.set_state(ResourceState::Failed);
                error
            })
            .wrap_err_with(|| format!("failed to load manifest {}", source))?;

        let generated = self.expand(ctx, &document);
        debug!(generated = generated.len(), "manifest expanded");
        self.core.set_generated_loaders(generated);

        resource.set_data_size(data_size);
        resource.set_payload(Payload::Document(document));
        resource.set_state(ResourceState::Loaded);

        Ok(Arc::new(resource))
    }
}

impl Debug for JsonLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLoader")
            .field("core", &self.core)
            .finish()
    }
}
