use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use gal_core::ahash::AHashMap;
use gal_core::eyre::{Result, WrapErr};
use gal_core::parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::context::Context;
use crate::loader::LoaderHandle;
use crate::location::{suffix_of, Location};
use crate::property::{Property, PropertyMap};

pub struct Resources {
    ctx: Arc<Context>,
    table: RwLock<ResourceTable>,
}

#[derive(Default)]
struct ResourceTable {
    values: AHashMap<String, Property>,
    loaders: AHashMap<String, LoaderHandle>,
}

#[derive(Deserialize)]
struct ResourceManifest {
    #[serde(default)]
    resources: BTreeMap<String, Property>,
}

impl Resources {
    pub fn new(ctx: Arc<Context>) -> Resources {
        Resources {
            ctx,
            table: RwLock::new(ResourceTable::default()),
        }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    pub fn add_resource(&self, name: impl Into<String>, value: impl Into<Property>) {
        let name = name.into();
        let value = value.into();
        let loader = self.resolve_loader(&name, &value);

        let mut table = self.table.write();
        match loader {
            Some(loader) => table.loaders.insert(name.clone(), loader),
            None => table.loaders.remove(&name),
        };
        table.values.insert(name, value);
    }

    fn resolve_loader(&self, name: &str, value: &Property) -> Option<LoaderHandle> {
        let source = match value.as_str() {
            Some(v) if !v.is_empty() => v,
            _ => {
                trace!(name, "resource value is not a source url");
                return None;
            }
        };

        let location = Location::parse(source);
        let mut properties = PropertyMap::default();
        properties.insert("source".into(), Property::from(source));

        let loader = self.ctx.registration().create_loader(
            &location.protocol,
            &location.suffix,
            &properties,
        );

        match loader {
            Some(loader) => {
                loader.set_source_url(source);
                debug!(name, source, loader = ?loader, "resource bound to loader");
                Some(loader)
            }
            None => {
                warn!(name, source, "unable to resolve loader for resource");
                None
            }
        }
    }

    pub fn get_loader(&self, name: &str) -> Option<LoaderHandle> {
        self.table.read().loaders.get(name).cloned()
    }

    pub fn get_resource(&self, name: &str) -> Option<Property> {
        self.table.read().values.get(name).cloned()
    }

    pub fn remove_resource(&self, name: &str) -> Option<Property> {
        let mut table = self.table.write();
        table.loaders.remove(name);
        table.values.remove(name)
    }

    pub fn resource_urls_by_suffix(&self, suffix: &str) -> Vec<String> {
        let suffix = suffix.to_lowercase();
        let table = self.table.read();

        let mut urls = table
            .values
            .iter()
            .filter_map(|(name, value)| Some((name, value.as_str()?)))
            .filter(|(_, url)| suffix_of(url) == suffix)
            .collect::<Vec<_>>();

        urls.sort_by(|a, b| a.0.cmp(b.0));
        urls.into_iter().map(|(_, url)| url.to_owned()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names = self.table.read().values.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn loaders(&self) -> Vec<(String, LoaderHandle)> {
        let mut loaders = self
            .table
            .read()
            .loaders
            .iter()
            .map(|(name, loader)| (name.clone(), loader.clone()))
            .collect::<Vec<_>>();
        loaders.sort_by(|a, b| a.0.cmp(&b.0));
        loaders
    }

    pub fn len(&self) -> usize {
        self.table.read().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().values.is_empty()
    }

    pub fn register_manifest(&self, source: &str) -> Result<usize> {
        let data = self
            .ctx
            .sources()
            .read_bytes(source)
            .wrap_err_with(|| format!("cannot read resource manifest {}", source))?;
        let manifest: ResourceManifest = serde_json::from_slice(&data)
            .wrap_err_with(|| format!("invalid resource manifest {}", source))?;

        let count = manifest.resources.len();
        for (name, value) in manifest.resources {
            self.add_resource(name, value);
        }

        debug!(source, count, "resource manifest registered");
        Ok(count)
    }
}

impl Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.read();
        f.debug_struct("Resources")
            .field("values", &table.values.len())
            .field("loaders", &table.loaders.len())
            .finish_non_exhaustive()
    }
}
