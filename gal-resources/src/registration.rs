use std::fmt::{self, Debug};
use std::sync::Arc;

use gal_core::ahash::AHashMap;
use gal_core::eyre::Result;
use gal_core::parking_lot::RwLock;
use tracing::{debug, warn};

use crate::loader::LoaderHandle;
use crate::location::{FILE, QRC};
use crate::loaders::{
    BITMAP_LOADER, IMAGE_SUFFIXES, JSON_LOADER, JSON_SUFFIX, QML_LOADER, QML_SUFFIX,
    VIDEO_LOADER, VIDEO_SUFFIXES,
};
use crate::native::{NativeFactory, NATIVE};
use crate::property::{Property, PropertyMap};
use crate::sync_any::SyncAny;

pub trait Factory: Send + Sync + 'static {
    fn type_name(&self) -> &str;

    fn create(&self, properties: &PropertyMap) -> Result<Object>;
}

pub enum Object {
    Loader(LoaderHandle),
    Other(Box<dyn SyncAny>),
}

impl Object {
    pub fn as_loader(&self) -> Option<&LoaderHandle> {
        match self {
            Object::Loader(v) => Some(v),
            Object::Other(_) => None,
        }
    }

    pub fn into_loader(self) -> Option<LoaderHandle> {
        match self {
            Object::Loader(v) => Some(v),
            Object::Other(_) => None,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Object::Loader(_) => None,
            Object::Other(v) => (**v).downcast_ref(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Loader(v) => v.type_name(),
            Object::Other(v) => (**v).type_name(),
        }
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Loader(v) => f.debug_tuple("Loader").field(v).finish(),
            Object::Other(v) => f.debug_tuple("Other").field(&(**v).type_name()).finish(),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct LoaderBinding {
    pub protocol: String,
    pub suffix: String,
    pub factory_type: String,
    pub loader_type: String,
}

impl LoaderBinding {
    pub fn new(
        protocol: impl Into<String>,
        suffix: impl Into<String>,
        factory_type: impl Into<String>,
        loader_type: impl Into<String>,
    ) -> LoaderBinding {
        LoaderBinding {
            protocol: protocol.into(),
            suffix: suffix.into().to_lowercase(),
            factory_type: factory_type.into(),
            loader_type: loader_type.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.protocol.is_empty()
            && !self.suffix.is_empty()
            && !self.factory_type.is_empty()
            && !self.loader_type.is_empty()
    }

    fn matches(&self, protocol: &str, suffix: &str) -> bool {
        self.protocol == protocol && self.suffix == suffix.to_lowercase()
    }
}

#[derive(Default)]
pub struct Registration {
    factories: RwLock<AHashMap<String, Arc<dyn Factory>>>,
    bindings: RwLock<Vec<LoaderBinding>>,
}

impl Registration {
    pub fn new() -> Registration {
        Registration::default()
    }

    pub fn with_builtin() -> Registration {
        let registration = Registration::new();
        registration.register_builtin();
        registration
    }

    pub fn register_builtin(&self) {
        self.register_factory(NativeFactory::new());

        for protocol in [FILE, QRC] {
            let image = IMAGE_SUFFIXES.iter().map(|s| (*s, BITMAP_LOADER));
            let video = VIDEO_SUFFIXES.iter().map(|s| (*s, VIDEO_LOADER));
            let other = [(JSON_SUFFIX, JSON_LOADER), (QML_SUFFIX, QML_LOADER)];

            for (suffix, loader_type) in image.chain(video).chain(other) {
                self.register_loader(LoaderBinding::new(protocol, suffix, NATIVE, loader_type));
            }
        }
    }

    pub fn register_factory<F: Factory>(&self, factory: F) -> bool {
        let type_name = factory.type_name().to_owned();
        let mut factories = self.factories.write();
        if factories.contains_key(&type_name) {
            warn!(%type_name, "factory is already registered");
            return false;
        }

        debug!(%type_name, "factory registered");
        factories.insert(type_name, Arc::new(factory));
        true
    }

    pub fn unregister_factory(&self, type_name: &str) -> bool {
        self.factories.write().remove(type_name).is_some()
    }

    pub fn has_factory(&self, type_name: &str) -> bool {
        self.factories.read().contains_key(type_name)
    }

    pub fn registered_types(&self) -> Vec<String> {
        let mut types = self.factories.read().keys().cloned().collect::<Vec<_>>();
        types.sort();
        types
    }

    pub fn create(&self, type_name: &str, properties: &PropertyMap) -> Option<Object> {
        let factory = match self.factories.read().get(type_name) {
            Some(v) => v.clone(),
            None => {
                warn!(type_name, "no factory registered");
                return None;
            }
        };

        match factory.create(properties) {
            Ok(v) => Some(v),
            Err(error) => {
                warn!(type_name, ?error, "object creation failed");
                None
            }
        }
    }

    pub fn register_loader(&self, mut binding: LoaderBinding) -> bool {
        binding.suffix = binding.suffix.to_lowercase();
        if !binding.is_complete() {
            warn!(?binding, "loader binding has empty fields");
            return false;
        }

        let mut bindings = self.bindings.write();
        if bindings
            .iter()
            .any(|v| v.matches(&binding.protocol, &binding.suffix))
        {
            warn!(
                protocol = %binding.protocol,
                suffix = %binding.suffix,
                "loader binding already exists"
            );
            return false;
        }

        bindings.push(binding);
        true
    }

    pub fn unregister_loader(&self, protocol: &str, suffix: &str) -> bool {
        let mut bindings = self.bindings.write();
        let len = bindings.len();
        bindings.retain(|v| !v.matches(protocol, suffix));
        bindings.len() != len
    }

    pub fn bindings(&self) -> Vec<LoaderBinding> {
        self.bindings.read().clone()
    }

    pub fn binding(&self, protocol: &str, suffix: &str) -> Option<LoaderBinding> {
        self.bindings
            .read()
            .iter()
            .find(|v| v.matches(protocol, suffix))
            .cloned()
    }

    pub fn create_loader(
        &self,
        protocol: &str,
        suffix: &str,
        properties: &PropertyMap,
    ) -> Option<LoaderHandle> {
        let binding = match self.binding(protocol, suffix) {
            Some(v) => v,
            None => {
                warn!(protocol, suffix, "no loader binding");
                return None;
            }
        };

        let mut properties = properties.clone();
        properties.insert("type".into(), Property::from(binding.loader_type.as_str()));
        properties.insert("protocol".into(), Property::from(protocol));
        properties.insert("suffix".into(), Property::from(binding.suffix.as_str()));

        match self.create(&binding.factory_type, &properties)?.into_loader() {
            Some(v) => Some(v),
            None => {
                warn!(
                    factory = %binding.factory_type,
                    "factory produced an object that is not a loader"
                );
                None
            }
        }
    }
}

impl Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("factories", &self.registered_types())
            .field("bindings", &self.bindings.read().len())
            .finish()
    }
}
