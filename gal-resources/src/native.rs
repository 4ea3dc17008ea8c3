use gal_core::eyre::{bail, Result};
use tracing::warn;

use crate::loader::LoaderHandle;
use crate::loaders::{
    BitmapLoader, JsonLoader, QmlLoader, VideoLoader, BITMAP_LOADER, IMAGE_SUFFIXES,
    JSON_LOADER, JSON_SUFFIX, QML_LOADER, QML_SUFFIX, VIDEO_LOADER,
};
use crate::location::{FILE, HTTP, HTTPS, QRC};
use crate::property::{get_str, PropertyMap};
use crate::registration::{Factory, Object};

pub const NATIVE: &str = "Native";

const PROTOCOLS: [&str; 4] = [FILE, QRC, HTTP, HTTPS];

#[derive(Debug, Default)]
pub struct NativeFactory;

impl NativeFactory {
    pub fn new() -> NativeFactory {
        NativeFactory
    }
}

impl Factory for NativeFactory {
    fn type_name(&self) -> &str {
        NATIVE
    }

    fn create(&self, properties: &PropertyMap) -> Result<Object> {
        let loader_type = loader_type(properties)?;
        let protocol = get_str(properties, "protocol")?.unwrap_or(FILE);
        let suffix = get_str(properties, "suffix")?
            .map(str::to_lowercase)
            .unwrap_or_default();

        let loader = match loader_type.as_str() {
            BITMAP_LOADER => LoaderHandle::new(BitmapLoader::new(protocol, suffix)),
            VIDEO_LOADER => LoaderHandle::new(VideoLoader::new(protocol, suffix)),
            JSON_LOADER => LoaderHandle::new(JsonLoader::new(protocol, suffix)),
            QML_LOADER => LoaderHandle::new(QmlLoader::new(protocol, suffix)),
            other => bail!("unknown native type: {}", other),
        };

        if let Some(source) = get_str(properties, "source")?.filter(|v| !v.is_empty()) {
            loader.set_source_url(source);
        }

        Ok(Object::Loader(loader))
    }
}

fn loader_type(properties: &PropertyMap) -> Result<String> {
    if let Some(v) = get_str(properties, "type")? {
        return Ok(v.to_owned());
    }

    let protocol = get_str(properties, "protocol")?;
    let suffix = get_str(properties, "suffix")?;
    match (protocol, suffix) {
        (Some(protocol), Some(suffix)) => Ok(infer_loader_type(protocol, suffix)?.to_owned()),
        _ => bail!("property `type` is missing and cannot be inferred without `protocol` and `suffix`"),
    }
}

pub fn infer_loader_type(protocol: &str, suffix: &str) -> Result<&'static str> {
    if !PROTOCOLS.contains(&protocol) {
        bail!("unsupported protocol: {}", protocol);
    }

    let suffix = suffix.to_lowercase();
    let loader_type = if IMAGE_SUFFIXES.contains(&suffix.as_str()) {
        BITMAP_LOADER
    } else if suffix == JSON_SUFFIX {
        JSON_LOADER
    } else if suffix == QML_SUFFIX {
        QML_LOADER
    } else {
        warn!(%suffix, "unrecognized suffix, using video loader");
        VIDEO_LOADER
    };

    Ok(loader_type)
}
