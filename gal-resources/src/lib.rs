mod context;
mod event;
mod loader;
mod loaders;
mod location;
mod native;
mod property;
mod registration;
mod resource;
mod resources;
mod source;
mod sync_any;

pub use self::context::{Context, LoaderOptions};
pub use self::event::{EventReceiver, LoaderEvent};
pub use self::loader::{LoadMode, Loader, LoaderCore, LoaderHandle};
pub use self::loaders::{
    BitmapLoader, JsonLoader, QmlLoader, VideoLoader, BITMAP_LOADER, IMAGE_SUFFIXES, JSON_LOADER,
    QML_LOADER, VIDEO_LOADER,
};
pub use self::location::{path_of, protocol_of, suffix_of, Location, FILE, HTTP, HTTPS, QRC};
pub use self::native::{infer_loader_type, NativeFactory, NATIVE};
pub use self::property::{get_str, Property, PropertyError, PropertyKind, PropertyMap};
pub use self::registration::{Factory, LoaderBinding, Object, Registration};
pub use self::resource::{
    MediaUrl, Payload, Resource, ResourceHandle, ResourceKind, ResourceState,
};
pub use self::resources::Resources;
pub use self::source::{BundleSource, DirSource, Source, Sources};
pub use self::sync_any::SyncAny;
