mod bitmap;
mod json;
mod qml;
mod video;

pub use self::bitmap::BitmapLoader;
pub use self::json::JsonLoader;
pub use self::qml::QmlLoader;
pub use self::video::VideoLoader;

pub const BITMAP_LOADER: &str = "BitmapLoader";
pub const VIDEO_LOADER: &str = "VideoLoader";
pub const JSON_LOADER: &str = "JsonLoader";
pub const QML_LOADER: &str = "QmlLoader";

pub const IMAGE_SUFFIXES: &[&str] = &["bmp", "gif", "jpeg", "jpg", "png"];
pub const VIDEO_SUFFIXES: &[&str] = &["mp4"];
pub const JSON_SUFFIX: &str = "json";
pub const QML_SUFFIX: &str = "qml";
