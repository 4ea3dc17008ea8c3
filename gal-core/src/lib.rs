mod clock;
mod config;
mod execution;

pub use ahash;
pub use eyre;
pub use parking_lot;

pub use self::clock::FrameClock;
pub use self::config::{
    Configuration, CONFIG_PATH, FIXED_UPDATE_INTERVAL, MAX_THREADS, RESOURCES_BUNDLE,
    RESOURCES_MANIFEST, RESOURCES_ROOT, STRICT_SUFFIX,
};
pub use self::execution::Execution;
