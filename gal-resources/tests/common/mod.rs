#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gal_core::Execution;
use gal_resources::{
    BundleSource, Context, DirSource, EventReceiver, LoaderEvent, LoaderOptions, Registration,
    Sources,
};
use tempfile::TempDir;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Fixture {
        Fixture {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn png(&self, name: &str, width: u32, height: u32) -> String {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        image::RgbaImage::new(width, height).save(&path).unwrap();
        name.to_owned()
    }

    pub fn file(&self, name: &str, contents: &str) -> String {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        name.to_owned()
    }

    pub fn context(&self) -> Arc<Context> {
        self.context_with(LoaderOptions::default(), BundleSource::new())
    }

    pub fn context_with(&self, options: LoaderOptions, bundle: BundleSource) -> Arc<Context> {
        let sources = Sources::new(DirSource::new(self.dir.path()).unwrap(), bundle);
        Context::new(
            Arc::new(Registration::with_builtin()),
            sources,
            Execution::new(2).unwrap(),
            options,
        )
    }
}

pub fn next_event(events: &EventReceiver) -> LoaderEvent {
    events.recv_timeout(TIMEOUT).unwrap()
}
