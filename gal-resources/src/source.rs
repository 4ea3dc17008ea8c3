use std::fmt::{self, Debug};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gal_core::ahash::AHashMap;
use gal_core::eyre::{bail, eyre, Result, WrapErr};
use gal_core::parking_lot::RwLock;
use tracing::trace;

use crate::location::{Location, FILE, QRC};

pub trait Source: Send + Sync + Debug + 'static {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>>;

    fn read_string(&self, path: &str) -> Result<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).wrap_err("invalid utf-8")
    }

    fn exists(&self, path: &str) -> bool;

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let _ = path;
        None
    }
}

#[derive(Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl AsRef<Path>) -> Result<DirSource> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .wrap_err_with(|| format!("cannot open source root {}", root.display()))?;
        Ok(DirSource { root })
    }
}

impl Source for DirSource {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let file_path = self.root.join(path);
        let mut file = File::open(&file_path)
            .wrap_err_with(|| format!("cannot open {}", file_path.display()))?;

        let meta = file.metadata().ok();
        let capacity = meta
            .and_then(|meta| usize::try_from(meta.len()).ok())
            .unwrap_or(0);

        let mut buf = Vec::with_capacity(capacity);
        file.read_to_end(&mut buf)
            .wrap_err_with(|| format!("cannot read {}", file_path.display()))?;

        Ok(buf)
    }

    fn exists(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        Some(self.root.join(path))
    }
}

#[derive(Default)]
pub struct BundleSource {
    entries: RwLock<AHashMap<String, Arc<[u8]>>>,
}

impl BundleSource {
    pub fn new() -> BundleSource {
        BundleSource::default()
    }

    pub fn from_dir(dir: impl AsRef<Path>) -> Result<BundleSource> {
        let bundle = BundleSource::new();
        let dir = dir.as_ref();
        bundle
            .import_dir(dir, dir)
            .wrap_err_with(|| format!("cannot bundle {}", dir.display()))?;
        Ok(bundle)
    }

    fn import_dir(&self, root: &Path, dir: &Path) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.import_dir(root, &path)?;
                continue;
            }

            let relative = path.strip_prefix(root)?;
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let data = std::fs::read(&path)
                .wrap_err_with(|| format!("cannot read {}", path.display()))?;
            trace!(path = %key, len = data.len(), "bundled");
            self.insert(key, data);
        }

        Ok(())
    }

    pub fn insert(&self, path: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        let path = path.into();
        let path = path.trim_start_matches('/').to_owned();
        self.entries.write().insert(path, data.into());
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Debug for BundleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleSource")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Source for BundleSource {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let entries = self.entries.read();
        entries
            .get(path.trim_start_matches('/'))
            .map(|data| data.to_vec())
            .ok_or_else(|| eyre!("no bundled resource {}", path))
    }

    fn exists(&self, path: &str) -> bool {
        self.entries.read().contains_key(path.trim_start_matches('/'))
    }
}

#[derive(Debug)]
pub struct Sources {
    file: Box<dyn Source>,
    bundle: Box<dyn Source>,
}

impl Sources {
    pub fn new<F: Source, B: Source>(file: F, bundle: B) -> Sources {
        Sources {
            file: Box::new(file),
            bundle: Box::new(bundle),
        }
    }

    fn route(&self, location: &Location) -> Result<&dyn Source> {
        match location.protocol.as_str() {
            FILE => Ok(&*self.file),
            QRC => Ok(&*self.bundle),
            other => bail!("unsupported protocol: {}", other),
        }
    }

    pub fn read_bytes(&self, source: &str) -> Result<Vec<u8>> {
        let location = Location::parse(source);
        self.route(&location)?.read_bytes(&location.path)
    }

    pub fn read_string(&self, source: &str) -> Result<String> {
        let location = Location::parse(source);
        self.route(&location)?.read_string(&location.path)
    }

    pub fn exists(&self, source: &str) -> bool {
        let location = Location::parse(source);
        match self.route(&location) {
            Ok(source) => source.exists(&location.path),
            Err(_) => false,
        }
    }

    pub fn resolve(&self, source: &str) -> Option<PathBuf> {
        let location = Location::parse(source);
        self.route(&location).ok()?.resolve(&location.path)
    }
}
