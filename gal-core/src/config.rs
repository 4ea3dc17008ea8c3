use std::path::Path;
use std::thread;
use std::time::Duration;

use ahash::AHashMap;
use eyre::{bail, Result, WrapErr};
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const MAX_THREADS: &str = "execution.max_threads";
pub const FIXED_UPDATE_INTERVAL: &str = "execution.fixed_update_interval";
pub const RESOURCES_ROOT: &str = "resources.root";
pub const RESOURCES_BUNDLE: &str = "resources.bundle";
pub const RESOURCES_MANIFEST: &str = "resources.manifest";
pub const STRICT_SUFFIX: &str = "loader.strict_suffix";
pub const CONFIG_PATH: &str = "config.path";

const MIN_FIXED_UPDATE_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Clone, Debug)]
pub struct Configuration {
    values: AHashMap<String, Value>,
}

impl Configuration {
    pub fn new() -> Configuration {
        let mut config = Configuration {
            values: AHashMap::new(),
        };
        config.set_defaults();
        config
    }

    fn set_defaults(&mut self) {
        let threads = thread::available_parallelism().map_or(1, |v| v.get());
        self.set(MAX_THREADS, threads);
        self.set(FIXED_UPDATE_INTERVAL, 1.0 / 60.0);
        self.set(RESOURCES_ROOT, ".");
        self.set(RESOURCES_MANIFEST, "resources.json");
        self.set(STRICT_SUFFIX, false);
        self.set(CONFIG_PATH, "config.json");
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_owned()
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn max_threads(&self) -> usize {
        self.get_int(MAX_THREADS, 1).max(1) as usize
    }

    pub fn fixed_update_interval(&self) -> Duration {
        let secs = self.get_float(FIXED_UPDATE_INTERVAL, 1.0 / 60.0);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MIN_FIXED_UPDATE_INTERVAL)
            .max(MIN_FIXED_UPDATE_INTERVAL)
    }

    pub fn strict_suffix(&self) -> bool {
        self.get_bool(STRICT_SUFFIX, false)
    }

    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read {}", path.display()))?;
        self.load_from_str(&data)
            .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(())
    }

    pub fn load_from_str(&mut self, data: &str) -> Result<()> {
        let root: Value = serde_json::from_str(data)?;
        match root {
            Value::Object(map) => {
                flatten("", map, &mut self.values);
                Ok(())
            }
            _ => bail!("configuration root must be an object"),
        }
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(&self.to_json())?;
        std::fs::write(path, data).wrap_err_with(|| format!("cannot write {}", path.display()))
    }

    pub fn to_json(&self) -> Value {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();

        let mut root = Map::new();
        for key in keys {
            insert_nested(&mut root, key, self.values[key].clone());
        }

        Value::Object(root)
    }

    pub fn parse_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = match arg.strip_prefix("--").and_then(|v| v.split_once('=')) {
                Some(v) => v,
                None => continue,
            };

            if key.is_empty() {
                warn!(arg, "ignoring argument without a key");
                continue;
            }

            self.set(key, parse_value(value));
        }
    }
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration::new()
    }
}

fn parse_value(value: &str) -> Value {
    if let Ok(v) = value.parse::<i64>() {
        return Value::from(v);
    }

    if let Ok(v) = value.parse::<f64>() {
        if v.is_finite() {
            return Value::from(v);
        }
    }

    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(value.to_owned()),
    }
}

fn flatten(prefix: &str, map: Map<String, Value>, out: &mut AHashMap<String, Value>) {
    for (key, value) in map {
        let key = if prefix.is_empty() {
            key
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(inner) => flatten(&key, inner, out),
            value => {
                out.insert(key, value);
            }
        }
    }
}

fn insert_nested(root: &mut Map<String, Value>, key: &str, value: Value) {
    let mut map = root;
    let mut parts = key.split('.').peekable();

    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            map.insert(part.to_owned(), value);
            return;
        }

        let entry = map
            .entry(part)
            .or_insert_with(|| Value::Object(Map::new()));

        if !entry.is_object() {
            warn!(key, "configuration key shadows a nested section");
            *entry = Value::Object(Map::new());
        }

        map = match entry {
            Value::Object(inner) => inner,
            _ => return,
        };
    }
}
