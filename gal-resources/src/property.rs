use std::fmt::{self, Display};

use gal_core::ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type PropertyMap = AHashMap<String, Property>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
    String,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("property `{key}`: expected {expected}, found {found}")]
pub struct PropertyError {
    pub key: String,
    pub expected: PropertyKind,
    pub found: PropertyKind,
}

impl Property {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Property::Bool(_) => PropertyKind::Bool,
            Property::Int(_) => PropertyKind::Int,
            Property::Float(_) => PropertyKind::Float,
            Property::String(_) => PropertyKind::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Property::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Property::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Property::Float(v) => Some(v),
            Property::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn from_json(value: &Value) -> Option<Property> {
        match value {
            Value::Bool(v) => Some(Property::Bool(*v)),
            Value::Number(v) => v
                .as_i64()
                .map(Property::Int)
                .or_else(|| v.as_f64().map(Property::Float)),
            Value::String(v) => Some(Property::String(v.clone())),
            _ => None,
        }
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Bool(v) => v.fmt(f),
            Property::Int(v) => v.fmt(f),
            Property::Float(v) => v.fmt(f),
            Property::String(v) => v.fmt(f),
        }
    }
}

impl Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Bool => "bool",
            PropertyKind::Int => "int",
            PropertyKind::Float => "float",
            PropertyKind::String => "string",
        };
        f.write_str(name)
    }
}

impl From<bool> for Property {
    fn from(v: bool) -> Property {
        Property::Bool(v)
    }
}

impl From<i32> for Property {
    fn from(v: i32) -> Property {
        Property::Int(v.into())
    }
}

impl From<i64> for Property {
    fn from(v: i64) -> Property {
        Property::Int(v)
    }
}

impl From<f64> for Property {
    fn from(v: f64) -> Property {
        Property::Float(v)
    }
}

impl From<&str> for Property {
    fn from(v: &str) -> Property {
        Property::String(v.to_owned())
    }
}

impl From<String> for Property {
    fn from(v: String) -> Property {
        Property::String(v)
    }
}

pub fn get_str<'a>(properties: &'a PropertyMap, key: &str) -> Result<Option<&'a str>, PropertyError> {
    match properties.get(key) {
        None => Ok(None),
        Some(Property::String(v)) => Ok(Some(v)),
        Some(other) => Err(PropertyError {
            key: key.to_owned(),
            expected: PropertyKind::String,
            found: other.kind(),
        }),
    }
}
