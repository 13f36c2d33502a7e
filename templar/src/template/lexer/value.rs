//! The basic building block of the template language: the value.
//! All values like floats, integers, strings, lists, hashes, etc.
//! are represented using the value.
//!
//! This allows operations across data types, like multiplying strings by integers,
//! or accessing hash keys.
use super::super::Error;

use std::cmp::Ordering;
use std::collections::HashMap;

/// Longest string `"text" * n` is allowed to produce.
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// A constant value, e.g. `5` or `"hello world"`.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    List(Vec<Value>),
    Hash(HashMap<String, Value>),
    Null,
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => i1.partial_cmp(i2),
            (Value::Integer(i1), Value::Float(f2)) => (*i1 as f64).partial_cmp(f2),
            (Value::Float(f1), Value::Integer(i2)) => f1.partial_cmp(&(*i2 as f64)),
            (Value::Float(f1), Value::Float(f2)) => f1.partial_cmp(f2),
            (Value::String(s1), Value::String(s2)) => s1.partial_cmp(s2),
            (Value::Boolean(b1), Value::Boolean(b2)) => b1.partial_cmp(b2),
            _ => None,
        }
    }
}

/// How the value is written into the rendered template.
///
/// `null` is written as nothing at all and lists are joined with commas.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::List(l) => {
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
            Value::Hash(h) => {
                let mut keys = h.keys().collect::<Vec<_>>();
                keys.sort();

                write!(f, "{{")?;
                for (i, k) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, h[*k])?;
                }
                write!(f, "}}")
            }
            Value::Null => Ok(()),
        }
    }
}

impl Value {
    /// If the value would count as `true` in a boolean expression,
    /// e.g. `{{ admin && "(admin)" }}`.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Null => false,
            Value::List(list) => !list.is_empty(),
            Value::Hash(hash) => !hash.is_empty(),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => Value::Integer(i1.wrapping_add(*i2)),
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 + f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 + *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 + f2),
            (Value::String(s1), other) => Value::String(format!("{}{}", s1, other)),
            (value, Value::String(s2)) => Value::String(format!("{}{}", value, s2)),
            (Value::List(list), other) => {
                let mut list = list.clone();
                list.push(other.clone());
                Value::List(list)
            }
            _ => Value::Null,
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => Value::Integer(i1.wrapping_sub(*i2)),
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 - f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 - *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 - f2),
            (Value::String(s1), Value::String(s2)) => Value::String(s1.replace(s2.as_str(), "")),
            (Value::List(list), other) => {
                let mut list = list.clone();
                list.retain(|v| v != other);
                Value::List(list)
            }
            _ => Value::Null,
        }
    }

    pub fn div(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => {
                i1.checked_div(*i2).map(Value::Integer).unwrap_or(Value::Null)
            }
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 / f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 / *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 / f2),
            _ => Value::Null,
        }
    }

    pub fn rem(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => {
                i1.checked_rem(*i2).map(Value::Integer).unwrap_or(Value::Null)
            }
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 % f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 % *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 % f2),
            _ => Value::Null,
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => Value::Integer(i1.wrapping_mul(*i2)),
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 * f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 * *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 * f2),
            (Value::String(s1), Value::Integer(i1)) | (Value::Integer(i1), Value::String(s1)) => {
                let times = usize::try_from((*i1).max(0)).unwrap_or(usize::MAX);
                match s1.len().checked_mul(times) {
                    Some(len) if len <= MAX_STRING_LEN => Value::String(s1.repeat(times)),
                    _ => Value::Null,
                }
            }
            _ => Value::Null,
        }
    }

    /// Call a method on the value, e.g. `name.upcase` or `items.join(", ")`.
    pub fn call(&self, method_name: &str, args: &[Value]) -> Result<Self, Error> {
        Ok(match self {
            Value::Integer(value) => match method_name {
                "abs" => Value::Integer(value.wrapping_abs()),
                "to_string" | "to_s" => Value::String(value.to_string()),
                "to_f" | "to_float" => Value::Float(*value as f64),
                _ => return Err(Error::UnknownMethod(method_name.into(), "integer")),
            },

            Value::Float(value) => match method_name {
                "abs" => Value::Float(value.abs()),
                "ceil" => Value::Float(value.ceil()),
                "floor" => Value::Float(value.floor()),
                "round" => Value::Float(value.round()),
                "to_string" | "to_s" => Value::String(value.to_string()),
                "to_i" | "to_integer" => Value::Integer(*value as i64),
                _ => return Err(Error::UnknownMethod(method_name.into(), "float")),
            },

            Value::String(value) => match method_name {
                "to_uppercase" | "upcase" => Value::String(value.to_uppercase()),
                "to_lowercase" | "downcase" => Value::String(value.to_lowercase()),
                "trim" => Value::String(value.trim().to_string()),
                "capitalize" => Value::String(crate::capitalize(value)),
                "escape" => Value::String(crate::safe_html(value)),
                "len" | "length" => Value::Integer(value.chars().count() as i64),
                "to_string" | "to_s" => self.clone(),
                _ => return Err(Error::UnknownMethod(method_name.into(), "string")),
            },

            Value::List(list) => match method_name.parse::<usize>() {
                Ok(index) => list.get(index).cloned().unwrap_or(Value::Null),

                Err(_) => match method_name {
                    "len" | "length" => Value::Integer(list.len() as i64),
                    "empty" => Value::Boolean(list.is_empty()),
                    "first" => list.first().cloned().unwrap_or(Value::Null),
                    "last" => list.last().cloned().unwrap_or(Value::Null),
                    "reverse" | "rev" => Value::List(list.iter().rev().cloned().collect()),
                    "contains" => match args {
                        [needle] => Value::Boolean(list.contains(needle)),
                        _ => Value::Boolean(false),
                    },
                    "join" => {
                        let separator = match args {
                            [Value::String(separator)] => separator.as_str(),
                            _ => ",",
                        };
                        Value::String(
                            list.iter()
                                .map(|v| v.to_string())
                                .collect::<Vec<_>>()
                                .join(separator),
                        )
                    }
                    _ => return Err(Error::UnknownMethod(method_name.into(), "list")),
                },
            },

            Value::Hash(hash) => match hash.get(method_name) {
                Some(value) => value.clone(),
                None => match method_name {
                    "keys" => {
                        let mut keys = hash.keys().cloned().collect::<Vec<_>>();
                        keys.sort();
                        Value::List(keys.into_iter().map(Value::String).collect())
                    }
                    "values" => Value::List(hash.values().cloned().collect()),
                    "len" | "length" => Value::Integer(hash.len() as i64),
                    _ => Value::Null,
                },
            },

            Value::Boolean(_) | Value::Null => {
                return Err(Error::UnknownMethod(method_name.into(), "other"))
            }
        })
    }
}

/// Convert a Rust type into a template value.
pub trait ToTemplateValue {
    fn to_template_value(&self) -> Result<Value, Error>;
}

impl ToTemplateValue for String {
    fn to_template_value(&self) -> Result<Value, Error> {
        Ok(Value::String(self.clone()))
    }
}

impl ToTemplateValue for &str {
    fn to_template_value(&self) -> Result<Value, Error> {
        Ok(Value::String(self.to_string()))
    }
}

macro_rules! impl_integer {
    ($ty:ty) => {
        impl ToTemplateValue for $ty {
            fn to_template_value(&self) -> Result<Value, Error> {
                Ok(Value::Integer(*self as i64))
            }
        }
    };
}

impl_integer!(i64);
impl_integer!(i32);
impl_integer!(i16);
impl_integer!(i8);
impl_integer!(u64); // Could very much overflow
impl_integer!(u32);
impl_integer!(u16);
impl_integer!(u8);
impl_integer!(usize);

impl ToTemplateValue for f64 {
    fn to_template_value(&self) -> Result<Value, Error> {
        Ok(Value::Float(*self))
    }
}

impl ToTemplateValue for f32 {
    fn to_template_value(&self) -> Result<Value, Error> {
        Ok(Value::Float(*self as f64))
    }
}

impl ToTemplateValue for bool {
    fn to_template_value(&self) -> Result<Value, Error> {
        Ok(Value::Boolean(*self))
    }
}

impl ToTemplateValue for Value {
    fn to_template_value(&self) -> Result<Value, Error> {
        Ok(self.clone())
    }
}

impl<T: ToTemplateValue> ToTemplateValue for Option<T> {
    fn to_template_value(&self) -> Result<Value, Error> {
        match self {
            Some(value) => value.to_template_value(),
            None => Ok(Value::Null),
        }
    }
}

impl<T: ToTemplateValue> ToTemplateValue for Vec<T> {
    fn to_template_value(&self) -> Result<Value, Error> {
        let mut list = vec![];

        for value in self.iter() {
            list.push(value.to_template_value()?);
        }

        Ok(Value::List(list))
    }
}

impl<T: ToTemplateValue> ToTemplateValue for HashMap<String, T> {
    fn to_template_value(&self) -> Result<Value, Error> {
        let mut result = HashMap::new();
        for (key, value) in self.iter() {
            result.insert(key.clone(), value.to_template_value()?);
        }

        Ok(Value::Hash(result))
    }
}

impl ToTemplateValue for serde_json::Value {
    fn to_template_value(&self) -> Result<Value, Error> {
        use serde_json::Value as Json;

        Ok(match self {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().ok_or(Error::SerializationError)?),
            },
            Json::String(s) => Value::String(s.clone()),
            Json::Array(list) => Value::List(
                list.iter()
                    .map(|v| v.to_template_value())
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Json::Object(hash) => {
                let mut result = HashMap::new();
                for (key, value) in hash {
                    result.insert(key.clone(), value.to_template_value()?);
                }
                Value::Hash(result)
            }
        })
    }
}
