//! Variables available to a template while it renders.
use super::{Error, ToTemplateValue, Value};
use std::collections::HashMap;
use std::ops::Index;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl ToTemplateValue) -> Result<&mut Self, Error> {
        self.values.insert(key.to_string(), value.to_template_value()?);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Index<&str> for Context {
    type Output = Value;

    fn index(&self, key: &str) -> &Self::Output {
        self.values.get(key).unwrap_or(&Value::Null)
    }
}

/// Anything that can be used as template variables.
///
/// Implemented for contexts, maps and lists of key/value pairs, and JSON objects.
/// `()` renders with no variables at all.
pub trait IntoContext {
    fn into_context(self) -> Result<Context, Error>;
}

impl IntoContext for Context {
    fn into_context(self) -> Result<Context, Error> {
        Ok(self)
    }
}

impl IntoContext for &Context {
    fn into_context(self) -> Result<Context, Error> {
        Ok(self.clone())
    }
}

impl IntoContext for () {
    fn into_context(self) -> Result<Context, Error> {
        Ok(Context::default())
    }
}

fn from_pairs<K: AsRef<str>, V: ToTemplateValue>(
    pairs: impl IntoIterator<Item = (K, V)>,
) -> Result<Context, Error> {
    let mut context = Context::new();
    for (key, value) in pairs {
        context.set(key.as_ref(), value)?;
    }

    Ok(context)
}

impl<K: AsRef<str>, V: ToTemplateValue> IntoContext for HashMap<K, V> {
    fn into_context(self) -> Result<Context, Error> {
        from_pairs(self)
    }
}

impl<K: AsRef<str>, V: ToTemplateValue> IntoContext for Vec<(K, V)> {
    fn into_context(self) -> Result<Context, Error> {
        from_pairs(self)
    }
}

impl<K: AsRef<str>, V: ToTemplateValue, const N: usize> IntoContext for [(K, V); N] {
    fn into_context(self) -> Result<Context, Error> {
        from_pairs(self)
    }
}

impl IntoContext for serde_json::Value {
    fn into_context(self) -> Result<Context, Error> {
        match self.to_template_value()? {
            Value::Hash(values) => Ok(Context { values }),
            Value::Null => Ok(Context::default()),
            Value::List(_) => Err(Error::NotAHash("list")),
            _ => Err(Error::NotAHash("scalar")),
        }
    }
}
