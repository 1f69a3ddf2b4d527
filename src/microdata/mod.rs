//! schema.org microdata items.
//!
//! [`extract`] turns HTML into a list of [`Item`]s. Property values form a
//! small recursive tree ([`Value`]) whose accessors never fail: looking up a
//! property that isn't there yields [`Value::Absent`], so nested paths such as
//! `article.property("publisher").property("name")` can be walked without
//! checking every step.

mod extract;

pub use extract::extract;

use std::collections::BTreeMap;

static ABSENT: Value = Value::Absent;

/// A microdata item: an element carrying `itemscope`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    /// The `itemtype` attribute, e.g. `http://schema.org/Article`.
    pub item_type: Option<String>,
    /// The `itemid` attribute.
    pub id: Option<String>,
    pub properties: BTreeMap<String, Value>,
}

/// The value of a microdata property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Item(Item),
    /// The property was given on more than one element.
    List(Vec<Value>),
    Absent,
}

impl Item {
    /// The named property, or [`Value::Absent`].
    pub fn property(&self, name: &str) -> &Value {
        self.properties.get(name).unwrap_or(&ABSENT)
    }

    /// Whether any of the space-separated `itemtype` URLs equals `type_url`.
    pub fn is_a(&self, type_url: &str) -> bool {
        self.item_type
            .as_deref()
            .is_some_and(|types| types.split_whitespace().any(|t| t == type_url))
    }

    /// Record a value, turning a repeated property into a [`Value::List`].
    pub(crate) fn add_property(&mut self, name: &str, value: Value) {
        match self.properties.get_mut(name) {
            None => {
                self.properties.insert(name.to_string(), value);
            }
            Some(Value::List(values)) => values.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, Value::Absent);
                *existing = Value::List(vec![first, value]);
            }
        }
    }
}

impl Value {
    /// The first of several values, or the value itself.
    pub fn first(&self) -> &Value {
        match self {
            Value::List(values) => values.first().unwrap_or(&ABSENT),
            other => other,
        }
    }

    /// A property of the (first) item value.
    pub fn property(&self, name: &str) -> &Value {
        match self.first() {
            Value::Item(item) => item.property(name),
            _ => &ABSENT,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self.first() {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self.first() {
            Value::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}
