//! Presence-aware configuration values.
//!
//! A [`Field`] records whether a value was supplied at all, so that "not
//! provided" and "provided empty" stay distinct all the way to the request
//! payload. Absent and `null` JSON values both decode to [`Field::Unset`].
//!
//! ```
//! use checkpoint_provider::field::Field;
//!
//! #[derive(serde::Deserialize)]
//! struct Config {
//!     #[serde(default)]
//!     flag: Field<bool>,
//!     #[serde(default)]
//!     label: Field<String>,
//! }
//!
//! let config: Config = serde_json::from_str(r#"{"flag": false}"#).unwrap();
//! assert_eq!(config.flag, Field::Set(false));
//! assert!(config.label.is_unset());
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A value that is either explicitly set or not supplied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// No value was supplied.
    #[default]
    Unset,
    /// A value was supplied, possibly an empty or `false` one.
    Set(T),
}

impl<T> Field<T> {
    /// Returns `true` when no value was supplied.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// The supplied value, if any.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Unset => None,
            Self::Set(v) => Some(v),
        }
    }
}

impl<T: Default + Clone> Field<T> {
    /// The supplied value, or the type's empty value when unset.
    pub fn value_or_default(&self) -> T {
        self.get().cloned().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Unset,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(v) => v.serialize(serializer),
            Self::Unset => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Into::into)
    }
}
