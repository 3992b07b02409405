use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::TagError;

/// A single tag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    List(Vec<Tag>),
    Compound(CompoundTag),
}

impl Tag {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Tag::Byte(_) => "byte",
            Tag::Short(_) => "short",
            Tag::Int(_) => "int",
            Tag::Long(_) => "long",
            Tag::Float(_) => "float",
            Tag::Double(_) => "double",
            Tag::String(_) => "string",
            Tag::List(_) => "list",
            Tag::Compound(_) => "compound",
        }
    }

    /// Widen any integer tag to `i64`. Non-integer tags give `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Tag::Byte(v) => Some(v.into()),
            Tag::Short(v) => Some(v.into()),
            Tag::Int(v) => Some(v.into()),
            Tag::Long(v) => Some(v),
            _ => None,
        }
    }
}

/// An ordered string-keyed map of tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompoundTag {
    entries: BTreeMap<String, Tag>,
}

macro_rules! typed_access {
    ($set:ident, $get:ident, $variant:ident, $ty:ty, $name:literal) => {
        #[doc = concat!("Store a ", $name, " tag under `key`.")]
        pub fn $set(&mut self, key: impl Into<String>, value: $ty) {
            self.insert(key, Tag::$variant(value));
        }

        #[doc = concat!("Read the ", $name, " tag under `key`.")]
        pub fn $get(&self, key: &str) -> Result<$ty, TagError> {
            match self.require(key)? {
                Tag::$variant(v) => Ok(*v),
                other => Err(mismatch(key, $name, other)),
            }
        }
    };
}

impl CompoundTag {
    /// An empty compound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` holds any tag.
    pub fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The raw tag under `key`, untyped.
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.entries.get(key)
    }

    /// Insert a tag, returning whatever was stored under `key` before.
    pub fn insert(&mut self, key: impl Into<String>, tag: Tag) -> Option<Tag> {
        self.entries.insert(key.into(), tag)
    }

    /// Remove and return the tag under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.entries.remove(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Tag> {
        self.entries.iter()
    }

    /// Copy every entry of `other` into `self`, overwriting on collision.
    pub fn merge(&mut self, other: &CompoundTag) {
        for (k, v) in other.iter() {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    typed_access!(set_byte, get_byte, Byte, i8, "byte");
    typed_access!(set_short, get_short, Short, i16, "short");
    typed_access!(set_int, get_int, Int, i32, "int");
    typed_access!(set_long, get_long, Long, i64, "long");
    typed_access!(set_float, get_float, Float, f32, "float");
    typed_access!(set_double, get_double, Double, f64, "double");

    /// Booleans are stored as a byte, 0 or 1.
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.set_byte(key, i8::from(value));
    }

    /// Any non-zero byte reads as `true`.
    pub fn get_bool(&self, key: &str) -> Result<bool, TagError> {
        self.get_byte(key).map(|b| b != 0)
    }

    /// Store a string tag under `key`.
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, Tag::String(value.into()));
    }

    /// Read the string tag under `key`.
    pub fn get_string(&self, key: &str) -> Result<&str, TagError> {
        match self.require(key)? {
            Tag::String(s) => Ok(s),
            other => Err(mismatch(key, "string", other)),
        }
    }

    /// Store a list tag under `key`.
    pub fn set_list(&mut self, key: impl Into<String>, items: Vec<Tag>) {
        self.insert(key, Tag::List(items));
    }

    /// Read the list tag under `key`.
    pub fn get_list(&self, key: &str) -> Result<&[Tag], TagError> {
        match self.require(key)? {
            Tag::List(items) => Ok(items),
            other => Err(mismatch(key, "list", other)),
        }
    }

    /// Store a nested compound under `key`.
    pub fn set_compound(&mut self, key: impl Into<String>, value: CompoundTag) {
        self.insert(key, Tag::Compound(value));
    }

    /// Read the nested compound under `key`.
    pub fn get_compound(&self, key: &str) -> Result<&CompoundTag, TagError> {
        match self.require(key)? {
            Tag::Compound(c) => Ok(c),
            other => Err(mismatch(key, "compound", other)),
        }
    }

    fn require(&self, key: &str) -> Result<&Tag, TagError> {
        self.entries
            .get(key)
            .ok_or_else(|| TagError::MissingKey(key.to_string()))
    }
}

impl<'a> IntoIterator for &'a CompoundTag {
    type Item = (&'a String, &'a Tag);
    type IntoIter = btree_map::Iter<'a, String, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn mismatch(key: &str, expected: &'static str, found: &Tag) -> TagError {
    TagError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_set_and_get() {
        let mut tag = CompoundTag::new();
        tag.set_byte("b", -3);
        tag.set_int("i", 70_000);
        tag.set_string("s", "wheat");
        tag.set_bool("flag", true);

        assert_eq!(tag.get_byte("b").unwrap(), -3);
        assert_eq!(tag.get_int("i").unwrap(), 70_000);
        assert_eq!(tag.get_string("s").unwrap(), "wheat");
        assert!(tag.get_bool("flag").unwrap());
        assert_eq!(tag.len(), 4);
    }

    #[test]
    fn missing_key_is_error() {
        let tag = CompoundTag::new();
        assert!(matches!(tag.get_int("nope"), Err(TagError::MissingKey(k)) if k == "nope"));
    }

    #[test]
    fn wrong_type_is_error() {
        let mut tag = CompoundTag::new();
        tag.set_string("x", "not a number");
        match tag.get_int("x") {
            Err(TagError::TypeMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, "int");
                assert_eq!(found, "string");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn nested_compound() {
        let mut inner = CompoundTag::new();
        inner.set_short("size", 3);
        let mut outer = CompoundTag::new();
        outer.set_compound("inner", inner.clone());

        assert_eq!(outer.get_compound("inner").unwrap(), &inner);
        assert_eq!(
            outer.get_compound("inner").unwrap().get_short("size").unwrap(),
            3
        );
    }

    #[test]
    fn integer_widening() {
        assert_eq!(Tag::Byte(-1).as_i64(), Some(-1));
        assert_eq!(Tag::Long(1 << 40).as_i64(), Some(1 << 40));
        assert_eq!(Tag::Float(1.0).as_i64(), None);
    }

    #[test]
    fn keys_iterate_sorted() {
        let mut tag = CompoundTag::new();
        tag.set_byte("z", 0);
        tag.set_byte("a", 0);
        tag.set_byte("m", 0);
        let keys: Vec<&str> = tag.keys().collect();
        assert_eq!(keys, vec!["a", "m", "z"]);
    }

    #[test]
    fn merge_overwrites() {
        let mut a = CompoundTag::new();
        a.set_int("k", 1);
        a.set_int("only_a", 1);
        let mut b = CompoundTag::new();
        b.set_int("k", 2);
        a.merge(&b);
        assert_eq!(a.get_int("k").unwrap(), 2);
        assert!(a.has_key("only_a"));
    }
}
