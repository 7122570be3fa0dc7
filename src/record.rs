//! Record types and instances
//!
//! A [`RecordType`] pairs a label with a frozen [`Schema`]; a [`Record`] is
//! one instance: a fully-populated, declaration-ordered mapping from the
//! schema's keys to current values. The key set of an instance is always
//! exactly the schema's key set.
//!
//! Strictness: reading, writing, merging, or constructing with a key the
//! schema does not declare fails with `KEY_NOT_FOUND`. Absence of a declared
//! key never happens; a stored `null` is an ordinary value.

use std::fmt;
use std::iter;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::{RecordError, RecordResult};
use crate::key::{Key, KeyProbe};
use crate::schema::Schema;
use crate::value::{is_truthy, shared, snapshot, SharedValue, Value};

/// A concrete record type: an optional label plus a frozen schema.
///
/// Types are defined through a closure so that the declaration protocol is
/// only reachable while the type is being assembled; the finished
/// `Rc<RecordType>` handle exposes no mutation path.
#[derive(Debug)]
pub struct RecordType {
    label: Option<String>,
    schema: Schema,
}

impl RecordType {
    /// Defines a named record type.
    ///
    /// The closure receives the open schema and declares attributes on it;
    /// the schema is frozen when the closure returns.
    ///
    /// # Errors
    ///
    /// Propagates the first declaration error from the closure.
    pub fn define<F>(label: impl Into<String>, build: F) -> RecordResult<Rc<Self>>
    where
        F: FnOnce(&mut Schema) -> RecordResult<()>,
    {
        Self::build(Some(label.into()), Schema::new(), build)
    }

    /// Defines an unnamed record type; it renders as `subclass` in inspection
    pub fn define_anonymous<F>(build: F) -> RecordResult<Rc<Self>>
    where
        F: FnOnce(&mut Schema) -> RecordResult<()>,
    {
        Self::build(None, Schema::new(), build)
    }

    /// Wraps an externally built schema, freezing it
    pub fn from_schema(label: impl Into<String>, mut schema: Schema) -> Rc<Self> {
        schema.freeze();
        Rc::new(Self {
            label: Some(label.into()),
            schema,
        })
    }

    /// Defines a subtype: the parent's attributes plus the closure's.
    ///
    /// Literal defaults stay shared with the parent type. Redeclaring a
    /// parent attribute is the usual duplicate-name error.
    pub fn extend<F>(self: &Rc<Self>, label: impl Into<String>, build: F) -> RecordResult<Rc<Self>>
    where
        F: FnOnce(&mut Schema) -> RecordResult<()>,
    {
        Self::build(Some(label.into()), self.schema.reopened(), build)
    }

    fn build<F>(label: Option<String>, mut schema: Schema, build: F) -> RecordResult<Rc<Self>>
    where
        F: FnOnce(&mut Schema) -> RecordResult<()>,
    {
        build(&mut schema)?;
        schema.freeze();
        Ok(Rc::new(Self { label, schema }))
    }

    /// Returns the type label, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Label used in inspection output; `subclass` for unnamed types
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("subclass")
    }

    /// Returns the (frozen) schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Resolves an attribute handle for accessor-style access.
    ///
    /// Returns `None` for undeclared names. The handle is bound to this
    /// type's slot layout and valid for every instance of the type.
    pub fn attr(&self, name: &str) -> Option<Attr> {
        let (index, spec) = self.schema.get_full(name)?;
        Some(Attr {
            key: spec.name().clone(),
            index,
            predicate: spec.is_predicate(),
        })
    }

    /// Constructs an instance from defaults alone.
    ///
    /// Factories run fresh; literal defaults are aliased in verbatim.
    pub fn construct(self: &Rc<Self>) -> RecordResult<Record> {
        self.construct_with(iter::empty::<(&str, Value)>())
    }

    /// Constructs an instance, overriding defaults key by key.
    ///
    /// Override keys accept symbol or string spelling; a later duplicate
    /// wins. An overridden attribute stores the supplied value verbatim and
    /// its factory, if any, does not run.
    ///
    /// # Errors
    ///
    /// `KEY_NOT_FOUND` naming the unknown key(s) if any override key is not
    /// declared; no partial instance escapes.
    pub fn construct_with<I, K, V>(self: &Rc<Self>, overrides: I) -> RecordResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut pending: IndexMap<String, Value> = IndexMap::new();
        for (name, value) in overrides {
            pending.insert(name.as_ref().to_string(), value.into());
        }

        let mut values = IndexMap::with_capacity(self.schema.len());
        for spec in self.schema.iter() {
            let value = match pending.shift_remove(spec.name().as_str()) {
                Some(supplied) => shared(supplied),
                None => spec.initial_value(),
            };
            values.insert(spec.name().clone(), value);
        }

        if !pending.is_empty() {
            let mut unknown: Vec<String> = pending.into_keys().collect();
            return Err(if unknown.len() == 1 {
                RecordError::UnknownKey(unknown.remove(0))
            } else {
                RecordError::UnknownKeys(unknown)
            });
        }

        log::trace!(
            "constructed {} record with {} attribute(s)",
            self.display_label(),
            values.len()
        );
        Ok(Record {
            ty: Rc::clone(self),
            values,
        })
    }
}

/// Resolved attribute handle: the accessor-pair equivalent.
///
/// Obtained from [`RecordType::attr`]; access through a handle never fails on
/// the key, because the key is known to exist for every instance of the type.
#[derive(Debug, Clone)]
pub struct Attr {
    key: Key,
    index: usize,
    predicate: bool,
}

impl Attr {
    /// Returns the attribute key
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Returns true if the attribute answers predicate queries
    pub fn is_predicate(&self) -> bool {
        self.predicate
    }
}

/// One record instance.
///
/// Holds a shared reference to its type and a value for every declared
/// attribute, in declaration order. Values mutate in place; keys never change.
#[derive(Debug)]
pub struct Record {
    ty: Rc<RecordType>,
    values: IndexMap<Key, SharedValue>,
}

impl Record {
    /// Returns the record's type
    pub fn record_type(&self) -> &Rc<RecordType> {
        &self.ty
    }

    /// Returns the current value for `key`.
    ///
    /// The returned cell is the stored one: in-place mutation through it is
    /// visible to this instance (and to any instance aliasing the same
    /// unmodified literal default).
    ///
    /// # Errors
    ///
    /// `UnknownKey` if `key` is not declared, regardless of the stored value.
    pub fn get(&self, key: &str) -> RecordResult<SharedValue> {
        self.values
            .get(key)
            .map(Rc::clone)
            .ok_or_else(|| RecordError::UnknownKey(key.to_string()))
    }

    /// Replaces the value for `key`.
    ///
    /// Assignment rebinds the slot to a fresh cell; it never writes through
    /// a shared default.
    ///
    /// # Errors
    ///
    /// `UnknownKey` if `key` is not declared.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> RecordResult<()> {
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = shared(value.into());
                Ok(())
            }
            None => Err(RecordError::UnknownKey(key.to_string())),
        }
    }

    /// Accessor-style read through a resolved handle. Never fails on the key.
    ///
    /// # Panics
    ///
    /// Panics if `attr` was resolved from a different record type.
    pub fn value_of(&self, attr: &Attr) -> SharedValue {
        match self.values.get_index(attr.index) {
            Some((key, value)) if key == attr.key() => Rc::clone(value),
            _ => panic!(
                "attribute handle '{}' does not belong to this record type",
                attr.key()
            ),
        }
    }

    /// Accessor-style write through a resolved handle.
    ///
    /// # Panics
    ///
    /// Panics if `attr` was resolved from a different record type.
    pub fn set_value(&mut self, attr: &Attr, value: impl Into<Value>) {
        match self.values.get_index_mut(attr.index) {
            Some((key, slot)) if key == attr.key() => *slot = shared(value.into()),
            _ => panic!(
                "attribute handle '{}' does not belong to this record type",
                attr.key()
            ),
        }
    }

    /// Boolean-coercion query for predicate attributes.
    ///
    /// Truthiness, not equality: only `null` and `false` answer `false`.
    ///
    /// # Errors
    ///
    /// - `UnknownKey` if `key` is not declared
    /// - `NotAPredicate` if the attribute was not declared as a predicate
    pub fn predicate(&self, key: &str) -> RecordResult<bool> {
        let spec = self
            .ty
            .schema()
            .get(key)
            .ok_or_else(|| RecordError::UnknownKey(key.to_string()))?;
        if !spec.is_predicate() {
            return Err(RecordError::NotAPredicate(key.to_string()));
        }
        let value = self.get(key)?;
        let truthy = is_truthy(&value.borrow());
        Ok(truthy)
    }

    /// Returns true iff the probe normalizes to a declared key.
    ///
    /// Non-textual probes (numbers, arrays, ...) answer `false` rather than
    /// failing.
    pub fn contains_key(&self, probe: impl KeyProbe) -> bool {
        probe
            .key_str()
            .is_some_and(|name| self.values.contains_key(name))
    }

    /// Alias of [`Record::contains_key`]
    pub fn has_key(&self, probe: impl KeyProbe) -> bool {
        self.contains_key(probe)
    }

    /// Alias of [`Record::contains_key`]
    pub fn includes(&self, probe: impl KeyProbe) -> bool {
        self.contains_key(probe)
    }

    /// Alias of [`Record::contains_key`]
    pub fn is_member(&self, probe: impl KeyProbe) -> bool {
        self.contains_key(probe)
    }

    /// Returns an independent, ordered snapshot of the current values.
    ///
    /// Mutating the snapshot never affects the instance; successive
    /// snapshots are independent of each other.
    pub fn to_map(&self) -> IndexMap<Key, Value> {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), snapshot(value)))
            .collect()
    }

    /// Alias of [`Record::to_map`]
    pub fn to_hash(&self) -> IndexMap<Key, Value> {
        self.to_map()
    }

    /// Declared keys, in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.values.keys()
    }

    /// Current values, positionally aligned with [`Record::keys`]
    pub fn values(&self) -> impl Iterator<Item = SharedValue> + '_ {
        self.values.values().map(Rc::clone)
    }

    /// Restartable `(key, value)` enumeration in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&Key, SharedValue)> {
        self.values.iter().map(|(key, value)| (key, Rc::clone(value)))
    }

    /// Returns a new instance with the given keys overridden.
    ///
    /// Non-overridden slots alias the receiver's current values; overridden
    /// slots take the supplied values verbatim. Neither the receiver nor the
    /// argument is mutated.
    ///
    /// # Errors
    ///
    /// `UnknownKey` for the first override key that is not declared.
    pub fn merge<I, K, V>(&self, overrides: I) -> RecordResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut values = self.values.clone();
        for (name, value) in overrides {
            let name = name.as_ref();
            match values.get_mut(name) {
                Some(slot) => *slot = shared(value.into()),
                None => return Err(RecordError::UnknownKey(name.to_string())),
            }
        }
        Ok(Record {
            ty: Rc::clone(&self.ty),
            values,
        })
    }
}

fn clone_pair<'a>((key, value): (&'a Key, &'a SharedValue)) -> (&'a Key, SharedValue) {
    (key, Rc::clone(value))
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a Key, SharedValue);
    type IntoIter = iter::Map<
        indexmap::map::Iter<'a, Key, SharedValue>,
        fn((&'a Key, &'a SharedValue)) -> (&'a Key, SharedValue),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let project: fn((&'a Key, &'a SharedValue)) -> (&'a Key, SharedValue) = clone_pair;
        self.values.iter().map(project)
    }
}

impl fmt::Display for Record {
    /// Renders `#<StrictHash Label: {k1: v1, k2: v2}>` in declaration order,
    /// with `subclass` standing in for an unnamed type.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<StrictHash {}: {{", self.ty.display_label())?;
        for (position, (key, value)) in self.values.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value.borrow())?;
        }
        write!(f, "}}>")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(key, &*value.borrow())?;
        }
        map.end()
    }
}
