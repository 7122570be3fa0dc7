//! Schema declaration protocol
//!
//! A [`Schema`] is the ordered set of attribute specifications for one record
//! type. It is built incrementally while the type is being defined and frozen
//! before the type handle escapes; declaration against a frozen schema fails
//! with `DeclarationClosed`.
//!
//! Declaration rules:
//! - Names must have symbol shape
//! - Exactly one default strategy per attribute (literal or factory),
//!   expressed by the entry point used
//! - No name may be declared twice, regardless of which entry points are
//!   combined
//! - Declaration order is preserved and significant for enumeration

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::errors::{RecordError, RecordResult};
use crate::key::Key;
use crate::value::{shared, SharedValue, Value};

/// Zero-argument factory producing a fresh default per construction
pub type Factory = Rc<dyn Fn() -> Value>;

/// Default strategy for an attribute.
///
/// The two strategies have different runtime semantics: a literal is one
/// value aliased into every instance that does not override it, a factory is
/// invoked fresh at each construction and never memoized.
#[derive(Clone)]
pub enum AttributeDefault {
    /// One value shared verbatim across constructions
    Literal(SharedValue),
    /// Invoked at each construction; skipped when the attribute is overridden
    Factory(Factory),
}

impl AttributeDefault {
    /// Produces the initial value for one construction
    pub(crate) fn materialize(&self) -> SharedValue {
        match self {
            AttributeDefault::Literal(value) => Rc::clone(value),
            AttributeDefault::Factory(factory) => shared(factory()),
        }
    }

    /// Returns true for the factory strategy
    pub fn is_factory(&self) -> bool {
        matches!(self, AttributeDefault::Factory(_))
    }
}

impl fmt::Debug for AttributeDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeDefault::Literal(value) => {
                f.debug_tuple("Literal").field(&*value.borrow()).finish()
            }
            AttributeDefault::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// One declared attribute: name, default strategy, predicate flag.
///
/// The predicate flag is orthogonal to storage: predicate attributes share
/// the single value path and additionally answer boolean-coercion queries.
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    name: Key,
    default: AttributeDefault,
    predicate: bool,
}

impl AttributeSpec {
    /// Returns the attribute name
    pub fn name(&self) -> &Key {
        &self.name
    }

    /// Returns the default strategy
    pub fn default(&self) -> &AttributeDefault {
        &self.default
    }

    /// Returns true if the attribute answers predicate queries
    pub fn is_predicate(&self) -> bool {
        self.predicate
    }

    pub(crate) fn initial_value(&self) -> SharedValue {
        self.default.materialize()
    }
}

/// Ordered attribute specifications for one record type.
///
/// One schema per concrete type. Instances hold a read-only reference to it;
/// nothing mutates a schema after [`Schema::freeze`].
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: IndexMap<Key, AttributeSpec>,
    frozen: bool,
}

impl Schema {
    /// Creates an empty schema, open for declaration
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an attribute with a literal default.
    ///
    /// The default is stored verbatim and aliased into every instance that
    /// does not override it.
    ///
    /// # Errors
    ///
    /// - `DeclarationClosed` if the schema is frozen
    /// - `InvalidName` if `name` is not symbol-shaped
    /// - `DuplicateAttribute` if `name` is already declared
    pub fn attribute(&mut self, name: &str, default: impl Into<Value>) -> RecordResult<()> {
        self.declare(name, AttributeDefault::Literal(shared(default.into())), false)
    }

    /// Declares an attribute with a per-instance factory default
    pub fn attribute_factory<F>(&mut self, name: &str, factory: F) -> RecordResult<()>
    where
        F: Fn() -> Value + 'static,
    {
        self.declare(name, AttributeDefault::Factory(Rc::new(factory)), false)
    }

    /// Declares several attributes with literal defaults, in iteration order.
    ///
    /// The first invalid or conflicting entry fails immediately; entries
    /// already applied by the same call remain declared.
    pub fn attributes<I, K, V>(&mut self, defaults: I) -> RecordResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (name, default) in defaults {
            self.attribute(name.as_ref(), default)?;
        }
        Ok(())
    }

    /// Declares a predicate attribute with a literal default
    pub fn predicate(&mut self, name: &str, default: impl Into<Value>) -> RecordResult<()> {
        self.declare(name, AttributeDefault::Literal(shared(default.into())), true)
    }

    /// Declares a predicate attribute with a per-instance factory default
    pub fn predicate_factory<F>(&mut self, name: &str, factory: F) -> RecordResult<()>
    where
        F: Fn() -> Value + 'static,
    {
        self.declare(name, AttributeDefault::Factory(Rc::new(factory)), true)
    }

    /// Declares several predicate attributes with literal defaults
    pub fn predicates<I, K, V>(&mut self, defaults: I) -> RecordResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (name, default) in defaults {
            self.predicate(name.as_ref(), default)?;
        }
        Ok(())
    }

    fn declare(
        &mut self,
        name: &str,
        default: AttributeDefault,
        predicate: bool,
    ) -> RecordResult<()> {
        if self.frozen {
            return Err(RecordError::DeclarationClosed);
        }
        let key = Key::new(name)?;
        if self.attributes.contains_key(&key) {
            return Err(RecordError::DuplicateAttribute(name.to_string()));
        }
        log::trace!(
            "declared attribute '{}' (predicate: {}, factory: {})",
            key,
            predicate,
            default.is_factory()
        );
        self.attributes.insert(
            key.clone(),
            AttributeSpec {
                name: key,
                default,
                predicate,
            },
        );
        Ok(())
    }

    /// Closes the schema for declaration. Idempotent.
    pub fn freeze(&mut self) {
        if !self.frozen {
            self.frozen = true;
            log::debug!("schema frozen with {} attribute(s)", self.attributes.len());
        }
    }

    /// Returns true once the schema is closed for declaration
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Returns an unfrozen copy for subtype declaration
    pub(crate) fn reopened(&self) -> Schema {
        Schema {
            attributes: self.attributes.clone(),
            frozen: false,
        }
    }

    /// Returns the number of declared attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if no attributes are declared
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns true if `name` is declared
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Looks up an attribute specification by name
    pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.get(name)
    }

    /// Looks up an attribute with its declaration index
    pub(crate) fn get_full(&self, name: &str) -> Option<(usize, &AttributeSpec)> {
        self.attributes
            .get_full(name)
            .map(|(index, _, spec)| (index, spec))
    }

    /// Declared names, in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.attributes.keys()
    }

    /// Attribute specifications, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.values()
    }
}
