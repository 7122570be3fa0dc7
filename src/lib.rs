//! stricthash - strict, schema-declared record types
//!
//! A record type declares a fixed, ordered set of named attributes, each with
//! a literal default (shared across instances) or a zero-argument factory
//! (invoked fresh per construction). Instances are ordered mappings over that
//! closed key set: a typo in a key name fails loudly instead of silently.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use stricthash::RecordType;
//!
//! # fn main() -> stricthash::RecordResult<()> {
//! let options = RecordType::define("Options", |schema| {
//!     schema.attribute("max_lines", json!(50))?;
//!     schema.attribute_factory("markers", || json!([]))?;
//!     schema.predicate("debug", json!(false))?;
//!     Ok(())
//! })?;
//!
//! let record = options.construct_with([("max_lines", json!(10))])?;
//! assert_eq!(*record.get("max_lines")?.borrow(), json!(10));
//! assert!(!record.predicate("debug")?);
//! assert!(record.get("max_linez").is_err());
//! # Ok(())
//! # }
//! ```
//!
//! Single-threaded by construction: values are `Rc<RefCell<_>>` cells so the
//! shared-literal-default contract is expressible, and the types are
//! deliberately not `Send`.

pub mod errors;
pub mod key;
pub mod record;
pub mod schema;
pub mod value;

pub use errors::{RecordError, RecordResult};
pub use key::{Key, KeyProbe};
pub use record::{Attr, Record, RecordType};
pub use schema::{AttributeDefault, AttributeSpec, Factory, Schema};
pub use value::{is_truthy, shared, snapshot, SharedValue, Value};
