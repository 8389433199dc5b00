//! Read-only protobuf descriptor tree consumed by the Delphi declaration
//! generator.
//!
//! Descriptors are loaded from the JSON form of a `FileDescriptorSet` and
//! indexed by fully-qualified name in a [`DescriptorPool`]:
//!
//! ```
//! use delphi_proto_schema::*;
//!
//! let set = DescriptorSet::from_json_str(r#"{
//!     "file": [{
//!         "name": "addressbook.proto",
//!         "package": "tutorial",
//!         "messageType": [{ "name": "Person" }]
//!     }]
//! }"#).unwrap();
//!
//! let pool = DescriptorPool::new(&set).unwrap();
//! let person = pool.get(".tutorial.Person").unwrap();
//! assert_eq!(person.local_name, "Person");
//! assert!(matches!(person.node, TypeNode::Message(_)));
//! ```

pub mod descriptor;
pub mod error;
pub mod pool;

pub use descriptor::*;
pub use error::SchemaError;
pub use pool::*;
