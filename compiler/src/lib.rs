//! delphi-proto-compiler
//!
//! Turns protobuf descriptors into Delphi units of record and enumeration
//! declarations that bind against the `Delphi.Serial.Protobuf` runtime:
//!  1) identifier conversions (`naming`),
//!  2) a `$variable$` template printer (`printer`),
//!  3) type resolution into an ordered declaration plan (`resolver`),
//!  4) rendering of that plan (`gen_delphi`),
//!  5) default-value literals (`literal`) and generator options (`options`).

pub mod error;
pub mod gen_delphi;
pub mod generator;
pub mod literal;
pub mod naming;
pub mod options;
pub mod printer;
pub mod registry;
pub mod resolver;
pub mod types;

pub use error::GenerateError;
pub use generator::{generate_units, GeneratedUnit, Generator, UNIT_FILE_SUFFIX};
pub use options::Options;
pub use types::UnitPlan;
