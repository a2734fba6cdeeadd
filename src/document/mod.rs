//! Configuration document subsystem.
//!
//! # Data Flow
//! ```text
//! upload body (YAML or JSON)
//!     → decode.rs (parse, merge keys, top level must be a mapping)
//!     → validation.rs (required-field table, all errors in one pass)
//!     → Document (stored verbatim)
//!
//! read with template=1
//!     → template.rs (strict rendering of every string leaf)
//!     → Document (rendered copy, stored one untouched)
//! ```
//!
//! # Design Decisions
//! - One tagged `Value` tree for every node; no dynamic type inspection
//! - Mapping order is insertion order and survives storage
//! - Validation and rendering are pure functions over their inputs

pub mod decode;
pub mod template;
pub mod validation;
pub mod value;

pub use decode::{decode_yaml, DecodeError};
pub use template::{RenderContext, TemplateError, TemplateRenderer};
pub use validation::{validate, FieldType, ValidationErrors, REQUIRED_FIELDS};
pub use value::{Document, Map, Value};
