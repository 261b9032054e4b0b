//! Schema-driven marshalling.
//!
//! - [`transform`] turns caller options into wire parameters, validating them
//!   against an operation's parameter schema.
//! - [`normalize`] undoes the artifacts of XML-to-object conversion in
//!   responses and extracts the `<Operation>Result` envelope.

pub mod normalize;
pub mod transform;

pub use normalize::{
    camel_case_key, flatten, normalize_keys, unwrap_envelope, KeyOptions, ServiceError,
};
pub use transform::{passthrough, transform, CallOptions, ParamValue, ValidationError, WireQuery};
