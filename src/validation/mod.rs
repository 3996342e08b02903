//! Request payload validation: a small declarative schema engine, the
//! compiled auth schemas, and the middleware gate that applies them.

pub mod gate;
pub mod schema;
pub mod schemas;

pub use gate::gate;
pub use schema::{Field, FieldError, Schema};
