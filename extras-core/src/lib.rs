//! Extras Core
//!
//! Resource lifecycle contract shared by the extras providers: attribute
//! values, resource data handed over by the host, schemas and the
//! create/read/update/delete operation descriptors.

pub mod provider;
pub mod resource;
pub mod schema;
