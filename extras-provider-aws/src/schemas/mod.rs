//! AWS resource schema definitions

pub mod directconnect;
pub mod provider;
pub mod route53;
pub mod types;
