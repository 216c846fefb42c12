//! Resources of the base AWS provider that the extras resources build on
//!
//! These bodies act with a single account and are typed on [`BaseClient`];
//! the extras layer decorates them with cross-account routing.
//!
//! [`BaseClient`]: crate::client::BaseClient

pub mod route53_zone_association;
