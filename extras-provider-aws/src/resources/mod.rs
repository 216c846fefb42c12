//! Resources served by the extras provider
//!
//! Names are given without the provider prefix.

pub mod dx_private_virtual_interface;
pub mod dx_private_virtual_interface_confirmation;
pub mod route53_zone_association;
pub mod route53_zone_association_authorization;
