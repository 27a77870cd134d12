//! fittrack: normalize heterogeneous fitness exports into yearly and
//! monthly aggregates.
//!
//! Raw grids come from [`sources`], rows are interpreted by the adapters in
//! [`parsers`], and [`services`] normalizes, buckets and aggregates them.

pub mod parsers;
pub mod services;
pub mod sources;
pub mod types;
