//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering HTTPS-only
//! endpoints, per-operation capability flags, and provider quirks (scope delimiter,
//! extra authorization parameters). `strategy` defines [`ProviderStrategy`], an
//! HTTP-client-agnostic hook used by flows to augment outgoing token requests and map
//! provider failure shapes into the broker error taxonomy. `catalog` ships the two
//! built-in adapters (Google and the Microsoft identity platform).

pub mod catalog;
pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
