//! Crossroads — Hub Authority bounded context.
//!
//! Responsible for the domain and user registries, the item template
//! catalog, the custody record of every item, the setup/play mode machine
//! and the cross-domain journey sub-plot. "Domain" in the type names below
//! means a registered world server; the `domain` module holds this context's
//! model in the usual layered sense.

pub mod application;
pub mod domain;
