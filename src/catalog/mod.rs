//! Static game catalogs: units, political systems, countries and regions

pub mod politics;
pub mod regions;
pub mod units;

pub use politics::PoliticalSystem;
pub use regions::{Country, RegionSpec};
pub use units::{UnitCatalog, UnitKind, UnitSpec};
