//! Player state: inventory and the persisted record

pub mod inventory;
pub mod record;

pub use inventory::Inventory;
pub use record::PlayerRecord;
