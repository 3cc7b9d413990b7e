//! Frontline - turn-based persistent strategy game engine

pub mod catalog;
pub mod combat;
pub mod core;
pub mod engine;
pub mod modifiers;
pub mod player;
pub mod production;
pub mod store;
pub mod territory;

pub use crate::core::error::{ErrorCategory, GameError, Result};
pub use crate::core::types::PlayerId;
pub use crate::engine::Engine;
