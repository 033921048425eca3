//! # GServer Game Logic Layer
//!
//! This crate contains all game logic for the GServer.
//!
//! ## Modules
//!
//! - `player` - Player management and state
//! - `manager` - Player collection management
//! - `properties` - Player property definitions
//! - `property_engine` - Wire decode/encode and write-gating for player properties
//! - `handlers` - Packet handlers for game logic
//! - `account` - Player account management

pub mod player;
pub mod manager;
pub mod properties;
pub mod property_engine;
pub mod handlers;
pub mod account;

// Re-export commonly used types
pub use player::{Player, PlayerType, PlayerState};
pub use manager::PlayerManager;
pub use properties::{PlayerProperties, PlayerProp};
pub use property_engine::{apply_incoming_props, apply_incoming_props_rc, encode_all_props, encode_props, gate_for, forward_class_for, is_chat_command, sanitize_nickname, AppliedProp, ForwardClass, PropertyGate};
pub use account::{Account, AccountManager};
