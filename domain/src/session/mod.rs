//! Transcript domain.
//!
//! - [`entities::Transcript`]: the message sequence one run exchanges with the planner
//! - [`entities::ConversationTurn`]: prior chat context supplied by the caller
//! - [`response::PlannerTurn`]: what a single planning call decided

pub mod entities;
pub mod response;

pub use entities::{ConversationTurn, ImageRef, Message, Role, Transcript};
pub use response::PlannerTurn;
