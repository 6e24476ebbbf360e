//! Value types shared by every analysis

pub mod three_state;
pub mod types;

pub use three_state::ThreeState;
pub use types::{JavaType, PrimitiveType};
