//! In-memory record trees and their XML serialization.

mod node;
mod serialize;

pub use node::Node;
pub use serialize::INDENT_STEP;
