//! Command implementations for the nview CLI

mod search;
mod view;

pub use search::execute as search;
pub use view::execute as view;
