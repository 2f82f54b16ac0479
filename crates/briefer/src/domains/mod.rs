pub mod briefings;

pub use briefings::*;
