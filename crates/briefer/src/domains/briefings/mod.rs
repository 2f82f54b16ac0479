mod briefing_service;
mod render;
mod risk_tracker;

pub use briefing_service::*;
pub use render::*;
pub use risk_tracker::*;
