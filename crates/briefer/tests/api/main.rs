mod briefing;
mod helpers;
mod render;
