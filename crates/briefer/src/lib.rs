mod domains;
mod fetcher;
mod utils;

pub use domains::*;
pub use fetcher::*;
pub use utils::*;
