pub mod header;
pub mod utils;

pub use header::draw_header;
pub use utils::{format_rating, format_runtime, rating_color, truncate};
