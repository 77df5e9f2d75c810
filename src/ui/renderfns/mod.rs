pub mod footer;
pub mod header;
pub mod overlay;
pub mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
pub use overlay::{draw_overlay_frame, input_line, overlay_rect, Anchor};
pub use utils::{css_color, text_on, truncate};
