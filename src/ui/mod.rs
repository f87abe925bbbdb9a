pub mod diff_utils;
pub mod footer;
pub mod highlight_line;
pub mod render_ui;
pub mod side_by_side_diff;
pub mod unified_diff;
