pub mod icon;
pub mod view;

pub use icon::{icon_name, icon_level, MISSING_ICON};
pub use view::{IndicatorView, PREVIEW_CHARS};
