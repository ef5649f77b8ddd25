pub mod detect;
pub mod overlay;
pub mod pipeline;
pub mod rect;
pub mod report;
pub mod still;
pub mod video;
