pub mod icons;
pub mod render;
