pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod signals;
pub mod sound;
pub mod theme;
