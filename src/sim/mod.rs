pub mod engine;
pub mod event;
pub mod selftest;
pub mod session;
pub mod spawn;
