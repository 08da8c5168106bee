pub mod direction;
pub mod grid;
pub mod row;
pub mod rules;
