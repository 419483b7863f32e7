pub mod angle;
pub mod general;
