pub mod alignment;
pub mod engine;
pub mod frame_clock;
pub mod handle_spin;
pub mod participant;
pub mod slots;
pub mod spin;
pub mod visibility;
