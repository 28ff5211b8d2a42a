// Audio module - CPAL backend and the real-time callback

pub mod device;
pub mod dsp;
pub mod engine;
pub mod format;
pub mod parameters;
