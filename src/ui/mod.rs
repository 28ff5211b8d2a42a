// UI module - egui control surface

pub mod app;

pub use app::MetronomeApp;
