//! Desktop front-end: a UI-thread controller plus its egui renderer.

pub mod controller;
pub mod state;
pub mod ui;
