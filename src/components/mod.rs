pub mod app;
pub mod controls_panel;
