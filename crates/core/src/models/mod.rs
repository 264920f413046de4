pub mod analytics;
pub mod load_state;
pub mod portfolio;
pub mod settings;
pub mod tax;
pub mod view_state;
