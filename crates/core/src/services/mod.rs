pub mod analytics_service;
pub mod format;
pub mod portfolio_service;
pub mod projection_service;
pub mod tax_service;
