pub mod command_policy;
pub mod frame;
pub mod intersection;
pub mod line_locator;
pub mod preprocessor;
