pub mod default_route;
pub mod insights_route;
