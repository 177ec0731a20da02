pub mod aggregate;
pub mod drilldown;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod selection;
pub mod session;
pub mod source;
pub mod store;
