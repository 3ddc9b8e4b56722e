pub mod chart;
pub mod colormap;
pub mod config;
pub mod error;
pub mod http_client;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod selection;
pub mod table;
pub mod table_fetch;
pub mod viewer;
