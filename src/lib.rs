pub mod config;
pub mod constants;
pub mod error;
pub mod infographics;
pub mod infra;
pub mod output;
pub mod request;
pub mod services;
pub mod statistics;
pub mod store;
pub mod widgets;

pub use infographics::{Infographics, InfographicsData, InfographicsMeta};
