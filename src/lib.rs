pub mod config;
pub mod defense_rankings;
pub mod error;
pub mod http_client;
pub mod matchups;
pub mod model;
pub mod pipeline;
pub mod remote_source;
pub mod report;
pub mod season;
pub mod sink;
pub mod sources;
pub mod stat_table;
pub mod teams;
