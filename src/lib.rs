pub mod acquisition;
pub mod config;
pub mod export;
pub mod feed;
pub mod http_client;
pub mod insights;
pub mod odds_cache;
pub mod odds_fetch;
pub mod projections;
pub mod sample_slate;
pub mod state;
pub mod team_names;
pub mod top_picks;
pub mod valuation;
