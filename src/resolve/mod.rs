pub mod client;
pub mod dedup;
pub mod engine;
pub mod record;
pub mod tags;
