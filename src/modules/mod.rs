pub mod config;
pub mod env;
pub mod error;
pub mod fruit;
pub mod metrics;
pub mod monitor;
pub mod observation;
pub mod policy;
pub mod slot;
pub mod view;
