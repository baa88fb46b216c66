pub mod account;
pub mod bicep;
pub mod catalog;
pub mod client;
pub mod compliance;
pub mod deploy;
pub mod devops;
pub mod error_catalog;
pub mod fabric;
pub mod inputs;
pub mod lookup;
pub mod models;
pub mod resources;
pub mod runner;
pub mod scripts;
pub mod subnet;
pub mod tenant_region;

#[cfg(test)]
mod testing;
