// One module per platform; each tool lives in its own file.
pub mod compliance;
pub mod deployment;
pub mod devops;
pub mod fabric;
pub mod general;
pub mod resources;
pub mod support;
