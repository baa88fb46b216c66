// Identity and agent tools
pub mod azure_login;
pub mod get_current_user;
pub mod show_agent_instructions;

pub use azure_login::{AzureLoginArgs, azure_login};
pub use get_current_user::{GetCurrentUserArgs, get_current_user};
pub use show_agent_instructions::{ShowAgentInstructionsArgs, show_agent_instructions};
