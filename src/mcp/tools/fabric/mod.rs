// Microsoft Fabric workspace tools
pub mod assign_role;
pub mod attach_workspace_to_git;
pub mod create_managed_private_endpoint;
pub mod create_workspace;
pub mod list_managed_private_endpoints;
pub mod list_permissions;

pub use assign_role::{AssignRoleArgs, assign_role};
pub use attach_workspace_to_git::{AttachWorkspaceToGitArgs, attach_workspace_to_git};
pub use create_managed_private_endpoint::{CreateManagedPrivateEndpointArgs, create_managed_private_endpoint};
pub use create_workspace::{CreateWorkspaceArgs, create_workspace};
pub use list_managed_private_endpoints::{ListManagedPrivateEndpointsArgs, list_managed_private_endpoints};
pub use list_permissions::{ListPermissionsArgs, list_permissions};
