// Azure resource, subscription and RBAC tools
pub mod assign_role;
pub mod check_resource;
pub mod create_resource_group;
pub mod get_activity_log;
pub mod get_resource_info;
pub mod list_permissions;
pub mod list_subscriptions;
pub mod set_subscription;
pub mod update_tags;

pub use assign_role::{AssignRoleArgs, assign_role};
pub use check_resource::{CheckResourceArgs, check_resource};
pub use create_resource_group::{CreateResourceGroupArgs, create_resource_group};
pub use get_activity_log::{GetActivityLogArgs, get_activity_log};
pub use get_resource_info::{GetResourceInfoArgs, get_resource_info};
pub use list_permissions::{ListPermissionsArgs, list_permissions};
pub use list_subscriptions::{ListSubscriptionsArgs, list_subscriptions};
pub use set_subscription::{SetSubscriptionArgs, set_subscription};
pub use update_tags::{UpdateTagsArgs, update_tags};
