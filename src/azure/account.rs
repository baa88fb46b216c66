use crate::azure::client::{OpsClient, OpsError};
use crate::azure::inputs::present;
use crate::azure::scripts;

const INSTRUCTIONS_MISSING: &str = "Instructions file not found.";

fn value(input: Option<&str>) -> String {
    present(input).unwrap_or_default().to_string()
}

/// Subscription, tenant and signed-in user as JSON.
pub async fn get_current_user(client: &OpsClient) -> Result<String, OpsError> {
    client.run_script(scripts::GET_CURRENT_USER, &[]).await
}

/// Interactive `az login`. With several subscriptions the script lists them
/// and the agent calls again with the chosen id.
pub async fn azure_login(
    client: &OpsClient,
    selected_subscription_id: Option<&str>,
) -> Result<String, OpsError> {
    client
        .run_script(
            scripts::AZURE_LOGIN,
            &[("SelectedSubscriptionId", value(selected_subscription_id))],
        )
        .await
}

pub async fn list_subscriptions(client: &OpsClient) -> Result<String, OpsError> {
    client.run_script(scripts::LIST_SUBSCRIPTIONS, &[]).await
}

pub async fn set_subscription(
    client: &OpsClient,
    subscription_id: Option<&str>,
    subscription_name: Option<&str>,
) -> Result<String, OpsError> {
    client
        .run_script(
            scripts::SET_SUBSCRIPTION,
            &[
                ("SubscriptionId", value(subscription_id)),
                ("SubscriptionName", value(subscription_name)),
            ],
        )
        .await
}

/// Contents of the configured agent instructions file.
pub async fn show_agent_instructions(client: &OpsClient) -> String {
    let path = &client.config().instructions_file;
    match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Could not read instructions {}: {}", path.display(), e);
            INSTRUCTIONS_MISSING.to_string()
        }
    }
}
