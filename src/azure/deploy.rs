use crate::azure::bicep::{self, ValidationReport};
use crate::azure::client::{OpsClient, OpsError};
use crate::azure::compliance::{ResumptionToken, Workflow};
use crate::azure::models::{AutoDetected, BicepRequirements, DeploymentParameters};
use crate::azure::runner::Execution;
use crate::azure::scripts;
use crate::azure::subnet::{self, DEFAULT_SUBNET_PREFIX, SubnetError};
use crate::azure::tenant_region;
use serde_json::Value;

/// Parameter keys that may carry the deployed resource's name, in lookup
/// priority order.
const NAME_KEYS: &[&str] = &[
    "name",
    "accountName",
    "keyVaultName",
    "serverName",
    "databaseName",
    "storageAccountName",
    "workspaceName",
    "searchServiceName",
    "serviceName",
    "vmName",
    "virtualMachineName",
    "siteName",
    "functionAppName",
    "appServiceName",
    "logicAppName",
    "workflowName",
    "factoryName",
    "cacheName",
    "frontDoorName",
    "clusterName",
];

const LOGIC_APP_STORAGE_ROLES: &[(&str, &str)] = &[
    ("Storage Blob Data Owner", "b7e6dc6d-f1e8-4753-8033-0f276bb0955b"),
    ("Storage Account Contributor", "17d1049b-9a84-46fb-8f53-869881c3d3ab"),
    ("Storage Queue Data Contributor", "974c5e8b-45b9-4653-ba55-5f855dd0fb88"),
    ("Storage Table Data Contributor", "0a9a7e1f-b9d0-4cc4-a60d-0319b160aaa3"),
    ("Storage File Data SMB Share Contrib", "0c867c2a-1d8c-454a-a3db-ab2ea1bdc8bb"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Succeeded {
        text: String,
        resource_id: Option<String>,
    },
    /// Raw deployment output
    Failed(String),
}

impl DeployOutcome {
    pub fn text(&self) -> &str {
        match self {
            DeployOutcome::Succeeded { text, .. } => text,
            DeployOutcome::Failed(text) => text,
        }
    }
}

/// "hot", "HOT" and "Hot" all become "Hot".
pub fn normalize_access_tier(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `properties.provisioningState` from JSON deployment output, if the output
/// carries one.
fn provisioning_state(stdout: &str) -> Option<String> {
    let trimmed = stdout.trim();
    let json: Value = serde_json::from_str(trimmed).ok().or_else(|| {
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        serde_json::from_str(trimmed.get(start..=end)?).ok()
    })?;
    json.pointer("/properties/provisioningState")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Structured provisioning state when present, otherwise the text heuristic:
/// "Succeeded" appears and "Failed" does not.
pub fn deployment_succeeded(stdout: &str, rendered: &str) -> bool {
    match provisioning_state(stdout) {
        Some(state) => state == "Succeeded",
        None => rendered.contains("Succeeded") && !rendered.contains("Failed"),
    }
}

async fn derive_parameters(
    client: &OpsClient,
    resource_group: &str,
    resource_type: &str,
    params: &mut DeploymentParameters,
) -> Result<(), OpsError> {
    match resource_type {
        "storage-account" => {
            if let Some(tier) = params.get("accessTier") {
                let tier = normalize_access_tier(tier);
                params.insert("accessTier", tier);
            }
        }
        "fabric-capacity" => {
            let region = tenant_region::resolve_region(
                client.region_source(),
                &client.config().fabric_default_region,
            )
            .await;
            params.insert("location", region);
        }
        "subnet" => {
            let vnet_name = params.get("vnetName").unwrap_or_default().to_string();
            if !vnet_name.is_empty() && !params.has_value("subnetStartingAddress") {
                let prefix_len = subnet_size(params)?;
                let address =
                    subnet::next_subnet_address(client, resource_group, &vnet_name, prefix_len)
                        .await
                        .map_err(|e| subnet_error(&vnet_name, e))?;
                params.insert("subnetStartingAddress", address.to_string());
            }
        }
        _ => {}
    }
    Ok(())
}

fn subnet_size(params: &DeploymentParameters) -> Result<u8, OpsError> {
    match params.get("subnetSize").filter(|s| !s.is_empty()) {
        None => Ok(DEFAULT_SUBNET_PREFIX),
        Some(raw) => raw
            .parse::<u8>()
            .ok()
            .filter(|p| *p <= 32)
            .ok_or_else(|| {
                OpsError::Validation(format!(
                    "Error: subnetSize must be a prefix length between 0 and 32, got '{}'",
                    raw
                ))
            }),
    }
}

fn subnet_error(vnet_name: &str, err: SubnetError) -> OpsError {
    log::warn!("Subnet address calculation failed for {}: {}", vnet_name, err);
    let message = format!(
        "Error: Could not calculate next available subnet address in VNet '{}': {}",
        vnet_name, err
    );
    match err {
        SubnetError::Query(_) => OpsError::ExternalCommand(message),
        _ => OpsError::Validation(message),
    }
}

/// Applies derived values, runs the deployment script and interprets the
/// result. Does not check required parameters; see [`deploy_validated`].
pub async fn deploy(
    client: &OpsClient,
    resource_group: &str,
    resource_type: &str,
    mut params: DeploymentParameters,
) -> Result<DeployOutcome, OpsError> {
    let Some(template) = client.catalog().template_for(resource_type) else {
        return Err(OpsError::NotFound(bicep::unknown_type_message(
            client.catalog(),
            resource_type,
        )));
    };
    let template_path = client.template_path(template);
    if !template_path.is_file() {
        return Err(OpsError::NotFound(format!(
            "Template not found: {}",
            template_path.display()
        )));
    }

    derive_parameters(client, resource_group, resource_type, &mut params).await?;

    let script = client.require_script(scripts::DEPLOY_BICEP)?;
    log::info!(
        "Deploying {} to resource group {}",
        resource_type,
        resource_group
    );
    let execution = client
        .runner()
        .run_script_detailed(
            &script,
            &[
                ("ResourceGroup", resource_group.to_string()),
                ("TemplatePath", template_path.display().to_string()),
                ("Parameters", params.to_script_argument()),
            ],
        )
        .await;

    let stdout = execution
        .output
        .as_ref()
        .map(|o| o.stdout.as_str())
        .unwrap_or_default();
    if !deployment_succeeded(stdout, &execution.text) {
        log::warn!("Deployment of {} did not succeed", resource_type);
        return Ok(DeployOutcome::Failed(execution.text));
    }

    let mut sections =
        post_deployment(client, resource_group, resource_type, &params, &execution).await;
    let resource_id = lookup_resource_id(client, resource_group, resource_type, &params).await;

    if client.catalog().requires_nsp(resource_type) {
        sections.push(compliance_prompt(Workflow::Nsp, resource_group, resource_id.as_deref()));
    }
    if client.catalog().requires_diagnostics(resource_type) {
        sections.push(compliance_prompt(
            Workflow::Diagnostics,
            resource_group,
            resource_id.as_deref(),
        ));
    }

    Ok(DeployOutcome::Succeeded {
        text: sections.join("\n"),
        resource_id,
    })
}

/// Checks required parameters, then deploys. Missing parameters are a
/// validation error naming them.
pub async fn deploy_validated(
    client: &OpsClient,
    resource_group: &str,
    resource_type: &str,
    params: DeploymentParameters,
) -> Result<DeployOutcome, OpsError> {
    let report = validate(client, resource_type, &params)?;
    if !report.is_ok() {
        let required = required_names(client, resource_type, &report);
        return Err(OpsError::Validation(format!(
            "STOP: {}\n\nPlease call azure_get_bicep_requirements('{}') to see all required parameters.\nRequired: {}",
            report.message(),
            resource_type,
            if required.is_empty() {
                "unknown".to_string()
            } else {
                required.join(", ")
            }
        )));
    }
    deploy(client, resource_group, resource_type, params).await
}

fn validate(
    client: &OpsClient,
    resource_type: &str,
    params: &DeploymentParameters,
) -> Result<ValidationReport, OpsError> {
    bicep::validate_parameters(
        client.catalog(),
        &client.config().templates_dir,
        resource_type,
        params,
    )
}

fn required_names(
    client: &OpsClient,
    resource_type: &str,
    report: &ValidationReport,
) -> Vec<String> {
    let auto = client.catalog().auto_calculated(resource_type);
    report
        .schema
        .required_names()
        .into_iter()
        .filter(|p| !auto.contains(&p.as_str()))
        .collect()
}

/// Direct deployment path. The text is the deployment result whether it
/// succeeded or failed.
pub async fn deploy_bicep_resource(
    client: &OpsClient,
    resource_group: &str,
    resource_type: &str,
    params: DeploymentParameters,
) -> Result<String, OpsError> {
    if resource_group.trim().is_empty() {
        return Err(OpsError::Validation(
            "STOP: Resource group name is required. Please provide the resource group name."
                .to_string(),
        ));
    }
    if resource_type.trim().is_empty() {
        return Err(OpsError::Validation(format!(
            "STOP: Resource type is required. Valid types: {}",
            client.catalog().deployable_types().join(", ")
        )));
    }

    let outcome =
        deploy_validated(client, resource_group.trim(), resource_type.trim(), params).await?;
    Ok(outcome.text().to_string())
}

/// Guided creation: asks for whatever is still missing, deploys once
/// everything is there.
pub async fn create_resource(
    client: &OpsClient,
    resource_type: &str,
    resource_group: Option<&str>,
    parameters: Option<&str>,
) -> Result<String, OpsError> {
    let catalog = client.catalog();
    if catalog.template_for(resource_type).is_none() {
        let listing = catalog
            .deployable_types()
            .iter()
            .map(|t| format!("  - {}", t))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(OpsError::NotFound(format!(
            "Invalid resource type. Supported types:\n{}",
            listing
        )));
    }

    let params = match parameters.map(str::trim).filter(|p| !p.is_empty()) {
        None => DeploymentParameters::new(),
        Some(raw) => DeploymentParameters::from_json_str(raw).map_err(|_| {
            OpsError::Validation(format!("Error: Invalid JSON in parameters: {}", raw))
        })?,
    };

    let Some(resource_group) = resource_group.map(str::trim).filter(|rg| !rg.is_empty()) else {
        return Err(OpsError::Validation(format!(
            "Creating {}\n\nPlease provide:\n  - resource_group (required): The Azure resource group name\n\nOnce you provide the resource group, I'll check for the required template parameters.",
            resource_type
        )));
    };

    let report = validate(client, resource_type, &params)?;
    if !report.is_ok() {
        let auto = catalog.auto_calculated(resource_type);
        let mut lines = vec![
            format!("Creating {} in '{}'\n", resource_type, resource_group),
            "Please provide the following required parameters:\n".to_string(),
        ];
        lines.extend(report.missing.iter().map(|p| format!("  - {}", p)));

        match resource_type {
            "fabric-capacity" => lines.push(
                "\nNote: 'location' will be auto-detected from your Fabric tenant region."
                    .to_string(),
            ),
            "subnet" => lines.push(
                "\nNote: 'subnetStartingAddress' will be auto-calculated based on existing subnets."
                    .to_string(),
            ),
            _ => {}
        }

        let optional: Vec<String> = report
            .schema
            .optional_names()
            .into_iter()
            .filter(|p| !auto.contains(&p.as_str()))
            .collect();
        if !optional.is_empty() {
            lines.push(format!("\nOptional parameters: {}", optional.join(", ")));
        }
        lines.push(format!(
            "\nOnce you provide these, I'll:\n\n   1. Deploy the {}",
            resource_type
        ));
        return Err(OpsError::Validation(lines.join("\n")));
    }

    deploy_bicep_resource(client, resource_group, resource_type, params).await
}

/// Parameter report for a template. For Fabric capacities the location is
/// reported as auto-detected instead of as a parameter.
pub async fn bicep_requirements(
    client: &OpsClient,
    resource_type: &str,
) -> Result<BicepRequirements, OpsError> {
    let catalog = client.catalog();
    let Some(template) = catalog.template_for(resource_type) else {
        return Err(OpsError::NotFound(format!(
            "Unknown resource_type. Valid: {}",
            catalog.deployable_types().join(", ")
        )));
    };
    let path = client.template_path(template);
    if !path.is_file() {
        return Err(OpsError::NotFound(format!(
            "Template not found at {}",
            path.display()
        )));
    }
    let schema = bicep::introspect(&path);

    let hidden: &[&str] = if resource_type == "fabric-capacity" {
        &["location"]
    } else {
        &[]
    };
    let visible = |name: &String| !hidden.contains(&name.as_str());

    let mut requirements = BicepRequirements {
        required: schema.required_names().into_iter().filter(visible).collect(),
        optional: schema.optional_names().into_iter().filter(visible).collect(),
        defaults: schema
            .iter()
            .filter(|p| !hidden.contains(&p.name.as_str()))
            .filter_map(|p| Some((p.name.clone(), p.default.clone()?)))
            .collect(),
        auto_detected: None,
        note: None,
    };

    if resource_type == "fabric-capacity" {
        let detected = client.region_source().home_region().await;
        let (location, source) = match detected {
            Some(region) => {
                let normalized = tenant_region::normalize_region(&region);
                let source = format!(" (auto-detected: {})", normalized);
                (normalized, source)
            }
            None => {
                let fallback = client.config().fabric_default_region.clone();
                let source = format!(" (will use default: {})", fallback);
                (fallback, source)
            }
        };
        requirements.auto_detected = Some(AutoDetected { location });
        requirements.note = Some(format!(
            "Location is automatically set to your Fabric tenant's home region{}. You do not need to specify it.",
            source
        ));
    }

    Ok(requirements)
}

async fn post_deployment(
    client: &OpsClient,
    resource_group: &str,
    resource_type: &str,
    params: &DeploymentParameters,
    execution: &Execution,
) -> Vec<String> {
    let details = deployment_details(resource_type, params);
    match resource_type {
        "function-app" => {
            let mut sections =
                vec!["Running post-deployment tasks for Function App...".to_string()];
            sections.extend(function_app_hook(client, resource_group, params, execution).await);
            sections.push(details);
            sections
        }
        "logic-app" if params.get("logicAppType") == Some("standard") => {
            let storage_name = params.get("storageAccountName").unwrap_or_default();
            vec![details, logic_app_role_table(storage_name)]
        }
        _ => vec![details],
    }
}

/// Grants the new Function App identity access to its storage account.
async fn function_app_hook(
    client: &OpsClient,
    resource_group: &str,
    params: &DeploymentParameters,
    execution: &Execution,
) -> Option<String> {
    let script = client.script_path(scripts::POST_DEPLOY_FUNCTION_APP);
    if !script.is_file() {
        log::warn!("Post-deployment script missing: {}", script.display());
        return None;
    }

    let principal_id = execution
        .output
        .as_ref()
        .and_then(|o| serde_json::from_str::<Value>(o.stdout.trim()).ok())
        .and_then(|json| {
            json.pointer("/properties/outputs/systemAssignedIdentityPrincipalId/value")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|id| !id.is_empty());

    let Some(principal_id) = principal_id else {
        return Some(
            "Warning: Could not read the Function App identity from the deployment output; post-deployment tasks skipped."
                .to_string(),
        );
    };

    let output = client
        .runner()
        .run_script(
            &script,
            &[
                ("ResourceGroup", resource_group.to_string()),
                (
                    "FunctionAppName",
                    params.get("functionAppName").unwrap_or_default().to_string(),
                ),
                (
                    "StorageAccountName",
                    params.get("storageAccountName").unwrap_or_default().to_string(),
                ),
                ("PrincipalId", principal_id),
            ],
        )
        .await;
    Some(output)
}

fn logic_app_role_table(storage_name: &str) -> String {
    let rule = "═".repeat(70);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        "🔐 REQUIRED RBAC ROLE ASSIGNMENTS".to_string(),
        rule.clone(),
        String::new(),
        "The Logic App System Assigned Managed Identity needs these roles".to_string(),
        format!("on Storage Account '{}':", storage_name),
        String::new(),
        "┌─────────────────────────────────────┬──────────────────────────────────────┐".to_string(),
        "│ Role Name                           │ Role Definition ID                   │".to_string(),
        "├─────────────────────────────────────┼──────────────────────────────────────┤".to_string(),
    ];
    for (role, id) in LOGIC_APP_STORAGE_ROLES {
        lines.push(format!("│ {:<35} │ {:<36} │", role, id));
    }
    lines.push(
        "└─────────────────────────────────────┴──────────────────────────────────────┘".to_string(),
    );
    lines.push(String::new());
    lines.push(
        "Ask your admin to provide these roles to the Logic App's managed identity for proper functioning."
            .to_string(),
    );
    lines.push(rule);
    lines.join("\n")
}

/// Resolves the deployed resource's id from the first name-like parameter.
async fn lookup_resource_id(
    client: &OpsClient,
    resource_group: &str,
    resource_type: &str,
    params: &DeploymentParameters,
) -> Option<String> {
    let name = NAME_KEYS
        .iter()
        .find_map(|key| params.get(key).filter(|v| !v.is_empty()))?;
    let provider = client.catalog().provider_for(resource_type)?;

    let output = client
        .runner()
        .run_raw(&[
            "az",
            "resource",
            "show",
            "-g",
            resource_group,
            "-n",
            name,
            "--resource-type",
            provider,
            "--query",
            "id",
            "-o",
            "tsv",
        ])
        .await
        .ok()?;

    let id = output.stdout.trim();
    if output.success() && !id.is_empty() {
        Some(id.to_string())
    } else {
        log::info!("Could not resolve resource id of {} '{}'", resource_type, name);
        None
    }
}

fn compliance_prompt(workflow: Workflow, resource_group: &str, resource_id: Option<&str>) -> String {
    let rule = "═".repeat(70);
    let mut lines = vec![
        format!("\n{}", "─".repeat(70)),
        "⚠️  COMPLIANCE REQUIREMENT".to_string(),
        rule.clone(),
        String::new(),
    ];

    match workflow {
        Workflow::Nsp => lines.extend([
            "This resource requires NSP attachment for:".to_string(),
            "   📋 Secure PaaS Resources - Network Isolation".to_string(),
            String::new(),
            rule.clone(),
            String::new(),
            "🔒 Do you want to attach this resource to NSP?".to_string(),
            String::new(),
            "   Type 'yes' or 'attach to NSP' to proceed".to_string(),
            "   Type 'no' to skip (not recommended - resource will not be compliant)".to_string(),
            String::new(),
            "Automated workflow will:".to_string(),
            "   1. ✓ Check if NSP exists in the resource group".to_string(),
            "   2. ✓ Create NSP if it doesn't exist (skip if exists)".to_string(),
            "   3. ✓ Attach the resource to the NSP".to_string(),
        ]),
        Workflow::Diagnostics => lines.extend([
            "This resource requires Log Analytics diagnostic settings for:".to_string(),
            "   Resource Monitoring & Compliance".to_string(),
            String::new(),
            rule.clone(),
            String::new(),
            "Do you want to configure Log Analytics for this resource?".to_string(),
            String::new(),
            "   Type 'yes' or 'configure Log Analytics' to proceed".to_string(),
            "   Type 'no' to skip (not recommended - resource will not have monitoring)".to_string(),
            String::new(),
            "Automated workflow will:".to_string(),
            "   1. ✓ Check if Log Analytics Workspace exists in the resource group".to_string(),
            "   2. ✓ Create workspace if it doesn't exist (skip if exists)".to_string(),
            "   3. ✓ Configure diagnostic settings for the resource".to_string(),
        ]),
    }

    lines.push(String::new());
    match resource_id {
        Some(id) => {
            let token = ResumptionToken::new(workflow, resource_group, id, None);
            lines.push(format!(
                "To proceed, call azure_confirm_compliance with confirm=true and token:\n   {}",
                token.encode()
            ));
        }
        None => lines.push(format!(
            "The resource id could not be resolved; call {} with the resource id to proceed.",
            workflow.direct_tool()
        )),
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Human-readable summary of a successful deployment.
pub fn deployment_details(resource_type: &str, params: &DeploymentParameters) -> String {
    let get = |key: &str, fallback: &'static str| -> String {
        params.get(key).unwrap_or(fallback).to_string()
    };
    let flag = |key: &str| params.get(key).unwrap_or("true").eq_ignore_ascii_case("true");
    let location = get("location", "N/A");
    let rule = "═".repeat(70);

    let mut lines = vec![
        rule.clone(),
        "✅ DEPLOYMENT SUCCESSFUL".to_string(),
        rule,
        String::new(),
        "📦 Deployment Details:".to_string(),
        String::new(),
    ];

    match resource_type {
        "storage-account" => {
            let name = get("storageAccountName", "N/A");
            lines.push(format!("   Storage Account: {}", name));
            lines.push(format!("   Location: {}", location));
            lines.push(format!("   Access Tier: {}", get("accessTier", "N/A")));
            lines.push(format!(
                "   ADLS Gen2: {}",
                if flag("enableHierarchicalNamespace") { "Enabled" } else { "Disabled" }
            ));
            lines.push(format!("   Blob Endpoint: https://{}.blob.core.windows.net/", name));
            lines.push(format!("   DFS Endpoint: https://{}.dfs.core.windows.net/", name));
        }
        "key-vault" => {
            let name = get("keyVaultName", "N/A");
            lines.push(format!("   Key Vault: {}", name));
            lines.push(format!("   Location: {}", location));
            lines.push(format!("   Vault URI: https://{}.vault.azure.net/", name));
        }
        "cosmos-db" => {
            lines.push(format!("   Cosmos DB Account: {}", get("cosmosAccountName", "N/A")));
            lines.push(format!("   Location: {}", location));
        }
        "openai" => {
            let name = get("openAIServiceName", "N/A");
            lines.push(format!("   Azure OpenAI: {}", name));
            lines.push(format!("   Location: {}", location));
            lines.push(format!("   Endpoint: https://{}.openai.azure.com/", name));
        }
        "ai-search" => {
            let name = get("searchServiceName", "N/A");
            lines.push(format!("   AI Search Service: {}", name));
            lines.push(format!("   Location: {}", location));
            lines.push(format!("   SKU: {}", get("sku", "standard")));
            lines.push(format!("   Endpoint: https://{}.search.windows.net/", name));
        }
        "log-analytics" => {
            lines.push(format!("   Log Analytics Workspace: {}", get("workspaceName", "N/A")));
            lines.push(format!("   Location: {}", location));
        }
        "container-registry" => {
            let name = get("registryName", "N/A");
            lines.push(format!("   Container Registry: {}", name));
            lines.push(format!("   Location: {}", location));
            lines.push(format!("   SKU: {}", get("sku", "N/A")));
            lines.push(format!("   Login Server: {}.azurecr.io", name));
        }
        "function-app" => {
            let name = get("functionAppName", "N/A");
            lines.push(format!("   Function App: {}", name));
            lines.push(format!("   Location: {}", location));
            lines.push(format!("   Hosting Plan: {}", get("hostingPlanType", "N/A")));
            lines.push(format!("   Runtime: {}", get("runtimeStack", "N/A")));
            lines.push(format!("   URL: https://{}.azurewebsites.net", name));
            lines.push(String::new());
            lines.push("Storage containers created automatically".to_string());
            lines.push(String::new());
            lines.push("   ⚠️ ADMIN ACTION REQUIRED:".to_string());
            lines.push("   An admin with Owner role must assign 'Storage Blob Data Owner'".to_string());
            lines.push("   to the Function App's managed identity, then restart the app.".to_string());
        }
        "synapse" | "azure-synapse-analytics" => {
            let name = get("synapseName", "N/A");
            let storage = get("storageAccountName", "N/A");
            lines.push(format!("   Synapse Workspace: {}", name));
            lines.push(format!("   Location: {}", location));
            lines.push(format!("   Storage Account: {}", storage));
            lines.push(format!("   Filesystem/Container: {}", get("filesystemName", "N/A")));
            lines.push(format!(
                "   Storage Created: {}",
                if flag("createStorageAccount") { "Yes" } else { "No (existing)" }
            ));
            lines.push(format!(
                "   Container Created: {}",
                if flag("createContainer") { "Yes" } else { "No (existing)" }
            ));
            lines.push(format!(
                "   Synapse Studio: https://web.azuresynapse.net?workspace=%2Fsubscriptions%2F...%2F{}",
                name
            ));
            lines.push(String::new());
            lines.push("   ⚠️ ADMIN ACTION REQUIRED:".to_string());
            lines.push("   An admin with Owner/User Access Administrator role must assign".to_string());
            lines.push("   'Storage Blob Data Contributor' role to the Synapse workspace".to_string());
            lines.push(format!("   managed identity on storage account '{}'.", storage));
        }
        _ => {
            let name = ["name", "accountName", "serverName", "serviceName"]
                .iter()
                .find_map(|key| params.get(key));
            if let Some(name) = name {
                lines.push(format!("   Resource Name: {}", name));
            }
            lines.push(format!("   Resource Type: {}", resource_type));
            lines.push(format!("   Location: {}", location));
        }
    }

    lines.push(String::new());
    lines.push("─".repeat(70));
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::runner::ProcessOutput;
    use crate::azure::testing::{Fixture, arg, failed, fixture, ok};

    const TEMPLATES: &[(&str, &str)] = &[
        (
            "templates/azure-key-vaults.bicep",
            "param keyVaultName string\nparam location string = resourceGroup().location\n",
        ),
        (
            "templates/storage-account.bicep",
            "param storageAccountName string\nparam accessTier string = 'Hot'\n",
        ),
        (
            "templates/fabric-capacity.bicep",
            "param capacityName string\nparam location string\nparam adminMembers array\n",
        ),
        (
            "templates/subnet.bicep",
            "param vnetName string\nparam subnetName string\nparam subnetStartingAddress string\nparam subnetSize int = 27\n",
        ),
    ];

    fn deploy_fixture<F>(region: Option<&str>, respond: F) -> Fixture
    where
        F: Fn(&str, &[String]) -> ProcessOutput + Send + Sync + 'static,
    {
        fixture(TEMPLATES, &[scripts::DEPLOY_BICEP], region, respond)
    }

    fn parameters_argument(fx: &Fixture) -> String {
        let calls = fx.calls_to(scripts::DEPLOY_BICEP);
        assert_eq!(calls.len(), 1, "deploy-bicep calls: {:?}", calls);
        arg(&calls[0], "-Parameters").unwrap().to_string()
    }

    #[test]
    fn access_tier_normalizes_case() {
        for raw in ["hot", "HOT", "Hot", "hOT"] {
            assert_eq!(normalize_access_tier(raw), "Hot");
        }
        assert_eq!(normalize_access_tier(""), "");
    }

    #[test]
    fn structured_state_beats_the_text_heuristic() {
        let json = r#"{"name": "FailedOverRegion", "properties": {"provisioningState": "Succeeded"}}"#;
        assert!(deployment_succeeded(json, json));

        let json = r#"{"properties": {"provisioningState": "Failed"}, "note": "Succeeded earlier"}"#;
        assert!(!deployment_succeeded(json, json));

        let noisy = "WARNING: preview\n{\"properties\": {\"provisioningState\": \"Succeeded\"}}\n";
        assert!(deployment_succeeded(noisy, noisy));
    }

    #[test]
    fn text_heuristic_applies_without_json() {
        assert!(deployment_succeeded("", "Deployment Succeeded"));
        assert!(!deployment_succeeded("", "Succeeded partially, Failed on step 2"));
        assert!(!deployment_succeeded("", "nothing useful"));
    }

    #[tokio::test]
    async fn storage_access_tier_reaches_the_script_normalized() {
        for tier in ["hot", "HOT", "Hot"] {
            let fx = deploy_fixture(None, |_, _| ok("Succeeded"));
            let params: DeploymentParameters =
                [("storageAccountName", "stdemo"), ("accessTier", tier)].into_iter().collect();

            deploy(&fx.client, "rg-demo", "storage-account", params).await.unwrap();

            assert_eq!(
                parameters_argument(&fx),
                "accessTier=Hot;storageAccountName=stdemo"
            );
        }
    }

    #[tokio::test]
    async fn fabric_region_falls_back_when_detection_fails() {
        let fx = deploy_fixture(None, |_, _| ok("Succeeded"));
        let params: DeploymentParameters = [
            ("capacityName", "fc1"),
            ("adminMembers", "a@b.c"),
            ("location", "eastus"),
        ]
        .into_iter()
        .collect();

        deploy_validated(&fx.client, "rg", "fabric-capacity", params).await.unwrap();

        assert!(parameters_argument(&fx).contains("location=westcentralus"));
    }

    #[tokio::test]
    async fn fabric_region_uses_detected_tenant_region() {
        let fx = deploy_fixture(Some("North Europe"), |_, _| ok("Succeeded"));
        let params: DeploymentParameters =
            [("capacityName", "fc1"), ("adminMembers", "a@b.c")].into_iter().collect();

        deploy_validated(&fx.client, "rg", "fabric-capacity", params).await.unwrap();

        assert!(parameters_argument(&fx).contains("location=northeurope"));
    }

    #[tokio::test]
    async fn subnet_start_address_is_calculated_from_the_vnet() {
        let fx = deploy_fixture(None, |program, args| {
            if program != "az" {
                return ok("Succeeded");
            }
            if args.iter().any(|a| a == "subnet") {
                ok(r#"[{"addressPrefix": "10.0.0.0/27"}]"#)
            } else {
                ok("10.0.0.0/16\n")
            }
        });
        let params: DeploymentParameters =
            [("vnetName", "vnet-app"), ("subnetName", "snet-data")].into_iter().collect();

        deploy_validated(&fx.client, "rg", "subnet", params).await.unwrap();

        assert!(parameters_argument(&fx).contains("subnetStartingAddress=10.0.0.32"));
    }

    #[tokio::test]
    async fn supplied_subnet_address_is_kept() {
        let fx = deploy_fixture(None, |_, _| ok("Succeeded"));
        let params: DeploymentParameters = [
            ("vnetName", "vnet-app"),
            ("subnetName", "snet-data"),
            ("subnetStartingAddress", "10.0.5.0"),
        ]
        .into_iter()
        .collect();

        deploy_validated(&fx.client, "rg", "subnet", params).await.unwrap();

        assert!(parameters_argument(&fx).contains("subnetStartingAddress=10.0.5.0"));
        assert!(!fx.all_calls().iter().any(|c| c.iter().any(|a| a == "vnet")));
    }

    #[tokio::test]
    async fn full_vnet_stops_before_deploying() {
        let fx = deploy_fixture(None, |_, args| {
            if args.iter().any(|a| a == "subnet") {
                ok(r#"[{"addressPrefix": "10.0.0.0/27"}]"#)
            } else {
                ok("10.0.0.0/27")
            }
        });
        let params: DeploymentParameters =
            [("vnetName", "vnet-app"), ("subnetName", "snet-data")].into_iter().collect();

        let err = deploy_validated(&fx.client, "rg", "subnet", params).await.unwrap_err();

        assert!(matches!(err, OpsError::Validation(msg) if msg.contains("vnet-app")));
        assert!(fx.calls_to(scripts::DEPLOY_BICEP).is_empty());
    }

    #[tokio::test]
    async fn missing_parameters_stop_with_the_required_list() {
        let fx = deploy_fixture(None, |_, _| ok("Succeeded"));

        let err = deploy_bicep_resource(&fx.client, "rg", "key-vault", DeploymentParameters::new())
            .await
            .unwrap_err();

        match err {
            OpsError::Validation(msg) => {
                assert!(msg.starts_with("STOP: Missing required parameters: keyVaultName"));
                assert!(msg.ends_with("Required: keyVaultName"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(fx.all_calls().is_empty());
    }

    #[tokio::test]
    async fn blank_resource_group_stops() {
        let fx = deploy_fixture(None, |_, _| ok("Succeeded"));
        let err = deploy_bicep_resource(&fx.client, "  ", "key-vault", DeploymentParameters::new())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("STOP: Resource group name is required"));
    }

    #[tokio::test]
    async fn failed_deployment_returns_raw_output_without_prompts() {
        let fx = deploy_fixture(None, |_, _| failed("Deployment Failed: (Conflict) name taken"));
        let params: DeploymentParameters = [("keyVaultName", "kv1")].into_iter().collect();

        let outcome = deploy(&fx.client, "rg", "key-vault", params).await.unwrap();

        let DeployOutcome::Failed(text) = outcome else {
            panic!("expected failure");
        };
        assert!(text.contains("RESOURCE CONFLICT"));
        assert!(!text.contains("COMPLIANCE REQUIREMENT"));
    }

    #[tokio::test]
    async fn storage_prompt_carries_a_token_for_the_resolved_id() {
        let fx = deploy_fixture(None, |program, _| {
            if program == "az" {
                ok("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/stdemo\n")
            } else {
                ok("Succeeded")
            }
        });
        let params: DeploymentParameters = [("storageAccountName", "stdemo")].into_iter().collect();

        let outcome = deploy(&fx.client, "rg", "storage-account", params).await.unwrap();

        let DeployOutcome::Succeeded { text, resource_id } = outcome else {
            panic!("expected success");
        };
        let id = resource_id.unwrap();
        assert!(id.ends_with("/storageAccounts/stdemo"));
        assert!(text.contains("This resource requires NSP attachment for:"));
        assert!(!text.contains("Log Analytics diagnostic settings"));

        let token = ResumptionToken::new(Workflow::Nsp, "rg", id, None).encode();
        assert!(text.contains(&token));
    }

    #[tokio::test]
    async fn create_resource_asks_for_missing_inputs() {
        let fx = deploy_fixture(None, |_, _| ok("Succeeded"));

        let err = create_resource(&fx.client, "subnet", Some("rg"), Some(r#"{"vnetName": "v"}"#))
            .await
            .unwrap_err();
        let OpsError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("  - subnetName"));
        assert!(!msg.contains("  - subnetStartingAddress"));
        assert!(msg.contains("will be auto-calculated"));
        assert!(msg.contains("Optional parameters: subnetSize"));

        let err = create_resource(&fx.client, "subnet", None, None).await.unwrap_err();
        assert!(err.to_string().contains("resource_group (required)"));

        let err = create_resource(&fx.client, "subnet", Some("rg"), Some("{oops"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            OpsError::Validation("Error: Invalid JSON in parameters: {oops".to_string())
        );

        let err = create_resource(&fx.client, "mainframe", Some("rg"), None).await.unwrap_err();
        assert!(matches!(err, OpsError::NotFound(msg) if msg.contains("  - key-vault")));
    }

    #[tokio::test]
    async fn fabric_requirements_hide_location() {
        let fx = deploy_fixture(None, |_, _| ok(""));

        let report = bicep_requirements(&fx.client, "fabric-capacity").await.unwrap();

        assert_eq!(report.required, vec!["capacityName", "adminMembers"]);
        assert!(!report.defaults.contains_key("location"));
        assert_eq!(report.auto_detected.unwrap().location, "westcentralus");
        assert!(report.note.unwrap().contains("will use default: westcentralus"));
    }

    #[tokio::test]
    async fn requirements_list_defaults() {
        let fx = deploy_fixture(None, |_, _| ok(""));

        let report = bicep_requirements(&fx.client, "key-vault").await.unwrap();

        assert_eq!(report.required, vec!["keyVaultName"]);
        assert_eq!(report.optional, vec!["location"]);
        assert_eq!(
            report.defaults.get("location").map(String::as_str),
            Some("resourceGroup().location")
        );
        assert!(report.auto_detected.is_none());
    }

    #[test]
    fn details_block_per_type() {
        let params: DeploymentParameters =
            [("keyVaultName", "kv1"), ("location", "westeurope")].into_iter().collect();
        let text = deployment_details("key-vault", &params);
        assert!(text.contains("Vault URI: https://kv1.vault.azure.net/"));

        let params: DeploymentParameters = [("name", "nsp1")].into_iter().collect();
        let text = deployment_details("nsp", &params);
        assert!(text.contains("Resource Name: nsp1"));
        assert!(text.contains("Location: N/A"));
    }

    #[test]
    fn logic_app_table_lists_every_role() {
        let table = logic_app_role_table("stlogic");
        for (role, id) in LOGIC_APP_STORAGE_ROLES {
            assert!(table.contains(role));
            assert!(table.contains(id));
        }
        assert!(table.contains("on Storage Account 'stlogic':"));
    }
}
