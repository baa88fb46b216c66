use async_trait::async_trait;
use mcp_for_azure_operations::azure::client::{OpsClient, OpsError};
use mcp_for_azure_operations::azure::runner::{ExecError, ProcessExecutor, ProcessOutput};
use mcp_for_azure_operations::azure::tenant_region::FixedRegion;
use mcp_for_azure_operations::azure::{compliance, deploy, models::DeploymentParameters, scripts};
use mcp_for_azure_operations::config::Config;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const VAULT_ID: &str = "/subscriptions/0000/resourceGroups/rg-app/providers/Microsoft.KeyVault/vaults/kv-app";
const NSP_ID: &str = "/subscriptions/0000/resourceGroups/rg-app/providers/Microsoft.Network/networkSecurityPerimeters/rg-app-nsp";

/// Stands in for pwsh and the Azure CLI, answering by script name.
#[derive(Default)]
struct ScriptedAzure {
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedAzure {
    fn scripts_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| {
                call.iter()
                    .find(|a| a.ends_with(".ps1"))
                    .and_then(|a| a.rsplit('/').next())
                    .map(str::to_string)
            })
            .collect()
    }
}

fn stdout(text: &str) -> ProcessOutput {
    ProcessOutput {
        stdout: text.to_string(),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

#[async_trait]
impl ProcessExecutor for ScriptedAzure {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        _timeout: Duration,
    ) -> Result<ProcessOutput, ExecError> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().cloned());
        self.calls.lock().unwrap().push(call);

        if program == "az" {
            return Ok(stdout(&format!("{}\n", VAULT_ID)));
        }
        let script = args.iter().find(|a| a.ends_with(".ps1")).cloned().unwrap_or_default();
        let output = if script.ends_with(scripts::DEPLOY_BICEP) {
            stdout(r#"{"name": "kv-app", "properties": {"provisioningState": "Succeeded"}}"#)
        } else if script.ends_with(scripts::CHECK_RESOURCE) {
            stdout(&format!("RESOURCE FOUND: rg-app-nsp\nRESOURCE ID: {}\nCOUNT: 1", NSP_ID))
        } else if script.ends_with(scripts::ATTACH_NSP) {
            stdout("Resource associated with perimeter profile 'defaultProfile'")
        } else {
            stdout("")
        };
        Ok(output)
    }
}

struct Workspace {
    _dir: tempfile::TempDir,
    client: OpsClient,
    azure: Arc<ScriptedAzure>,
}

fn workspace() -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(
        templates.join("azure-key-vaults.bicep"),
        "@description('Vault name')\nparam keyVaultName string\nparam location string = resourceGroup().location\nparam enablePurgeProtection bool = true\n",
    )
    .unwrap();
    let scripts_dir = dir.path().join("scripts");
    std::fs::create_dir_all(&scripts_dir).unwrap();
    for script in [scripts::DEPLOY_BICEP, scripts::CHECK_RESOURCE, scripts::ATTACH_NSP] {
        std::fs::write(scripts_dir.join(script), "").unwrap();
    }

    let config = Config {
        scripts_dir,
        templates_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    let azure = Arc::new(ScriptedAzure::default());
    let client = OpsClient::new(config, azure.clone(), "pwsh", Arc::new(FixedRegion(None)));
    Workspace {
        _dir: dir,
        client,
        azure,
    }
}

fn token_for(text: &str, workflow: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| line.starts_with(&format!("{}.", workflow)))
        .unwrap_or_else(|| panic!("no {} token in:\n{}", workflow, text))
        .to_string()
}

#[tokio::test]
async fn key_vault_deploys_and_offers_both_compliance_steps() {
    let ws = workspace();
    let params: DeploymentParameters = [("keyVaultName", "kv-app")].into_iter().collect();

    let text = deploy::deploy_bicep_resource(&ws.client, "rg-app", "key-vault", params)
        .await
        .unwrap();

    assert!(text.contains("DEPLOYMENT SUCCESSFUL"));
    assert!(text.contains("This resource requires NSP attachment for:"));
    assert!(text.contains("This resource requires Log Analytics diagnostic settings for:"));
    assert_eq!(ws.azure.scripts_called(), vec![scripts::DEPLOY_BICEP.to_string()]);

    let nsp = compliance::ResumptionToken::decode(&token_for(&text, "nsp")).unwrap();
    assert_eq!(nsp.resource_group, "rg-app");
    assert_eq!(nsp.resource_id, VAULT_ID);
    let diagnostics = compliance::ResumptionToken::decode(&token_for(&text, "diagnostics")).unwrap();
    assert_eq!(diagnostics.resource_id, VAULT_ID);
}

#[tokio::test]
async fn confirmed_nsp_step_attaches_to_the_existing_perimeter() {
    let ws = workspace();
    let params: DeploymentParameters = [("keyVaultName", "kv-app")].into_iter().collect();
    let text = deploy::deploy_bicep_resource(&ws.client, "rg-app", "key-vault", params)
        .await
        .unwrap();

    let report = compliance::confirm(&ws.client, &token_for(&text, "nsp"), true)
        .await
        .unwrap();

    assert!(report.contains("Found existing NSP: 'rg-app-nsp'"));
    assert!(report.ends_with("Final state: SUCCEEDED"));
    assert_eq!(
        ws.azure.scripts_called(),
        vec![
            scripts::DEPLOY_BICEP.to_string(),
            scripts::CHECK_RESOURCE.to_string(),
            scripts::ATTACH_NSP.to_string(),
        ]
    );
}

#[tokio::test]
async fn declined_diagnostics_step_runs_nothing() {
    let ws = workspace();
    let params: DeploymentParameters = [("keyVaultName", "kv-app")].into_iter().collect();
    let text = deploy::deploy_bicep_resource(&ws.client, "rg-app", "key-vault", params)
        .await
        .unwrap();
    let calls_before = ws.azure.calls.lock().unwrap().len();

    let reply = compliance::confirm(&ws.client, &token_for(&text, "diagnostics"), false)
        .await
        .unwrap();

    assert!(reply.starts_with("Skipped Log Analytics configuration"));
    assert!(reply.contains("azure_attach_diagnostic_settings"));
    assert_eq!(ws.azure.calls.lock().unwrap().len(), calls_before);
}

#[tokio::test]
async fn missing_vault_name_stops_before_any_command() {
    let ws = workspace();

    let err = deploy::deploy_bicep_resource(&ws.client, "rg-app", "key-vault", DeploymentParameters::new())
        .await
        .unwrap_err();

    assert!(matches!(err, OpsError::Validation(_)));
    let message = err.to_string();
    assert!(message.starts_with("STOP: "));
    assert!(message.contains("keyVaultName"));
    assert!(message.contains("azure_get_bicep_requirements('key-vault')"));
    assert!(ws.azure.calls.lock().unwrap().is_empty());
}
