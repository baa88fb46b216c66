use crate::azure::client::{OpsClient, OpsError};
use crate::azure::deploy::{self, DeployOutcome};
use crate::azure::lookup::{self, LookupOutcome};
use crate::azure::models::DeploymentParameters;
use crate::azure::scripts;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Substrings that mark an attach step as failed. Case-sensitive.
const ERROR_KEYWORDS: &[&str] = &["Error", "error", "FAILED", "Failed", "failed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    /// Attach to a network security perimeter
    Nsp,
    /// Send diagnostic settings to a Log Analytics workspace
    Diagnostics,
}

impl Workflow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Workflow::Nsp => "nsp",
            Workflow::Diagnostics => "diagnostics",
        }
    }

    fn from_prefix(raw: &str) -> Option<Self> {
        match raw {
            "nsp" => Some(Workflow::Nsp),
            "diagnostics" => Some(Workflow::Diagnostics),
            _ => None,
        }
    }

    /// Tool that runs this workflow without a token.
    pub fn direct_tool(&self) -> &'static str {
        match self {
            Workflow::Nsp => "azure_attach_to_nsp",
            Workflow::Diagnostics => "azure_attach_diagnostic_settings",
        }
    }

    fn banner(&self) -> &'static str {
        match self {
            Workflow::Nsp => "🔒 Starting NSP Attachment Workflow",
            Workflow::Diagnostics => "📊 Starting Log Analytics Configuration Workflow",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Workflow::Nsp => "NSP attachment",
            Workflow::Diagnostics => "Log Analytics configuration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Checking,
    Creating,
    Attaching,
    Succeeded,
    Failed,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Succeeded | WorkflowState::Failed)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Checking => "CHECKING",
            WorkflowState::Creating => "CREATING",
            WorkflowState::Attaching => "ATTACHING",
            WorkflowState::Succeeded => "SUCCEEDED",
            WorkflowState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Found,
    Absent,
    Created,
    Skipped,
    Attached,
    Failed,
}

/// Narrative of one workflow run. Every run ends in exactly one terminal
/// state; `render` is the only output handed to the agent.
#[derive(Debug, Clone)]
pub struct ComplianceRun {
    workflow: Workflow,
    state: WorkflowState,
    outcomes: Vec<StepOutcome>,
    lines: Vec<String>,
}

impl ComplianceRun {
    fn new(workflow: Workflow) -> Self {
        Self {
            workflow,
            state: WorkflowState::Checking,
            outcomes: Vec::new(),
            lines: vec![workflow.banner().to_string(), "=".repeat(70), String::new()],
        }
    }

    fn enter(&mut self, state: WorkflowState, header: impl Into<String>) {
        log::debug!("{} workflow: {} -> {}", self.workflow.as_str(), self.state, state);
        if self.state != WorkflowState::Checking || state != WorkflowState::Checking {
            self.lines.push(String::new());
        }
        self.state = state;
        self.lines.push(header.into());
    }

    fn record(&mut self, outcome: StepOutcome, detail: impl Into<String>) {
        self.outcomes.push(outcome);
        self.lines.push(detail.into());
    }

    fn fail(mut self, summary: &str, details: impl AsRef<str>) -> Self {
        log::warn!("{} workflow failed: {}", self.workflow.as_str(), summary);
        self.outcomes.push(StepOutcome::Failed);
        self.state = WorkflowState::Failed;
        self.lines.push(format!("   ✗ {}", summary));
        self.lines.push(String::new());
        self.lines.push("=".repeat(70));
        self.lines.push("Error Details:".to_string());
        self.lines.push(details.as_ref().trim().to_string());
        self
    }

    fn succeed(mut self, resolution: &str, summary: &[String]) -> Self {
        self.state = WorkflowState::Succeeded;
        self.lines.push(String::new());
        self.lines.push("=".repeat(70));
        self.lines.push("✓ WORKFLOW COMPLETED".to_string());
        self.lines.push(String::new());
        self.lines.push(resolution.to_string());
        self.lines.push(String::new());
        self.lines.push("Summary:".to_string());
        self.lines.extend(summary.iter().map(|s| format!("   • {}", s)));
        self
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push_str(&format!("\n\nFinal state: {}", self.state));
        text
    }
}

fn require_inputs<'a>(resource_group: &'a str, resource_id: &'a str) -> Result<(&'a str, &'a str), OpsError> {
    let resource_group = resource_group.trim();
    if resource_group.is_empty() {
        return Err(OpsError::Validation(
            "Error: Resource group name is required".to_string(),
        ));
    }
    let resource_id = resource_id.trim();
    if resource_id.is_empty() {
        return Err(OpsError::Validation("Error: Resource ID is required".to_string()));
    }
    Ok((resource_group, resource_id))
}

/// The lookup outcome for a prerequisite type; unparseable output is an error
/// so it can never be mistaken for "absent".
async fn find_prerequisite(
    client: &OpsClient,
    resource_group: &str,
    resource_type: &str,
) -> Result<LookupOutcome, OpsError> {
    let lookup = lookup::check_resource(client, resource_group, resource_type).await?;
    lookup.parsed().cloned()
}

/// Creates a prerequisite through the dispatcher. `Err` carries the text to
/// surface as the failure details.
async fn create_prerequisite(
    client: &OpsClient,
    resource_group: &str,
    resource_type: &str,
    params: DeploymentParameters,
) -> Result<(), String> {
    match deploy::deploy_validated(client, resource_group, resource_type, params).await {
        Ok(DeployOutcome::Succeeded { text, .. }) => {
            log::debug!("Created {}: {}", resource_type, text);
            Ok(())
        }
        Ok(DeployOutcome::Failed(text)) => Err(text),
        Err(e) => Err(e.to_string()),
    }
}

fn attach_failed(output: &str) -> bool {
    ERROR_KEYWORDS.iter().any(|k| output.contains(k))
}

/// Ensures a network security perimeter exists in the resource group and
/// attaches the resource to it.
pub async fn attach_to_nsp(
    client: &OpsClient,
    resource_group: &str,
    nsp_name: Option<&str>,
    resource_id: &str,
) -> Result<ComplianceRun, OpsError> {
    let (resource_group, resource_id) = require_inputs(resource_group, resource_id)?;
    let preferred = nsp_name.map(str::trim).filter(|n| !n.is_empty());
    let mut run = ComplianceRun::new(Workflow::Nsp);

    run.enter(WorkflowState::Checking, "Step 1/3: Checking for existing NSP...");
    let existing = match find_prerequisite(client, resource_group, "nsp").await {
        Ok(outcome) => outcome,
        Err(e) => return Ok(run.fail("Could not determine whether an NSP exists", e.to_string())),
    };

    let nsp_name = if existing.count() == 0 {
        run.record(StepOutcome::Absent, "   → No NSP found in resource group");
        run.enter(WorkflowState::Creating, "Step 2/3: Creating NSP...");
        let name = preferred
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}-nsp", resource_group));
        let params: DeploymentParameters = [
            ("name", name.clone()),
            ("location", client.config().nsp_location.clone()),
        ]
        .into_iter()
        .collect();
        if let Err(details) = create_prerequisite(client, resource_group, "nsp", params).await {
            return Ok(run.fail("Failed to create NSP", details));
        }
        run.record(
            StepOutcome::Created,
            format!("   → NSP '{}' created successfully", name),
        );
        name
    } else {
        let Some(chosen) = lookup::choose(existing.resources(), preferred) else {
            return Ok(run.fail("NSP check returned invalid data", format!("{:?}", existing)));
        };
        run.record(
            StepOutcome::Found,
            format!("   → Found existing NSP: '{}'", chosen.name),
        );
        run.lines.push(String::new());
        run.record(
            StepOutcome::Skipped,
            "Step 2/3: Skipping NSP creation (already exists)",
        );
        chosen.name.clone()
    };

    run.enter(WorkflowState::Attaching, "Step 3/3: Attaching resource to NSP...");
    let output = match client
        .run_script(
            scripts::ATTACH_NSP,
            &[
                ("ResourceGroupName", resource_group.to_string()),
                ("NspName", nsp_name.clone()),
                ("ResourceId", resource_id.to_string()),
            ],
        )
        .await
    {
        Ok(output) => output,
        Err(e) => return Ok(run.fail("Attach script unavailable", e.to_string())),
    };
    if attach_failed(&output) {
        return Ok(run.fail("Failed to attach resource to NSP", output));
    }

    run.record(
        StepOutcome::Attached,
        format!("   → Resource attached to NSP '{}'", nsp_name),
    );
    Ok(run.succeed(
        "Network security compliance resolved.",
        &[
            format!("Resource Group: {}", resource_group),
            format!("NSP Name: {}", nsp_name),
            "Resource attached and secured".to_string(),
        ],
    ))
}

/// Last path segment of a resource id.
fn name_from_id(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// Ensures a Log Analytics workspace exists in the resource group and
/// configures the resource's diagnostic settings to send to it.
pub async fn attach_diagnostic_settings(
    client: &OpsClient,
    resource_group: &str,
    workspace_id: Option<&str>,
    resource_id: &str,
) -> Result<ComplianceRun, OpsError> {
    let (resource_group, resource_id) = require_inputs(resource_group, resource_id)?;
    let supplied_id = workspace_id.map(str::trim).filter(|w| !w.is_empty());
    let mut run = ComplianceRun::new(Workflow::Diagnostics);

    run.enter(
        WorkflowState::Checking,
        "Step 1/3: Checking for existing Log Analytics Workspace...",
    );
    let existing = match find_prerequisite(client, resource_group, "log-analytics").await {
        Ok(outcome) => outcome,
        Err(e) => {
            return Ok(run.fail(
                "Could not determine whether a Log Analytics Workspace exists",
                e.to_string(),
            ));
        }
    };

    let (workspace_name, workspace_id) = if existing.count() == 0 {
        run.record(StepOutcome::Absent, "   → No Log Analytics Workspace found");
        run.enter(
            WorkflowState::Creating,
            "Step 2/3: Creating Log Analytics Workspace...",
        );
        let name = format!("{}-law", resource_group);
        let params: DeploymentParameters = [
            ("workspaceName", name.clone()),
            ("location", client.config().workspace_default_region.clone()),
        ]
        .into_iter()
        .collect();
        if let Err(details) =
            create_prerequisite(client, resource_group, "log-analytics", params).await
        {
            return Ok(run.fail("Failed to create Log Analytics Workspace", details));
        }
        run.record(
            StepOutcome::Created,
            format!("   → Log Analytics Workspace '{}' created successfully", name),
        );

        let created = find_prerequisite(client, resource_group, "log-analytics")
            .await
            .ok()
            .and_then(|outcome| {
                lookup::choose(outcome.resources(), Some(&name)).and_then(|m| m.id.clone())
            });
        let Some(id) = created else {
            return Ok(run.fail(
                "Could not retrieve workspace ID after creation",
                format!("Workspace '{}' was created but could not be found again.", name),
            ));
        };
        (name, id)
    } else {
        let chosen = match supplied_id {
            Some(id) => Some((name_from_id(id).to_string(), id.to_string())),
            None => lookup::choose(existing.resources(), None)
                .and_then(|m| Some((m.name.clone(), m.id.clone()?))),
        };
        let Some((name, id)) = chosen else {
            return Ok(run.fail(
                "Log Analytics check returned invalid data",
                format!("{:?}", existing),
            ));
        };
        run.record(
            StepOutcome::Found,
            format!("   → Found existing Log Analytics Workspace: '{}'", name),
        );
        run.lines.push(String::new());
        run.record(
            StepOutcome::Skipped,
            "Step 2/3: Skipping workspace creation (already exists)",
        );
        (name, id)
    };

    run.enter(
        WorkflowState::Attaching,
        "Step 3/3: Configuring diagnostic settings...",
    );
    let output = match client
        .run_script(
            scripts::ATTACH_LOG_ANALYTICS,
            &[
                ("ResourceGroupName", resource_group.to_string()),
                ("WorkspaceId", workspace_id),
                ("ResourceId", resource_id.to_string()),
            ],
        )
        .await
    {
        Ok(output) => output,
        Err(e) => return Ok(run.fail("Attach script unavailable", e.to_string())),
    };
    if attach_failed(&output) {
        return Ok(run.fail("Failed to configure diagnostic settings", output));
    }

    run.record(
        StepOutcome::Attached,
        "   → Diagnostic settings configured successfully",
    );
    Ok(run.succeed(
        "Monitoring compliance resolved.",
        &[
            format!("Resource Group: {}", resource_group),
            format!("Log Analytics Workspace: {}", workspace_name),
            "Diagnostic settings enabled and monitoring active".to_string(),
        ],
    ))
}

/// Identifies exactly which workflow a confirmation would run.
///
/// Encoded as `<workflow>.<base64url(JSON)>` so it can be handed back
/// verbatim by an agent. It holds no secrets and no server-side state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumptionToken {
    pub workflow: Workflow,
    pub resource_group: String,
    pub resource_id: String,
    /// Preferred prerequisite: an NSP name or a workspace id
    #[serde(default)]
    pub target: Option<String>,
}

impl ResumptionToken {
    pub fn new(
        workflow: Workflow,
        resource_group: impl Into<String>,
        resource_id: impl Into<String>,
        target: Option<String>,
    ) -> Self {
        Self {
            workflow,
            resource_group: resource_group.into(),
            resource_id: resource_id.into(),
            target,
        }
    }

    pub fn encode(&self) -> String {
        let payload = serde_json::json!({
            "workflow": self.workflow.as_str(),
            "resource_group": self.resource_group,
            "resource_id": self.resource_id,
            "target": self.target,
        });
        format!(
            "{}.{}",
            self.workflow.as_str(),
            URL_SAFE_NO_PAD.encode(payload.to_string())
        )
    }

    pub fn decode(raw: &str) -> Result<Self, OpsError> {
        let invalid = || {
            OpsError::Validation(format!(
                "Invalid confirmation token '{}'. Use the token from the deployment response.",
                raw
            ))
        };

        let (prefix, payload) = raw.trim().split_once('.').ok_or_else(invalid)?;
        let workflow = Workflow::from_prefix(prefix).ok_or_else(invalid)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|_| invalid())?;
        let token: ResumptionToken = serde_json::from_slice(&bytes).map_err(|_| invalid())?;

        if token.workflow != workflow
            || token.resource_group.trim().is_empty()
            || token.resource_id.trim().is_empty()
        {
            return Err(invalid());
        }
        Ok(token)
    }
}

/// Second phase of a compliance prompt: runs the workflow named by the token,
/// or records that the caller declined.
pub async fn confirm(
    client: &OpsClient,
    token: &str,
    confirm: bool,
) -> Result<String, OpsError> {
    let token = ResumptionToken::decode(token)?;
    if !confirm {
        log::info!(
            "{} declined for {}",
            token.workflow.label(),
            token.resource_id
        );
        return Ok(format!(
            "Skipped {} for '{}'. The resource is not compliant until {} is run for it.",
            token.workflow.label(),
            token.resource_id,
            token.workflow.direct_tool()
        ));
    }

    let run = match token.workflow {
        Workflow::Nsp => {
            attach_to_nsp(
                client,
                &token.resource_group,
                token.target.as_deref(),
                &token.resource_id,
            )
            .await?
        }
        Workflow::Diagnostics => {
            attach_diagnostic_settings(
                client,
                &token.resource_group,
                token.target.as_deref(),
                &token.resource_id,
            )
            .await?
        }
    };
    Ok(run.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::runner::ProcessOutput;
    use crate::azure::testing::{Fixture, arg, failed, fixture, invokes, ok};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TARGET: &str = "/subscriptions/s/resourceGroups/rg-app/providers/Microsoft.KeyVault/vaults/kv1";

    fn compliance_fixture<F>(respond: F) -> Fixture
    where
        F: Fn(&str, &[String]) -> ProcessOutput + Send + Sync + 'static,
    {
        fixture(
            &[
                (
                    "templates/network-security-perimeter.bicep",
                    "param name string\nparam location string = 'global'\n",
                ),
                (
                    "templates/log-analytics.bicep",
                    "param workspaceName string\nparam location string\n",
                ),
            ],
            &[
                scripts::CHECK_RESOURCE,
                scripts::DEPLOY_BICEP,
                scripts::ATTACH_NSP,
                scripts::ATTACH_LOG_ANALYTICS,
            ],
            None,
            respond,
        )
    }

    #[tokio::test]
    async fn existing_nsp_skips_creation_and_prefers_exact_name() {
        let fx = compliance_fixture(|_, args| {
            if invokes(args, scripts::CHECK_RESOURCE) {
                ok("MULTIPLE RESOURCES FOUND\nCOUNT: 2\n- Name: nsp-a, ID: /nsp/a\n- Name: nsp-b, ID: /nsp/b")
            } else {
                ok("Association created")
            }
        });

        let run = attach_to_nsp(&fx.client, "rg-app", Some("nsp-b"), TARGET).await.unwrap();

        assert_eq!(run.state(), WorkflowState::Succeeded);
        assert_eq!(
            run.outcomes(),
            &[StepOutcome::Found, StepOutcome::Skipped, StepOutcome::Attached]
        );
        assert!(fx.calls_to(scripts::DEPLOY_BICEP).is_empty());
        let attach = &fx.calls_to(scripts::ATTACH_NSP)[0];
        assert_eq!(arg(attach, "-NspName"), Some("nsp-b"));
        assert_eq!(arg(attach, "-ResourceId"), Some(TARGET));

        let text = run.render();
        assert!(text.contains("Step 2/3: Skipping NSP creation (already exists)"));
        assert!(text.ends_with("Final state: SUCCEEDED"));
    }

    #[tokio::test]
    async fn unknown_preferred_name_falls_back_to_first_listed() {
        let fx = compliance_fixture(|_, args| {
            if invokes(args, scripts::CHECK_RESOURCE) {
                ok("MULTIPLE RESOURCES FOUND\n- Name: nsp-a, ID: /nsp/a\n- Name: nsp-b, ID: /nsp/b")
            } else {
                ok("done")
            }
        });

        attach_to_nsp(&fx.client, "rg-app", Some("nsp-z"), TARGET).await.unwrap();

        let attach = &fx.calls_to(scripts::ATTACH_NSP)[0];
        assert_eq!(arg(attach, "-NspName"), Some("nsp-a"));
    }

    #[tokio::test]
    async fn missing_nsp_is_created_with_deterministic_name() {
        let fx = compliance_fixture(|program, args| {
            if program == "az" {
                ok("/nsp/rg-app-nsp")
            } else if invokes(args, scripts::CHECK_RESOURCE) {
                ok("RESOURCE NOT FOUND")
            } else if invokes(args, scripts::DEPLOY_BICEP) {
                ok(r#"{"properties": {"provisioningState": "Succeeded"}}"#)
            } else {
                ok("attached")
            }
        });

        let run = attach_to_nsp(&fx.client, "rg-app", None, TARGET).await.unwrap();

        assert_eq!(run.state(), WorkflowState::Succeeded);
        assert_eq!(
            run.outcomes(),
            &[StepOutcome::Absent, StepOutcome::Created, StepOutcome::Attached]
        );
        let deploy = &fx.calls_to(scripts::DEPLOY_BICEP)[0];
        assert_eq!(arg(deploy, "-Parameters"), Some("location=global;name=rg-app-nsp"));
        let attach = &fx.calls_to(scripts::ATTACH_NSP)[0];
        assert_eq!(arg(attach, "-NspName"), Some("rg-app-nsp"));
        assert!(run.render().contains("   → NSP 'rg-app-nsp' created successfully"));
    }

    #[tokio::test]
    async fn create_failure_ends_failed_without_attaching() {
        let fx = compliance_fixture(|_, args| {
            if invokes(args, scripts::CHECK_RESOURCE) {
                ok("RESOURCE NOT FOUND")
            } else {
                ProcessOutput {
                    stdout: String::new(),
                    stderr: "(QuotaExceeded) limit reached".to_string(),
                    exit_code: Some(1),
                }
            }
        });

        let run = attach_to_nsp(&fx.client, "rg-app", None, TARGET).await.unwrap();

        assert_eq!(run.state(), WorkflowState::Failed);
        assert!(fx.calls_to(scripts::ATTACH_NSP).is_empty());
        let text = run.render();
        assert!(text.contains("✗ Failed to create NSP"));
        assert!(text.contains("QUOTA EXCEEDED"));
        assert!(text.ends_with("Final state: FAILED"));
    }

    #[tokio::test]
    async fn unparseable_lookup_never_creates() {
        let fx = compliance_fixture(|_, _| ok("Something unexpected happened"));

        let run = attach_to_nsp(&fx.client, "rg-app", None, TARGET).await.unwrap();

        assert_eq!(run.state(), WorkflowState::Failed);
        assert_eq!(fx.all_calls().len(), 1);
        assert!(run.render().contains("Something unexpected happened"));
    }

    #[tokio::test]
    async fn failed_lookup_command_never_creates() {
        let fx = compliance_fixture(|_, args| {
            if invokes(args, scripts::CHECK_RESOURCE) {
                failed("ERROR: (ResourceNotFound) The Resource group 'rg-app' could not be found.")
            } else {
                ok(r#"{"properties": {"provisioningState": "Succeeded"}}"#)
            }
        });

        let nsp = attach_to_nsp(&fx.client, "rg-app", None, TARGET).await.unwrap();
        let diagnostics = attach_diagnostic_settings(&fx.client, "rg-app", None, TARGET)
            .await
            .unwrap();

        for run in [&nsp, &diagnostics] {
            assert_eq!(run.state(), WorkflowState::Failed);
            assert_eq!(run.outcomes(), &[StepOutcome::Failed]);
            let text = run.render();
            assert!(text.contains("ResourceNotFound"));
            assert!(text.ends_with("Final state: FAILED"));
        }
        assert!(fx.calls_to(scripts::DEPLOY_BICEP).is_empty());
        assert!(fx.calls_to(scripts::ATTACH_NSP).is_empty());
        assert!(fx.calls_to(scripts::ATTACH_LOG_ANALYTICS).is_empty());
    }

    #[tokio::test]
    async fn workspace_create_failure_ends_failed_without_attaching() {
        let fx = compliance_fixture(|_, args| {
            if invokes(args, scripts::CHECK_RESOURCE) {
                ok("RESOURCE NOT FOUND")
            } else {
                failed("(QuotaExceeded) workspace limit reached")
            }
        });

        let run = attach_diagnostic_settings(&fx.client, "rg-app", None, TARGET)
            .await
            .unwrap();

        assert_eq!(run.state(), WorkflowState::Failed);
        assert_eq!(fx.calls_to(scripts::DEPLOY_BICEP).len(), 1);
        assert_eq!(fx.calls_to(scripts::CHECK_RESOURCE).len(), 1);
        assert!(fx.calls_to(scripts::ATTACH_LOG_ANALYTICS).is_empty());
        let text = run.render();
        assert!(text.contains("✗ Failed to create Log Analytics Workspace"));
        assert!(text.contains("QUOTA EXCEEDED"));
        assert!(text.ends_with("Final state: FAILED"));
    }

    #[tokio::test]
    async fn attach_output_with_error_keyword_fails() {
        let fx = compliance_fixture(|_, args| {
            if invokes(args, scripts::CHECK_RESOURCE) {
                ok("RESOURCE FOUND: nsp1\nRESOURCE ID: /nsp/1")
            } else {
                ok("Association Failed: resource type not supported")
            }
        });

        let run = attach_to_nsp(&fx.client, "rg-app", None, TARGET).await.unwrap();

        assert_eq!(run.state(), WorkflowState::Failed);
        assert_eq!(run.outcomes().last(), Some(&StepOutcome::Failed));
        let text = run.render();
        assert!(text.contains("✗ Failed to attach resource to NSP"));
        assert!(text.contains("Error Details:"));
    }

    #[tokio::test]
    async fn missing_attach_script_fails() {
        let fx = fixture(&[], &[scripts::CHECK_RESOURCE], None, |_, _| {
            ok("RESOURCE FOUND: nsp1\nRESOURCE ID: /nsp/1")
        });

        let run = attach_to_nsp(&fx.client, "rg-app", None, TARGET).await.unwrap();

        assert_eq!(run.state(), WorkflowState::Failed);
        assert!(run.render().contains("attach-nsp.ps1"));
    }

    #[tokio::test]
    async fn blank_inputs_are_rejected() {
        let fx = compliance_fixture(|_, _| ok(""));
        assert!(matches!(
            attach_to_nsp(&fx.client, " ", None, TARGET).await,
            Err(OpsError::Validation(_))
        ));
        assert!(matches!(
            attach_diagnostic_settings(&fx.client, "rg", None, "").await,
            Err(OpsError::Validation(_))
        ));
        assert!(fx.all_calls().is_empty());
    }

    #[tokio::test]
    async fn workspace_is_created_then_requeried_for_its_id() {
        let checks = Arc::new(AtomicUsize::new(0));
        let seen = checks.clone();
        let fx = compliance_fixture(move |program, args| {
            if program == "az" {
                ok("")
            } else if invokes(args, scripts::CHECK_RESOURCE) {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    ok("RESOURCE NOT FOUND")
                } else {
                    ok("RESOURCE FOUND: rg-app-law\nRESOURCE ID: /law/rg-app-law")
                }
            } else if invokes(args, scripts::DEPLOY_BICEP) {
                ok("provisioningState: Succeeded")
            } else {
                ok("diagnostic setting created")
            }
        });

        let run = attach_diagnostic_settings(&fx.client, "rg-app", None, TARGET)
            .await
            .unwrap();

        assert_eq!(run.state(), WorkflowState::Succeeded);
        assert_eq!(checks.load(Ordering::SeqCst), 2);
        let deploy = &fx.calls_to(scripts::DEPLOY_BICEP)[0];
        assert_eq!(
            arg(deploy, "-Parameters"),
            Some("location=eastus;workspaceName=rg-app-law")
        );
        let attach = &fx.calls_to(scripts::ATTACH_LOG_ANALYTICS)[0];
        assert_eq!(arg(attach, "-WorkspaceId"), Some("/law/rg-app-law"));
        assert!(run.render().contains("Log Analytics Workspace: rg-app-law"));
    }

    #[tokio::test]
    async fn supplied_workspace_id_wins_over_listing() {
        let fx = compliance_fixture(|_, args| {
            if invokes(args, scripts::CHECK_RESOURCE) {
                ok("RESOURCE FOUND: law-a\nRESOURCE ID: /law/law-a")
            } else {
                ok("ok")
            }
        });

        let run = attach_diagnostic_settings(&fx.client, "rg-app", Some("/x/y/law-central"), TARGET)
            .await
            .unwrap();

        assert_eq!(run.state(), WorkflowState::Succeeded);
        assert!(fx.calls_to(scripts::DEPLOY_BICEP).is_empty());
        let attach = &fx.calls_to(scripts::ATTACH_LOG_ANALYTICS)[0];
        assert_eq!(arg(attach, "-WorkspaceId"), Some("/x/y/law-central"));
        assert!(run.render().contains("Found existing Log Analytics Workspace: 'law-central'"));
    }

    #[test]
    fn token_encodes_workflow_and_target() {
        let token = ResumptionToken::new(Workflow::Diagnostics, "rg-app", TARGET, Some("/law/1".into()));
        let encoded = token.encode();

        assert!(encoded.starts_with("diagnostics."));
        assert_eq!(ResumptionToken::decode(&encoded).unwrap(), token);
    }

    #[test]
    fn malformed_tokens_are_validation_errors() {
        let nsp = ResumptionToken::new(Workflow::Nsp, "rg", TARGET, None).encode();
        let (_, payload) = nsp.split_once('.').unwrap();
        let mislabelled = format!("diagnostics.{}", payload);

        for raw in ["", "nsp", "nsp.!!!", "bogus.e30", "nsp.e30", mislabelled.as_str()] {
            assert!(
                matches!(ResumptionToken::decode(raw), Err(OpsError::Validation(_))),
                "token {:?}",
                raw
            );
        }
    }

    #[tokio::test]
    async fn declined_confirmation_runs_nothing() {
        let fx = compliance_fixture(|_, _| ok(""));
        let token = ResumptionToken::new(Workflow::Nsp, "rg-app", TARGET, None).encode();

        let text = confirm(&fx.client, &token, false).await.unwrap();

        assert!(text.starts_with("Skipped NSP attachment"));
        assert!(fx.all_calls().is_empty());
    }

    #[tokio::test]
    async fn confirmation_runs_the_named_workflow() {
        let fx = compliance_fixture(|_, args| {
            if invokes(args, scripts::CHECK_RESOURCE) {
                ok("RESOURCE FOUND: nsp1\nRESOURCE ID: /nsp/1")
            } else {
                ok("attached")
            }
        });
        let token = ResumptionToken::new(Workflow::Nsp, "rg-app", TARGET, None).encode();

        let text = confirm(&fx.client, &token, true).await.unwrap();

        assert!(text.contains("Network security compliance resolved."));
        assert_eq!(fx.calls_to(scripts::ATTACH_NSP).len(), 1);
    }
}
