use crate::azure::catalog::ResourceCatalog;
use crate::azure::client::{OpsClient, OpsError};
use crate::azure::models::{CheckResult, ResourceMatch};
use crate::azure::scripts;
use once_cell::sync::Lazy;
use regex::Regex;

static FOUND_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"RESOURCE FOUND:\s*(.+)").unwrap());
static FOUND_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"RESOURCE ID:\s*(.+)").unwrap());
static COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"COUNT:\s*(\d+)").unwrap());
static LIST_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"Name:\s*([^,]+)").unwrap());
static LIST_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"ID:\s*(.+)").unwrap());

const NOT_FOUND_MARKER: &str = "RESOURCE NOT FOUND";
const MULTIPLE_MARKER: &str = "MULTIPLE RESOURCES FOUND";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    NotFound,
    Single(ResourceMatch),
    /// Listing order is preserved, duplicates by name removed.
    Multiple {
        count: usize,
        resources: Vec<ResourceMatch>,
    },
    /// Output matched no known shape; carries the raw text.
    Unparsed(String),
    /// The check command itself failed; carries the rendered output.
    CommandFailed(String),
}

impl LookupOutcome {
    pub fn count(&self) -> usize {
        match self {
            LookupOutcome::NotFound
            | LookupOutcome::Unparsed(_)
            | LookupOutcome::CommandFailed(_) => 0,
            LookupOutcome::Single(_) => 1,
            LookupOutcome::Multiple { count, .. } => *count,
        }
    }

    pub fn resources(&self) -> &[ResourceMatch] {
        match self {
            LookupOutcome::Single(m) => std::slice::from_ref(m),
            LookupOutcome::Multiple { resources, .. } => resources,
            _ => &[],
        }
    }
}

/// One known output shape of the check-resource script.
pub trait OutputShapeParser: Sync {
    fn shape(&self) -> &'static str;

    /// `None` when the output is not of this shape.
    fn parse(&self, output: &str) -> Option<LookupOutcome>;
}

pub struct NotFoundShape;

impl OutputShapeParser for NotFoundShape {
    fn shape(&self) -> &'static str {
        "not-found"
    }

    fn parse(&self, output: &str) -> Option<LookupOutcome> {
        output
            .contains(NOT_FOUND_MARKER)
            .then_some(LookupOutcome::NotFound)
    }
}

pub struct MultipleShape;

impl OutputShapeParser for MultipleShape {
    fn shape(&self) -> &'static str {
        "multiple"
    }

    fn parse(&self, output: &str) -> Option<LookupOutcome> {
        if !output.contains(MULTIPLE_MARKER) {
            return None;
        }

        let mut resources: Vec<ResourceMatch> = Vec::new();
        for line in output.lines() {
            let line = line.trim();
            if !line.starts_with("- Name:") {
                continue;
            }
            let Some(name) = LIST_NAME.captures(line).map(|c| c[1].trim().to_string()) else {
                continue;
            };
            if resources.iter().any(|r| r.name == name) {
                continue;
            }
            let id = LIST_ID.captures(line).map(|c| c[1].trim().to_string());
            resources.push(ResourceMatch { name, id });
        }

        if resources.is_empty() {
            return Some(LookupOutcome::Unparsed(output.to_string()));
        }

        // The listed entries are authoritative; the script's own count may
        // include duplicates or disagree with the list.
        let count = resources.len();
        let reported = COUNT
            .captures(output)
            .and_then(|c| c[1].parse::<usize>().ok());
        if let Some(reported) = reported.filter(|r| *r != count) {
            log::debug!("COUNT line says {}, parsed {} entries", reported, count);
        }
        Some(LookupOutcome::Multiple { count, resources })
    }
}

pub struct SingleShape;

impl OutputShapeParser for SingleShape {
    fn shape(&self) -> &'static str {
        "single"
    }

    fn parse(&self, output: &str) -> Option<LookupOutcome> {
        let name = FOUND_NAME.captures(output)?[1].trim().to_string();
        let id = FOUND_ID
            .captures(output)
            .map(|c| c[1].trim().to_string());
        Some(LookupOutcome::Single(ResourceMatch { name, id }))
    }
}

// Tried in order; the first shape that matches wins.
const SHAPES: &[&dyn OutputShapeParser] = &[&NotFoundShape, &MultipleShape, &SingleShape];

/// Classifies check-resource output into exactly one outcome.
pub fn classify(output: &str) -> LookupOutcome {
    for parser in SHAPES {
        if let Some(outcome) = parser.parse(output) {
            log::debug!("Lookup output classified as {}", parser.shape());
            return outcome;
        }
    }
    LookupOutcome::Unparsed(output.to_string())
}

/// Picks a match: the exact name when one is preferred and present,
/// otherwise the first listed.
pub fn choose<'a>(
    resources: &'a [ResourceMatch],
    preferred: Option<&str>,
) -> Option<&'a ResourceMatch> {
    preferred
        .and_then(|name| resources.iter().find(|r| r.name == name))
        .or_else(|| resources.first())
}

#[derive(Debug, Clone)]
pub struct Lookup {
    pub resource_group: String,
    pub resource_type: String,
    pub outcome: LookupOutcome,
}

impl Lookup {
    pub fn to_check_result(&self) -> CheckResult {
        let (message, raw_output) = match &self.outcome {
            LookupOutcome::NotFound => (
                format!(
                    "No {} found in resource group '{}'",
                    self.resource_type, self.resource_group
                ),
                None,
            ),
            LookupOutcome::Unparsed(raw) => (
                format!(
                    "Could not parse {} information from output",
                    self.resource_type
                ),
                Some(raw.clone()),
            ),
            LookupOutcome::CommandFailed(text) => (
                format!(
                    "Checking for {} in '{}' failed",
                    self.resource_type, self.resource_group
                ),
                Some(text.clone()),
            ),
            outcome => (
                format!(
                    "Found {} {} resource(s) in '{}'",
                    outcome.count(),
                    self.resource_type,
                    self.resource_group
                ),
                None,
            ),
        };

        let requires_selection = self.outcome.count() > 1;
        CheckResult {
            count: self.outcome.count(),
            resources: self.outcome.resources().to_vec(),
            message,
            requires_selection,
            prompt: requires_selection
                .then(|| "Multiple resources detected. Please specify which one to use.".to_string()),
            raw_output,
        }
    }

    /// The outcome, or `ParseAmbiguity` / `ExternalCommand` carrying the
    /// output.
    pub fn parsed(&self) -> Result<&LookupOutcome, OpsError> {
        match &self.outcome {
            LookupOutcome::Unparsed(raw) => Err(OpsError::ParseAmbiguity(format!(
                "Could not parse {} information from output:\n{}",
                self.resource_type, raw
            ))),
            LookupOutcome::CommandFailed(text) => Err(OpsError::ExternalCommand(format!(
                "Checking for {} in '{}' failed:\n{}",
                self.resource_type, self.resource_group, text
            ))),
            outcome => Ok(outcome),
        }
    }
}

/// Runs the check-resource script for a resource type in a resource group.
pub async fn check_resource(
    client: &OpsClient,
    resource_group: &str,
    resource_type: &str,
) -> Result<Lookup, OpsError> {
    let resource_group = resource_group.trim();
    if resource_group.is_empty() {
        return Err(OpsError::Validation(
            "Resource group name is required".to_string(),
        ));
    }

    let resource_type = ResourceCatalog::normalize_lookup_type(resource_type);
    let Some(provider) = client.catalog().provider_for(&resource_type) else {
        return Err(OpsError::NotFound(format!(
            "Invalid resource_type. Supported: {}",
            client.catalog().lookup_types().join(", ")
        )));
    };

    let execution = client
        .run_script_detailed(
            scripts::CHECK_RESOURCE,
            &[
                ("ResourceGroupName", resource_group.to_string()),
                ("ResourceType", resource_type.clone()),
                ("ProviderType", provider.to_string()),
            ],
        )
        .await?;

    // Only a clean run is classified. The rendered text of a failed run
    // carries catalogue banners that read like the output shapes.
    let outcome = match &execution.output {
        Some(output) if output.success() => classify(&output.stdout),
        _ => LookupOutcome::CommandFailed(execution.text),
    };

    Ok(Lookup {
        resource_group: resource_group.to_string(),
        resource_type,
        outcome,
    })
}
