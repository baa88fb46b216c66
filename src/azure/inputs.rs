use crate::azure::client::OpsError;

const DEVOPS_HOST: &str = "https://dev.azure.com";

/// A trimmed, non-empty value, if there is one.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Turns a bare organization name into its `https://dev.azure.com/<org>` URL.
/// Anything already starting with `http` is kept, trimmed.
pub fn normalize_organization(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.to_lowercase().starts_with("http") {
        trimmed.to_string()
    } else {
        format!("{}/{}", DEVOPS_HOST, trimmed)
    }
}

/// Collects the inputs a request is still missing and renders them as a
/// "Please provide:" list under a title.
#[derive(Debug)]
pub struct RequiredInputs {
    title: String,
    missing: Vec<String>,
    footer: Option<String>,
}

impl RequiredInputs {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            missing: Vec::new(),
            footer: None,
        }
    }

    /// Records `description` when `value` is absent or blank.
    pub fn require(mut self, value: Option<&str>, description: &str) -> Self {
        if present(value).is_none() {
            self.missing.push(description.to_string());
        }
        self
    }

    /// Text appended after the list.
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn finish(self) -> Result<(), OpsError> {
        if self.is_complete() {
            return Ok(());
        }
        let list = self
            .missing
            .iter()
            .map(|m| format!("  - {}", m))
            .collect::<Vec<_>>()
            .join("\n");
        let mut text = format!("{}\n\nPlease provide:\n{}", self.title, list);
        if let Some(footer) = self.footer {
            text.push_str("\n\n");
            text.push_str(&footer);
        }
        Err(OpsError::Validation(text))
    }
}

/// Fails with a "Missing required parameters:" list naming every blank
/// input.
pub fn require_all(inputs: &[(Option<&str>, &str)]) -> Result<(), OpsError> {
    let missing: Vec<String> = inputs
        .iter()
        .filter(|(value, _)| present(*value).is_none())
        .map(|(_, description)| format!("  - {}", description))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(OpsError::Validation(format!(
            "Missing required parameters:\n{}",
            missing.join("\n")
        )))
    }
}
