use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Caller-supplied template parameters, as strings, the way the deployment
/// script receives them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentParameters(BTreeMap<String, String>);

impl DeploymentParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strings are kept verbatim, numbers and booleans are stringified and
    /// nulls are dropped.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let map = values
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((key, value))
            })
            .collect();
        Self(map)
    }

    /// Parses a JSON object string. Anything other than an object is an error.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let values: BTreeMap<String, Value> = serde_json::from_str(raw)?;
        Ok(Self::from_values(values))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// True when the key holds a non-empty value.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `k1=v1;k2=v2`, the `-Parameters` format of the deployment script.
    pub fn to_script_argument(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DeploymentParameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// An existing resource discovered by a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMatch {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// What `azure_check_resource` returns to the agent.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub count: usize,
    pub resources: Vec<ResourceMatch>,
    pub message: String,
    pub requires_selection: bool,
    pub prompt: Option<String>,
    pub raw_output: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AutoDetected {
    pub location: String,
}

/// Parameter report for a deployable template.
#[derive(Debug, Clone, Serialize)]
pub struct BicepRequirements {
    pub required: Vec<String>,
    pub optional: Vec<String>,
    pub defaults: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_detected: Option<AutoDetected>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
