use serde::Deserialize;

/// Required string argument, trimmed. Blank values are rejected at
/// deserialization so the tool never sees them.
pub fn deserialize_non_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(serde::de::Error::custom("field cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Optional string argument. Agents often send `""` for "not given"; that is
/// treated the same as an absent field.
pub fn deserialize_blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Debug)]
    struct Args {
        #[serde(deserialize_with = "deserialize_non_empty_string")]
        resource_type: String,
        #[serde(default, deserialize_with = "deserialize_blank_as_none")]
        resource_group: Option<String>,
    }

    #[test]
    fn required_values_are_trimmed_and_blank_rejected() {
        let args: Args = serde_json::from_str(r#"{"resource_type": " key-vault "}"#).unwrap();
        assert_eq!(args.resource_type, "key-vault");
        assert_eq!(args.resource_group, None);

        let err = serde_json::from_str::<Args>(r#"{"resource_type": "  "}"#).unwrap_err();
        assert!(err.to_string().contains("field cannot be empty"));
    }

    #[test]
    fn blank_optional_values_become_none() {
        let args: Args =
            serde_json::from_str(r#"{"resource_type": "kv", "resource_group": " "}"#).unwrap();
        assert_eq!(args.resource_group, None);

        let args: Args =
            serde_json::from_str(r#"{"resource_type": "kv", "resource_group": null}"#).unwrap();
        assert_eq!(args.resource_group, None);

        let args: Args =
            serde_json::from_str(r#"{"resource_type": "kv", "resource_group": "rg-app "}"#).unwrap();
        assert_eq!(args.resource_group.as_deref(), Some("rg-app"));
    }
}
