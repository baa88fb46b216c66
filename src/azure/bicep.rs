use crate::azure::catalog::ResourceCatalog;
use crate::azure::client::OpsError;
use crate::azure::models::DeploymentParameters;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static PARAM_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^param\s+(\w+)\s+[^=\n]+(?:=\s*(.+))?").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParameter {
    pub name: String,
    pub required: bool,
    /// Raw default expression as written in the template
    pub default: Option<String>,
}

/// Declared template parameters in declaration order. Names are unique; a
/// redeclaration replaces the earlier entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    params: Vec<TemplateParameter>,
}

impl ParameterSchema {
    fn insert(&mut self, param: TemplateParameter) {
        match self.params.iter_mut().find(|p| p.name == param.name) {
            Some(existing) => *existing = param,
            None => self.params.push(param),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TemplateParameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateParameter> {
        self.params.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn required_names(&self) -> Vec<String> {
        self.iter()
            .filter(|p| p.required)
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn optional_names(&self) -> Vec<String> {
        self.iter()
            .filter(|p| !p.required)
            .map(|p| p.name.clone())
            .collect()
    }
}

/// Extracts parameter declarations from template source. Lines that don't
/// look like a declaration are skipped.
pub fn parse_parameters(source: &str) -> ParameterSchema {
    let mut schema = ParameterSchema::default();
    for line in source.lines() {
        let line = line.trim();
        if !line.starts_with("param ") {
            continue;
        }
        let Some(caps) = PARAM_DECLARATION.captures(line) else {
            log::debug!("Skipping unparseable parameter line: {}", line);
            continue;
        };
        let default = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|d| !d.is_empty());
        schema.insert(TemplateParameter {
            name: caps[1].to_string(),
            required: default.is_none(),
            default,
        });
    }
    schema
}

/// Reads and parses a template. A missing or unreadable file yields an empty
/// schema.
pub fn introspect(template_path: &Path) -> ParameterSchema {
    match std::fs::read_to_string(template_path) {
        Ok(source) => parse_parameters(&source),
        Err(e) => {
            log::warn!(
                "Could not read template {}: {}",
                template_path.display(),
                e
            );
            ParameterSchema::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Required, non auto-calculated parameters without a value, in
    /// declaration order
    pub missing: Vec<String>,
    pub schema: ParameterSchema,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn message(&self) -> String {
        if self.is_ok() {
            "OK".to_string()
        } else {
            format!("Missing required parameters: {}", self.missing.join(", "))
        }
    }
}

pub fn unknown_type_message(catalog: &ResourceCatalog, resource_type: &str) -> String {
    format!(
        "Unknown resource_type '{}'. Valid: {}",
        resource_type,
        catalog.deployable_types().join(", ")
    )
}

/// Checks `supplied` against the template of `resource_type`.
///
/// Fails with `NotFound` for an unknown type or a missing template file;
/// otherwise reports which required parameters still lack a value.
pub fn validate_parameters(
    catalog: &ResourceCatalog,
    templates_dir: &Path,
    resource_type: &str,
    supplied: &DeploymentParameters,
) -> Result<ValidationReport, OpsError> {
    let Some(template) = catalog.template_for(resource_type) else {
        return Err(OpsError::NotFound(unknown_type_message(
            catalog,
            resource_type,
        )));
    };
    let path = templates_dir.join(template);
    if !path.is_file() {
        return Err(OpsError::NotFound(format!(
            "Template not found at {}",
            path.display()
        )));
    }

    let schema = introspect(&path);
    if schema.is_empty() {
        log::warn!(
            "Template {} declares no parameters; check the templates directory",
            path.display()
        );
    }

    let auto = catalog.auto_calculated(resource_type);
    let missing = schema
        .iter()
        .filter(|p| p.required && !auto.contains(&p.name.as_str()))
        .filter(|p| !supplied.has_value(&p.name))
        .map(|p| p.name.clone())
        .collect();

    Ok(ValidationReport { missing, schema })
}
