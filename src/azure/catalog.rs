/// Static knowledge about one resource-type key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTypeDescriptor {
    pub key: &'static str,
    /// Bicep template, relative to the templates directory
    pub template: Option<&'static str>,
    /// ARM provider type used for lookups
    pub provider: Option<&'static str>,
    /// Should be attached to a network security perimeter after creation
    pub nsp_required: bool,
    /// Should get diagnostic settings after creation
    pub diagnostics_required: bool,
}

const TEMPLATES: &[(&str, &str)] = &[
    ("storage-account", "templates/storage-account.bicep"),
    ("key-vault", "templates/azure-key-vaults.bicep"),
    ("openai", "templates/azure-openai.bicep"),
    ("ai-search", "templates/ai-search.bicep"),
    ("ai-foundry", "templates/ai-foundry.bicep"),
    ("cosmos-db", "templates/cosmos-db.bicep"),
    ("log-analytics", "templates/log-analytics.bicep"),
    ("uami", "templates/user-assigned-managed-identity.bicep"),
    (
        "user-assigned-managed-identity",
        "templates/user-assigned-managed-identity.bicep",
    ),
    ("nsp", "templates/network-security-perimeter.bicep"),
    (
        "network-security-perimeter",
        "templates/network-security-perimeter.bicep",
    ),
    ("fabric-capacity", "templates/fabric-capacity.bicep"),
    ("container-registry", "templates/container-registry.bicep"),
    ("acr", "templates/container-registry.bicep"),
    ("function-app", "templates/function-app.bicep"),
    ("public-ip", "templates/public-ip.bicep"),
    ("pip", "templates/public-ip.bicep"),
    ("data-factory", "templates/azure-data-factory.bicep"),
    ("azure-data-factory", "templates/azure-data-factory.bicep"),
    ("adf", "templates/azure-data-factory.bicep"),
    ("synapse", "templates/azure-synapse-analytics.bicep"),
    (
        "azure-synapse-analytics",
        "templates/azure-synapse-analytics.bicep",
    ),
    ("nsg", "templates/network-security-group.bicep"),
    (
        "network-security-group",
        "templates/network-security-group.bicep",
    ),
    ("vnet", "templates/virtual-network.bicep"),
    ("virtual-network", "templates/virtual-network.bicep"),
    ("subnet", "templates/subnet.bicep"),
    ("private-endpoint", "templates/private-endpoint.bicep"),
    ("pe", "templates/private-endpoint.bicep"),
    ("logic-app", "templates/logic-app.bicep"),
];

const PROVIDERS: &[(&str, &str)] = &[
    ("nsp", "Microsoft.Network/networkSecurityPerimeters"),
    (
        "network-security-perimeter",
        "Microsoft.Network/networkSecurityPerimeters",
    ),
    ("log-analytics", "Microsoft.OperationalInsights/workspaces"),
    ("law", "Microsoft.OperationalInsights/workspaces"),
    ("storage-account", "Microsoft.Storage/storageAccounts"),
    ("storage", "Microsoft.Storage/storageAccounts"),
    ("key-vault", "Microsoft.KeyVault/vaults"),
    ("kv", "Microsoft.KeyVault/vaults"),
    ("openai", "Microsoft.CognitiveServices/accounts"),
    ("azure-openai", "Microsoft.CognitiveServices/accounts"),
    ("ai-search", "Microsoft.Search/searchServices"),
    ("ai-foundry", "Microsoft.CognitiveServices/accounts"),
    ("ai-services", "Microsoft.CognitiveServices/accounts"),
    ("ai-hub", "Microsoft.MachineLearningServices/workspaces"),
    ("ai-project", "Microsoft.MachineLearningServices/workspaces"),
    ("cosmos-db", "Microsoft.DocumentDB/databaseAccounts"),
    ("cosmosdb", "Microsoft.DocumentDB/databaseAccounts"),
    ("fabric-capacity", "Microsoft.Fabric/capacities"),
    ("fabric", "Microsoft.Fabric/capacities"),
    ("uami", "Microsoft.ManagedIdentity/userAssignedIdentities"),
    (
        "user-assigned-managed-identity",
        "Microsoft.ManagedIdentity/userAssignedIdentities",
    ),
    ("container-registry", "Microsoft.ContainerRegistry/registries"),
    ("acr", "Microsoft.ContainerRegistry/registries"),
    ("logic-app", "Microsoft.Logic/workflows"),
    ("function-app", "Microsoft.Web/sites"),
    ("app-service", "Microsoft.Web/sites"),
    ("synapse", "Microsoft.Synapse/workspaces"),
    ("azure-synapse-analytics", "Microsoft.Synapse/workspaces"),
    ("data-factory", "Microsoft.DataFactory/factories"),
    ("azure-data-factory", "Microsoft.DataFactory/factories"),
    ("adf", "Microsoft.DataFactory/factories"),
    ("public-ip", "Microsoft.Network/publicIPAddresses"),
    ("pip", "Microsoft.Network/publicIPAddresses"),
    ("front-door", "Microsoft.Network/frontDoors"),
    ("nsg", "Microsoft.Network/networkSecurityGroups"),
    (
        "network-security-group",
        "Microsoft.Network/networkSecurityGroups",
    ),
    ("vnet", "Microsoft.Network/virtualNetworks"),
    ("virtual-network", "Microsoft.Network/virtualNetworks"),
    ("subnet", "Microsoft.Network/virtualNetworks/subnets"),
    ("private-endpoint", "Microsoft.Network/privateEndpoints"),
    ("pe", "Microsoft.Network/privateEndpoints"),
    ("virtual-machine", "Microsoft.Compute/virtualMachines"),
    ("vm", "Microsoft.Compute/virtualMachines"),
    ("redis-cache", "Microsoft.Cache/redis"),
    ("redis-enterprise", "Microsoft.Cache/redisEnterprise"),
];

const NSP_MANDATORY: &[&str] = &["storage-account", "key-vault", "cosmos-db", "sql-db"];

const DIAGNOSTICS_MANDATORY: &[&str] = &[
    "logic-app",
    "function-app",
    "app-service",
    "key-vault",
    "kv",
    "openai",
    "azure-openai",
    "synapse",
    "azure-synapse-analytics",
    "data-factory",
    "azure-data-factory",
    "adf",
    "ai-hub",
    "ai-project",
    "ai-foundry",
    "ai-services",
    "ai-search",
    "front-door",
    "virtual-machine",
    "vm",
    "redis-cache",
    "redis-enterprise",
    "container-registry",
    "acr",
];

/// Parameters the dispatcher fills in itself, so callers never have to.
const AUTO_CALCULATED: &[(&str, &[&str])] = &[
    ("subnet", &["subnetStartingAddress"]),
    ("fabric-capacity", &["location"]),
];

/// Read-only resource-type tables, built once at startup and shared.
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    descriptors: Vec<ResourceTypeDescriptor>,
}

impl ResourceCatalog {
    pub fn builtin() -> Self {
        let mut keys: Vec<&'static str> = Vec::new();
        let all_keys = TEMPLATES
            .iter()
            .map(|(k, _)| *k)
            .chain(PROVIDERS.iter().map(|(k, _)| *k))
            .chain(NSP_MANDATORY.iter().copied())
            .chain(DIAGNOSTICS_MANDATORY.iter().copied());
        for key in all_keys {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let descriptors = keys
            .into_iter()
            .map(|key| ResourceTypeDescriptor {
                key,
                template: find(TEMPLATES, key),
                provider: find(PROVIDERS, key),
                nsp_required: NSP_MANDATORY.contains(&key),
                diagnostics_required: DIAGNOSTICS_MANDATORY.contains(&key),
            })
            .collect();

        Self { descriptors }
    }

    pub fn get(&self, key: &str) -> Option<&ResourceTypeDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    pub fn descriptors(&self) -> &[ResourceTypeDescriptor] {
        &self.descriptors
    }

    pub fn template_for(&self, key: &str) -> Option<&'static str> {
        self.get(key).and_then(|d| d.template)
    }

    pub fn provider_for(&self, key: &str) -> Option<&'static str> {
        self.get(key).and_then(|d| d.provider)
    }

    pub fn requires_nsp(&self, key: &str) -> bool {
        self.get(key).is_some_and(|d| d.nsp_required)
    }

    pub fn requires_diagnostics(&self, key: &str) -> bool {
        self.get(key).is_some_and(|d| d.diagnostics_required)
    }

    /// Keys that can be deployed from a template, in declaration order.
    pub fn deployable_types(&self) -> Vec<&'static str> {
        self.descriptors
            .iter()
            .filter(|d| d.template.is_some())
            .map(|d| d.key)
            .collect()
    }

    /// Keys that can be looked up by provider type, sorted.
    pub fn lookup_types(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self
            .descriptors
            .iter()
            .filter(|d| d.provider.is_some())
            .map(|d| d.key)
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn auto_calculated(&self, key: &str) -> &'static [&'static str] {
        AUTO_CALCULATED
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, params)| *params)
            .unwrap_or(&[])
    }

    /// Maps free-form lookup type names onto catalog keys.
    pub fn normalize_lookup_type(raw: &str) -> String {
        let lowered = raw.trim().to_lowercase();
        if lowered.contains("network") && lowered.contains("security") && lowered.contains("perimeter")
        {
            return "nsp".to_string();
        }
        lowered
    }
}

fn find(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}
