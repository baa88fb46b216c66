/// A platform error code the runner recognises in command output.
#[derive(Debug, PartialEq, Eq)]
pub struct KnownError {
    pub code: &'static str,
    pub title: &'static str,
    pub cause: &'static str,
    pub remediation: &'static [&'static str],
}

// Order matters: the first code found in the output wins.
pub const KNOWN_ERRORS: &[KnownError] = &[
    KnownError {
        code: "AuthorizationFailed",
        title: "AUTHORIZATION ERROR",
        cause: "You don't have sufficient permissions to perform this action.",
        remediation: &[
            "Run 'az login' to refresh your credentials",
            "Verify you have 'Contributor' or 'Owner' role on the resource group",
            "Check if your token has expired (tokens expire after ~1 hour)",
            "Contact your Azure admin to grant required permissions",
        ],
    },
    KnownError {
        code: "ResourceNotFound",
        title: "RESOURCE NOT FOUND",
        cause: "The specified resource does not exist.",
        remediation: &[
            "Verify the resource name and resource group are correct",
            "Check if the resource was deleted or moved",
            "Ensure you're using the correct subscription",
        ],
    },
    KnownError {
        code: "SubscriptionNotFound",
        title: "SUBSCRIPTION NOT FOUND",
        cause: "The specified subscription is not accessible.",
        remediation: &[
            "Run 'az account list' to see available subscriptions",
            "Run 'az account set --subscription <id>' to switch subscriptions",
            "Verify you have access to the subscription",
        ],
    },
    KnownError {
        code: "InvalidResourceType",
        title: "INVALID RESOURCE TYPE",
        cause: "The resource type specified is not valid.",
        remediation: &[
            "Check the resource type spelling",
            "Verify the API version supports this resource type",
        ],
    },
    KnownError {
        code: "QuotaExceeded",
        title: "QUOTA EXCEEDED",
        cause: "You've reached the limit for this resource type in the region.",
        remediation: &[
            "Try a different Azure region",
            "Request a quota increase via Azure portal",
            "Delete unused resources to free up quota",
        ],
    },
    KnownError {
        code: "Conflict",
        title: "RESOURCE CONFLICT",
        cause: "A resource with this name already exists or is in a conflicting state.",
        remediation: &[
            "Use a different resource name",
            "Wait for any pending operations to complete",
            "Delete the existing resource if it's no longer needed",
        ],
    },
    KnownError {
        code: "InvalidParameter",
        title: "INVALID PARAMETER",
        cause: "One or more parameters are invalid.",
        remediation: &[
            "Review the parameter values for typos",
            "Check parameter constraints (length, allowed values, format)",
        ],
    },
    KnownError {
        code: "PrivateEndpointCannotBeCreatedInSubnet",
        title: "PRIVATE ENDPOINT SUBNET ERROR",
        cause: "The subnet cannot host private endpoints.",
        remediation: &[
            "Ensure 'privateEndpointNetworkPolicies' is set to 'Disabled' on the subnet",
            "Use a different subnet designated for private endpoints",
        ],
    },
];

pub fn detect(output: &str) -> Option<&'static KnownError> {
    KNOWN_ERRORS.iter().find(|e| output.contains(e.code))
}

impl KnownError {
    /// Renders the boxed cause/remediation block appended to command output.
    pub fn render(&self) -> String {
        let rule = "═".repeat(78);
        let solutions = self
            .remediation
            .iter()
            .map(|s| format!("  • {}", s))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "\n╔{rule}╗\n║ ⚠️ {title} ({code})\n╠{rule}╣\n║ Cause: {cause}\n║\n║ Solutions:\n{solutions}\n╚{rule}╝\n",
            rule = rule,
            title = self.title,
            code = self.code,
            cause = self.cause,
            solutions = solutions,
        )
    }
}
