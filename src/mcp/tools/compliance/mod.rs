// Compliance tools: perimeter membership and diagnostic settings
pub mod attach_diagnostic_settings;
pub mod attach_to_nsp;
pub mod confirm_compliance;

pub use attach_diagnostic_settings::{AttachDiagnosticSettingsArgs, attach_diagnostic_settings};
pub use attach_to_nsp::{AttachToNspArgs, attach_to_nsp};
pub use confirm_compliance::{ConfirmComplianceArgs, confirm_compliance};
