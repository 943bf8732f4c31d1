use serde::{Deserialize, Serialize};

/// Key the host pipeline stores this plugin's transform data under.
pub const DEFAULT_PLUGIN_NAME: &str = "playwright-ct-core";

/// Field Playwright's browser runtime reads to tell an import reference apart.
pub const DEFAULT_TYPE_FIELD: &str = "__pw_type";

/// Plugin options, passed as JSON next to the plugin path in the SWC config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginConfig {
    pub plugin_name: String,
    /// Name of the tag field in injected `{ <field>: "importRef", id }` objects.
    pub type_field: String,
    /// Inject the global transform data registration into the module.
    pub emit_transform_data: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            plugin_name: DEFAULT_PLUGIN_NAME.to_string(),
            type_field: DEFAULT_TYPE_FIELD.to_string(),
            emit_transform_data: true,
        }
    }
}

impl PluginConfig {
    /// Parse the raw plugin config. A malformed config falls back to defaults
    /// rather than failing the compilation.
    pub fn from_json(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str(raw) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "invalid plugin config, using defaults");
                Self::default()
            }
        }
    }
}
