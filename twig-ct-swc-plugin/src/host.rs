use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

use crate::config::PluginConfig;

pub const CT_CORE_KEY: &str = "@playwright/experimental-ct-core";
pub const TEST_KEY: &str = "@playwright/test";
pub const DEFAULT_FRAMEWORK_PLUGIN: &str = "vite-plugin-twigjs-loader";

/// Bundler plugin the host instantiates (asynchronously, on its side) to load
/// `.twig` files as render functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkPlugin {
    pub module: String,
    pub export: String,
}

impl Default for FrameworkPlugin {
    fn default() -> Self {
        Self {
            module: DEFAULT_FRAMEWORK_PLUGIN.to_string(),
            export: "default".to_string(),
        }
    }
}

/// Everything the host needs to know to run Twig component tests.
#[derive(Debug, Clone)]
pub struct HostRegistration {
    /// Module installing the mount/unmount/update bridge in the page.
    pub register_source_file: PathBuf,
    pub framework_plugin: FrameworkPlugin,
    /// Compiled wasm of this transform.
    pub transform_plugin: PathBuf,
    pub plugin_config: PluginConfig,
}

impl HostRegistration {
    pub fn new(register_source_file: impl Into<PathBuf>, transform_plugin: impl Into<PathBuf>) -> Self {
        Self {
            register_source_file: register_source_file.into(),
            framework_plugin: FrameworkPlugin::default(),
            transform_plugin: transform_plugin.into(),
            plugin_config: PluginConfig::default(),
        }
    }
}

fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut().expect("slot holds an object")
}

/// Add this plugin's keys to a Playwright config, keeping everything else.
/// Applying it twice leaves a single transform plugin entry.
pub fn define_config(config: Value, registration: &HostRegistration) -> Value {
    let mut root = match config {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let ct_core = object_entry(&mut root, CT_CORE_KEY);
    ct_core.insert(
        "registerSourceFile".into(),
        Value::String(registration.register_source_file.to_string_lossy().into_owned()),
    );
    ct_core.insert(
        "frameworkPluginFactory".into(),
        json!(registration.framework_plugin),
    );

    let plugin_path = registration.transform_plugin.to_string_lossy().into_owned();
    let test = object_entry(&mut root, TEST_KEY);
    let plugins = test.entry("swcPlugins").or_insert_with(|| Value::Array(vec![]));
    if !plugins.is_array() {
        *plugins = Value::Array(vec![]);
    }
    if let Value::Array(entries) = plugins {
        entries.retain(|entry| entry.get(0).and_then(Value::as_str) != Some(plugin_path.as_str()));
        entries.push(json!([plugin_path, registration.plugin_config]));
    }

    tracing::debug!(plugin = %plugin_path, "registered twig component testing");
    Value::Object(root)
}
