//! SWC plugin that lets Playwright component tests mount Twig templates.
//!
//! Test files import things that cannot run in the test process: `.twig`
//! templates, images, stylesheets, fonts, and components only ever rendered in
//! the browser. The transform replaces those bindings with serializable import
//! references (`{ __pw_type: "importRef", id }`) and hands the matching
//! descriptors to the host, which resolves the ids again in the page.

use swc_core::{
    ecma::{ast::*, visit::VisitMutWith},
    plugin::{
        metadata::TransformPluginMetadataContextKind, plugin_transform,
        proxies::TransformPluginProgramMetadata,
    },
};

pub mod classify;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod rewrite;
pub mod runtime;
pub mod transform_data;

#[cfg(test)]
mod test_utils;

pub use classify::ComponentUsages;
pub use config::PluginConfig;
pub use descriptor::{ImportBinding, ImportDescriptor};
pub use error::MountError;
pub use rewrite::{ImportRefTransform, RewriteSession};
pub use transform_data::{ModuleRegistration, TransformDataSink, TransformDataStore};

/// Rewrite `module` in place and return its descriptors in collection order.
pub fn transform_module(module: &mut Module, filename: &str, config: &PluginConfig) -> Vec<ImportDescriptor> {
    let mut transform = ImportRefTransform::new(filename, config);
    module.visit_mut_with(&mut transform);
    transform.take_descriptors()
}

// -----------------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------------

#[plugin_transform]
pub fn process_transform(mut program: Program, metadata: TransformPluginProgramMetadata) -> Program {
    let config = PluginConfig::from_json(metadata.get_transform_plugin_config().as_deref());
    let filename = metadata
        .get_context(&TransformPluginMetadataContextKind::Filename)
        .unwrap_or_else(|| "unknown".to_string());

    // Scripts cannot import, nothing to rewrite.
    if let Program::Module(module) = &mut program {
        let descriptors = transform_module(module, &filename, &config);
        if config.emit_transform_data {
            ModuleRegistration::new(module).set_transform_data(&config.plugin_name, &filename, &descriptors);
        }
    }

    program
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ImportRef, MountBridge, RootElement, TemplateRegistry};
    use crate::test_utils::{parse_module, print_module, SPEC_FILE};
    use serde_json::{json, Value};

    #[test]
    fn icon_import_becomes_const_import_ref() {
        let (mut module, cm) = parse_module("import Icon from \"./icon.svg\";\nconst el = <Icon />;\n");
        let descriptors = transform_module(&mut module, SPEC_FILE, &PluginConfig::default());

        let out = print_module(&cm, &module);
        assert!(!out.contains("import Icon"));
        assert!(out.starts_with("const Icon = {"));
        assert!(out.contains("\"_repo_tests_icon_svg\""));
        assert_eq!(descriptors[0].id, "_repo_tests_icon_svg");
    }

    #[test]
    fn transform_data_and_bridge_share_ids() {
        let (mut module, _) = parse_module(
            r#"import { render } from "./card.twig";
test("card", async ({ mount }) => {
  await mount(render, { context: { title: "Hi" } });
});"#,
        );
        let config = PluginConfig::default();
        let descriptors = transform_module(&mut module, SPEC_FILE, &config);

        let mut store = TransformDataStore::new();
        store.set_transform_data(&config.plugin_name, SPEC_FILE, &descriptors);
        let descriptor = store.find(&config.plugin_name, "_repo_tests_card_twig_render").unwrap();
        assert_eq!(descriptor.import_source, "./card.twig");

        // The page loads the template the descriptor points at under the same id.
        let mut templates = TemplateRegistry::new();
        templates.register(ImportRef::new(descriptor.id.clone()), |ctx: &Value| {
            format!("<h1>{}</h1>", ctx["title"].as_str().unwrap_or_default())
        });
        let bridge = MountBridge::new(templates);

        let mut root = RootElement::new();
        bridge
            .mount_value(
                &json!({
                    "__pw_type": "object-component",
                    "type": { "__pw_type": "importRef", "id": descriptor.id },
                    "context": { "title": "Hi" },
                }),
                &mut root,
            )
            .unwrap();
        assert_eq!(root.inner_html(), "<h1>Hi</h1>");
    }

    #[test]
    fn module_without_refs_reports_nothing() {
        let (mut module, cm) = parse_module("import { expect } from \"@playwright/test\";\nexpect(1).toBe(1);\n");
        let before = print_module(&cm, &module);

        let descriptors = transform_module(&mut module, SPEC_FILE, &PluginConfig::default());

        assert!(descriptors.is_empty());
        assert_eq!(print_module(&cm, &module), before);
    }
}
