use std::collections::HashMap;
use swc_core::{
    common::{SyntaxContext, DUMMY_SP},
    ecma::ast::*,
};

use crate::descriptor::ImportDescriptor;

/// Global object the injected registration writes into:
/// `globalThis.__pwTransformData[pluginName][filename] = [...]`.
pub const TRANSFORM_DATA_GLOBAL: &str = "__pwTransformData";

/// Per-plugin metadata store of the host build pipeline.
pub trait TransformDataSink {
    /// Replace whatever was recorded for `filename` before.
    fn set_transform_data(&mut self, plugin_name: &str, filename: &str, descriptors: &[ImportDescriptor]);
}

// -----------------------------------------------------------------------------
// In-process store
// -----------------------------------------------------------------------------

/// Transform data kept in memory, for hosts that drive the transform from Rust.
#[derive(Debug, Default, Clone)]
pub struct TransformDataStore {
    plugins: HashMap<String, HashMap<String, Vec<ImportDescriptor>>>,
}

impl TransformDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, plugin_name: &str, filename: &str) -> Option<&[ImportDescriptor]> {
        self.plugins
            .get(plugin_name)
            .and_then(|files| files.get(filename))
            .map(Vec::as_slice)
    }

    /// Look a descriptor up by id across all files of a plugin.
    pub fn find(&self, plugin_name: &str, id: &str) -> Option<&ImportDescriptor> {
        self.plugins
            .get(plugin_name)?
            .values()
            .flatten()
            .find(|d| d.id == id)
    }
}

impl TransformDataSink for TransformDataStore {
    fn set_transform_data(&mut self, plugin_name: &str, filename: &str, descriptors: &[ImportDescriptor]) {
        self.plugins
            .entry(plugin_name.to_string())
            .or_default()
            .insert(filename.to_string(), descriptors.to_vec());
    }
}

// -----------------------------------------------------------------------------
// Injected registration
// -----------------------------------------------------------------------------

/// Writes transform data into the module itself, for hosts that only see the
/// emitted code (the wasm plugin).
pub struct ModuleRegistration<'a> {
    module: &'a mut Module,
}

impl<'a> ModuleRegistration<'a> {
    pub fn new(module: &'a mut Module) -> Self {
        Self { module }
    }
}

impl<'a> TransformDataSink for ModuleRegistration<'a> {
    fn set_transform_data(&mut self, plugin_name: &str, filename: &str, descriptors: &[ImportDescriptor]) {
        let js = registration_source(plugin_name, filename, descriptors);
        self.module.body.insert(0, function_call_stmt(js));
    }
}

fn json_str(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"unknown\"".into())
}

fn registration_source(plugin_name: &str, filename: &str, descriptors: &[ImportDescriptor]) -> String {
    let data_json = serde_json::to_string(descriptors).unwrap_or_else(|_| "[]".into());
    format!(
        "try{{var g=(typeof globalThis!=='undefined'?globalThis:window);var d=g.{global}=g.{global}||{{}};var p=d[{plugin}]=d[{plugin}]||{{}};p[{file}]=JSON.parse({data});}}catch(_e){{}}",
        global = TRANSFORM_DATA_GLOBAL,
        plugin = json_str(plugin_name),
        file = json_str(filename),
        data = json_str(&data_json),
    )
}

/// `new Function("<js>")()`, which keeps the payload a single string literal.
fn function_call_stmt(js: String) -> ModuleItem {
    ModuleItem::Stmt(Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(Expr::Call(CallExpr {
            span: DUMMY_SP,
            callee: Callee::Expr(Box::new(Expr::New(NewExpr {
                span: DUMMY_SP,
                callee: Box::new(Expr::Ident(Ident::new("Function".into(), DUMMY_SP, SyntaxContext::empty()))),
                args: Some(vec![ExprOrSpread {
                    spread: None,
                    expr: Box::new(Expr::Lit(Lit::Str(Str {
                        span: DUMMY_SP,
                        value: js.into(),
                        raw: None,
                    }))),
                }]),
                type_args: None,
                ctxt: SyntaxContext::empty(),
            }))),
            args: vec![],
            type_args: None,
            ctxt: SyntaxContext::empty(),
        })),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{parse_module, print_module};

    fn descriptor(id: &str, remote: Option<&str>) -> ImportDescriptor {
        ImportDescriptor {
            id: id.into(),
            filename: "/repo/a.spec.tsx".into(),
            import_source: "./a.twig".into(),
            remote_name: remote.map(Into::into),
        }
    }

    #[test]
    fn store_replaces_data_per_file() {
        let mut store = TransformDataStore::new();
        store.set_transform_data("ct", "/repo/a.spec.tsx", &[descriptor("a", None), descriptor("a_b", Some("b"))]);
        assert_eq!(store.get("ct", "/repo/a.spec.tsx").map(<[_]>::len), Some(2));

        store.set_transform_data("ct", "/repo/a.spec.tsx", &[]);
        assert_eq!(store.get("ct", "/repo/a.spec.tsx"), Some(&[][..]));
        assert_eq!(store.get("other", "/repo/a.spec.tsx"), None);
    }

    #[test]
    fn store_finds_descriptors_by_id() {
        let mut store = TransformDataStore::new();
        store.set_transform_data("ct", "/repo/a.spec.tsx", &[descriptor("a", None)]);
        store.set_transform_data("ct", "/repo/b.spec.tsx", &[descriptor("b_render", Some("render"))]);

        let found = store.find("ct", "b_render").unwrap();
        assert_eq!(found.remote_name.as_deref(), Some("render"));
        assert!(store.find("ct", "missing").is_none());
    }

    #[test]
    fn registration_source_embeds_plugin_file_and_json() {
        let js = registration_source("playwright-ct-core", "/repo/a.spec.tsx", &[descriptor("a", None)]);

        assert!(js.contains(r#"d["playwright-ct-core"]"#));
        assert!(js.contains(r#"p["/repo/a.spec.tsx"]"#));
        assert!(js.contains(r#"JSON.parse("[{\"id\":\"a\",\"filename\":\"/repo/a.spec.tsx\",\"importSource\":\"./a.twig\"}]")"#));
        assert!(js.starts_with("try{"));
    }

    #[test]
    fn module_registration_is_prepended() {
        let (mut module, cm) = parse_module("import x from \"./x\";\nrun(x);");
        ModuleRegistration::new(&mut module).set_transform_data("ct", "/repo/a.spec.tsx", &[]);

        let out = print_module(&cm, &module);
        assert!(out.starts_with("new Function("));
        assert!(out.contains(TRANSFORM_DATA_GLOBAL));
        assert_eq!(module.body.len(), 3);
    }
}
