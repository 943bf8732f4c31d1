use indexmap::IndexMap;
use swc_core::{
    common::{SyntaxContext, DUMMY_SP},
    ecma::{
        ast::*,
        visit::{VisitMut, VisitMutWith},
    },
};

use crate::{
    classify::ComponentUsages,
    config::PluginConfig,
    descriptor::{import_ref_object, is_artifact_source, property_ref_object, ImportBinding, ImportDescriptor},
};

// -----------------------------------------------------------------------------
// Transform
// -----------------------------------------------------------------------------

/// Replaces artifact imports and component-like imports with import references.
///
/// Every module visited gets a fresh [`RewriteSession`]; the descriptors of the
/// last visited module are kept for the host pipeline.
pub struct ImportRefTransform {
    filename: String,
    type_field: String,
    descriptors: Vec<ImportDescriptor>,
}

impl ImportRefTransform {
    pub fn new(filename: impl Into<String>, config: &PluginConfig) -> Self {
        Self {
            filename: filename.into(),
            type_field: config.type_field.clone(),
            descriptors: vec![],
        }
    }

    pub fn descriptors(&self) -> &[ImportDescriptor] {
        &self.descriptors
    }

    pub fn take_descriptors(&mut self) -> Vec<ImportDescriptor> {
        std::mem::take(&mut self.descriptors)
    }
}

impl VisitMut for ImportRefTransform {
    fn visit_mut_module(&mut self, m: &mut Module) {
        let usages = ComponentUsages::collect(m);
        let session = RewriteSession::new(&self.filename, &self.type_field, usages);
        self.descriptors = session.rewrite(m);
    }
}

// -----------------------------------------------------------------------------
// Per-file session
// -----------------------------------------------------------------------------

struct RefBinding {
    /// Original local binding, syntax context included, so the injected
    /// declaration binds the same identifier the rest of the module refers to.
    local: Ident,
    descriptor: ImportDescriptor,
}

/// Scratch state of one file's rewrite. Nothing here outlives the file.
pub struct RewriteSession<'a> {
    filename: &'a str,
    type_field: &'a str,
    usages: ComponentUsages,
    refs: IndexMap<String, RefBinding>,
}

impl<'a> RewriteSession<'a> {
    pub fn new(filename: &'a str, type_field: &'a str, usages: ComponentUsages) -> Self {
        Self {
            filename,
            type_field,
            usages,
            refs: IndexMap::new(),
        }
    }

    /// Rewrite `m` in place and return the descriptors in collection order.
    pub fn rewrite(mut self, m: &mut Module) -> Vec<ImportDescriptor> {
        m.body.retain(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => !self.convert_import(decl),
            _ => true,
        });
        if self.refs.is_empty() {
            return vec![];
        }

        m.visit_mut_with(&mut PropertyRefRewriter { refs: &self.refs });
        self.inject_declarations(m);

        self.refs.into_values().map(|r| r.descriptor).collect()
    }

    /// Record descriptors for the convertible specifiers of `decl`. Returns
    /// whether the whole statement should be dropped.
    fn convert_import(&mut self, decl: &ImportDecl) -> bool {
        if decl.type_only {
            return false;
        }

        let source = decl.src.value.to_string();
        if is_artifact_source(&source) {
            for specifier in &decl.specifiers {
                if let Some(binding) = ImportBinding::from_specifier(decl, specifier, self.filename) {
                    self.record(local_ident(specifier), binding);
                }
            }
            tracing::debug!(file = self.filename, source = %source, "artifact import replaced");
            return true;
        }

        let mut converted = 0;
        for specifier in &decl.specifiers {
            let Some(binding) = ImportBinding::from_specifier(decl, specifier, self.filename) else {
                continue;
            };
            if self.usages.is_component(&binding.local_name) {
                self.record(local_ident(specifier), binding);
                converted += 1;
            }
        }
        if converted > 0 {
            tracing::debug!(file = self.filename, source = %source, converted, "component import replaced");
        }
        converted > 0 && converted == decl.specifiers.len()
    }

    fn record(&mut self, local: &Ident, binding: ImportBinding) {
        // Re-importing a local keeps its first position, the latest descriptor wins.
        self.refs.insert(
            binding.local_name.clone(),
            RefBinding {
                local: local.clone(),
                descriptor: binding.descriptor(),
            },
        );
    }

    /// `const <local> = { <type_field>: "importRef", id }` for every ref, right
    /// after the last surviving import, or at the top of the module.
    fn inject_declarations(&self, m: &mut Module) {
        let at = m
            .body
            .iter()
            .rposition(|item| matches!(item, ModuleItem::ModuleDecl(ModuleDecl::Import(_))))
            .map(|i| i + 1)
            .unwrap_or(0);
        let declarations: Vec<ModuleItem> = self.refs.values().map(|r| self.declaration(r)).collect();
        m.body.splice(at..at, declarations);
    }

    fn declaration(&self, r: &RefBinding) -> ModuleItem {
        ModuleItem::Stmt(Stmt::Decl(Decl::Var(Box::new(VarDecl {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            kind: VarDeclKind::Const,
            declare: false,
            decls: vec![VarDeclarator {
                span: DUMMY_SP,
                name: Pat::Ident(BindingIdent {
                    id: r.local.clone(),
                    type_ann: None,
                }),
                init: Some(Box::new(import_ref_object(self.type_field, &r.descriptor.id))),
                definite: false,
            }],
        }))))
    }
}

fn local_ident(specifier: &ImportSpecifier) -> &Ident {
    match specifier {
        ImportSpecifier::Default(s) => &s.local,
        ImportSpecifier::Named(s) => &s.local,
        ImportSpecifier::Namespace(s) => &s.local,
    }
}

// -----------------------------------------------------------------------------
// Member access
// -----------------------------------------------------------------------------

/// `Icons.Close` -> `{ ...Icons, property: "Close" }` for import-ref bindings.
/// Only `ident.ident` is handled; computed and private members pass through.
struct PropertyRefRewriter<'a> {
    refs: &'a IndexMap<String, RefBinding>,
}

impl<'a> VisitMut for PropertyRefRewriter<'a> {
    fn visit_mut_expr(&mut self, e: &mut Expr) {
        e.visit_mut_children_with(self);

        let replacement = match e {
            Expr::Member(member) => match (&*member.obj, &member.prop) {
                (Expr::Ident(obj), MemberProp::Ident(prop)) if self.refs.contains_key(&*obj.sym) => {
                    Some(property_ref_object(obj.clone(), prop.sym.as_ref()))
                }
                _ => None,
            },
            _ => None,
        };
        if let Some(replacement) = replacement {
            *e = replacement;
        }
    }
}
