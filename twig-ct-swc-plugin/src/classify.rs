use std::collections::HashSet;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

/// Callee whose arguments are treated as component references.
pub const MOUNT_CALLEE: &str = "mount";

/// Names that look like component references in one module.
///
/// Classification is syntactic only: no scope resolution happens here, so a
/// shadowing local with the same name as an import still counts. The rewriter
/// only acts on names that are also bound by an import of the same file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ComponentUsages {
    /// Tag names of JSX elements, and `Foo` of `<Foo.Bar />`.
    pub jsx_names: HashSet<String>,
    /// Every identifier inside the arguments of a `mount(...)` call.
    pub mount_call_names: HashSet<String>,
}

impl ComponentUsages {
    pub fn collect(module: &Module) -> Self {
        let mut usages = Self::default();
        module.visit_with(&mut UsageCollector { out: &mut usages });
        usages
    }

    pub fn is_component(&self, name: &str) -> bool {
        self.jsx_names.contains(name) || self.mount_call_names.contains(name)
    }
}

struct UsageCollector<'a> {
    out: &'a mut ComponentUsages,
}

impl<'a> Visit for UsageCollector<'a> {
    fn visit_jsx_element(&mut self, n: &JSXElement) {
        match &n.opening.name {
            JSXElementName::Ident(ident) => {
                self.out.jsx_names.insert(ident.sym.to_string());
            }
            JSXElementName::JSXMemberExpr(member) => {
                if let JSXObject::Ident(obj) = &member.obj {
                    self.out.jsx_names.insert(obj.sym.to_string());
                }
            }
            JSXElementName::JSXNamespacedName(_) => {}
        }
        n.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, n: &CallExpr) {
        if is_mount_call(n) {
            let mut names = IdentCollector { out: &mut self.out.mount_call_names };
            for arg in &n.args {
                arg.visit_with(&mut names);
            }
        }
        n.visit_children_with(self);
    }
}

fn is_mount_call(n: &CallExpr) -> bool {
    match &n.callee {
        Callee::Expr(callee) => matches!(&**callee, Expr::Ident(i) if i.sym.as_ref() == MOUNT_CALLEE),
        _ => false,
    }
}

/// Every identifier below a node, property names included.
struct IdentCollector<'a> {
    out: &'a mut HashSet<String>,
}

impl<'a> Visit for IdentCollector<'a> {
    fn visit_ident(&mut self, n: &Ident) {
        self.out.insert(n.sym.to_string());
    }

    fn visit_ident_name(&mut self, n: &IdentName) {
        self.out.insert(n.sym.to_string());
    }
}
