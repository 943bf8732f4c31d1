use once_cell::sync::Lazy;
use path_clean::PathClean;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use swc_core::{
    common::DUMMY_SP,
    ecma::ast::*,
};

// -----------------------------------------------------------------------------
// Artifact imports
// -----------------------------------------------------------------------------

/// Extensions of imports that never execute in the test process and are
/// always replaced by an import reference.
pub const ARTIFACT_EXTENSIONS: &[&str] = &[
    // Template engines
    ".twig",
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".bmp", ".webp", ".ico",
    // CSS
    ".css",
    // Fonts
    ".woff", ".woff2", ".ttf", ".otf", ".eot",
];

pub fn is_artifact_source(source: &str) -> bool {
    let ext = extname(source);
    !ext.is_empty() && ARTIFACT_EXTENSIONS.contains(&ext)
}

/// Extension of the last path segment, dot included. Mirrors Node's
/// `path.extname`: dotfiles have no extension and trailing slashes are ignored.
pub fn extname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    let base = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if base == ".." {
        return "";
    }
    match base.rfind('.') {
        None | Some(0) => "",
        Some(i) => &base[i..],
    }
}

// -----------------------------------------------------------------------------
// Ids
// -----------------------------------------------------------------------------

static NON_IDENT_CHAR: Lazy<Regex> = Lazy::new(|| {
    // Literal pattern, cannot fail to compile.
    Regex::new(r"[^A-Za-z0-9_]").unwrap()
});

/// Replace everything outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_id(raw: &str) -> String {
    NON_IDENT_CHAR.replace_all(raw, "_").into_owned()
}

/// `origin_file/../import_source`, lexically normalized.
fn resolve_next_to(origin_file: &str, import_source: &str) -> String {
    PathBuf::from(format!("{origin_file}/../{import_source}"))
        .clean()
        .to_string_lossy()
        .into_owned()
}

// -----------------------------------------------------------------------------
// Bindings & descriptors
// -----------------------------------------------------------------------------

/// One local name introduced by an import statement of the file under transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local_name: String,
    pub import_source: String,
    /// Exported name for named imports; `None` for default imports.
    pub remote_name: Option<String>,
    pub origin_file: String,
}

impl ImportBinding {
    /// Binding for a default or named specifier. Namespace and type-only
    /// specifiers have no binding an id could stand for.
    pub fn from_specifier(
        decl: &ImportDecl,
        specifier: &ImportSpecifier,
        origin_file: &str,
    ) -> Option<Self> {
        let (local, remote_name) = match specifier {
            ImportSpecifier::Default(def) => (&def.local, None),
            ImportSpecifier::Named(named) => {
                if named.is_type_only {
                    return None;
                }
                let remote = match &named.imported {
                    Some(ModuleExportName::Ident(i)) => i.sym.to_string(),
                    Some(ModuleExportName::Str(s)) => s.value.to_string(),
                    None => named.local.sym.to_string(),
                };
                (&named.local, Some(remote))
            }
            ImportSpecifier::Namespace(_) => return None,
        };
        Some(Self {
            local_name: local.sym.to_string(),
            import_source: decl.src.value.to_string(),
            remote_name,
            origin_file: origin_file.to_string(),
        })
    }

    pub fn descriptor(&self) -> ImportDescriptor {
        let mut id = sanitize_id(&resolve_next_to(&self.origin_file, &self.import_source));
        if let Some(remote) = &self.remote_name {
            id.push('_');
            id.push_str(remote);
        }
        ImportDescriptor {
            id,
            filename: self.origin_file.clone(),
            import_source: self.import_source.clone(),
            remote_name: self.remote_name.clone(),
        }
    }
}

/// What survives of a converted import: inlined into the rewritten module as
/// an import reference and handed to the host as transform data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDescriptor {
    /// Join key between build-time metadata and runtime lookup.
    pub id: String,
    pub filename: String,
    pub import_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_name: Option<String>,
}

pub const IMPORT_REF_KIND: &str = "importRef";

fn str_lit(value: &str) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    })))
}

fn key_value(key: &str, value: Box<Expr>) -> PropOrSpread {
    PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
        key: PropName::Ident(IdentName::new(key.into(), DUMMY_SP)),
        value,
    })))
}

/// `{ <type_field>: "importRef", id: "<id>" }`
pub fn import_ref_object(type_field: &str, id: &str) -> Expr {
    Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props: vec![
            key_value(type_field, str_lit(IMPORT_REF_KIND)),
            key_value("id", str_lit(id)),
        ],
    })
}

/// `{ ...<local>, property: "<property>" }`
pub fn property_ref_object(local: Ident, property: &str) -> Expr {
    Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props: vec![
            PropOrSpread::Spread(SpreadElement {
                dot3_token: DUMMY_SP,
                expr: Box::new(Expr::Ident(local)),
            }),
            key_value("property", str_lit(property)),
        ],
    })
}
