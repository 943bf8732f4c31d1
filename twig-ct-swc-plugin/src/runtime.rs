//! Mount bridge: what the browser side does with the import references the
//! transform emits.
//!
//! Test code mounts either a `twig` component (`{ template, context }`) or, via
//! the generic `mount(component, options)` fixture, an `object-component`
//! (`{ type, ...options }`). Both carry an import reference to a render
//! function; the bridge resolves it, renders the template to markup and writes
//! it into the root element.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    config::DEFAULT_TYPE_FIELD,
    error::{MountError, Result},
};

pub const TWIG_KIND: &str = "twig";
pub const OBJECT_COMPONENT_KIND: &str = "object-component";

// -----------------------------------------------------------------------------
// Templates
// -----------------------------------------------------------------------------

/// A compiled template: `render(context) -> markup`.
pub trait Template: Send + Sync {
    fn render(&self, context: &Value) -> String;
}

impl<F> Template for F
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn render(&self, context: &Value) -> String {
        self(context)
    }
}

/// Import reference as emitted by the transform, optionally narrowed to one
/// property by a member access (`Icons.Close`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

impl ImportRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            property: None,
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }
}

impl fmt::Display for ImportRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(property) => write!(f, "{}.{}", self.id, property),
            None => f.write_str(&self.id),
        }
    }
}

/// Templates the page has loaded, keyed by import reference.
#[derive(Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<ImportRef, Arc<dyn Template>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, import_ref: ImportRef, template: impl Template + 'static) {
        self.templates.insert(import_ref, Arc::new(template));
    }

    pub fn resolve(&self, import_ref: &ImportRef) -> Option<Arc<dyn Template>> {
        self.templates.get(import_ref).cloned()
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.templates.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// Component descriptors
// -----------------------------------------------------------------------------

/// What test code hands to `mount`/`update`.
///
/// The two variants carry the same thing under different field names
/// (`template` vs `type`); both are accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentDescriptor {
    Twig {
        template: ImportRef,
        context: Option<Value>,
    },
    ObjectComponent {
        render: ImportRef,
        context: Option<Value>,
    },
}

#[derive(Deserialize)]
struct TwigFields {
    template: ImportRef,
    context: Option<Value>,
}

#[derive(Deserialize)]
struct ObjectComponentFields {
    #[serde(rename = "type")]
    render: ImportRef,
    context: Option<Value>,
}

impl ComponentDescriptor {
    /// Decode a descriptor received from the test process. The tag is read
    /// from `__pw_type`, or `kind`; unknown tags fail before anything else.
    pub fn from_value(value: &Value) -> Result<Self> {
        let tag = value
            .get(DEFAULT_TYPE_FIELD)
            .or_else(|| value.get("kind"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        match tag {
            TWIG_KIND => {
                let fields: TwigFields = decode(value)?;
                Ok(Self::Twig {
                    template: fields.template,
                    context: fields.context,
                })
            }
            OBJECT_COMPONENT_KIND => {
                let fields: ObjectComponentFields = decode(value)?;
                Ok(Self::ObjectComponent {
                    render: fields.render,
                    context: fields.context,
                })
            }
            other => Err(MountError::UnsupportedComponentType(other.to_string())),
        }
    }

    fn parts(&self) -> (&ImportRef, Option<&Value>) {
        match self {
            Self::Twig { template, context } => (template, context.as_ref()),
            Self::ObjectComponent { render, context } => (render, context.as_ref()),
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|err| MountError::InvalidDescriptor(err.to_string()))
}

// -----------------------------------------------------------------------------
// Root elements
// -----------------------------------------------------------------------------

/// Proof that the bridge mounted something into an element. Only this module
/// can create one, so no page script can fake or clash with it.
#[derive(Debug)]
pub struct MountMarker {
    _private: (),
}

/// Element a component is mounted into.
pub trait MountRoot {
    fn set_inner_html(&mut self, html: String);

    /// Storage for the bridge's marker; hosts keep it, they never inspect it.
    fn mount_marker(&mut self) -> &mut Option<MountMarker>;
}

/// In-memory root element.
#[derive(Debug, Default)]
pub struct RootElement {
    inner_html: String,
    marker: Option<MountMarker>,
}

impl RootElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    pub fn is_mounted(&self) -> bool {
        self.marker.is_some()
    }
}

impl MountRoot for RootElement {
    fn set_inner_html(&mut self, html: String) {
        self.inner_html = html;
    }

    fn mount_marker(&mut self) -> &mut Option<MountMarker> {
        &mut self.marker
    }
}

// -----------------------------------------------------------------------------
// Bridge
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MountBridge {
    templates: TemplateRegistry,
}

impl MountBridge {
    pub fn new(templates: TemplateRegistry) -> Self {
        Self { templates }
    }

    pub fn templates_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.templates
    }

    fn render(&self, component: &ComponentDescriptor) -> Result<String> {
        let (render_ref, context) = component.parts();
        let template = self
            .templates
            .resolve(render_ref)
            .ok_or_else(|| MountError::UnresolvedTemplate(render_ref.to_string()))?;
        let empty = Value::Object(Default::default());
        Ok(template.render(context.unwrap_or(&empty)))
    }

    /// Render `component` into `root` and mark it mounted. Nothing is written
    /// when rendering fails.
    pub fn mount<R: MountRoot>(&self, component: &ComponentDescriptor, root: &mut R) -> Result<()> {
        tracing::debug!(?component, "mount");
        let html = self.render(component)?;
        root.set_inner_html(html);
        *root.mount_marker() = Some(MountMarker { _private: () });
        Ok(())
    }

    /// [`mount`](Self::mount) for a descriptor still in wire form.
    pub fn mount_value<R: MountRoot>(&self, component: &Value, root: &mut R) -> Result<()> {
        self.mount(&ComponentDescriptor::from_value(component)?, root)
    }

    pub fn unmount<R: MountRoot>(&self, root: &mut R) -> Result<()> {
        tracing::debug!("unmount");
        if root.mount_marker().take().is_none() {
            return Err(MountError::NotMounted);
        }
        root.set_inner_html(String::new());
        Ok(())
    }

    /// Re-render into an already mounted `root`.
    pub fn update<R: MountRoot>(&self, root: &mut R, component: &ComponentDescriptor) -> Result<()> {
        tracing::debug!(?component, "update");
        if root.mount_marker().is_none() {
            return Err(MountError::NotMounted);
        }
        let html = self.render(component)?;
        root.set_inner_html(html);
        Ok(())
    }
}
