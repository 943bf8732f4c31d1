//! Errors surfaced by the runtime mount bridge.
//!
//! The transform itself has no error paths: anything it cannot classify is
//! left unconverted.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    /// The descriptor's type tag is neither `twig` nor `object-component`.
    #[error("unsupported component type: '{0}'")]
    UnsupportedComponentType(String),

    /// `unmount`/`update` on an element without an active component.
    #[error("component was not mounted")]
    NotMounted,

    /// No template is registered for the import reference.
    #[error("no template registered for import ref '{0}'")]
    UnresolvedTemplate(String),

    /// The descriptor has the right tag but not the fields that go with it.
    #[error("invalid component descriptor: {0}")]
    InvalidDescriptor(String),
}

pub type Result<T> = std::result::Result<T, MountError>;
