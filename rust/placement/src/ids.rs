// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier types shared by the placement pipeline and document backends.
//!
//! Every identifier is a plain `Copy` value with structural equality, so it
//! can be used directly as a map or set key. [`BarrierRef`] is the identity of
//! a physical barrier: two references are the same barrier iff both the link
//! instance and the element id match.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

id_type! {
    /// Id of an element inside one document (host or linked).
    ElementId(u64)
}

id_type! {
    /// Id of a vertical reference level in the host document.
    LevelId(u64)
}

id_type! {
    /// Id of a 3D view in the host document.
    ViewId(u64)
}

id_type! {
    /// Id of the parametric opening template.
    TemplateId(u64)
}

id_type! {
    /// Handle to an opening instance created by an [`OpeningWriter`](crate::OpeningWriter).
    OpeningHandle(u64)
}

id_type! {
    /// A template parameter, resolved once from its name.
    ParameterId(u32)
}

/// Which document an element lives in.
///
/// `Host` is a valid value that compares equal to itself, so host barriers
/// deduplicate exactly like linked ones.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LinkId {
    /// The host document itself.
    #[default]
    Host,
    /// A linked model, identified by its link instance in the host document.
    Instance(ElementId),
}

impl LinkId {
    /// Returns `true` for elements of the host document.
    pub fn is_host(&self) -> bool {
        matches!(self, LinkId::Host)
    }

    /// Returns the link instance id, if any.
    pub fn instance(&self) -> Option<ElementId> {
        match self {
            LinkId::Host => None,
            LinkId::Instance(id) => Some(*id),
        }
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkId::Host => f.write_str("host"),
            LinkId::Instance(id) => write!(f, "link {}", id),
        }
    }
}

/// Identity of a barrier surface: `(link, element)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BarrierRef {
    pub link: LinkId,
    pub element: ElementId,
}

impl BarrierRef {
    /// A barrier in the host document.
    pub fn host(element: ElementId) -> Self {
        Self {
            link: LinkId::Host,
            element,
        }
    }

    /// A barrier inside the linked model placed by link instance `link`.
    pub fn linked(link: ElementId, element: ElementId) -> Self {
        Self {
            link: LinkId::Instance(link),
            element,
        }
    }
}

impl fmt::Display for BarrierRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.link {
            LinkId::Host => write!(f, "{}", self.element),
            LinkId::Instance(link) => write!(f, "{} in link {}", self.element, link),
        }
    }
}
