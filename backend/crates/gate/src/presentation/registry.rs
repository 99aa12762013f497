//! Portal Registry
//!
//! The set of portals served by this process, built from the taxonomy and
//! validated before any route is registered.

use std::sync::Arc;

use crate::domain::entity::portal_definition::PortalDefinition;
use crate::domain::taxonomy;
use crate::domain::value_object::portal_id::PortalId;
use crate::error::{GateError, GateResult};

#[derive(Debug, Clone)]
pub struct PortalRegistry {
    portals: Vec<Arc<PortalDefinition>>,
}

impl PortalRegistry {
    /// Every portal in the taxonomy
    pub fn new() -> GateResult<Self> {
        Self::from_ids(PortalId::ALL)
    }

    /// Only the portals named by `slugs`. An unknown slug is a startup error.
    pub fn with_slugs<S: AsRef<str>>(slugs: &[S]) -> GateResult<Self> {
        let ids = slugs
            .iter()
            .map(|slug| slug.as_ref().trim().parse::<PortalId>())
            .collect::<GateResult<Vec<_>>>()?;
        Self::from_ids(ids)
    }

    fn from_ids(ids: impl IntoIterator<Item = PortalId>) -> GateResult<Self> {
        taxonomy::validate()?;

        let mut portals: Vec<Arc<PortalDefinition>> = Vec::new();
        for id in ids {
            if portals.iter().any(|def| def.id == id) {
                return Err(GateError::InvalidConfig(format!("portal {id} listed twice")));
            }
            portals.push(Arc::new(PortalDefinition::from_taxonomy(id)));
        }

        Ok(Self { portals })
    }

    pub fn get(&self, id: PortalId) -> Option<&Arc<PortalDefinition>> {
        self.portals.iter().find(|def| def.id == id)
    }

    pub fn by_slug(&self, slug: &str) -> GateResult<&Arc<PortalDefinition>> {
        let id: PortalId = slug.parse()?;
        self.get(id)
            .ok_or_else(|| GateError::UnknownPortal(slug.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PortalDefinition>> {
        self.portals.iter()
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }
}
