//! Registry of the platforms drafts can be staged to.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::contract::{PageCreator, WorkspaceValidator};

pub const NOTION: &str = "notion";

/// The collaborators that serve one platform.
#[derive(Clone)]
pub struct Platform {
    pub validator: Arc<dyn WorkspaceValidator>,
    pub creator: Arc<dyn PageCreator>,
}

impl Platform {
    pub fn new(validator: Arc<dyn WorkspaceValidator>, creator: Arc<dyn PageCreator>) -> Self {
        Self { validator, creator }
    }
}

#[derive(Clone, Default)]
pub struct PlatformRegistry {
    platforms: BTreeMap<String, Platform>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, id: impl Into<String>, platform: Platform) -> Self {
        self.platforms.insert(id.into(), platform);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Platform> {
        self.platforms.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.platforms.keys().map(String::as_str)
    }
}
