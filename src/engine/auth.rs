//! Privilege checks for administrative operations

use ahash::AHashSet;

use crate::core::types::PlayerId;

pub trait AuthorizationPolicy: Send + Sync {
    fn is_privileged(&self, actor: PlayerId) -> bool;
}

/// Fixed set of privileged player ids
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    ids: AHashSet<PlayerId>,
}

impl AllowList {
    pub fn new(ids: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn from_config(ids: &[u64]) -> Self {
        Self::new(ids.iter().copied().map(PlayerId))
    }
}

impl AuthorizationPolicy for AllowList {
    fn is_privileged(&self, actor: PlayerId) -> bool {
        self.ids.contains(&actor)
    }
}
