//! The user's current picks, tracked by piece id

use brickyard_pieces::{Piece, PieceId};

/// Selected piece ids in pick order.
///
/// Membership is what matters; order only drives how the selected list is
/// displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<PieceId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &PieceId) -> bool {
        self.ids.contains(id)
    }

    /// Add `id` if absent; returns whether it was added
    pub fn insert(&mut self, id: PieceId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id` if present; returns whether it was removed
    pub fn remove(&mut self, id: &PieceId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        self.ids.len() != before
    }

    /// Flip membership of `id`; returns whether it is selected afterwards
    pub fn toggle(&mut self, id: &PieceId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id.clone());
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceId> {
        self.ids.iter()
    }

    /// Drop ids that do not belong to `batch`; returns how many were dropped
    pub fn retain_batch(&mut self, batch: &[Piece]) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| batch.iter().any(|piece| &piece.id == id));
        before - self.ids.len()
    }

    /// Selected pieces of `batch`, in pick order
    pub fn pieces<'a>(&self, batch: &'a [Piece]) -> Vec<&'a Piece> {
        self.ids
            .iter()
            .filter_map(|id| batch.iter().find(|piece| &piece.id == id))
            .collect()
    }
}
