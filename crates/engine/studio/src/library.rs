//! Library browser: search, type filter and asset downloads

use brickyard_pieces::{Piece, PieceType};

/// Type-equality filter applied after the free-text search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Only(PieceType),
}

impl TypeFilter {
    /// Parse the value of the filter control (`all` or a type name)
    pub fn from_control(value: &str) -> Self {
        if value == "all" {
            TypeFilter::All
        } else {
            TypeFilter::Only(PieceType::from(value.to_string()))
        }
    }

    /// Inverse of [`from_control`](Self::from_control)
    pub fn control_value(&self) -> &str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Only(piece_type) => piece_type.as_str(),
        }
    }

    pub fn matches(&self, piece: &Piece) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(piece_type) => &piece.piece_type == piece_type,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// Why the library shows no cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Nothing detected yet
    NoPieces,
    /// Pieces exist but the filters hide all of them
    NoMatches,
}

/// A browser download of one piece's asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub url: String,
    pub file_name: String,
}

impl Download {
    /// `None` when the piece has no asset to download
    pub fn for_piece(piece: &Piece) -> Option<Self> {
        let url = piece.asset_url.clone().filter(|u| !u.is_empty())?;
        let stem = if piece.name.trim().is_empty() {
            "3d-model"
        } else {
            piece.name.as_str()
        };
        Some(Self {
            url,
            file_name: format!("{stem}.glb"),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Library {
    query: String,
    type_filter: TypeFilter,
    view: ViewMode,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn type_filter(&self) -> &TypeFilter {
        &self.type_filter
    }

    pub fn set_type_filter(&mut self, filter: TypeFilter) {
        self.type_filter = filter;
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn toggle_view(&mut self) -> ViewMode {
        self.view = match self.view {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        };
        self.view
    }

    /// Case-insensitive match of the search text against name or type
    pub fn matches_query(&self, piece: &Piece) -> bool {
        let needle = self.query.to_lowercase();
        piece.name.to_lowercase().contains(&needle)
            || piece.piece_type.as_str().to_lowercase().contains(&needle)
    }

    /// Pieces passing both the search and the type filter, in batch order
    pub fn visible<'a>(&self, batch: &'a [Piece]) -> Vec<&'a Piece> {
        batch
            .iter()
            .filter(|piece| self.matches_query(piece) && self.type_filter.matches(piece))
            .collect()
    }

    pub fn empty_state(&self, batch: &[Piece]) -> Option<EmptyState> {
        if batch.is_empty() {
            Some(EmptyState::NoPieces)
        } else if self.visible(batch).is_empty() {
            Some(EmptyState::NoMatches)
        } else {
            None
        }
    }
}

/// Distinct types in first-appearance order, for the filter control
pub fn piece_types(batch: &[Piece]) -> Vec<PieceType> {
    let mut types: Vec<PieceType> = Vec::new();
    for piece in batch {
        if !types.contains(&piece.piece_type) {
            types.push(piece.piece_type.clone());
        }
    }
    types
}

/// `1 piece selected`, `3 pieces selected`
pub fn selection_summary(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} piece{plural} selected")
}
