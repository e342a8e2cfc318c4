//! Caller-owned memo of parsed decks and libraries
//!
//! Parsing a full price deck or type-curve library is the slowest step of a
//! run, so callers that evaluate many deals keep one `DeckCache` and pass it
//! by reference. There is no process-wide state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{load_price_deck, load_type_curves, PriceDeck, TypeCurveLibrary};
use crate::error::EvalError;

#[derive(Debug, Default)]
pub struct DeckCache {
    price_decks: HashMap<PathBuf, Arc<PriceDeck>>,
    type_curves: HashMap<PathBuf, Arc<TypeCurveLibrary>>,
}

impl DeckCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price deck at `path`, parsed on first request
    pub fn price_deck(&mut self, path: &Path) -> Result<Arc<PriceDeck>, EvalError> {
        if let Some(deck) = self.price_decks.get(path) {
            log::debug!("Price deck cache hit for {}", path.display());
            return Ok(Arc::clone(deck));
        }
        let deck = Arc::new(load_price_deck(path)?);
        self.price_decks.insert(path.to_path_buf(), Arc::clone(&deck));
        Ok(deck)
    }

    /// Type-curve library at `path`, parsed on first request
    pub fn type_curves(&mut self, path: &Path) -> Result<Arc<TypeCurveLibrary>, EvalError> {
        if let Some(library) = self.type_curves.get(path) {
            log::debug!("Type curve cache hit for {}", path.display());
            return Ok(Arc::clone(library));
        }
        let library = Arc::new(load_type_curves(path)?);
        self.type_curves.insert(path.to_path_buf(), Arc::clone(&library));
        Ok(library)
    }

    /// Drop every cached entry
    pub fn clear(&mut self) {
        self.price_decks.clear();
        self.type_curves.clear();
    }

    /// Number of cached decks and libraries
    pub fn len(&self) -> usize {
        self.price_decks.len() + self.type_curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
