use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{info, warn};

use crate::selection::take_uniform;

/// Draws catalog images one at a time without putting them back.
pub struct BingoRoller {
    universe: Vec<String>,
    remaining: Vec<String>,
    drawn: Vec<String>,
    asset_dir: PathBuf,
}

impl BingoRoller {
    pub fn new(catalog: &[String], asset_dir: &Path) -> Self {
        let mut universe: Vec<String> = Vec::with_capacity(catalog.len());
        for item in catalog {
            if universe.contains(item) {
                warn!(%item, "duplicate catalog entry ignored");
                continue;
            }
            universe.push(item.clone());
        }

        Self {
            remaining: universe.clone(),
            universe,
            drawn: Vec::new(),
            asset_dir: asset_dir.to_path_buf(),
        }
    }

    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    pub fn drawn(&self) -> &[String] {
        &self.drawn
    }

    pub fn last_drawn(&self) -> Option<&str> {
        self.drawn.last().map(String::as_str)
    }

    pub fn can_draw(&self) -> bool {
        !self.remaining.is_empty()
    }

    /// Moves one uniformly chosen item from remaining to the end of drawn.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&str> {
        let item = take_uniform(&mut self.remaining, rng)?;
        info!(%item, left = self.remaining.len(), "bingo draw");
        self.drawn.push(item);
        self.last_drawn()
    }

    pub fn reset(&mut self) {
        self.remaining = self.universe.clone();
        self.drawn.clear();
    }

    pub fn asset_path(&self, item: &str) -> PathBuf {
        self.asset_dir.join(item)
    }
}
