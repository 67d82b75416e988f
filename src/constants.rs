//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! with no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

#[derive(Debug, Deserialize)]
pub struct Genre {
  pub id: u64,
  pub name: String,
}

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub default_server: String,

  // Image CDN / detail pages
  pub poster_base_url: String,
  pub poster_placeholder_url: String,
  pub detail_base_url: String,

  // Carousel window
  pub window_before: usize,
  pub window_after: usize,

  pub error_dismiss_secs: u64,

  // Filter form
  pub genres: Vec<Genre>,
  pub certifications: Vec<String>,
  pub default_min_rating: String,
  pub default_min_votes: String,
  pub default_release_date: String,
  pub default_certification: String,
}

impl Constants {
  /// Maximum number of cards in the carousel window.
  pub fn window_size(&self) -> usize {
    self.window_before + 1 + self.window_after
  }

  pub fn genre_name(&self, id: u64) -> Option<&str> {
    self.genres.iter().find(|g| g.id == id).map(|g| g.name.as_str())
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
