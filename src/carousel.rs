//! Windowed carousel over a discover result set.
//!
//! `Carousel` owns the result list and the cursor (the centered card). The view it
//! produces is a pure function of those two, so the terminal renderer never reads
//! state it could get out of sync with.

use std::ops::Range;

use crate::api::{Movie, detail_url, poster_url};
use crate::constants::constants;

/// Identifies one discover request. Only the most recent ticket may apply results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Result of applying a discover response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
  /// Response belonged to a superseded search and was dropped.
  Stale,
  /// No matches; the carousel is now hidden.
  Empty,
  /// Results replaced, cursor positioned.
  Loaded { count: usize, cursor: usize },
}

/// Controls offered on the centered card only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardActions {
  pub detail_url: String,
}

/// One rendered card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
  pub index: usize,
  pub movie_id: u64,
  pub title: String,
  pub poster_url: String,
  pub centered: bool,
  pub actions: Option<CardActions>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselView {
  pub cards: Vec<CardView>,
  pub cursor: usize,
  pub total: usize,
}

#[derive(Debug, Default)]
pub struct Carousel {
  movies: Vec<Movie>,
  cursor: usize,
  visible: bool,
  generation: u64,
}

impl Carousel {
  pub fn new() -> Self {
    Self::default()
  }

  /// Issue a ticket for a new discover request, superseding any earlier one.
  pub fn begin_search(&mut self) -> SearchTicket {
    self.generation += 1;
    SearchTicket(self.generation)
  }

  /// Apply a discover response. Responses for superseded tickets are ignored.
  pub fn apply_results(&mut self, ticket: SearchTicket, movies: Vec<Movie>) -> SearchOutcome {
    if ticket.0 != self.generation {
      return SearchOutcome::Stale;
    }
    if movies.is_empty() {
      self.visible = false;
      return SearchOutcome::Empty;
    }
    self.cursor = constants().window_before.min(movies.len() - 1);
    self.movies = movies;
    self.visible = true;
    SearchOutcome::Loaded { count: self.movies.len(), cursor: self.cursor }
  }

  pub fn is_visible(&self) -> bool {
    self.visible
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  /// The centered movie, if any results are loaded.
  pub fn current(&self) -> Option<&Movie> {
    self.movies.get(self.cursor)
  }

  /// Move one card back. Returns `false` at the first card.
  pub fn prev(&mut self) -> bool {
    if self.cursor > 0 && !self.movies.is_empty() {
      self.cursor -= 1;
      true
    } else {
      false
    }
  }

  /// Move one card forward. Returns `false` at the last card.
  pub fn next(&mut self) -> bool {
    if self.cursor + 1 < self.movies.len() {
      self.cursor += 1;
      true
    } else {
      false
    }
  }

  /// Indices of the cards around the cursor: `[cursor - before, cursor + after]`, clipped to the list.
  pub fn window(&self) -> Range<usize> {
    if self.movies.is_empty() {
      return 0..0;
    }
    let c = constants();
    let start = self.cursor.saturating_sub(c.window_before);
    let end = self.movies.len().min(self.cursor + c.window_after + 1);
    start..end
  }

  pub fn view(&self) -> CarouselView {
    let cards = if self.visible {
      self
        .window()
        .map(|i| {
          let movie = &self.movies[i];
          let centered = i == self.cursor;
          CardView {
            index: i,
            movie_id: movie.id,
            title: movie.title.clone(),
            poster_url: poster_url(movie.poster_path.as_deref()),
            centered,
            actions: centered.then(|| CardActions { detail_url: detail_url(movie.id) }),
          }
        })
        .collect()
    } else {
      Vec::new()
    };
    CarouselView { cards, cursor: self.cursor, total: self.movies.len() }
  }
}
