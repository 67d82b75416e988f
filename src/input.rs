use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{Action, App, AppMode};
use crate::filters::FilterField;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Single-line editable text with a char-indexed cursor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextInput {
  pub value: String,
  /// Cursor position (char index).
  pub cursor: usize,
  /// Horizontal scroll offset (display columns), maintained by the renderer.
  pub scroll: usize,
}

impl TextInput {
  pub fn with_value(value: &str) -> Self {
    Self { value: value.to_string(), cursor: value.chars().count(), scroll: 0 }
  }

  pub fn insert(&mut self, c: char) {
    let byte_idx = char_to_byte_index(&self.value, self.cursor);
    self.value.insert(byte_idx, c);
    self.cursor += 1;
  }

  pub fn backspace(&mut self) {
    if self.cursor > 0 {
      self.cursor -= 1;
      let byte_idx = char_to_byte_index(&self.value, self.cursor);
      self.value.remove(byte_idx);
    }
  }

  pub fn delete(&mut self) {
    if self.cursor < self.value.chars().count() {
      let byte_idx = char_to_byte_index(&self.value, self.cursor);
      self.value.remove(byte_idx);
    }
  }

  pub fn left(&mut self) {
    self.cursor = self.cursor.saturating_sub(1);
  }

  pub fn right(&mut self) {
    if self.cursor < self.value.chars().count() {
      self.cursor += 1;
    }
  }

  pub fn home(&mut self) {
    self.cursor = 0;
  }

  pub fn end(&mut self) {
    self.cursor = self.value.chars().count();
  }

  pub fn clear(&mut self) {
    self.value.clear();
    self.cursor = 0;
    self.scroll = 0;
  }
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return;
  }

  match app.mode {
    AppMode::Filter => handle_filter_key(app, key),
    AppMode::Carousel => handle_carousel_key(app, key),
  }
}

fn handle_filter_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => {
      app.dispatch(Action::Submit);
      return;
    }
    KeyCode::Tab | KeyCode::Down => {
      app.form.focus_next();
      return;
    }
    KeyCode::BackTab | KeyCode::Up => {
      app.form.focus_prev();
      return;
    }
    KeyCode::Esc => {
      if app.carousel.is_visible() {
        app.mode = AppMode::Carousel;
      } else {
        app.should_quit = true;
      }
      return;
    }
    _ => {}
  }

  match app.form.focus {
    FilterField::Genres => match key.code {
      KeyCode::Left => app.form.genre_left(),
      KeyCode::Right => app.form.genre_right(),
      KeyCode::Char(' ') => app.form.toggle_genre(),
      KeyCode::Delete | KeyCode::Backspace => app.form.clear_genres(),
      _ => {}
    },
    FilterField::Certification => match key.code {
      KeyCode::Left => app.form.cycle_certification(false),
      KeyCode::Right | KeyCode::Char(' ') => app.form.cycle_certification(true),
      _ => {}
    },
    FilterField::MinRating | FilterField::MinVotes | FilterField::ReleaseDate => {
      let Some(input) = app.form.focused_text_mut() else { return };
      match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => input.clear(),
        KeyCode::Char(c) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => {}
      }
    }
  }
}

fn handle_carousel_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Left | KeyCode::Char('h') => app.dispatch(Action::Prev),
    KeyCode::Right | KeyCode::Char('l') => app.dispatch(Action::Next),
    KeyCode::Char('w') => app.dispatch(Action::MarkWatched),
    KeyCode::Char('n') => app.dispatch(Action::MarkNeverWatch),
    KeyCode::Char('t') => app.dispatch(Action::Trailer),
    KeyCode::Char('o') | KeyCode::Enter => app.dispatch(Action::MoreInfo),
    KeyCode::Esc | KeyCode::Char('/') | KeyCode::Char('f') => {
      app.mode = AppMode::Filter;
    }
    KeyCode::Char('q') => {
      app.should_quit = true;
    }
    _ => {}
  }
}
