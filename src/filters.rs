use crate::api::DiscoverQuery;
use crate::constants::constants;
use crate::input::TextInput;

/// Focusable rows of the filter form, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
  Genres,
  MinRating,
  MinVotes,
  ReleaseDate,
  Certification,
}

impl FilterField {
  pub const ALL: [FilterField; 5] = [
    FilterField::Genres,
    FilterField::MinRating,
    FilterField::MinVotes,
    FilterField::ReleaseDate,
    FilterField::Certification,
  ];

  pub fn label(self) -> &'static str {
    match self {
      FilterField::Genres => "Genres",
      FilterField::MinRating => "Min rating",
      FilterField::MinVotes => "Min votes",
      FilterField::ReleaseDate => "Released after",
      FilterField::Certification => "Certification",
    }
  }

  fn position(self) -> usize {
    Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
  }

  pub fn next(self) -> Self {
    Self::ALL[(self.position() + 1) % Self::ALL.len()]
  }

  pub fn prev(self) -> Self {
    let idx = self.position();
    Self::ALL[if idx == 0 { Self::ALL.len() - 1 } else { idx - 1 }]
  }
}

/// Filter form state. Pre-filled with the backend's own defaults.
#[derive(Debug)]
pub struct FilterForm {
  pub focus: FilterField,
  /// Highlighted genre in the multi-select row.
  pub genre_cursor: usize,
  selected_genres: Vec<bool>,
  pub min_rating: TextInput,
  pub min_votes: TextInput,
  pub release_date: TextInput,
  /// Index into the certification choices; `None` means any.
  pub certification: Option<usize>,
}

impl FilterForm {
  pub fn new() -> Self {
    let c = constants();
    Self {
      focus: FilterField::Genres,
      genre_cursor: 0,
      selected_genres: vec![false; c.genres.len()],
      min_rating: TextInput::with_value(&c.default_min_rating),
      min_votes: TextInput::with_value(&c.default_min_votes),
      release_date: TextInput::with_value(&c.default_release_date),
      certification: c.certifications.iter().position(|cert| *cert == c.default_certification),
    }
  }

  /// The text input under focus, if the focused row is free text.
  pub fn focused_text_mut(&mut self) -> Option<&mut TextInput> {
    match self.focus {
      FilterField::MinRating => Some(&mut self.min_rating),
      FilterField::MinVotes => Some(&mut self.min_votes),
      FilterField::ReleaseDate => Some(&mut self.release_date),
      FilterField::Genres | FilterField::Certification => None,
    }
  }

  pub fn focus_next(&mut self) {
    self.focus = self.focus.next();
  }

  pub fn focus_prev(&mut self) {
    self.focus = self.focus.prev();
  }

  pub fn genre_left(&mut self) {
    let count = self.selected_genres.len();
    if count > 0 {
      self.genre_cursor = if self.genre_cursor == 0 { count - 1 } else { self.genre_cursor - 1 };
    }
  }

  pub fn genre_right(&mut self) {
    let count = self.selected_genres.len();
    if count > 0 {
      self.genre_cursor = (self.genre_cursor + 1) % count;
    }
  }

  pub fn toggle_genre(&mut self) {
    if let Some(selected) = self.selected_genres.get_mut(self.genre_cursor) {
      *selected = !*selected;
    }
  }

  pub fn clear_genres(&mut self) {
    self.selected_genres.iter_mut().for_each(|s| *s = false);
  }

  pub fn is_genre_selected(&self, idx: usize) -> bool {
    self.selected_genres.get(idx).copied().unwrap_or(false)
  }

  /// Selected genre names in list order.
  pub fn selected_genres(&self) -> Vec<String> {
    constants()
      .genres
      .iter()
      .zip(&self.selected_genres)
      .filter(|(_, selected)| **selected)
      .map(|(genre, _)| genre.name.clone())
      .collect()
  }

  /// Step through `any, G, PG, ...` in either direction.
  pub fn cycle_certification(&mut self, forward: bool) {
    let count = constants().certifications.len();
    if count == 0 {
      return;
    }
    self.certification = match (self.certification, forward) {
      (None, true) => Some(0),
      (None, false) => Some(count - 1),
      (Some(i), true) if i + 1 < count => Some(i + 1),
      (Some(i), false) if i > 0 => Some(i - 1),
      (Some(_), _) => None,
    };
  }

  pub fn certification_label(&self) -> &str {
    self.certification.and_then(|i| constants().certifications.get(i)).map_or("any", String::as_str)
  }

  pub fn to_query(&self) -> DiscoverQuery {
    DiscoverQuery {
      genres: self.selected_genres(),
      min_rating: self.min_rating.value.clone(),
      min_votes: self.min_votes.value.clone(),
      release_date: self.release_date.value.clone(),
      us_certification: self.certification.and_then(|i| constants().certifications.get(i)).cloned().unwrap_or_default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ApiClient;

  #[test]
  fn new_form_carries_backend_defaults() {
    let query = FilterForm::new().to_query();
    assert!(query.genres.is_empty());
    assert_eq!(query.min_rating, "7.0");
    assert_eq!(query.min_votes, "150");
    assert_eq!(query.release_date, "2020-01-01");
    assert_eq!(query.us_certification, "R");
  }

  #[test]
  fn toggled_genres_come_out_in_list_order() {
    let mut form = FilterForm::new();
    let genres = &constants().genres;
    let drama = genres.iter().position(|g| g.name == "Drama").unwrap();
    let action = genres.iter().position(|g| g.name == "Action").unwrap();

    form.genre_cursor = drama;
    form.toggle_genre();
    form.genre_cursor = action;
    form.toggle_genre();
    assert_eq!(form.selected_genres(), vec!["Action".to_string(), "Drama".to_string()]);

    form.toggle_genre();
    assert_eq!(form.selected_genres(), vec!["Drama".to_string()]);
    form.clear_genres();
    assert!(form.selected_genres().is_empty());
  }

  #[test]
  fn genre_cursor_wraps() {
    let mut form = FilterForm::new();
    form.genre_left();
    assert_eq!(form.genre_cursor, constants().genres.len() - 1);
    form.genre_right();
    assert_eq!(form.genre_cursor, 0);
  }

  #[test]
  fn certification_cycles_through_any() {
    let mut form = FilterForm::new();
    form.certification = None;
    assert_eq!(form.certification_label(), "any");
    form.cycle_certification(true);
    assert_eq!(form.certification_label(), "G");
    form.cycle_certification(false);
    assert_eq!(form.certification_label(), "any");
    form.cycle_certification(false);
    assert_eq!(form.certification_label(), "NC-17");
    form.cycle_certification(true);
    assert_eq!(form.to_query().us_certification, "");
  }

  #[test]
  fn any_certification_sends_empty_value() {
    let mut form = FilterForm::new();
    form.certification = None;
    assert_eq!(form.certification_label(), "any");
    let url = ApiClient::new("http://h").unwrap().discover_url(&form.to_query()).unwrap();
    assert_eq!(url.query(), Some("min_rating=7.0&min_votes=150&release_date=2020-01-01&us_certification="));
  }

  #[test]
  fn focus_wraps_both_ways() {
    let mut form = FilterForm::new();
    form.focus_prev();
    assert_eq!(form.focus, FilterField::Certification);
    form.focus_next();
    assert_eq!(form.focus, FilterField::Genres);
    assert!(form.focused_text_mut().is_none());
    form.focus_next();
    assert!(form.focused_text_mut().is_some());
  }

  #[test]
  fn edited_text_flows_into_query() {
    let mut form = FilterForm::new();
    form.focus = FilterField::MinVotes;
    if let Some(input) = form.focused_text_mut() {
      input.clear();
      input.insert('9');
    }
    assert_eq!(form.to_query().min_votes, "9");
  }
}
