use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style},
  text::{Line, Span},
  widgets::{Block, BorderType, Padding, Paragraph, Wrap},
};

use crate::api::Movie;
use crate::app::{App, AppMode};
use crate::carousel::CardView;
use crate::constants::constants;
use crate::filters::FilterField;
use crate::input::TextInput;
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// Keep the cursor column inside a `width`-column viewport; returns the visible slice.
fn scrolled_text(input: &mut TextInput, width: usize) -> (String, usize) {
  let cursor_col = display_width(&input.value, input.cursor);
  if cursor_col < input.scroll {
    input.scroll = cursor_col;
  } else if width > 0 && cursor_col >= input.scroll + width {
    input.scroll = cursor_col.saturating_sub(width) + 1;
  }
  let scroll = input.scroll;
  let visible: String = input
    .value
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + width)
    .map(|(_, _, c)| c)
    .collect();
  (visible, cursor_col - scroll)
}

fn rounded_block(theme: &Theme, focused: bool) -> Block<'static> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(color))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let form_height = FilterField::ALL.len() as u16 + 2;
  let [header_area, form_area, main_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(form_height),
    Constraint::Min(6),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_form(frame, app, form_area);
  if app.carousel.is_visible() {
    render_carousel(frame, app, main_area);
  } else {
    render_welcome(frame, theme, main_area);
  }
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let left = Line::from(vec![
    Span::styled(" ▶ mf ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(app.api.base_url().to_string(), Style::default().fg(theme.muted)),
  ]);
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_welcome(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("▶  Find something to watch", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Set your filters above and press Enter.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(rounded_block(theme, false));
  frame.render_widget(paragraph, area);
}

fn render_form(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Filter;
  let block = rounded_block(theme, focused)
    .title(" Filters ")
    .title_style(Style::default().fg(if focused { theme.accent } else { theme.border }))
    .padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  const LABEL_W: u16 = 16;
  let rows = Layout::vertical(FilterField::ALL.map(|_| Constraint::Length(1))).split(inner);
  for (field, row) in FilterField::ALL.into_iter().zip(rows.iter().copied()) {
    let is_focus = focused && app.form.focus == field;
    let label_style =
      if is_focus { Style::default().fg(theme.accent).add_modifier(Modifier::BOLD) } else { Style::default().fg(theme.muted) };
    let marker = if is_focus { "› " } else { "  " };
    let [label_area, value_area] = Layout::horizontal([Constraint::Length(LABEL_W), Constraint::Min(1)]).areas(row);
    frame.render_widget(Line::from(Span::styled(format!("{}{}", marker, field.label()), label_style)), label_area);

    match field {
      FilterField::Genres => {
        render_genres(frame, app, value_area, is_focus);
      }
      FilterField::Certification => {
        let value = format!("‹ {} ›", app.form.certification_label());
        frame.render_widget(Line::from(Span::styled(value, Style::default().fg(theme.fg))), value_area);
      }
      FilterField::MinRating | FilterField::MinVotes | FilterField::ReleaseDate => {
        let width = value_area.width as usize;
        let Some(input) = (match field {
          FilterField::MinRating => Some(&mut app.form.min_rating),
          FilterField::MinVotes => Some(&mut app.form.min_votes),
          FilterField::ReleaseDate => Some(&mut app.form.release_date),
          _ => None,
        }) else {
          continue;
        };
        let (visible, cursor_col) = scrolled_text(input, width);
        let placeholder = visible.is_empty() && !is_focus;
        let text = if placeholder {
          Span::styled("(backend default)", Style::default().fg(theme.muted))
        } else {
          Span::styled(visible, Style::default().fg(theme.fg))
        };
        frame.render_widget(Line::from(text), value_area);
        if is_focus {
          frame.set_cursor_position((value_area.x + cursor_col as u16, value_area.y));
        }
      }
    }
  }
}

fn render_genres(frame: &mut Frame, app: &App, area: Rect, is_focus: bool) {
  let theme = app.theme();
  let genres = &constants().genres;
  let width = area.width as usize;
  if genres.is_empty() {
    return;
  }

  // Scroll the chip row so the highlighted genre stays visible.
  let chips: Vec<String> = genres
    .iter()
    .enumerate()
    .map(|(i, g)| format!("{}{} ", if app.form.is_genre_selected(i) { "●" } else { "○" }, g.name))
    .collect();
  let mut start = 0;
  let cursor = app.form.genre_cursor.min(chips.len() - 1);
  let mut used: usize = chips[..=cursor].iter().map(|c| c.chars().count()).sum();
  while used > width && start < cursor {
    used -= chips[start].chars().count();
    start += 1;
  }

  let spans: Vec<Span> = chips
    .iter()
    .enumerate()
    .skip(start)
    .map(|(i, chip)| {
      let style = if is_focus && i == app.form.genre_cursor {
        Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg)
      } else if app.form.is_genre_selected(i) {
        Style::default().fg(theme.accent)
      } else {
        Style::default().fg(theme.muted)
      };
      Span::styled(chip.clone(), style)
    })
    .collect();
  frame.render_widget(Line::from(spans), area);
}

fn render_carousel(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let view = app.carousel.view();
  let focused = app.mode == AppMode::Carousel;
  let title = format!(" Results {}/{} ", view.cursor + 1, view.total);
  let block = rounded_block(theme, focused)
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let c = constants();
  let slots = Layout::horizontal(vec![Constraint::Ratio(1, c.window_size() as u32); c.window_size()]).split(inner);
  for card in &view.cards {
    // Pin the centered card to the middle slot.
    let slot = card.index + c.window_before - view.cursor;
    if let Some(slot_area) = slots.get(slot) {
      render_card(frame, app, card, *slot_area);
    }
  }
}

fn render_card(frame: &mut Frame, app: &App, card: &CardView, area: Rect) {
  let theme = app.theme();
  let inner_w = area.width.saturating_sub(4) as usize;
  let title_style = if card.centered {
    Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(theme.fg)
  };
  let block = rounded_block(theme, card.centered).padding(Padding::horizontal(1));

  let mut lines = vec![
    Line::from(Span::styled(truncate_str(&card.title, inner_w), title_style)),
    Line::from(Span::styled(truncate_str(&card.poster_url, inner_w), Style::default().fg(theme.muted))),
    Line::from(Span::styled(format!("#{}", card.movie_id), Style::default().fg(theme.muted))),
  ];

  if let Some(actions) = &card.actions {
    lines.push(Line::from(""));
    if let Some(movie) = app.carousel.current() {
      for fact in card_facts(movie) {
        lines.push(Line::from(Span::styled(truncate_str(&fact, inner_w), Style::default().fg(theme.fg))));
      }
    }
    lines.push(Line::from(Span::styled(
      truncate_str(&actions.detail_url, inner_w),
      Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
    )));
    lines.push(Line::from(""));
    for (key, label) in [("o", "More Info"), ("w", "Watched"), ("n", "Never Watch"), ("t", "Trailer")] {
      lines.push(Line::from(vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {}", label), Style::default().fg(theme.fg)),
      ]));
    }
    if let Some(overview) = app.carousel.current().and_then(|m| m.overview.as_deref()).filter(|o| !o.is_empty()) {
      lines.push(Line::from(""));
      lines.push(Line::from(Span::styled(overview.to_string(), Style::default().fg(theme.muted))));
    }
  }

  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}

/// Detail lines for the centered card: genres, then rating, votes and release date.
fn card_facts(movie: &Movie) -> Vec<String> {
  let mut facts = Vec::new();
  let genres = movie.genre_names();
  if !genres.is_empty() {
    facts.push(genres.join(", "));
  }
  let mut stats = Vec::new();
  if let Some(rating) = movie.vote_average {
    stats.push(format!("★ {:.1}", rating));
  }
  if let Some(votes) = movie.vote_count {
    stats.push(format!("{} votes", votes));
  }
  if let Some(date) = movie.release_date.as_deref().filter(|d| !d.is_empty()) {
    stats.push(date.to_string());
  }
  if !stats.is_empty() {
    facts.push(stats.join("  "));
  }
  facts
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let in_flight = app.tasks.actions_in_flight();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ  {}", info), Style::default().fg(theme.info))
  } else if in_flight > 0 {
    (format!(" ⏳ {} request(s) pending", in_flight), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Filter => {
      let mut k = vec![("Enter", "Search"), ("Tab", "Field")];
      match app.form.focus {
        FilterField::Genres => {
          k.push(("←/→", "Move"));
          k.push(("Space", "Toggle"));
        }
        FilterField::Certification => k.push(("←/→", "Change")),
        _ => {}
      }
      k.push(("^t", "Theme"));
      k.push(("Esc", if app.carousel.is_visible() { "Results" } else { "Quit" }));
      k
    }
    AppMode::Carousel => {
      vec![("h/l", "Prev/Next"), ("w", "Watched"), ("n", "Never"), ("t", "Trailer"), ("o", "Info"), ("Esc", "Filters")]
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
