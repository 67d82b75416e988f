use ratatui::style::Color;

/// Colour palette for the whole UI.
#[derive(Debug)]
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub status: Color,
  pub info: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "Matinee",
    bg: Color::Rgb(24, 22, 30),
    fg: Color::Rgb(226, 222, 233),
    accent: Color::Rgb(242, 181, 68),
    muted: Color::Rgb(128, 122, 140),
    border: Color::Rgb(70, 64, 84),
    highlight_fg: Color::Rgb(24, 22, 30),
    highlight_bg: Color::Rgb(242, 181, 68),
    status: Color::Rgb(137, 196, 244),
    info: Color::Rgb(152, 214, 160),
    error: Color::Rgb(240, 113, 120),
    key_fg: Color::Rgb(24, 22, 30),
    key_bg: Color::Rgb(128, 122, 140),
  },
  Theme {
    name: "Noir",
    bg: Color::Rgb(10, 10, 10),
    fg: Color::Rgb(220, 220, 220),
    accent: Color::Rgb(255, 255, 255),
    muted: Color::Rgb(120, 120, 120),
    border: Color::Rgb(60, 60, 60),
    highlight_fg: Color::Rgb(10, 10, 10),
    highlight_bg: Color::Rgb(220, 220, 220),
    status: Color::Rgb(180, 180, 180),
    info: Color::Rgb(200, 200, 200),
    error: Color::Rgb(230, 90, 90),
    key_fg: Color::Rgb(10, 10, 10),
    key_bg: Color::Rgb(150, 150, 150),
  },
  Theme {
    name: "Technicolor",
    bg: Color::Rgb(16, 28, 36),
    fg: Color::Rgb(230, 240, 236),
    accent: Color::Rgb(255, 94, 135),
    muted: Color::Rgb(110, 140, 150),
    border: Color::Rgb(46, 80, 92),
    highlight_fg: Color::Rgb(16, 28, 36),
    highlight_bg: Color::Rgb(92, 225, 200),
    status: Color::Rgb(92, 225, 200),
    info: Color::Rgb(170, 230, 120),
    error: Color::Rgb(255, 120, 90),
    key_fg: Color::Rgb(16, 28, 36),
    key_bg: Color::Rgb(110, 140, 150),
  },
];

/// Index of the named theme, falling back to the first.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name == n)).unwrap_or(0)
}
