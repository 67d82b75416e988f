use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::api::{ActionOutcome, ApiClient, Movie, WatchList, detail_url, mark_outcome, trailer_outcome};
use crate::browser;
use crate::carousel::{Carousel, SearchOutcome, SearchTicket};
use crate::config::Config;
use crate::constants::constants;
use crate::filters::FilterForm;
use crate::theme::{THEMES, Theme, theme_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Filter,
  Carousel,
}

/// User intents the controller responds to. Key bindings map onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Submit,
  Prev,
  Next,
  MarkWatched,
  MarkNeverWatch,
  Trailer,
  MoreInfo,
}

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) search_rx: Option<(SearchTicket, oneshot::Receiver<Result<Vec<Movie>>>)>,
  /// One receiver per action request not yet answered.
  pub(crate) action_rxs: Vec<oneshot::Receiver<ActionOutcome>>,
}

impl AsyncTasks {
  pub(crate) fn actions_in_flight(&self) -> usize {
    self.action_rxs.len()
  }
}

pub struct App {
  pub mode: AppMode,
  pub form: FilterForm,
  pub carousel: Carousel,
  pub api: ApiClient,
  pub theme_index: usize,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  /// Informational message: shown with info icon, lower priority than status/error.
  pub info_message: Option<String>,
  pub should_quit: bool,
  pub(crate) tasks: AsyncTasks,
  config: Config,
  error_time: Option<Instant>,
  info_time: Option<Instant>,
}

impl App {
  pub fn new(api: ApiClient, config: Config) -> Self {
    Self {
      mode: AppMode::Filter,
      form: FilterForm::new(),
      carousel: Carousel::new(),
      api,
      theme_index: theme_index(config.theme_name.as_deref()),
      last_error: None,
      status_message: None,
      info_message: None,
      should_quit: false,
      tasks: AsyncTasks::default(),
      config,
      error_time: None,
      info_time: None,
    }
  }

  pub fn theme(&self) -> &'static Theme {
    // theme_index() and next_theme() keep the index in range.
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  pub fn set_info(&mut self, msg: String) {
    self.info_message = Some(msg);
    self.info_time = Some(Instant::now());
  }

  /// Clear stale error and info messages.
  pub fn expire_messages(&mut self) {
    let ttl = Duration::from_secs(constants().error_dismiss_secs);
    if self.error_time.is_some_and(|t| t.elapsed() >= ttl) {
      self.clear_error();
    }
    if self.info_time.is_some_and(|t| t.elapsed() >= ttl) {
      self.info_message = None;
      self.info_time = None;
    }
  }

  pub fn dispatch(&mut self, action: Action) {
    debug!(?action, "dispatch");
    match action {
      Action::Submit => self.trigger_search(),
      Action::Prev => {
        self.carousel.prev();
      }
      Action::Next => {
        self.carousel.next();
      }
      Action::MarkWatched => self.trigger_mark(WatchList::Watched),
      Action::MarkNeverWatch => self.trigger_mark(WatchList::NeverWatch),
      Action::Trailer => self.trigger_trailer(),
      Action::MoreInfo => {
        if let Some(id) = self.centered_movie_id() {
          self.open_url(&detail_url(id));
        }
      }
    }
  }

  fn centered_movie_id(&self) -> Option<u64> {
    if !self.carousel.is_visible() {
      return None;
    }
    self.carousel.current().map(|m| m.id)
  }

  fn open_url(&mut self, url: &str) {
    if let Err(e) = browser::open_url(url) {
      warn!(err = %e, url = %url, "browser open failed");
      self.set_error(format!("Failed to open browser: {:#}", e));
    }
  }

  pub fn trigger_search(&mut self) {
    let query = self.form.to_query();
    let ticket = self.carousel.begin_search();
    info!(?ticket, genres = ?query.genres, "search triggered");
    self.clear_error();
    self.status_message = Some("Searching…".to_string());

    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(api.discover(&query).await);
    });
    // Dropping any previous receiver discards its response.
    self.tasks.search_rx = Some((ticket, rx));
  }

  fn trigger_mark(&mut self, list: WatchList) {
    let Some(movie_id) = self.centered_movie_id() else { return };
    info!(movie_id, list = list.label(), "mark requested");
    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    self.tasks.action_rxs.push(rx);
    tokio::spawn(async move {
      let result = api.mark(list, movie_id).await;
      match &result {
        Ok(resp) => debug!(movie_id, success = ?resp.success, "mark completed"),
        Err(e) => warn!(movie_id, err = %format!("{:#}", e), "mark failed"),
      }
      let _ = tx.send(mark_outcome(list, &result));
    });
  }

  fn trigger_trailer(&mut self) {
    let Some(movie_id) = self.centered_movie_id() else { return };
    info!(movie_id, "trailer requested");
    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    self.tasks.action_rxs.push(rx);
    tokio::spawn(async move {
      let result = api.trailer(movie_id).await;
      if let Err(e) = &result {
        warn!(movie_id, err = %format!("{:#}", e), "trailer lookup failed");
      }
      let _ = tx.send(trailer_outcome(&result));
    });
  }

  /// Poll in-flight tasks and fold their results into state. Called once per UI tick.
  pub fn check_pending(&mut self) {
    if let Some((ticket, mut rx)) = self.tasks.search_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.status_message = None;
          self.finish_search(ticket, result);
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.search_rx = Some((ticket, rx));
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.set_error("Search task failed.".to_string());
        }
      }
    }

    let mut still_pending = Vec::new();
    for mut rx in std::mem::take(&mut self.tasks.action_rxs) {
      match rx.try_recv() {
        Ok(outcome) => self.apply_action_outcome(outcome),
        Err(oneshot::error::TryRecvError::Empty) => still_pending.push(rx),
        Err(oneshot::error::TryRecvError::Closed) => {
          warn!("action task ended without a result");
          self.set_error("Request task failed.".to_string());
        }
      }
    }
    self.tasks.action_rxs = still_pending;
  }

  pub(crate) fn finish_search(&mut self, ticket: SearchTicket, result: Result<Vec<Movie>>) {
    match result {
      Ok(movies) => match self.carousel.apply_results(ticket, movies) {
        SearchOutcome::Stale => {
          debug!(?ticket, "dropping stale discover response");
        }
        SearchOutcome::Empty => {
          info!("search returned no results");
          self.set_info("No movies found.".to_string());
          self.mode = AppMode::Filter;
        }
        SearchOutcome::Loaded { count, cursor } => {
          info!(count, cursor, "search results loaded");
          self.mode = AppMode::Carousel;
        }
      },
      Err(e) => {
        warn!(err = %format!("{:#}", e), "search failed");
        self.set_error(format!("Search failed: {:#}", e));
      }
    }
  }

  pub(crate) fn apply_action_outcome(&mut self, outcome: ActionOutcome) {
    match outcome {
      ActionOutcome::Message(msg) => self.set_info(msg),
      ActionOutcome::Failed(msg) => self.set_error(msg),
      ActionOutcome::OpenUrl(url) => self.open_url(&url),
    }
  }
}
