use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::constants;

// --- Wire types ---

/// A single movie as returned by the discover endpoint.
///
/// The backend forwards raw TMDB objects; only `id` and `title` are required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
  pub id: u64,
  pub title: String,
  #[serde(default)]
  pub poster_path: Option<String>,
  #[serde(default)]
  pub vote_average: Option<f64>,
  #[serde(default)]
  pub vote_count: Option<u64>,
  #[serde(default)]
  pub release_date: Option<String>,
  #[serde(default)]
  pub overview: Option<String>,
  #[serde(default)]
  pub genre_ids: Vec<u64>,
}

impl Movie {
  /// Names for the movie's TMDB genre ids. Unknown ids are skipped.
  pub fn genre_names(&self) -> Vec<&'static str> {
    let c = constants();
    self.genre_ids.iter().filter_map(|id| c.genre_name(*id)).collect()
  }
}

/// JSON body for the watch-state mutation endpoints.
#[derive(Debug, Serialize)]
pub struct MovieIdBody {
  pub movie_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
  pub message: String,
  #[serde(default)]
  pub success: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TrailerResponse {
  pub success: bool,
  #[serde(default)]
  pub trailer_url: Option<String>,
  #[serde(default)]
  pub message: Option<String>,
}

/// Filter criteria for a discover request.
///
/// Fields hold the raw text the user entered; the backend validates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverQuery {
  pub genres: Vec<String>,
  pub min_rating: String,
  pub min_votes: String,
  pub release_date: String,
  /// Empty means any rating.
  pub us_certification: String,
}

impl DiscoverQuery {
  /// Query pairs in wire order. Genres repeat as `genre[]`; blank text fields are omitted
  /// so the backend default applies. `us_certification` is always sent: the backend
  /// defaults a missing one to R, and only an empty value disables the filter.
  pub fn pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs: Vec<(&'static str, String)> = self.genres.iter().map(|g| ("genre[]", g.clone())).collect();
    let text = [("min_rating", &self.min_rating), ("min_votes", &self.min_votes), ("release_date", &self.release_date)];
    for (key, value) in text {
      let v = value.trim();
      if !v.is_empty() {
        pairs.push((key, v.to_string()));
      }
    }
    pairs.push(("us_certification", self.us_certification.trim().to_string()));
    pairs
  }
}

/// Which watch-state list a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchList {
  Watched,
  NeverWatch,
}

impl WatchList {
  fn path(self) -> &'static str {
    match self {
      WatchList::Watched => "mark_watched",
      WatchList::NeverWatch => "mark_neverwatch",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      WatchList::Watched => "watched",
      WatchList::NeverWatch => "never-watch",
    }
  }

  fn failure_message(self) -> &'static str {
    match self {
      WatchList::Watched => "Error marking movie as watched.",
      WatchList::NeverWatch => "Error adding movie to Never Watch list.",
    }
  }
}

// --- URL construction ---

/// Poster URL on the image CDN, or the placeholder when the movie has no poster.
pub fn poster_url(poster_path: Option<&str>) -> String {
  let c = constants();
  match poster_path.filter(|p| !p.is_empty()) {
    Some(path) => format!("{}{}", c.poster_base_url, path),
    None => c.poster_placeholder_url.clone(),
  }
}

/// External detail page for a movie.
pub fn detail_url(movie_id: u64) -> String {
  format!("{}/{}", constants().detail_base_url, movie_id)
}

// --- Client ---

/// Thin wrapper over the discovery backend's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
  http: Client,
  base: Url,
}

impl ApiClient {
  pub fn new(base_url: &str) -> Result<Self> {
    Self::with_client(Client::new(), base_url)
  }

  pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
    let mut base = Url::parse(base_url.trim()).with_context(|| format!("Invalid server URL '{}'", base_url))?;
    if base.cannot_be_a_base() {
      return Err(anyhow!("Server URL '{}' cannot carry endpoint paths", base_url));
    }
    // Endpoints are joined relative to the base, which needs a trailing slash to keep its path.
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }
    Ok(Self { http, base })
  }

  pub fn base_url(&self) -> &str {
    self.base.as_str()
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self.base.join(path).with_context(|| format!("Failed to build URL for '{}'", path))
  }

  /// Build the full discover URL, query string included.
  pub fn discover_url(&self, query: &DiscoverQuery) -> Result<Url> {
    let mut url = self.endpoint("discover")?;
    {
      let mut qp = url.query_pairs_mut();
      for (key, value) in query.pairs() {
        qp.append_pair(key, &value);
      }
    }
    Ok(url)
  }

  pub async fn discover(&self, query: &DiscoverQuery) -> Result<Vec<Movie>> {
    let url = self.discover_url(query)?;
    debug!(url = %url, "discover request");
    let response = self
      .http
      .get(url)
      .send()
      .await
      .context("Discover request failed")?
      .error_for_status()
      .context("Discover endpoint returned an error")?;
    response.json::<Vec<Movie>>().await.context("Failed to parse discover response")
  }

  pub async fn mark(&self, list: WatchList, movie_id: u64) -> Result<MessageResponse> {
    let url = self.endpoint(list.path())?;
    debug!(url = %url, movie_id, "mark request");
    let response = self
      .http
      .post(url)
      .json(&MovieIdBody { movie_id })
      .send()
      .await
      .with_context(|| format!("Mark {} request failed", list.label()))?
      .error_for_status()
      .with_context(|| format!("Mark {} endpoint returned an error", list.label()))?;
    response.json::<MessageResponse>().await.context("Failed to parse mark response")
  }

  pub async fn trailer(&self, movie_id: u64) -> Result<TrailerResponse> {
    let mut url = self.endpoint("get_trailer")?;
    url.query_pairs_mut().append_pair("movie_id", &movie_id.to_string());
    debug!(url = %url, "trailer request");
    let response = self
      .http
      .get(url)
      .send()
      .await
      .context("Trailer request failed")?
      .error_for_status()
      .context("Trailer endpoint returned an error")?;
    response.json::<TrailerResponse>().await.context("Failed to parse trailer response")
  }
}

// --- Outcome interpretation ---

/// What the UI should do once an action request completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
  /// Server-provided confirmation, shown verbatim.
  Message(String),
  /// User-facing failure notice.
  Failed(String),
  /// Open this URL in the browser.
  OpenUrl(String),
}

pub fn mark_outcome(list: WatchList, result: &Result<MessageResponse>) -> ActionOutcome {
  match result {
    Ok(resp) => ActionOutcome::Message(resp.message.clone()),
    Err(_) => ActionOutcome::Failed(list.failure_message().to_string()),
  }
}

pub fn trailer_outcome(result: &Result<TrailerResponse>) -> ActionOutcome {
  const NOT_FOUND: &str = "Trailer not found.";
  match result {
    Ok(TrailerResponse { success: true, trailer_url: Some(url), .. }) if !url.is_empty() => {
      ActionOutcome::OpenUrl(url.clone())
    }
    Ok(TrailerResponse { success: false, message: Some(msg), .. }) => ActionOutcome::Message(msg.clone()),
    Ok(_) | Err(_) => ActionOutcome::Failed(NOT_FOUND.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;
  use tokio::task::JoinHandle;

  fn movie_json() -> &'static str {
    r#"[
      {"id": 603, "title": "The Matrix", "poster_path": "/matrix.jpg", "vote_average": 8.2, "adult": false, "genre_ids": [28, 878, 1]},
      {"id": 27205, "title": "Inception", "poster_path": null}
    ]"#
  }

  fn test_client(base: &str) -> ApiClient {
    let http = Client::builder().no_proxy().build().unwrap();
    ApiClient::with_client(http, base).unwrap()
  }

  /// Serve exactly one canned HTTP response; the handle yields the raw request.
  async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
      let (mut sock, _) = listener.accept().await.unwrap();
      let mut buf = Vec::new();
      let mut chunk = [0u8; 4096];
      loop {
        let n = sock.read(&mut chunk).await.unwrap();
        if n == 0 {
          break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
          let content_length = text[..header_end]
            .lines()
            .find_map(|l| {
              let (name, value) = l.split_once(':')?;
              name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
            })
            .unwrap_or(0);
          if buf.len() >= header_end + 4 + content_length {
            break;
          }
        }
      }
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
      );
      sock.write_all(response.as_bytes()).await.unwrap();
      sock.shutdown().await.ok();
      String::from_utf8_lossy(&buf).to_string()
    });
    (format!("http://{}", addr), handle)
  }

  // --- Movie parsing ---

  #[test]
  fn movie_parses_tmdb_shape() {
    let movies: Vec<Movie> = serde_json::from_str(movie_json()).unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].poster_path.as_deref(), Some("/matrix.jpg"));
    assert_eq!(movies[0].vote_average, Some(8.2));
    assert_eq!(movies[1].poster_path, None);
    assert_eq!(movies[1].release_date, None);
    assert!(movies[1].genre_ids.is_empty());
  }

  #[test]
  fn genre_ids_resolve_to_names() {
    let movies: Vec<Movie> = serde_json::from_str(movie_json()).unwrap();
    assert_eq!(movies[0].genre_names(), vec!["Action", "Science Fiction"]);
    assert!(movies[1].genre_names().is_empty());
  }

  // --- URL construction ---

  #[test]
  fn poster_url_uses_cdn_template() {
    assert_eq!(poster_url(Some("/abc.jpg")), "https://image.tmdb.org/t/p/w500/abc.jpg");
  }

  #[test]
  fn poster_url_falls_back_to_placeholder() {
    assert_eq!(poster_url(None), "https://via.placeholder.com/500x750?text=No+Image");
    assert_eq!(poster_url(Some("")), "https://via.placeholder.com/500x750?text=No+Image");
  }

  #[test]
  fn detail_url_points_at_movie_page() {
    assert_eq!(detail_url(603), "https://www.themoviedb.org/movie/603");
  }

  #[test]
  fn base_url_gains_trailing_slash() {
    let client = test_client("http://localhost:5321/app");
    assert_eq!(client.base_url(), "http://localhost:5321/app/");
    assert_eq!(client.endpoint("discover").unwrap().as_str(), "http://localhost:5321/app/discover");
  }

  #[test]
  fn invalid_base_url_is_rejected() {
    assert!(ApiClient::new("not a url").is_err());
    assert!(ApiClient::new("mailto:someone@example.com").is_err());
  }

  // --- Query serialization ---

  #[test]
  fn query_repeats_genres_and_omits_blank_text() {
    let query = DiscoverQuery {
      genres: vec!["Action".into(), "Science Fiction".into()],
      min_rating: " 7.5 ".into(),
      min_votes: String::new(),
      release_date: "2021-01-01".into(),
      us_certification: String::new(),
    };
    assert_eq!(
      query.pairs(),
      vec![
        ("genre[]", "Action".to_string()),
        ("genre[]", "Science Fiction".to_string()),
        ("min_rating", "7.5".to_string()),
        ("release_date", "2021-01-01".to_string()),
        ("us_certification", String::new()),
      ]
    );
  }

  #[test]
  fn discover_url_encodes_repeated_genre_param() {
    let client = test_client("http://localhost:5321");
    let query = DiscoverQuery {
      genres: vec!["Drama".into(), "War".into()],
      us_certification: "PG-13".into(),
      ..Default::default()
    };
    let url = client.discover_url(&query).unwrap();
    assert_eq!(url.path(), "/discover");
    assert_eq!(url.query(), Some("genre%5B%5D=Drama&genre%5B%5D=War&us_certification=PG-13"));
  }

  // --- Outcome interpretation ---

  #[test]
  fn mark_success_shows_server_message() {
    let resp = Ok(MessageResponse { message: "Movie marked as watched.".into(), success: Some(true) });
    assert_eq!(mark_outcome(WatchList::Watched, &resp), ActionOutcome::Message("Movie marked as watched.".into()));
  }

  #[test]
  fn mark_failure_shows_generic_notice() {
    let err: Result<MessageResponse> = Err(anyhow!("connection refused"));
    assert_eq!(
      mark_outcome(WatchList::NeverWatch, &err),
      ActionOutcome::Failed("Error adding movie to Never Watch list.".into())
    );
    assert_eq!(mark_outcome(WatchList::Watched, &err), ActionOutcome::Failed("Error marking movie as watched.".into()));
  }

  #[test]
  fn trailer_success_opens_url() {
    let resp = Ok(TrailerResponse {
      success: true,
      trailer_url: Some("https://www.youtube.com/watch?v=abc".into()),
      message: None,
    });
    assert_eq!(trailer_outcome(&resp), ActionOutcome::OpenUrl("https://www.youtube.com/watch?v=abc".into()));
  }

  #[test]
  fn trailer_unsuccessful_shows_server_message() {
    let resp = Ok(TrailerResponse { success: false, trailer_url: None, message: Some("No trailer".into()) });
    assert_eq!(trailer_outcome(&resp), ActionOutcome::Message("No trailer".into()));
  }

  #[test]
  fn trailer_transport_failure_is_not_found() {
    let err: Result<TrailerResponse> = Err(anyhow!("timed out"));
    assert_eq!(trailer_outcome(&err), ActionOutcome::Failed("Trailer not found.".into()));
    let no_url = Ok(TrailerResponse { success: true, trailer_url: None, message: None });
    assert_eq!(trailer_outcome(&no_url), ActionOutcome::Failed("Trailer not found.".into()));
  }

  // --- Client against a local server ---

  #[tokio::test]
  async fn discover_sends_query_and_parses_movies() {
    let (base, server) = serve_once("200 OK", movie_json()).await;
    let client = test_client(&base);
    let query = DiscoverQuery { genres: vec!["Romance".into()], min_votes: "150".into(), ..Default::default() };

    let movies = client.discover(&query).await.unwrap();
    assert_eq!(movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![603, 27205]);

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /discover?genre%5B%5D=Romance&min_votes=150&us_certification= HTTP/1.1"));
  }

  #[tokio::test]
  async fn discover_empty_array_is_empty_result() {
    let (base, server) = serve_once("200 OK", "[]").await;
    let movies = test_client(&base).discover(&DiscoverQuery::default()).await.unwrap();
    assert!(movies.is_empty());
    server.await.unwrap();
  }

  #[tokio::test]
  async fn discover_server_error_is_err() {
    let (base, server) = serve_once("500 Internal Server Error", "{}").await;
    assert!(test_client(&base).discover(&DiscoverQuery::default()).await.is_err());
    server.await.unwrap();
  }

  #[tokio::test]
  async fn mark_watched_posts_movie_id_json() {
    let (base, server) = serve_once("200 OK", r#"{"success": true, "message": "Movie marked as watched."}"#).await;
    let resp = test_client(&base).mark(WatchList::Watched, 603).await.unwrap();
    assert_eq!(resp.message, "Movie marked as watched.");
    assert_eq!(resp.success, Some(true));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /mark_watched HTTP/1.1"));
    assert!(request.to_lowercase().contains("content-type: application/json"));
    assert!(request.ends_with(r#"{"movie_id":603}"#));
  }

  #[tokio::test]
  async fn mark_neverwatch_bad_request_is_err() {
    let (base, server) = serve_once("400 Bad Request", r#"{"success": false, "message": "Invalid movie ID."}"#).await;
    let result = test_client(&base).mark(WatchList::NeverWatch, 1).await;
    assert_eq!(
      mark_outcome(WatchList::NeverWatch, &result),
      ActionOutcome::Failed("Error adding movie to Never Watch list.".into())
    );
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /mark_neverwatch HTTP/1.1"));
  }

  #[tokio::test]
  async fn trailer_requests_by_movie_id() {
    let (base, server) = serve_once("200 OK", r#"{"success": false, "message": "No trailer"}"#).await;
    let result = test_client(&base).trailer(27205).await;
    assert_eq!(trailer_outcome(&result), ActionOutcome::Message("No trailer".into()));
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /get_trailer?movie_id=27205 HTTP/1.1"));
  }

  #[tokio::test]
  async fn trailer_not_found_status_is_generic_notice() {
    let (base, server) = serve_once("404 Not Found", r#"{"success": false, "message": "No trailer found."}"#).await;
    let result = test_client(&base).trailer(1).await;
    assert_eq!(trailer_outcome(&result), ActionOutcome::Failed("Trailer not found.".into()));
    server.await.unwrap();
  }
}
