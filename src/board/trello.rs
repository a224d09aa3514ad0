//! Trello REST integration.
//!
//! Implements [`Board`] against the Trello REST API using a blocking client.
//! Requests are authenticated with the `key` and `token` query parameters.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Board, BoardCard, BoardError, BoardLabel, BoardList, BoardResult};
use crate::core::BoardConfig;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "TRELLO_API_KEY";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "TRELLO_TOKEN";

/// Trello API credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct TrelloCredentials {
    /// Developer API key
    pub api_key: String,

    /// Member token
    pub token: String,

    /// OAuth secret, unused by the REST client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,

    /// OAuth token secret, unused by the REST client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<String>,
}

impl std::fmt::Debug for TrelloCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrelloCredentials")
            .field("api_key", &"***")
            .field("token", &"***")
            .finish_non_exhaustive()
    }
}

/// Error type for credential loading.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// Credentials file could not be read
    #[error("Failed to read credentials file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credentials file is not valid JSON
    #[error("Invalid credentials file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No file and no environment variables
    #[error("No Trello credentials: pass a credentials file or set {API_KEY_ENV} and {TOKEN_ENV}")]
    Missing,
}

/// Result type for credential loading.
pub type CredentialsResult<T> = Result<T, CredentialsError>;

impl TrelloCredentials {
    /// Load credentials from a JSON file.
    pub fn load(path: &Path) -> CredentialsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| CredentialsError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&content).map_err(|source| CredentialsError::Parse { path: path.to_path_buf(), source })
    }

    /// Parse credentials from JSON text.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Read credentials from `TRELLO_API_KEY` and `TRELLO_TOKEN`.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|v| !v.is_empty())?;
        let token = std::env::var(TOKEN_ENV).ok().filter(|v| !v.is_empty())?;
        Some(Self { api_key, token, api_secret: None, token_secret: None })
    }

    /// Load from `path` when given, falling back to the environment.
    pub fn resolve(path: Option<&Path>) -> CredentialsResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::from_env().ok_or(CredentialsError::Missing),
        }
    }
}

/// A board as listed for the member.
#[derive(Debug, Deserialize)]
struct BoardSummary {
    id: String,
    name: String,
}

/// Trello board client.
pub struct TrelloBoard {
    /// API base URL
    base_url: String,

    /// Credentials
    credentials: TrelloCredentials,

    /// Selected board ID
    board_id: String,

    /// HTTP client
    client: reqwest::blocking::Client,
}

impl TrelloBoard {
    /// Connect and select a board.
    ///
    /// The board named in the configuration is used, or the member's first
    /// open board when no name is configured.
    pub fn connect(config: &BoardConfig, credentials: TrelloCredentials) -> BoardResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("taskboard/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut board = Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            credentials,
            board_id: String::new(),
            client,
        };

        let boards: Vec<BoardSummary> =
            board.request(Method::GET, "/members/me/boards", &[("filter", "open"), ("fields", "name")])?;
        let selected = select_board(boards, config.name.as_deref())?;
        tracing::debug!(board = %selected.name, id = %selected.id, "selected board");
        board.board_id = selected.id;

        Ok(board)
    }

    /// ID of the selected board.
    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Make an authenticated request, sending `params` as query or form data.
    fn send(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> BoardResult<reqwest::blocking::Response> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "board request");

        let auth = [("key", self.credentials.api_key.as_str()), ("token", self.credentials.token.as_str())];
        let builder = self.client.request(method.clone(), &url).query(&auth);
        let builder = if method == Method::GET {
            builder.query(params)
        } else {
            builder.form(params)
        };

        Ok(builder.send()?)
    }

    fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> BoardResult<T> {
        let response = self.send(method, path, params)?;
        handle_response(response)
    }

    /// Make a request whose response body is not needed.
    fn execute(&self, method: Method, path: &str, params: &[(&str, &str)]) -> BoardResult<()> {
        let _: serde_json::Value = self.request(method, path, params)?;
        Ok(())
    }
}

/// Handle API response.
fn handle_response<T: DeserializeOwned>(response: reqwest::blocking::Response) -> BoardResult<T> {
    let status = response.status();

    if status.is_success() {
        response.json().map_err(|e| BoardError::InvalidResponse(e.to_string()))
    } else {
        let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());

        match status.as_u16() {
            401 | 403 => Err(BoardError::Auth(message)),
            404 => Err(BoardError::NotFound(message)),
            code => Err(BoardError::Api { status: code, message }),
        }
    }
}

/// Pick the board to work on from the member's open boards.
fn select_board(boards: Vec<BoardSummary>, name: Option<&str>) -> BoardResult<BoardSummary> {
    match name {
        Some(name) => boards
            .into_iter()
            .find(|b| b.name == name)
            .ok_or_else(|| BoardError::NoBoard(name.to_string())),
        None => boards.into_iter().next().ok_or_else(|| BoardError::NoBoard("*".to_string())),
    }
}

impl Board for TrelloBoard {
    fn open_cards(&self) -> BoardResult<Vec<BoardCard>> {
        self.request(Method::GET, &format!("/boards/{}/cards/open", self.board_id), &[])
    }

    fn open_lists(&self) -> BoardResult<Vec<BoardList>> {
        self.request(Method::GET, &format!("/boards/{}/lists", self.board_id), &[("filter", "open")])
    }

    fn labels(&self) -> BoardResult<Vec<BoardLabel>> {
        self.request(Method::GET, &format!("/boards/{}/labels", self.board_id), &[])
    }

    fn create_card(
        &mut self,
        list_id: &str,
        name: &str,
        description: &str,
    ) -> BoardResult<BoardCard> {
        self.request(
            Method::POST,
            "/cards",
            &[("idList", list_id), ("name", name), ("desc", description), ("pos", "bottom")],
        )
    }

    fn change_list(&mut self, card_id: &str, list_id: &str) -> BoardResult<()> {
        self.execute(Method::PUT, &format!("/cards/{card_id}"), &[("idList", list_id)])
    }

    fn set_description(&mut self, card_id: &str, description: &str) -> BoardResult<()> {
        self.execute(Method::PUT, &format!("/cards/{card_id}"), &[("desc", description)])
    }

    fn add_label(&mut self, card_id: &str, label_id: &str) -> BoardResult<()> {
        self.execute(Method::POST, &format!("/cards/{card_id}/idLabels"), &[("value", label_id)])
    }

    fn remove_label(&mut self, card_id: &str, label_id: &str) -> BoardResult<()> {
        self.execute(Method::DELETE, &format!("/cards/{card_id}/idLabels/{label_id}"), &[])
    }

    fn delete_card(&mut self, card_id: &str) -> BoardResult<()> {
        self.execute(Method::DELETE, &format!("/cards/{card_id}"), &[])
    }

    fn refresh_card(&self, card_id: &str) -> BoardResult<BoardCard> {
        self.request(Method::GET, &format!("/cards/{card_id}"), &[])
    }
}
