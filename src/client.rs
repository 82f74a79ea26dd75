//! Remote timesheet operations against the Kimai API

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::Config;
use crate::models::{Task, TaskId, TimesheetRecord};

pub type Result<T> = std::result::Result<T, ClientError>;

const AUTH_USER_HEADER: &str = "x-auth-user";
const AUTH_TOKEN_HEADER: &str = "x-auth-token";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("credentials rejected ({0})")]
    Auth(StatusCode),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid client setup: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// The four operations the tray needs from the time-tracking service.
///
/// "Nothing running" is `Ok(None)` from [`TaskBackend::fetch_active`], never an error.
pub trait TaskBackend: Send + Sync {
    /// Most recently used tasks, newest first.
    fn fetch_recent(&self, limit: usize) -> Result<Vec<Task>>;
    fn fetch_active(&self) -> Result<Option<Task>>;
    fn restart(&self, id: TaskId) -> Result<()>;
    fn stop(&self, id: TaskId) -> Result<()>;
}

#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    http: Client,
}

impl HttpClient {
    /// Build a client that sends the configured credentials with every request.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(AUTH_USER_HEADER),
            header_value(&config.user, false)?,
        );
        headers.insert(
            HeaderName::from_static(AUTH_TOKEN_HEADER),
            header_value(&config.token, true)?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("kimai-tray/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get_tasks(&self, path: &str) -> Result<Vec<Task>> {
        let url = self.endpoint(path);
        log::debug!("GET {url}");
        let response = check_status(self.http.get(&url).send()?)?;
        let body = response.text()?;
        let records: Vec<TimesheetRecord> =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(records.into_iter().map(Task::from).collect())
    }

    fn patch(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path);
        log::debug!("PATCH {url}");
        check_status(self.http.patch(&url).send()?)?;
        Ok(())
    }
}

fn header_value(value: &str, sensitive: bool) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value.trim())
        .map_err(|e| ClientError::Setup(format!("credential header: {e}")))?;
    value.set_sensitive(sensitive);
    Ok(value)
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::Auth(status));
    }
    if !status.is_success() {
        return Err(ClientError::Transport(format!(
            "{} returned {}",
            response.url(),
            status
        )));
    }
    Ok(response)
}

impl TaskBackend for HttpClient {
    fn fetch_recent(&self, limit: usize) -> Result<Vec<Task>> {
        let tasks = self.get_tasks(&format!("recent?size={limit}"))?;
        Ok(tasks.into_iter().map(Task::without_start).collect())
    }

    fn fetch_active(&self) -> Result<Option<Task>> {
        let tasks = self.get_tasks("active")?;
        if tasks.len() > 1 {
            log::debug!("{} active timesheets, showing the first", tasks.len());
        }
        Ok(tasks.into_iter().next())
    }

    fn restart(&self, id: TaskId) -> Result<()> {
        self.patch(&format!("{}/restart", id.0))
    }

    fn stop(&self, id: TaskId) -> Result<()> {
        self.patch(&format!("{}/stop", id.0))
    }
}
