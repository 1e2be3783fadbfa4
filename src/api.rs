//! Client for the remote task/auth/user API.
//!
//! Every response is expected in the `{ success, message?, data? }` envelope.
//! Authenticated calls carry `Authorization: Bearer <token>` whenever the
//! session holds one.

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;
use crate::session::Session;
use crate::task::{Task, TaskDraft};
use crate::user::{AuthPayload, Credentials, NewUser, ProfileUpdate, User};

#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl Envelope {
    fn check(self, status: StatusCode, confirm: Confirm) -> Result<Self, ApiError> {
        if self.success == Some(false) {
            return Err(ApiError::Rejected {
                message: self.message,
            });
        }
        if !status.is_success() {
            return Err(match self.message {
                Some(message) => ApiError::Rejected {
                    message: Some(message),
                },
                None => ApiError::Status(status),
            });
        }
        if confirm == Confirm::Explicit && self.success != Some(true) {
            return Err(ApiError::Rejected {
                message: self.message,
            });
        }
        Ok(self)
    }

    fn data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self.data {
            None | Some(Value::Null) => Err(ApiError::MissingData),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }
}

/// How a response proves success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirm {
    /// Anything but `success: false` on a 2xx status.
    Lenient,
    /// Requires `success: true`.
    Explicit,
}

/// One API call, as issued by a screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Login(Credentials),
    Signup(NewUser),
    ForgotPassword { email: String },
    ResetPassword { token: String, password: String },
    ListTasks,
    GetTask(String),
    CreateTask(TaskDraft),
    UpdateTask(String, TaskDraft),
    DeleteTask(String),
    CurrentUser,
    UpdateUser(ProfileUpdate),
}

/// Data-free tag of a [`Request`], used to route replies back to screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Login,
    Signup,
    ForgotPassword,
    ResetPassword,
    ListTasks,
    GetTask,
    CreateTask,
    UpdateTask,
    DeleteTask,
    CurrentUser,
    UpdateUser,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Login(_) => RequestKind::Login,
            Request::Signup(_) => RequestKind::Signup,
            Request::ForgotPassword { .. } => RequestKind::ForgotPassword,
            Request::ResetPassword { .. } => RequestKind::ResetPassword,
            Request::ListTasks => RequestKind::ListTasks,
            Request::GetTask(_) => RequestKind::GetTask,
            Request::CreateTask(_) => RequestKind::CreateTask,
            Request::UpdateTask(..) => RequestKind::UpdateTask,
            Request::DeleteTask(_) => RequestKind::DeleteTask,
            Request::CurrentUser => RequestKind::CurrentUser,
            Request::UpdateUser(_) => RequestKind::UpdateUser,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Login or signup went through; the token, if the API issued one.
    Authenticated(Option<String>),
    Done,
    Tasks(Vec<Task>),
    Task(Task),
    User(User),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Result<Self, url::ParseError> {
        let base = Url::parse(base_url.trim())?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn execute(&self, request: Request) -> Result<Reply, ApiError> {
        match request {
            Request::Login(credentials) => self.login(&credentials).await.map(Reply::Authenticated),
            Request::Signup(user) => self.signup(&user).await.map(Reply::Authenticated),
            Request::ForgotPassword { email } => {
                self.forgot_password(&email).await.map(|()| Reply::Done)
            }
            Request::ResetPassword { token, password } => self
                .reset_password(&token, &password)
                .await
                .map(|()| Reply::Done),
            Request::ListTasks => self.list_tasks().await.map(Reply::Tasks),
            Request::GetTask(id) => self.get_task(&id).await.map(Reply::Task),
            Request::CreateTask(draft) => self.create_task(&draft).await.map(|()| Reply::Done),
            Request::UpdateTask(id, draft) => {
                self.update_task(&id, &draft).await.map(|()| Reply::Done)
            }
            Request::DeleteTask(id) => self.delete_task(&id).await.map(|()| Reply::Done),
            Request::CurrentUser => self.current_user().await.map(Reply::User),
            Request::UpdateUser(update) => self.update_user(&update).await.map(|()| Reply::Done),
        }
    }

    /// Returns the issued token.
    pub async fn login(&self, credentials: &Credentials) -> Result<Option<String>, ApiError> {
        let request = self.http.post(self.endpoint(&["auth", "login"])).json(credentials);
        let payload: AuthPayload = self.send(request, Confirm::Lenient).await?.data()?;
        match payload.token {
            Some(token) => Ok(Some(token)),
            None => Err(ApiError::MissingData),
        }
    }

    /// Signup may or may not hand back a token.
    pub async fn signup(&self, user: &NewUser) -> Result<Option<String>, ApiError> {
        let request = self.http.post(self.endpoint(&["users"])).json(user);
        let envelope = self.send(request, Confirm::Lenient).await?;
        Ok(envelope
            .data::<AuthPayload>()
            .ok()
            .and_then(|payload| payload.token))
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.endpoint(&["auth", "forgot-password"]))
            .json(&serde_json::json!({ "email": email }));
        self.send(request, Confirm::Explicit).await.map(drop)
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.endpoint(&["auth", "reset-password", token]))
            .json(&serde_json::json!({ "newPassword": password }));
        self.send(request, Confirm::Explicit).await.map(drop)
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let request = self.authorized(self.http.get(self.endpoint(&["tasks", ""])));
        self.send(request, Confirm::Lenient).await?.data()
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, ApiError> {
        let request = self.authorized(self.http.get(self.endpoint(&["tasks", id])));
        self.send(request, Confirm::Lenient).await?.data()
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<(), ApiError> {
        let request = self.authorized(self.http.post(self.endpoint(&["tasks"])).json(draft));
        self.send(request, Confirm::Lenient).await.map(drop)
    }

    pub async fn update_task(&self, id: &str, draft: &TaskDraft) -> Result<(), ApiError> {
        let request = self.authorized(self.http.put(self.endpoint(&["tasks", id])).json(draft));
        self.send(request, Confirm::Lenient).await.map(drop)
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let request = self.authorized(self.http.delete(self.endpoint(&["tasks", id])));
        self.send(request, Confirm::Lenient).await.map(drop)
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        let request = self.authorized(self.http.get(self.endpoint(&["users", "userById"])));
        self.send(request, Confirm::Lenient).await?.data()
    }

    /// Sends the profile as multipart so a photo file can ride along.
    pub async fn update_user(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        let mut form = Form::new()
            .text("name", update.name.clone())
            .text("email", update.email.clone())
            .text("password", update.password.clone());

        if let Some(path) = &update.photo {
            let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
                path: path.display().to_string(),
                source,
            })?;
            let file_name = path
                .file_name()
                .map_or_else(|| "photo".to_string(), |n| n.to_string_lossy().into_owned());
            form = form.part("fotoperfil", Part::bytes(bytes).file_name(file_name));
        }

        let request = self.authorized(self.http.put(self.endpoint(&["users"])).multipart(form));
        self.send(request, Confirm::Lenient).await.map(drop)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, confirm: Confirm) -> Result<Envelope, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?;
        tracing::debug!(%url, %status, bytes = body.len(), "api response");

        let envelope = if body.iter().all(u8::is_ascii_whitespace) {
            Envelope::default()
        } else {
            match serde_json::from_slice::<Envelope>(&body) {
                Ok(envelope) => envelope,
                Err(_) if !status.is_success() => return Err(ApiError::Status(status)),
                Err(err) => return Err(err.into()),
            }
        };
        envelope.check(status, confirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Session::default()).unwrap()
    }

    #[test]
    fn endpoint_joins_under_base_path() {
        let api = client("http://localhost:3000/api/");
        assert_eq!(
            api.endpoint(&["auth", "login"]).as_str(),
            "http://localhost:3000/api/auth/login"
        );
        let api = client("http://localhost:3000");
        assert_eq!(api.endpoint(&["tasks", ""]).as_str(), "http://localhost:3000/tasks/");
    }

    #[test]
    fn endpoint_escapes_dynamic_segments() {
        let api = client("http://localhost:3000");
        assert_eq!(
            api.endpoint(&["auth", "reset-password", "a/b c"]).as_str(),
            "http://localhost:3000/auth/reset-password/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        assert!(ApiClient::new("mailto:someone@example.com", Session::default()).is_err());
        assert!(ApiClient::new("not a url", Session::default()).is_err());
    }

    #[test]
    fn envelope_without_success_flag_is_lenient_ok() {
        let envelope = Envelope::default();
        assert!(envelope.check(StatusCode::OK, Confirm::Lenient).is_ok());
        let envelope = Envelope::default();
        assert!(matches!(
            envelope.check(StatusCode::OK, Confirm::Explicit),
            Err(ApiError::Rejected { message: None })
        ));
    }

    #[test]
    fn envelope_error_status_without_message() {
        let envelope = Envelope::default();
        assert!(matches!(
            envelope.check(StatusCode::UNAUTHORIZED, Confirm::Lenient),
            Err(ApiError::Status(StatusCode::UNAUTHORIZED))
        ));
    }
}
