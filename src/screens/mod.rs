//! Screens mounted by the router.
//!
//! Every screen follows the same template: optionally fetch on mount, bind
//! fields to a [`Form`], send one request on submit, report the outcome
//! through the notification layer and navigate away on success.

mod auth;
mod profile;
mod task_form;

use crossterm::event::KeyEvent;

pub use auth::{ForgotPasswordScreen, LoginScreen, ResetPasswordScreen, SignupScreen};
pub use profile::ProfileScreen;
pub use task_form::TaskFormScreen;

use crate::api::{Reply, Request, RequestKind};
use crate::error::{ApiError, ValidationError};
use crate::form::Form;
use crate::kanban_board::KanbanBoard;
use crate::notify::{Level, Notifications};
use crate::router::{Resolved, RouteId};
use crate::session::Session;

/// Fallback text when the API rejects a request without saying why.
pub(crate) const SERVER_ERROR: &str = "Server error, please retry";

/// What a screen wants the app to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Send(Request),
    Navigate(String),
}

/// Shared state a screen may touch while handling input or replies.
pub struct Ctx<'a> {
    pub session: &'a Session,
    pub notifications: &'a mut Notifications,
}

impl Ctx<'_> {
    pub(crate) fn succeed(&mut self, channel: &'static str, message: &str) {
        self.notifications.post(channel, Level::Success, message);
    }

    pub(crate) fn fail(&mut self, channel: &'static str, err: &ApiError, fallback: &str) {
        tracing::warn!(channel, error = %err, "request failed");
        self.notifications
            .post(channel, Level::Error, err.user_message(fallback));
    }
}

/// A form plus its in-flight flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub form: Form,
    pub loading: bool,
}

impl FormState {
    pub fn new(form: Form) -> Self {
        Self {
            form,
            loading: false,
        }
    }

    /// Submit is disabled while loading or while the form is invalid.
    pub fn can_submit(&self) -> bool {
        !self.loading && self.form.is_valid()
    }

    /// Marks the form loading and hands back `request`, or does nothing when
    /// submit is disabled.
    pub(crate) fn submit(&mut self, request: impl FnOnce(&Form) -> Request) -> Action {
        if !self.can_submit() {
            return Action::None;
        }
        self.loading = true;
        Action::Send(request(&self.form))
    }
}

pub enum Screen {
    Login(LoginScreen),
    Signup(SignupScreen),
    ForgotPassword(ForgotPasswordScreen),
    ResetPassword(ResetPasswordScreen),
    Board(KanbanBoard),
    TaskForm(TaskFormScreen),
    Profile(ProfileScreen),
}

impl Screen {
    /// Builds the screen for a route that passed its guard.
    pub fn load(resolved: &Resolved) -> Self {
        let param = |name: &str| resolved.params.get(name).cloned().unwrap_or_default();
        match resolved.route {
            RouteId::Login => Screen::Login(LoginScreen::new()),
            RouteId::Signup => Screen::Signup(SignupScreen::new()),
            RouteId::ForgotPassword => Screen::ForgotPassword(ForgotPasswordScreen::new()),
            RouteId::ResetPassword => Screen::ResetPassword(ResetPasswordScreen::new(param("token"))),
            RouteId::Home => Screen::Board(KanbanBoard::new()),
            RouteId::CreateTask => Screen::TaskForm(TaskFormScreen::create()),
            RouteId::EditTask => Screen::TaskForm(TaskFormScreen::edit(param("id"))),
            RouteId::UpdateUser => Screen::Profile(ProfileScreen::new()),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login(_) => "Sign in",
            Screen::Signup(_) => "Sign up",
            Screen::ForgotPassword(_) => "Recover password",
            Screen::ResetPassword(_) => "Reset password",
            Screen::Board(_) => "Task board",
            Screen::TaskForm(s) => s.title(),
            Screen::Profile(_) => "Edit profile",
        }
    }

    /// Request to issue as soon as the screen is mounted.
    pub fn on_mount(&mut self) -> Option<Request> {
        match self {
            Screen::Board(board) => Some(board.reload()),
            Screen::TaskForm(s) => s.on_mount(),
            Screen::Profile(s) => Some(s.on_mount()),
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match self {
            Screen::Login(s) => s.handle_key(key),
            Screen::Signup(s) => s.handle_key(key),
            Screen::ForgotPassword(s) => s.handle_key(key),
            Screen::ResetPassword(s) => s.handle_key(key),
            Screen::Board(s) => s.handle_key(key),
            Screen::TaskForm(s) => s.handle_key(key),
            Screen::Profile(s) => s.handle_key(key),
        }
    }

    pub fn on_reply(
        &mut self,
        kind: RequestKind,
        result: Result<Reply, ApiError>,
        ctx: &mut Ctx<'_>,
    ) -> Action {
        match self {
            Screen::Login(s) => s.on_reply(result, ctx),
            Screen::Signup(s) => s.on_reply(result, ctx),
            Screen::ForgotPassword(s) => s.on_reply(result, ctx),
            Screen::ResetPassword(s) => s.on_reply(result, ctx),
            Screen::Board(s) => s.on_reply(kind, result, ctx),
            Screen::TaskForm(s) => s.on_reply(kind, result, ctx),
            Screen::Profile(s) => s.on_reply(kind, result, ctx),
        }
    }

    /// The form shown by form screens.
    pub fn form_state(&self) -> Option<&FormState> {
        match self {
            Screen::Login(s) => Some(&s.state),
            Screen::Signup(s) => Some(&s.state),
            Screen::ForgotPassword(s) => Some(&s.state),
            Screen::ResetPassword(s) => Some(&s.state),
            Screen::TaskForm(s) => Some(&s.state),
            Screen::Profile(s) => Some(&s.state),
            Screen::Board(_) => None,
        }
    }

    /// Why submit is currently disabled, if it is.
    pub fn problem(&self) -> Option<ValidationError> {
        match self {
            Screen::ResetPassword(s) => s.problem(),
            other => other.form_state().and_then(|s| s.form.validate().err()),
        }
    }

    /// Key hints for the footer.
    pub fn hints(&self) -> &'static str {
        match self {
            Screen::Login(_) => "Enter sign in · Ctrl+R sign up · Ctrl+F forgot password",
            Screen::Signup(_) | Screen::ForgotPassword(_) | Screen::ResetPassword(_) => {
                "Enter submit · Esc back to sign in"
            }
            Screen::Board(_) => {
                "←→↑↓ move · Enter open · n new · e edit · d delete · p priority · f date · r reload"
            }
            Screen::TaskForm(_) | Screen::Profile(_) => "Enter save · ←→ change choice · Esc back",
        }
    }
}
