use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Action, Ctx, FormState, SERVER_ERROR};
use crate::api::{Reply, Request};
use crate::error::{ApiError, ValidationError};
use crate::form::{Field, FieldKind, Form, FormInput};
use crate::guard::{HOME_PATH, LOGIN_PATH};
use crate::user::{Credentials, NewUser};

/// Feeds a key to the form. `None` means the user pressed `Esc`.
fn form_key(state: &mut FormState, key: KeyEvent) -> Option<FormInput> {
    (key.code != KeyCode::Esc).then(|| state.form.handle_key(key))
}

pub struct LoginScreen {
    pub state: FormState,
}

impl LoginScreen {
    const CHANNEL: &'static str = "login";

    pub fn new() -> Self {
        Self {
            state: FormState::new(Form::new(vec![
                Field::new("email", "Email", FieldKind::Email).required(),
                Field::new("password", "Password", FieldKind::Password).required(),
            ])),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('r') => Action::Navigate("/signup".into()),
                KeyCode::Char('f') => Action::Navigate("/forgot-password".into()),
                _ => Action::None,
            };
        }
        match form_key(&mut self.state, key) {
            Some(FormInput::Submit) => self.state.submit(|form| {
                Request::Login(Credentials {
                    email: form.text("email"),
                    password: form.value("password").to_string(),
                })
            }),
            _ => Action::None,
        }
    }

    pub fn on_reply(&mut self, result: Result<Reply, ApiError>, ctx: &mut Ctx<'_>) -> Action {
        self.state.loading = false;
        match result {
            Ok(Reply::Authenticated(Some(token))) => {
                ctx.session.set(token);
                ctx.succeed(Self::CHANNEL, "Signed in");
                Action::Navigate(HOME_PATH.into())
            }
            Ok(_) => {
                ctx.fail(Self::CHANNEL, &ApiError::MissingData, SERVER_ERROR);
                Action::None
            }
            Err(err) => {
                ctx.fail(Self::CHANNEL, &err, SERVER_ERROR);
                Action::None
            }
        }
    }
}

pub struct SignupScreen {
    pub state: FormState,
}

impl SignupScreen {
    const CHANNEL: &'static str = "signup";

    pub fn new() -> Self {
        Self {
            state: FormState::new(Form::new(vec![
                Field::new("name", "Name", FieldKind::Text).required(),
                Field::new("email", "Email", FieldKind::Email).required(),
                Field::new("password", "Password", FieldKind::Password).required(),
            ])),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match form_key(&mut self.state, key) {
            None => Action::Navigate(LOGIN_PATH.into()),
            Some(FormInput::Submit) => self.state.submit(|form| {
                Request::Signup(NewUser {
                    name: form.text("name"),
                    email: form.text("email"),
                    password: form.value("password").to_string(),
                })
            }),
            Some(_) => Action::None,
        }
    }

    pub fn on_reply(&mut self, result: Result<Reply, ApiError>, ctx: &mut Ctx<'_>) -> Action {
        self.state.loading = false;
        match result {
            Ok(Reply::Authenticated(Some(token))) => {
                ctx.session.set(token);
                ctx.succeed(Self::CHANNEL, "Account created");
                Action::Navigate(HOME_PATH.into())
            }
            Ok(_) => {
                ctx.succeed(Self::CHANNEL, "Account created, please sign in");
                Action::Navigate(LOGIN_PATH.into())
            }
            Err(err) => {
                ctx.fail(Self::CHANNEL, &err, SERVER_ERROR);
                Action::None
            }
        }
    }
}

pub struct ForgotPasswordScreen {
    pub state: FormState,
}

impl ForgotPasswordScreen {
    const CHANNEL: &'static str = "forgot-password";

    pub fn new() -> Self {
        Self {
            state: FormState::new(Form::new(vec![
                Field::new("email", "Email", FieldKind::Email).required()
            ])),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match form_key(&mut self.state, key) {
            None => Action::Navigate(LOGIN_PATH.into()),
            Some(FormInput::Submit) => self.state.submit(|form| Request::ForgotPassword {
                email: form.text("email"),
            }),
            Some(_) => Action::None,
        }
    }

    pub fn on_reply(&mut self, result: Result<Reply, ApiError>, ctx: &mut Ctx<'_>) -> Action {
        self.state.loading = false;
        match result {
            Ok(_) => ctx.succeed(
                Self::CHANNEL,
                "A link to reset your password has been sent to your email",
            ),
            Err(err) => ctx.fail(Self::CHANNEL, &err, "Something went wrong, try again"),
        }
        Action::None
    }
}

pub struct ResetPasswordScreen {
    pub state: FormState,
    token: String,
}

impl ResetPasswordScreen {
    const CHANNEL: &'static str = "reset-password";

    pub fn new(token: String) -> Self {
        Self {
            state: FormState::new(Form::new(vec![
                Field::new("password", "New password", FieldKind::Password).required(),
                Field::new("confirm", "Confirm password", FieldKind::Password).required(),
            ])),
            token,
        }
    }

    pub fn problem(&self) -> Option<ValidationError> {
        self.state.form.validate().err().or_else(|| {
            (self.state.form.value("password") != self.state.form.value("confirm"))
                .then_some(ValidationError::PasswordMismatch)
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match form_key(&mut self.state, key) {
            None => Action::Navigate(LOGIN_PATH.into()),
            Some(FormInput::Submit) if self.problem().is_none() => {
                let token = self.token.clone();
                self.state.submit(|form| Request::ResetPassword {
                    token,
                    password: form.value("password").to_string(),
                })
            }
            Some(_) => Action::None,
        }
    }

    pub fn on_reply(&mut self, result: Result<Reply, ApiError>, ctx: &mut Ctx<'_>) -> Action {
        self.state.loading = false;
        match result {
            Ok(_) => {
                ctx.succeed(Self::CHANNEL, "Password updated");
                Action::Navigate(LOGIN_PATH.into())
            }
            Err(err) => {
                ctx.fail(Self::CHANNEL, &err, "Could not update the password");
                Action::None
            }
        }
    }
}
