use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};

use super::{Action, Ctx, FormState, SERVER_ERROR};
use crate::api::{Reply, Request, RequestKind};
use crate::error::ApiError;
use crate::form::{Field, FieldKind, Form, FormInput};
use crate::guard::HOME_PATH;
use crate::user::ProfileUpdate;

pub struct ProfileScreen {
    pub state: FormState,
    /// Server-relative path of the current photo, as reported by the API.
    pub photo: Option<String>,
}

impl ProfileScreen {
    const CHANNEL: &'static str = "profile";

    pub fn new() -> Self {
        Self {
            state: FormState::new(Form::new(vec![
                Field::new("name", "Name", FieldKind::Text).required(),
                Field::new("email", "Email", FieldKind::Email).required(),
                Field::new("password", "Password", FieldKind::Password),
                Field::new("photo", "Profile photo (file path)", FieldKind::File),
            ])),
            photo: None,
        }
    }

    pub fn on_mount(&mut self) -> Request {
        self.state.loading = true;
        Request::CurrentUser
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Esc {
            return Action::Navigate(HOME_PATH.into());
        }
        match self.state.form.handle_key(key) {
            FormInput::Submit => self.state.submit(|form| {
                let photo = form.text("photo");
                Request::UpdateUser(ProfileUpdate {
                    name: form.text("name"),
                    email: form.text("email"),
                    password: form.value("password").to_string(),
                    photo: (!photo.is_empty()).then(|| PathBuf::from(photo)),
                })
            }),
            _ => Action::None,
        }
    }

    pub fn on_reply(
        &mut self,
        kind: RequestKind,
        result: Result<Reply, ApiError>,
        ctx: &mut Ctx<'_>,
    ) -> Action {
        self.state.loading = false;
        match (kind, result) {
            (RequestKind::CurrentUser, Ok(Reply::User(user))) => {
                self.state.form.set("name", user.name);
                self.state.form.set("email", user.email);
                self.state.form.set("password", "");
                self.photo = (!user.fotoperfil.is_empty()).then_some(user.fotoperfil);
                Action::None
            }
            (RequestKind::CurrentUser, other) => {
                let err = other.err().unwrap_or(ApiError::MissingData);
                tracing::warn!(error = %err, "could not load profile");
                Action::None
            }
            (_, Ok(_)) => {
                ctx.succeed(Self::CHANNEL, "Profile updated");
                Action::Navigate(HOME_PATH.into())
            }
            (_, Err(err)) => {
                ctx.fail(Self::CHANNEL, &err, SERVER_ERROR);
                Action::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::notify::Notifications;
    use crate::session::Session;
    use crate::user::User;

    #[test]
    fn loads_user_then_submits_multipart_update() {
        let session = Session::default();
        let mut notifications = Notifications::default();
        let mut ctx = Ctx {
            session: &session,
            notifications: &mut notifications,
        };
        let mut screen = ProfileScreen::new();
        assert_eq!(screen.on_mount(), Request::CurrentUser);

        let user = User {
            id: "u1".into(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            fotoperfil: "uploads/ana.png".into(),
        };
        screen.on_reply(RequestKind::CurrentUser, Ok(Reply::User(user)), &mut ctx);
        assert_eq!(screen.photo.as_deref(), Some("uploads/ana.png"));
        assert_eq!(screen.state.form.value("email"), "ana@example.com");

        screen.state.form.set("photo", "/tmp/me.png");
        let action = screen.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(
            action,
            Action::Send(Request::UpdateUser(ProfileUpdate {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                password: String::new(),
                photo: Some(PathBuf::from("/tmp/me.png")),
            }))
        );
    }

    #[test]
    fn failed_profile_load_is_silent() {
        let session = Session::default();
        let mut notifications = Notifications::default();
        let mut ctx = Ctx {
            session: &session,
            notifications: &mut notifications,
        };
        let mut screen = ProfileScreen::new();
        screen.on_mount();
        screen.on_reply(
            RequestKind::CurrentUser,
            Err(ApiError::Rejected { message: None }),
            &mut ctx,
        );
        assert!(!screen.state.loading);
        assert!(notifications.visible().is_empty());
    }
}
