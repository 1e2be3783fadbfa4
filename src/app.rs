//! Application state: the mounted screen, the router, the session and the
//! notification stack.
//!
//! The app never performs I/O. Input and API replies go in, [`Effect`]s come
//! out and the runtime executes them. Every mount gets a fresh id and
//! cancellation token; leaving a screen cancels its in-flight requests, and a
//! reply tagged with an older mount id is dropped.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio_util::sync::CancellationToken;

use crate::api::{Reply, Request, RequestKind};
use crate::error::ApiError;
use crate::guard::{HOME_PATH, LOGIN_PATH};
use crate::notify::{Level, NotificationConfig, Notifications};
use crate::router::{Router, RouteId};
use crate::screens::{Action, Ctx, Screen};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MountId(u64);

#[derive(Debug)]
pub enum Effect {
    Send {
        mount: MountId,
        request: Request,
        cancel: CancellationToken,
    },
    Quit,
}

/// Entries of the navbar user menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    SignIn,
    SignUp,
    EditProfile,
    SignOut,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::SignIn => "Sign in",
            MenuItem::SignUp => "Sign up",
            MenuItem::EditProfile => "Edit profile",
            MenuItem::SignOut => "Sign out",
        }
    }
}

#[derive(Debug, Default)]
pub struct Navbar {
    pub open: bool,
    pub selected: usize,
}

pub struct Mounted {
    pub id: MountId,
    pub route: RouteId,
    pub path: String,
    pub screen: Screen,
    cancel: CancellationToken,
}

pub struct App {
    pub session: Session,
    pub router: Router,
    pub notifications: Notifications,
    pub navbar: Navbar,
    pub current: Option<Mounted>,
    next_mount: u64,
}

impl App {
    pub fn new(session: Session, notifications: NotificationConfig) -> Self {
        Self {
            session,
            router: Router::new(),
            notifications: Notifications::new(notifications),
            navbar: Navbar::default(),
            current: None,
            next_mount: 0,
        }
    }

    pub fn current_path(&self) -> Option<&str> {
        self.current.as_ref().map(|m| m.path.as_str())
    }

    pub fn current_route(&self) -> Option<RouteId> {
        self.current.as_ref().map(|m| m.route)
    }

    pub fn menu_items(&self) -> &'static [MenuItem] {
        if self.session.is_present() {
            &[MenuItem::EditProfile, MenuItem::SignOut]
        } else {
            &[MenuItem::SignIn, MenuItem::SignUp]
        }
    }

    /// Resolves `path`, tears down the current screen and mounts the new one.
    /// Unknown paths leave the current screen in place.
    pub fn navigate(&mut self, path: &str) -> Vec<Effect> {
        let resolved = match self.router.resolve(path, &self.session) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!(%path, error = %err, "navigation failed");
                if self.current.is_none() {
                    return self.navigate(HOME_PATH);
                }
                return Vec::new();
            }
        };

        if let Some(previous) = self.current.take() {
            previous.cancel.cancel();
            tracing::debug!(from = %previous.path, "screen unmounted");
        }

        let id = MountId(self.next_mount);
        self.next_mount += 1;
        let cancel = CancellationToken::new();
        let mut screen = Screen::load(&resolved);
        let initial = screen.on_mount();
        tracing::info!(path = %resolved.path, route = ?resolved.route, "screen mounted");

        self.navbar.open = false;
        self.current = Some(Mounted {
            id,
            route: resolved.route,
            path: resolved.path,
            screen,
            cancel,
        });

        initial.and_then(|request| self.send(request)).into_iter().collect()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return vec![Effect::Quit],
            KeyCode::Char('h') if ctrl => return self.navigate(HOME_PATH),
            KeyCode::F(2) => {
                self.navbar.open = !self.navbar.open;
                self.navbar.selected = 0;
                return Vec::new();
            }
            _ => {}
        }

        if self.navbar.open {
            return self.handle_menu_key(key);
        }

        let action = match self.current.as_mut() {
            Some(mounted) => mounted.screen.handle_key(key),
            None => Action::None,
        };
        self.apply(action)
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let items = self.menu_items();
        match key.code {
            KeyCode::Esc => self.navbar.open = false,
            KeyCode::Up => self.navbar.selected = self.navbar.selected.saturating_sub(1),
            KeyCode::Down => {
                self.navbar.selected = (self.navbar.selected + 1).min(items.len() - 1);
            }
            KeyCode::Enter => {
                if let Some(item) = items.get(self.navbar.selected).copied() {
                    return self.choose(item);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    pub fn choose(&mut self, item: MenuItem) -> Vec<Effect> {
        self.navbar.open = false;
        match item {
            MenuItem::SignIn => self.navigate(LOGIN_PATH),
            MenuItem::SignUp => self.navigate("/signup"),
            MenuItem::EditProfile => self.navigate("/update-user"),
            MenuItem::SignOut => self.sign_out(),
        }
    }

    pub fn sign_out(&mut self) -> Vec<Effect> {
        self.session.clear();
        self.notifications.post("session", Level::Info, "Signed out");
        tracing::info!("signed out");
        self.navigate(LOGIN_PATH)
    }

    /// Routes an API reply to the screen that asked for it.
    pub fn handle_reply(
        &mut self,
        mount: MountId,
        kind: RequestKind,
        result: Result<Reply, ApiError>,
    ) -> Vec<Effect> {
        let Some(mounted) = self.current.as_mut().filter(|m| m.id == mount) else {
            tracing::debug!(?mount, ?kind, "discarding reply for unmounted screen");
            return Vec::new();
        };
        let mut ctx = Ctx {
            session: &self.session,
            notifications: &mut self.notifications,
        };
        let action = mounted.screen.on_reply(kind, result, &mut ctx);
        self.apply(action)
    }

    pub fn tick(&mut self, now: Instant) {
        self.notifications.tick(now);
    }

    fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::None => Vec::new(),
            Action::Send(request) => self.send(request).into_iter().collect(),
            Action::Navigate(path) => self.navigate(&path),
        }
    }

    fn send(&self, request: Request) -> Option<Effect> {
        let mounted = self.current.as_ref()?;
        tracing::debug!(kind = ?request.kind(), mount = ?mounted.id, "request queued");
        Some(Effect::Send {
            mount: mounted.id,
            request,
            cancel: mounted.cancel.child_token(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, Status, Task};

    fn app() -> App {
        App::new(Session::default(), NotificationConfig::default())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sent(effects: &[Effect]) -> Vec<(MountId, RequestKind)> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send { mount, request, .. } => Some((*mount, request.kind())),
                Effect::Quit => None,
            })
            .collect()
    }

    #[test]
    fn startup_without_session_lands_on_login() {
        let mut app = app();
        let effects = app.navigate("/");
        assert_eq!(app.current_path(), Some("/login"));
        assert!(effects.is_empty());
    }

    #[test]
    fn board_mount_fetches_tasks() {
        let mut app = app();
        app.session.set("t");
        let effects = app.navigate("/");
        assert_eq!(app.current_route(), Some(RouteId::Home));
        assert_eq!(sent(&effects), vec![(MountId(0), RequestKind::ListTasks)]);
    }

    #[test]
    fn login_reply_stores_token_and_opens_board() {
        let mut app = app();
        app.navigate("/login");
        let mount = app.current.as_ref().unwrap().id;
        let effects = app.handle_reply(
            mount,
            RequestKind::Login,
            Ok(Reply::Authenticated(Some("abc".into()))),
        );
        assert_eq!(app.session.get().as_deref(), Some("abc"));
        assert_eq!(app.current_path(), Some("/"));
        assert_eq!(sent(&effects)[0].1, RequestKind::ListTasks);
    }

    #[test]
    fn leaving_a_screen_cancels_and_discards_late_replies() {
        let mut app = app();
        app.session.set("t");
        let effects = app.navigate("/edit-task/1");
        let Some(Effect::Send { mount, cancel, .. }) = effects.into_iter().next() else {
            panic!("edit screen should fetch its task");
        };

        app.navigate("/");
        assert!(cancel.is_cancelled());

        let task = Task {
            id: "1".into(),
            name: "late".into(),
            description: String::new(),
            finishdate: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            priority: Priority::Low,
            status: Status::Todo,
            category: String::new(),
        };
        let effects = app.handle_reply(mount, RequestKind::GetTask, Ok(Reply::Task(task)));
        assert!(effects.is_empty());
        assert_eq!(app.current_route(), Some(RouteId::Home));
    }

    #[test]
    fn sign_out_clears_session_and_goes_to_login() {
        let mut app = app();
        app.session.set("t");
        app.navigate("/");
        app.handle_key(key(KeyCode::F(2)));
        assert!(app.navbar.open);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert!(!app.session.is_present());
        assert_eq!(app.current_path(), Some("/login"));
        assert!(!app.navbar.open);
        let notice = &app.notifications.visible()[0];
        assert_eq!((notice.level, notice.message.as_str()), (Level::Info, "Signed out"));
    }

    #[test]
    fn menu_depends_on_session() {
        let app = app();
        assert_eq!(app.menu_items(), &[MenuItem::SignIn, MenuItem::SignUp]);
        app.session.set("t");
        assert_eq!(app.menu_items(), &[MenuItem::EditProfile, MenuItem::SignOut]);
    }

    #[test]
    fn unknown_path_keeps_current_screen() {
        let mut app = app();
        app.navigate("/login");
        app.navigate("/does-not-exist");
        assert_eq!(app.current_path(), Some("/login"));
    }

    #[test]
    fn ctrl_c_quits() {
        let mut app = app();
        let effects = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(effects.as_slice(), [Effect::Quit]));
    }
}
