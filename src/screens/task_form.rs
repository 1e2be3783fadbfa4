use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};

use super::{Action, Ctx, FormState, SERVER_ERROR};
use crate::api::{Reply, Request, RequestKind};
use crate::error::ApiError;
use crate::form::{Field, FieldKind, Form, FormInput};
use crate::guard::HOME_PATH;
use crate::task::{due_date, Priority, Status, Task, TaskDraft};

const PRIORITIES: &[&str] = &["low", "medium", "high"];
const STATUSES: &[&str] = &["todo", "doing", "completed"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Create,
    Edit { id: String },
}

/// Create and edit share one form; edit pre-fills it from the API.
pub struct TaskFormScreen {
    pub mode: Mode,
    pub state: FormState,
}

impl TaskFormScreen {
    const CHANNEL: &'static str = "task-form";

    pub fn create() -> Self {
        Self {
            mode: Mode::Create,
            state: FormState::new(task_form()),
        }
    }

    pub fn edit(id: String) -> Self {
        Self {
            mode: Mode::Edit { id },
            state: FormState::new(task_form()),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            Mode::Create => "Create task",
            Mode::Edit { .. } => "Edit task",
        }
    }

    pub fn on_mount(&mut self) -> Option<Request> {
        match &self.mode {
            Mode::Create => None,
            Mode::Edit { id } => {
                self.state.loading = true;
                Some(Request::GetTask(id.clone()))
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Esc {
            return Action::Navigate(HOME_PATH.into());
        }
        if self.state.form.handle_key(key) != FormInput::Submit {
            return Action::None;
        }
        let Some(draft) = draft(&self.state.form) else {
            return Action::None;
        };
        let mode = self.mode.clone();
        self.state.submit(move |_| match mode {
            Mode::Create => Request::CreateTask(draft),
            Mode::Edit { id } => Request::UpdateTask(id, draft),
        })
    }

    pub fn on_reply(
        &mut self,
        kind: RequestKind,
        result: Result<Reply, ApiError>,
        ctx: &mut Ctx<'_>,
    ) -> Action {
        self.state.loading = false;
        match (kind, result) {
            (RequestKind::GetTask, Ok(Reply::Task(task))) => {
                fill(&mut self.state.form, &task);
                Action::None
            }
            (RequestKind::GetTask, Ok(_)) => {
                ctx.fail(Self::CHANNEL, &ApiError::MissingData, SERVER_ERROR);
                Action::None
            }
            (RequestKind::GetTask, Err(err)) => {
                ctx.fail(Self::CHANNEL, &err, "Could not load the task");
                Action::None
            }
            (_, Ok(_)) => {
                let message = match self.mode {
                    Mode::Create => "Task created",
                    Mode::Edit { .. } => "Task updated",
                };
                ctx.succeed(Self::CHANNEL, message);
                Action::Navigate(HOME_PATH.into())
            }
            (_, Err(err)) => {
                ctx.fail(Self::CHANNEL, &err, SERVER_ERROR);
                Action::None
            }
        }
    }
}

fn task_form() -> Form {
    let today = Local::now().date_naive().format(due_date::FORMAT).to_string();
    Form::new(vec![
        Field::new("name", "Name", FieldKind::Text).required(),
        Field::new("description", "Description", FieldKind::Text),
        Field::new("finishdate", "Due date", FieldKind::Date)
            .required()
            .with_value(today),
        Field::new("priority", "Priority", FieldKind::Choice(PRIORITIES)),
        Field::new("status", "Status", FieldKind::Choice(STATUSES)),
        Field::new("category", "Category", FieldKind::Text),
    ])
}

fn fill(form: &mut Form, task: &Task) {
    form.set("name", task.name.clone());
    form.set("description", task.description.clone());
    form.set("finishdate", task.finishdate.format(due_date::FORMAT).to_string());
    form.set("priority", task.priority.as_str());
    form.set("status", task.status.as_str());
    form.set("category", task.category.clone());
}

fn draft(form: &Form) -> Option<TaskDraft> {
    form.validate().ok()?;
    Some(TaskDraft {
        name: form.text("name"),
        description: form.text("description"),
        finishdate: due_date::parse(form.value("finishdate"))?,
        priority: Priority::parse(form.value("priority")).unwrap_or_default(),
        status: Status::parse(form.value("status")).unwrap_or_default(),
        category: form.text("category"),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::notify::Notifications;
    use crate::session::Session;

    fn enter() -> KeyEvent {
        KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)
    }

    fn sample() -> Task {
        Task {
            id: "t1".into(),
            name: "Cook".into(),
            description: "pasta".into(),
            finishdate: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            priority: Priority::High,
            status: Status::Doing,
            category: "home".into(),
        }
    }

    #[test]
    fn create_defaults_and_requires_name() {
        let mut screen = TaskFormScreen::create();
        assert_eq!(screen.on_mount(), None);
        assert_eq!(screen.state.form.value("priority"), "low");
        assert_eq!(screen.state.form.value("status"), "todo");
        assert_eq!(screen.handle_key(enter()), Action::None);

        screen.state.form.set("name", "Cook");
        screen.state.form.set("finishdate", "2024-05-01");
        let Action::Send(Request::CreateTask(draft)) = screen.handle_key(enter()) else {
            panic!("expected a create request");
        };
        assert_eq!(draft.name, "Cook");
        assert_eq!(draft.priority, Priority::Low);
        assert_eq!(draft.status, Status::Todo);
    }

    #[test]
    fn mistyped_due_date_blocks_submit() {
        let mut screen = TaskFormScreen::create();
        screen.state.form.set("name", "Cook");
        screen.state.form.set("finishdate", "2024-05-019");
        assert_eq!(screen.handle_key(enter()), Action::None);
        assert!(!screen.state.loading);
    }

    #[test]
    fn edit_fetches_then_fills_and_updates() {
        let session = Session::default();
        let mut notifications = Notifications::default();
        let mut ctx = Ctx {
            session: &session,
            notifications: &mut notifications,
        };
        let mut screen = TaskFormScreen::edit("t1".into());
        assert_eq!(screen.on_mount(), Some(Request::GetTask("t1".into())));
        assert!(screen.state.loading);

        screen.on_reply(RequestKind::GetTask, Ok(Reply::Task(sample())), &mut ctx);
        assert!(!screen.state.loading);
        assert_eq!(screen.state.form.value("priority"), "high");

        let action = screen.handle_key(enter());
        assert_eq!(
            action,
            Action::Send(Request::UpdateTask("t1".into(), TaskDraft::from(&sample())))
        );

        let action = screen.on_reply(RequestKind::UpdateTask, Ok(Reply::Done), &mut ctx);
        assert_eq!(action, Action::Navigate("/".into()));
        assert_eq!(notifications.visible()[0].message, "Task updated");
    }

    #[test]
    fn failed_create_stays_and_reports() {
        let session = Session::default();
        let mut notifications = Notifications::default();
        let mut ctx = Ctx {
            session: &session,
            notifications: &mut notifications,
        };
        let mut screen = TaskFormScreen::create();
        let action = screen.on_reply(
            RequestKind::CreateTask,
            Err(ApiError::Rejected { message: None }),
            &mut ctx,
        );
        assert_eq!(action, Action::None);
        assert_eq!(notifications.visible()[0].message, SERVER_ERROR);
    }

    #[test]
    fn escape_goes_back_to_board() {
        let mut screen = TaskFormScreen::create();
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(screen.handle_key(esc), Action::Navigate("/".into()));
    }
}
