use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};

use crate::api::{Reply, Request, RequestKind};
use crate::error::ApiError;
use crate::screens::{Action, Ctx};
use crate::task::{Priority, Status, Task};

/// The home screen: tasks split into todo/doing/completed columns.
#[derive(Debug, Default)]
pub struct KanbanBoard {
    pub tasks: Vec<Task>,
    pub selected_status: usize,
    pub selected_task: usize,
    /// Task shown in the detail panel.
    pub detail: Option<Task>,
    pub priority_filter: Option<Priority>,
    pub date_filter: Option<NaiveDate>,
    pub loading: bool,
}

impl KanbanBoard {
    const CHANNEL: &'static str = "board";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn reload(&mut self) -> Request {
        self.loading = true;
        Request::ListTasks
    }

    pub fn get_tasks_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == status)
            .filter(|t| self.priority_filter.map_or(true, |p| t.priority == p))
            .filter(|t| self.date_filter.map_or(true, |d| t.finishdate == d))
            .collect()
    }

    pub fn columns(&self) -> [(Status, Vec<&Task>); 3] {
        Status::BOARD.map(|status| (status, self.get_tasks_by_status(status)))
    }

    pub fn selected(&self) -> Option<&Task> {
        let status = Status::BOARD[self.selected_status];
        self.get_tasks_by_status(status)
            .get(self.selected_task)
            .copied()
    }

    pub fn open_selected(&mut self) {
        self.detail = self.selected().cloned();
    }

    /// Deletes the task in the detail panel. The panel closes whether or not
    /// the API ends up accepting the delete.
    pub fn delete_selected(&mut self) -> Action {
        match self.detail.take() {
            Some(task) => Action::Send(Request::DeleteTask(task.id)),
            None => Action::None,
        }
    }

    pub fn cycle_priority_filter(&mut self) {
        self.priority_filter = match self.priority_filter {
            None => Some(Priority::Low),
            Some(Priority::Low) => Some(Priority::Medium),
            Some(Priority::Medium) => Some(Priority::High),
            Some(Priority::High) => None,
        };
        self.clamp_selection();
    }

    /// Steps through the distinct due dates on the board, then back to all.
    pub fn cycle_date_filter(&mut self) {
        let mut dates: Vec<NaiveDate> = self.tasks.iter().map(|t| t.finishdate).collect();
        dates.sort_unstable();
        dates.dedup();
        self.date_filter = match self.date_filter {
            None => dates.first().copied(),
            Some(current) => dates.into_iter().find(|d| *d > current),
        };
        self.clamp_selection();
    }

    pub fn move_column(&mut self, direction: isize) {
        let last = Status::BOARD.len() as isize - 1;
        self.selected_status = (self.selected_status as isize + direction).clamp(0, last) as usize;
        self.clamp_selection();
    }

    pub fn move_task(&mut self, direction: isize) {
        let count = self
            .get_tasks_by_status(Status::BOARD[self.selected_status])
            .len() as isize;
        if count == 0 {
            self.selected_task = 0;
            return;
        }
        self.selected_task = (self.selected_task as isize + direction).clamp(0, count - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        self.move_task(0);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.detail.is_some() {
            return match key.code {
                KeyCode::Esc => {
                    self.detail = None;
                    Action::None
                }
                KeyCode::Char('e') => self.detail.as_ref().map_or(Action::None, |task| {
                    Action::Navigate(format!("/edit-task/{}", task.id))
                }),
                KeyCode::Char('d') => self.delete_selected(),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Left => self.move_column(-1),
            KeyCode::Right => self.move_column(1),
            KeyCode::Up => self.move_task(-1),
            KeyCode::Down => self.move_task(1),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('n') => return Action::Navigate("/create-task".into()),
            KeyCode::Char('p') => self.cycle_priority_filter(),
            KeyCode::Char('f') => self.cycle_date_filter(),
            KeyCode::Char('r') => return Action::Send(self.reload()),
            _ => {}
        }
        Action::None
    }

    pub fn on_reply(
        &mut self,
        kind: RequestKind,
        result: Result<Reply, ApiError>,
        ctx: &mut Ctx<'_>,
    ) -> Action {
        match (kind, result) {
            (RequestKind::ListTasks, Ok(Reply::Tasks(tasks))) => {
                self.loading = false;
                self.tasks = tasks;
                self.clamp_selection();
                Action::None
            }
            (RequestKind::ListTasks, other) => {
                self.loading = false;
                let err = other.err().unwrap_or(ApiError::MissingData);
                ctx.fail(Self::CHANNEL, &err, "Could not load tasks");
                Action::None
            }
            (RequestKind::DeleteTask, result) => {
                if let Err(err) = result {
                    tracing::warn!(error = %err, "delete failed");
                }
                Action::Send(self.reload())
            }
            (kind, _) => {
                tracing::debug!(?kind, "board ignored reply");
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

    fn task(id: &str, status: Status, priority: Priority, day: u32) -> Task {
        Task {
            id: id.into(),
            name: format!("task {id}"),
            description: String::new(),
            finishdate: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            priority,
            status,
            category: String::new(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn board_with(tasks: Vec<Task>) -> KanbanBoard {
        KanbanBoard {
            tasks,
            ..KanbanBoard::new()
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn partitions_into_three_columns_without_loss() {
        let board = board_with(vec![
            task("a", Status::Todo, Priority::Low, 1),
            task("b", Status::Doing, Priority::Low, 1),
            task("c", Status::Completed, Priority::Low, 1),
        ]);
        let columns = board.columns();
        assert_eq!(columns[0].0, Status::Todo);
        assert_eq!(ids(&columns[0].1), vec!["a"]);
        assert_eq!(ids(&columns[1].1), vec!["b"]);
        assert_eq!(ids(&columns[2].1), vec!["c"]);
    }

    #[test]
    fn expired_tasks_have_no_column() {
        let board = board_with(vec![task("x", Status::Expired, Priority::Low, 1)]);
        assert!(board.columns().iter().all(|(_, tasks)| tasks.is_empty()));
    }

    #[test]
    fn priority_filter_cycles() {
        let mut board = board_with(vec![
            task("a", Status::Todo, Priority::Low, 1),
            task("b", Status::Todo, Priority::High, 1),
        ]);
        board.handle_key(key(KeyCode::Char('p')));
        assert_eq!(ids(&board.get_tasks_by_status(Status::Todo)), vec!["a"]);
        board.handle_key(key(KeyCode::Char('p')));
        assert!(board.get_tasks_by_status(Status::Todo).is_empty());
        board.handle_key(key(KeyCode::Char('p')));
        assert_eq!(ids(&board.get_tasks_by_status(Status::Todo)), vec!["b"]);
        board.handle_key(key(KeyCode::Char('p')));
        assert_eq!(board.priority_filter, None);
        assert_eq!(board.get_tasks_by_status(Status::Todo).len(), 2);
    }

    #[test]
    fn date_filter_walks_distinct_dates() {
        let mut board = board_with(vec![
            task("a", Status::Todo, Priority::Low, 3),
            task("b", Status::Todo, Priority::Low, 1),
            task("c", Status::Doing, Priority::Low, 3),
        ]);
        board.cycle_date_filter();
        assert_eq!(ids(&board.get_tasks_by_status(Status::Todo)), vec!["b"]);
        board.cycle_date_filter();
        assert_eq!(ids(&board.get_tasks_by_status(Status::Todo)), vec!["a"]);
        assert_eq!(ids(&board.get_tasks_by_status(Status::Doing)), vec!["c"]);
        board.cycle_date_filter();
        assert_eq!(board.date_filter, None);
    }

    #[test]
    fn navigation_is_clamped() {
        let mut board = board_with(vec![
            task("a", Status::Todo, Priority::Low, 1),
            task("b", Status::Todo, Priority::Low, 1),
        ]);
        board.move_column(-1);
        assert_eq!(board.selected_status, 0);
        board.move_task(5);
        assert_eq!(board.selected().map(|t| t.id.as_str()), Some("b"));
        board.move_column(1);
        assert_eq!(board.selected_task, 0);
        assert!(board.selected().is_none());
        board.move_column(5);
        assert_eq!(board.selected_status, 2);
    }

    #[test]
    fn delete_issues_one_request_and_clears_panel() {
        let mut board = board_with(vec![task("a", Status::Todo, Priority::Low, 1)]);
        board.handle_key(key(KeyCode::Enter));
        assert_eq!(board.detail.as_ref().map(|t| t.id.as_str()), Some("a"));

        let action = board.handle_key(key(KeyCode::Char('d')));
        assert_eq!(action, Action::Send(Request::DeleteTask("a".into())));
        assert!(board.detail.is_none());
        assert_eq!(board.handle_key(key(KeyCode::Char('d'))), Action::None);
    }

    #[test]
    fn delete_reply_reloads_even_on_failure() {
        let session = Session::default();
        let mut notifications = Notifications::default();
        let mut ctx = Ctx {
            session: &session,
            notifications: &mut notifications,
        };
        let mut board = KanbanBoard::new();
        let action = board.on_reply(
            RequestKind::DeleteTask,
            Err(ApiError::Rejected { message: None }),
            &mut ctx,
        );
        assert_eq!(action, Action::Send(Request::ListTasks));
        assert!(board.loading);
    }

    #[test]
    fn detail_panel_edit_navigates_with_id() {
        let mut board = board_with(vec![task("a7", Status::Todo, Priority::Low, 1)]);
        board.open_selected();
        assert_eq!(
            board.handle_key(key(KeyCode::Char('e'))),
            Action::Navigate("/edit-task/a7".into())
        );
        board.handle_key(key(KeyCode::Esc));
        assert!(board.detail.is_none());
    }
}
