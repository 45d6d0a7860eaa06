use chrono::NaiveDate;

use crate::calendar::{CalendarMode, Cell, Direction, MonthGrid, Navigator};
use crate::domain::{Task, TaskError, TaskId, TaskPatch, TaskStatus};
use crate::slots::{WeekSlots, week_slots};
use crate::storage::{StoreError, TaskStore};

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Requests coming back from the presentation side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectDate(NaiveDate),
    NavigatePeriod(Direction),
    SetMode(CalendarMode),
    CreateTask(Task),
    EditTask { index: usize, patch: TaskPatch },
    DeleteTask { index: usize },
    SetStatus { index: usize, status: TaskStatus },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Navigated,
    Created(TaskId),
    Updated(TaskId),
    Deleted(Task),
}

/// Owns the task store and the navigation state for one session.
#[derive(Debug)]
pub struct Planner {
    store: TaskStore,
    navigator: Navigator,
    today: NaiveDate,
}

impl Planner {
    pub fn new(store: TaskStore, navigator: Navigator, today: NaiveDate) -> Self {
        Self {
            store,
            navigator,
            today,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn month_view(&self) -> MonthGrid {
        self.navigator.month_grid(self.today)
    }

    pub fn week_days(&self) -> [Cell; 7] {
        self.navigator.week_grid(self.today)
    }

    pub fn week_view(&self) -> WeekSlots<'_> {
        week_slots(self.store.tasks(), &self.week_days())
    }

    pub fn apply(&mut self, intent: Intent) -> Result<Outcome, PlannerError> {
        match intent {
            Intent::SelectDate(date) => {
                self.navigator.select(date);
                Ok(Outcome::Navigated)
            }
            Intent::NavigatePeriod(direction) => {
                self.navigator.navigate(direction);
                Ok(Outcome::Navigated)
            }
            Intent::SetMode(mode) => {
                self.navigator.set_mode(mode);
                Ok(Outcome::Navigated)
            }
            Intent::CreateTask(task) => Ok(Outcome::Created(self.store.add(task))),
            Intent::EditTask { index, patch } => {
                let current = self.task_at(index)?;
                let replacement = current.patched(&patch)?;
                let id = replacement.id.clone();
                self.store.update(index, replacement)?;
                Ok(Outcome::Updated(id))
            }
            Intent::DeleteTask { index } => Ok(Outcome::Deleted(self.store.delete(index)?)),
            Intent::SetStatus { index, status } => {
                let id = self.task_at(index)?.id.clone();
                self.store.set_status(index, status)?;
                Ok(Outcome::Updated(id))
            }
        }
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    fn task_at(&self, index: usize) -> Result<&Task, StoreError> {
        self.store.tasks().get(index).ok_or(StoreError::OutOfRange {
            index,
            len: self.store.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::calendar::{CalendarMode, Direction, Navigator, WeekStart};
    use crate::domain::{Task, TaskPatch, TaskStatus, TaskTime};
    use crate::storage::{StoreError, StoreSlot, TaskStore};

    use super::{Intent, Outcome, Planner, PlannerError};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn planner(dir: &tempfile::TempDir) -> Planner {
        let today = date(2024, 6, 12);
        let store = TaskStore::open(StoreSlot::new(dir.path(), "tasks"));
        Planner::new(store, Navigator::new(CalendarMode::Week, today, WeekStart::Sunday), today)
    }

    fn task(title: &str, date: &str, time: &str) -> Task {
        Task::from_input(title, "", date, time, TaskStatus::NotDone).expect("valid test task")
    }

    #[test]
    fn created_tasks_show_up_in_week_view() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut planner = planner(&dir);
        let outcome = planner
            .apply(Intent::CreateTask(task("Standup", "2024-06-12", "09:00")))
            .expect("create should succeed");
        assert!(matches!(outcome, Outcome::Created(_)));

        let view = planner.week_view();
        assert_eq!(view.slot(9, 3).len(), 1);

        planner
            .apply(Intent::NavigatePeriod(Direction::Next))
            .expect("navigate");
        assert_eq!(planner.week_view().task_count(), 0);
    }

    #[test]
    fn edit_applies_patch_and_persists() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut planner = planner(&dir);
        planner
            .apply(Intent::CreateTask(task("Standup", "2024-06-12", "09:00")))
            .expect("create");
        let patch = TaskPatch {
            time: Some(TaskTime::new(10, 0).unwrap()),
            ..TaskPatch::default()
        };
        planner
            .apply(Intent::EditTask { index: 0, patch })
            .expect("edit should succeed");
        planner
            .apply(Intent::SetStatus { index: 0, status: TaskStatus::Done })
            .expect("status should succeed");

        let stored = planner.store().load();
        assert_eq!(stored[0].time.to_string(), "10:00");
        assert!(stored[0].is_done());
    }

    #[test]
    fn invalid_index_and_invalid_patch_are_typed_errors() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut planner = planner(&dir);
        let err = planner.apply(Intent::DeleteTask { index: 0 }).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::Store(StoreError::OutOfRange { index: 0, len: 0 })
        ));

        planner
            .apply(Intent::CreateTask(task("Keep", "2024-06-12", "09:00")))
            .expect("create");
        let blank = TaskPatch {
            title: Some(" ".to_string()),
            ..TaskPatch::default()
        };
        assert!(matches!(
            planner.apply(Intent::EditTask { index: 0, patch: blank }),
            Err(PlannerError::Task(_))
        ));
        assert_eq!(planner.tasks()[0].title, "Keep");
    }

    #[test]
    fn month_selection_follows_intents() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut planner = planner(&dir);
        planner
            .apply(Intent::SetMode(CalendarMode::Month))
            .expect("mode");
        planner
            .apply(Intent::SelectDate(date(2024, 7, 4)))
            .expect("select");
        let grid = planner.month_view();
        assert_eq!(grid.month_start, date(2024, 7, 1));
        assert_eq!(grid.cells().filter(|cell| cell.is_selected).count(), 1);
        assert_eq!(grid.cells().filter(|cell| cell.is_today).count(), 0);
    }
}
