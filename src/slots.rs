use chrono::NaiveDate;

use crate::calendar::Cell;
use crate::domain::{Task, TaskError, TaskTime};

pub const HOURS_PER_DAY: u32 = 24;

/// A task placed in a slot, together with its position in the source collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundTask<'a> {
    pub index: usize,
    pub task: &'a Task,
}

#[derive(Debug, Clone)]
pub struct WeekSlots<'a> {
    pub days: [NaiveDate; 7],
    /// `rows[hour][day]`
    pub rows: Vec<[Vec<BoundTask<'a>>; 7]>,
}

impl<'a> WeekSlots<'a> {
    pub fn slot(&self, hour: u32, day: usize) -> &[BoundTask<'a>] {
        self.rows
            .get(hour as usize)
            .and_then(|row| row.get(day))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn hour_is_empty(&self, hour: u32) -> bool {
        self.rows
            .get(hour as usize)
            .is_none_or(|row| row.iter().all(Vec::is_empty))
    }

    pub fn task_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .map(Vec::len)
            .sum()
    }
}

/// Tasks on `date` whose hour matches the hour of `hour_label` (`HH:00`).
pub fn bind<'a>(
    tasks: &'a [Task],
    date: NaiveDate,
    hour_label: &str,
) -> Result<Vec<&'a Task>, TaskError> {
    let hour = TaskTime::parse(hour_label)?.hour();
    Ok(bind_hour(tasks, date, hour))
}

pub fn bind_hour(tasks: &[Task], date: NaiveDate, hour: u32) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| in_slot(task, date, hour))
        .collect()
}

pub fn bind_indexed(tasks: &[Task], date: NaiveDate, hour: u32) -> Vec<BoundTask<'_>> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| in_slot(task, date, hour))
        .map(|(index, task)| BoundTask { index, task })
        .collect()
}

/// First position whose title, time and date match `task`. Duplicates resolve
/// to the earliest entry; prefer [`position_of`] when the id is known.
pub fn index_of(tasks: &[Task], task: &Task) -> Option<usize> {
    tasks.iter().position(|candidate| {
        candidate.title == task.title && candidate.time == task.time && candidate.date == task.date
    })
}

pub fn position_of(tasks: &[Task], id: &str) -> Option<usize> {
    tasks.iter().position(|task| task.id == id)
}

pub fn week_slots<'a>(tasks: &'a [Task], days: &[Cell; 7]) -> WeekSlots<'a> {
    let days = days.map(|cell| cell.date);
    let mut rows: Vec<[Vec<BoundTask<'a>>; 7]> = (0..HOURS_PER_DAY)
        .map(|_| std::array::from_fn(|_| Vec::new()))
        .collect();

    // Single pass; source order is kept within each slot.
    for (index, task) in tasks.iter().enumerate() {
        if let Some(day) = days.iter().position(|date| *date == task.date) {
            rows[task.time.hour() as usize][day].push(BoundTask { index, task });
        }
    }

    WeekSlots { days, rows }
}

pub fn hour_labels() -> [String; 24] {
    std::array::from_fn(|hour| format!("{hour:02}:00"))
}

pub fn is_major_hour(hour: u32) -> bool {
    hour % 6 == 0
}

fn in_slot(task: &Task, date: NaiveDate, hour: u32) -> bool {
    task.date == date && task.time.hour() == hour
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::calendar::{WeekStart, week_grid};
    use crate::domain::{Task, TaskError, TaskStatus};

    use super::{bind, bind_indexed, hour_labels, index_of, is_major_hour, position_of, week_slots};

    fn task(title: &str, date: &str, time: &str) -> Task {
        Task::from_input(title, "", date, time, TaskStatus::NotDone).expect("valid test task")
    }

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
    }

    #[test]
    fn binds_tasks_by_date_and_hour() {
        let tasks = vec![task("A", "2024-06-01", "09:00")];
        let bound = bind(&tasks, day("2024-06-01"), "09:00").expect("label should parse");
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].title, "A");
        assert!(bind(&tasks, day("2024-06-01"), "10:00").unwrap().is_empty());
        assert!(bind(&tasks, day("2024-06-02"), "09:00").unwrap().is_empty());
    }

    #[test]
    fn binding_ignores_minutes_and_keeps_source_order() {
        let tasks = vec![
            task("late", "2024-06-01", "09:45"),
            task("other day", "2024-06-02", "09:10"),
            task("early", "2024-06-01", "09:05"),
        ];
        let titles: Vec<_> = bind(&tasks, day("2024-06-01"), "09:00")
            .unwrap()
            .into_iter()
            .map(|task| task.title.as_str())
            .collect();
        assert_eq!(titles, ["late", "early"]);

        let indexed = bind_indexed(&tasks, day("2024-06-01"), 9);
        let indices: Vec<_> = indexed.iter().map(|bound| bound.index).collect();
        assert_eq!(indices, [0, 2]);
    }

    #[test]
    fn rejects_invalid_hour_label() {
        let tasks = vec![task("A", "2024-06-01", "09:00")];
        assert_eq!(
            bind(&tasks, day("2024-06-01"), "25:00"),
            Err(TaskError::InvalidTime("25:00".to_string()))
        );
    }

    #[test]
    fn duplicate_tuples_resolve_to_first_index_but_ids_do_not() {
        let tasks = vec![
            task("A", "2024-06-01", "09:00"),
            task("A", "2024-06-01", "09:00"),
        ];
        assert_eq!(index_of(&tasks, &tasks[1]), Some(0));
        assert_eq!(position_of(&tasks, &tasks[1].id), Some(1));
        assert_eq!(position_of(&tasks, "missing"), None);
    }

    #[test]
    fn week_slots_place_tasks_in_day_columns() {
        let tasks = vec![
            task("standup", "2024-06-10", "09:15"),
            task("outside", "2024-06-20", "09:00"),
            task("review", "2024-06-15", "17:00"),
            task("standup 2", "2024-06-10", "09:30"),
        ];
        let today = day("2024-06-12");
        let days = week_grid(today, today, today, WeekStart::Sunday);
        let slots = week_slots(&tasks, &days);

        assert_eq!(slots.days[0], day("2024-06-09"));
        assert_eq!(slots.task_count(), 3);
        let monday_nine: Vec<_> = slots.slot(9, 1).iter().map(|bound| bound.index).collect();
        assert_eq!(monday_nine, [0, 3]);
        assert_eq!(slots.slot(17, 6)[0].task.title, "review");
        assert!(slots.hour_is_empty(12));
        assert!(!slots.hour_is_empty(9));
        assert!(slots.slot(30, 0).is_empty());
    }

    #[test]
    fn labels_cover_the_day() {
        let labels = hour_labels();
        assert_eq!(labels[0], "00:00");
        assert_eq!(labels[23], "23:00");
        assert!(is_major_hour(0) && is_major_hour(18) && !is_major_hour(7));
    }
}
