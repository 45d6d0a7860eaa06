use chrono::Datelike;

use crate::calendar::{Cell, MonthGrid, WeekStart, month_label, week_label};
use crate::domain::{Task, TaskStatus};
use crate::slots::{BoundTask, WeekSlots, hour_labels, is_major_hour};

const DAY_COLUMN_WIDTH: usize = 18;

pub fn print_lines(lines: &[String]) {
	for line in lines {
		println!("{line}");
	}
}

/// Month picker: `[d]` marks the selected day, `*` marks today, `·` pads other months.
pub fn month_lines(grid: &MonthGrid, week_start: WeekStart) -> Vec<String> {
	let mut lines = Vec::with_capacity(grid.rows.len() + 2);
	lines.push(month_label(grid.month_start));
	lines.push(weekday_header(week_start, 4));
	for row in &grid.rows {
		lines.push(row.iter().map(month_cell).collect::<Vec<_>>().join(""));
	}
	lines
}

fn month_cell(cell: &Cell) -> String {
	let day = if cell.in_period {
		cell.date.day().to_string()
	} else {
		"·".to_string()
	};
	let marked = match (cell.is_selected, cell.is_today) {
		(true, _) => format!("[{day}]"),
		(false, true) => format!("{day}*"),
		(false, false) => day,
	};
	format!("{marked:>4}")
}

fn weekday_header(week_start: WeekStart, width: usize) -> String {
	let mut weekday = week_start.weekday();
	let mut header = String::new();
	for _ in 0..7 {
		header.push_str(&format!("{:>width$}", weekday.to_string()));
		weekday = weekday.succ();
	}
	header
}

/// Weekly hour table. Empty hours are skipped unless `all_hours` is set.
pub fn week_lines(slots: &WeekSlots<'_>, days: &[Cell; 7], all_hours: bool) -> Vec<String> {
	let mut lines = vec![week_label(days[0].date)];

	let mut header = format!("{:<6}", "Time");
	for cell in days {
		let mut label = cell.date.format("%a %-d").to_string();
		if cell.is_today {
			label.push('*');
		}
		if cell.is_selected {
			label = format!("[{label}]");
		}
		header.push_str(&format!("| {label:<width$}", width = DAY_COLUMN_WIDTH));
	}
	lines.push(header.trim_end().to_string());

	for (hour, label) in hour_labels().iter().enumerate() {
		let hour = hour as u32;
		if !all_hours && slots.hour_is_empty(hour) {
			continue;
		}
		let depth = (0..7).map(|day| slots.slot(hour, day).len()).max().unwrap_or(0).max(1);
		for line in 0..depth {
			let mut row = if line == 0 {
				let marker = if is_major_hour(hour) { "=" } else { " " };
				format!("{label}{marker}")
			} else {
				" ".repeat(6)
			};
			for day in 0..7 {
				let entry = slots
					.slot(hour, day)
					.get(line)
					.map(slot_entry)
					.unwrap_or_default();
				row.push_str(&format!("| {entry:<width$}", width = DAY_COLUMN_WIDTH));
			}
			lines.push(row.trim_end().to_string());
		}
	}

	if slots.task_count() == 0 {
		lines.push("no tasks this week".to_string());
	}
	lines
}

fn slot_entry(bound: &BoundTask<'_>) -> String {
	let text = format!("#{} {} {}", bound.index, status_marker(bound.task.status), bound.task.title);
	truncate(&text, DAY_COLUMN_WIDTH)
}

pub fn task_lines(tasks: &[Task]) -> Vec<String> {
	if tasks.is_empty() {
		return vec!["no tasks yet".to_string()];
	}
	tasks
		.iter()
		.enumerate()
		.map(|(index, task)| task_line(index, task))
		.collect()
}

pub fn bound_lines(bound: &[BoundTask<'_>]) -> Vec<String> {
	if bound.is_empty() {
		return vec!["no tasks in this slot".to_string()];
	}
	bound.iter().map(|entry| task_line(entry.index, entry.task)).collect()
}

pub fn task_line(index: usize, task: &Task) -> String {
	let mut line = format!(
		"{:>3} | {} | {} {} | {} | {}",
		index,
		task.id,
		task.date.format("%Y-%m-%d"),
		task.time,
		status_marker(task.status),
		task.title
	);
	if let Some(first) = task.description.lines().next().filter(|line| !line.trim().is_empty()) {
		line.push_str(" - ");
		line.push_str(first);
	}
	line
}

fn status_marker(status: TaskStatus) -> &'static str {
	match status {
		TaskStatus::Done => "[x]",
		TaskStatus::NotDone => "[ ]",
	}
}

fn truncate(text: &str, width: usize) -> String {
	if text.chars().count() <= width {
		return text.to_string();
	}
	let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
	cut.push('…');
	cut
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use crate::calendar::{WeekStart, month_grid, week_grid};
	use crate::domain::{Task, TaskStatus};
	use crate::slots::week_slots;

	use super::{month_lines, task_lines, truncate, week_lines, weekday_header};

	fn date(year: i32, month: u32, day: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
	}

	#[test]
	fn weekday_header_follows_week_start() {
		assert!(weekday_header(WeekStart::Sunday, 4).trim_start().starts_with("Sun"));
		assert!(weekday_header(WeekStart::Monday, 4).trim_start().starts_with("Mon"));
	}

	#[test]
	fn month_lines_mark_selected_and_today() {
		let grid = month_grid(date(2024, 6, 1), date(2024, 6, 12), date(2024, 6, 3), WeekStart::Sunday);
		let lines = month_lines(&grid, WeekStart::Sunday);
		assert_eq!(lines[0], "June 2024");
		assert_eq!(lines.len(), 2 + grid.rows.len());
		assert!(lines[2].ends_with("   1"));
		assert!(lines[3].contains("3*"));
		assert!(lines[4].contains("[12]"));
	}

	#[test]
	fn week_lines_skip_empty_hours() {
		let tasks = vec![
			Task::from_input("Standup", "", "2024-06-12", "09:00", TaskStatus::Done).unwrap(),
			Task::from_input("Retro", "", "2024-06-12", "09:30", TaskStatus::NotDone).unwrap(),
		];
		let today = date(2024, 6, 12);
		let days = week_grid(today, today, today, WeekStart::Sunday);
		let slots = week_slots(&tasks, &days);

		let lines = week_lines(&slots, &days, false);
		assert_eq!(lines[0], "June 9 - 15");
		assert_eq!(lines.len(), 4);
		assert!(lines[2].starts_with("09:00"));
		assert!(lines[2].contains("#0 [x] Standup"));
		assert!(lines[3].contains("#1 [ ] Retro"));

		let all = week_lines(&slots, &days, true);
		assert_eq!(all.len(), 2 + 24 + 1);
	}

	#[test]
	fn empty_list_has_placeholder() {
		assert_eq!(task_lines(&[]), ["no tasks yet"]);
		assert_eq!(truncate("abcdef", 4), "abc…");
		assert_eq!(truncate("abc", 4), "abc");
	}
}
