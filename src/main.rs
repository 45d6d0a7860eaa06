use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;

use chronos_planner::calendar::{CalendarMode, Direction, Navigator};
use chronos_planner::config::Config;
use chronos_planner::domain::{Task, TaskPatch, TaskStatus, TaskTime, parse_date};
use chronos_planner::logging;
use chronos_planner::paths::resolve_state_dir;
use chronos_planner::planner::{Intent, Outcome, Planner};
use chronos_planner::slots::bind_indexed;
use chronos_planner::storage::{StoreSlot, TaskStore};
use chronos_planner::ui::{bound_lines, month_lines, print_lines, task_lines, week_lines};

#[derive(Debug, Parser)]
#[command(name = "chronos-planner", version, about = "Terminal week planner and task list")]
struct Cli {
	/// Directory holding config.toml and the task store
	#[arg(long)]
	state_dir: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Create the state directory, config and an empty task store
	Init,
	/// Print the month grid around a date
	Month {
		/// Selected date (YYYY-MM-DD), defaults to today
		#[arg(long)]
		date: Option<String>,
		/// Months to move forward (negative for back)
		#[arg(long, default_value_t = 0, allow_hyphen_values = true)]
		offset: i32,
	},
	/// Print the hour-by-hour table for a week
	Week {
		#[arg(long)]
		date: Option<String>,
		/// Weeks to move forward (negative for back)
		#[arg(long, default_value_t = 0, allow_hyphen_values = true)]
		offset: i32,
		/// Also print hours without tasks
		#[arg(long)]
		all_hours: bool,
	},
	/// List tasks in one (date, hour) slot
	Slot {
		#[arg(long)]
		date: String,
		/// Hour label, e.g. 09:00
		#[arg(long)]
		hour: String,
	},
	/// List all tasks with their index
	List,
	/// Add a task
	Add {
		#[arg(long)]
		title: String,
		#[arg(long, default_value = "")]
		description: String,
		/// Defaults to today
		#[arg(long)]
		date: Option<String>,
		/// HH:MM, defaults to config default_time or now
		#[arg(long)]
		time: Option<String>,
		#[arg(long)]
		done: bool,
	},
	/// Edit the task at an index
	Edit {
		index: usize,
		#[arg(long)]
		title: Option<String>,
		#[arg(long)]
		description: Option<String>,
		#[arg(long)]
		date: Option<String>,
		#[arg(long)]
		time: Option<String>,
		/// done or not-done
		#[arg(long)]
		status: Option<TaskStatus>,
	},
	/// Mark the task at an index as done
	Done { index: usize },
	/// Mark the task at an index as not done
	Undo { index: usize },
	/// Delete the task at an index
	Delete { index: usize },
	/// Remove every task
	Clear,
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	let state_dir = resolve_state_dir(cli.state_dir);
	let config = Config::load(&state_dir)?;
	logging::init(&config.log_level);

	let command = cli.command.unwrap_or(Command::Week {
		date: None,
		offset: 0,
		all_hours: false,
	});

	if let Command::Init = command {
		return init(&state_dir, &config);
	}

	let today = Local::now().date_naive();
	let store = TaskStore::open(StoreSlot::new(&state_dir, &config.store_key));
	let mut planner = Planner::new(
		store,
		Navigator::new(CalendarMode::Week, today, config.week_start),
		today,
	);

	match command {
		Command::Init => {}
		Command::Month { date, offset } => {
			select(&mut planner, CalendarMode::Month, date.as_deref(), offset)?;
			print_lines(&month_lines(&planner.month_view(), config.week_start));
		}
		Command::Week {
			date,
			offset,
			all_hours,
		} => {
			select(&mut planner, CalendarMode::Week, date.as_deref(), offset)?;
			let days = planner.week_days();
			print_lines(&week_lines(&planner.week_view(), &days, all_hours));
		}
		Command::Slot { date, hour } => {
			let date = parse_date(&date)?;
			let hour = TaskTime::parse(&hour)?.hour();
			print_lines(&bound_lines(&bind_indexed(planner.tasks(), date, hour)));
		}
		Command::List => {
			print_lines(&task_lines(planner.tasks()));
		}
		Command::Add {
			title,
			description,
			date,
			time,
			done,
		} => {
			let date = optional_date(date.as_deref(), today)?;
			let time = match time {
				Some(raw) => TaskTime::parse(&raw)?,
				None => config
					.default_time
					.unwrap_or_else(|| TaskTime::from_naive(Local::now().time())),
			};
			let status = if done { TaskStatus::Done } else { TaskStatus::NotDone };
			let task = Task::new(title, description, date, time, status)?;
			if let Outcome::Created(id) = planner.apply(Intent::CreateTask(task))? {
				println!("created task {id}");
			}
		}
		Command::Edit {
			index,
			title,
			description,
			date,
			time,
			status,
		} => {
			let patch = TaskPatch {
				title,
				description,
				date: date.as_deref().map(parse_date).transpose()?,
				time: time.as_deref().map(TaskTime::parse).transpose()?,
				status,
			};
			if patch.is_empty() {
				println!("nothing to change");
				return Ok(());
			}
			report(planner.apply(Intent::EditTask { index, patch })?);
		}
		Command::Done { index } => {
			report(planner.apply(Intent::SetStatus {
				index,
				status: TaskStatus::Done,
			})?);
		}
		Command::Undo { index } => {
			report(planner.apply(Intent::SetStatus {
				index,
				status: TaskStatus::NotDone,
			})?);
		}
		Command::Delete { index } => {
			report(planner.apply(Intent::DeleteTask { index })?);
		}
		Command::Clear => {
			let count = planner.tasks().len();
			planner.clear();
			println!("removed {count} tasks");
		}
	}

	Ok(())
}

fn init(state_dir: &Path, config: &Config) -> Result<(), Box<dyn Error>> {
	fs::create_dir_all(state_dir)?;
	if Config::init(state_dir)? {
		info!(path = %state_dir.display(), "wrote default config");
	}
	let slot = StoreSlot::new(state_dir, &config.store_key);
	if slot.read()?.is_none() {
		slot.write("[]")?;
	}
	println!("initialized planner at {}", state_dir.display());
	Ok(())
}

fn select(
	planner: &mut Planner,
	mode: CalendarMode,
	date: Option<&str>,
	offset: i32,
) -> Result<(), Box<dyn Error>> {
	let date = optional_date(date, planner.today())?;
	planner.apply(Intent::SetMode(mode))?;
	planner.apply(Intent::SelectDate(date))?;
	let direction = if offset < 0 { Direction::Previous } else { Direction::Next };
	for _ in 0..offset.unsigned_abs() {
		planner.apply(Intent::NavigatePeriod(direction))?;
	}
	Ok(())
}

fn optional_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, Box<dyn Error>> {
	match raw {
		Some(raw) => Ok(parse_date(raw)?),
		None => Ok(today),
	}
}

fn report(outcome: Outcome) {
	match outcome {
		Outcome::Updated(id) => println!("updated task {id}"),
		Outcome::Deleted(task) => println!("deleted task {} ({})", task.id, task.title),
		Outcome::Created(id) => println!("created task {id}"),
		Outcome::Navigated => {}
	}
}
