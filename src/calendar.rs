use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

const DAYS_PER_WEEK: i64 = 7;

/// First day of the week. Month and week grids must be built with the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    fn offset_of(self, day: NaiveDate) -> i64 {
        match self {
            WeekStart::Sunday => day.weekday().num_days_from_sunday() as i64,
            WeekStart::Monday => day.weekday().num_days_from_monday() as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarMode {
    Month,
    #[default]
    Week,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub date: NaiveDate,
    pub in_period: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month_start: NaiveDate,
    pub grid_start: NaiveDate,
    pub grid_end: NaiveDate,
    pub rows: Vec<[Cell; 7]>,
}

impl MonthGrid {
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flat_map(|row| row.iter())
    }

    pub fn cell_count(&self) -> usize {
        self.rows.len() * DAYS_PER_WEEK as usize
    }
}

pub fn month_grid(
    reference: NaiveDate,
    selected: NaiveDate,
    today: NaiveDate,
    week_start: WeekStart,
) -> MonthGrid {
    let month_start = first_day_of_month(reference);
    let month_end = last_day_of_month(reference);
    let grid_start = start_of_week(month_start, week_start);
    let grid_end = end_of_week(month_end, week_start);

    let mut rows = Vec::with_capacity(6);
    let mut day = grid_start;
    while day <= grid_end {
        rows.push(week_cells(day, |date| {
            let in_period = date.year() == month_start.year() && date.month() == month_start.month();
            Cell {
                date,
                in_period,
                is_today: date == today,
                is_selected: date == selected,
            }
        }));
        match day.checked_add_signed(Duration::days(DAYS_PER_WEEK)) {
            Some(next) => day = next,
            None => break,
        }
    }

    MonthGrid {
        month_start,
        grid_start,
        grid_end,
        rows,
    }
}

pub fn week_grid(
    reference: NaiveDate,
    selected: NaiveDate,
    today: NaiveDate,
    week_start: WeekStart,
) -> [Cell; 7] {
    week_cells(start_of_week(reference, week_start), |date| Cell {
        date,
        in_period: true,
        is_today: date == today,
        is_selected: date == selected,
    })
}

/// Near `NaiveDate::MAX` the row is pulled back so all seven days exist.
fn week_cells(first: NaiveDate, mut cell: impl FnMut(NaiveDate) -> Cell) -> [Cell; 7] {
    let first = first.min(offset_days(NaiveDate::MAX, -(DAYS_PER_WEEK - 1)));
    std::array::from_fn(|offset| cell(offset_days(first, offset as i64)))
}

/// Adds `days`, saturating at the representable date range.
fn offset_days(day: NaiveDate, days: i64) -> NaiveDate {
    day.checked_add_signed(Duration::days(days)).unwrap_or(if days < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

pub fn start_of_week(day: NaiveDate, week_start: WeekStart) -> NaiveDate {
    offset_days(day, -week_start.offset_of(day))
}

pub fn end_of_week(day: NaiveDate, week_start: WeekStart) -> NaiveDate {
    offset_days(start_of_week(day, week_start), DAYS_PER_WEEK - 1)
}

pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

pub fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    offset_days(
        first_day_of_month(day),
        days_in_month(day.year(), day.month()) as i64 - 1,
    )
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Moves `day` by `delta` months, clamping the day of month to the target month.
pub fn shift_month(day: NaiveDate, delta: i32) -> NaiveDate {
    let months = day.year() * 12 + day.month0() as i32 + delta;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) as u32 + 1;
    let target_day = day.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, target_day).unwrap_or(day)
}

pub fn month_label(day: NaiveDate) -> String {
    day.format("%B %Y").to_string()
}

/// Header for a week, e.g. `June 2 - 8` or `June 30 - July 6`.
pub fn week_label(week_first: NaiveDate) -> String {
    let week_last = offset_days(week_first, DAYS_PER_WEEK - 1);
    if week_first.month() == week_last.month() {
        format!("{} - {}", week_first.format("%B %-d"), week_last.format("%-d"))
    } else {
        format!("{} - {}", week_first.format("%B %-d"), week_last.format("%B %-d"))
    }
}

/// Transient view state: which period is displayed and which day is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    mode: CalendarMode,
    anchor: NaiveDate,
    selected: NaiveDate,
    week_start: WeekStart,
}

impl Navigator {
    pub fn new(mode: CalendarMode, selected: NaiveDate, week_start: WeekStart) -> Self {
        Self {
            mode,
            anchor: anchor_for(mode, selected, week_start),
            selected,
            week_start,
        }
    }

    pub fn mode(&self) -> CalendarMode {
        self.mode
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn previous_period(&mut self) {
        self.navigate(Direction::Previous);
    }

    pub fn next_period(&mut self) {
        self.navigate(Direction::Next);
    }

    pub fn navigate(&mut self, direction: Direction) {
        let step = match direction {
            Direction::Previous => -1,
            Direction::Next => 1,
        };
        self.anchor = match self.mode {
            CalendarMode::Month => shift_month(self.anchor, step),
            CalendarMode::Week => self
                .anchor
                .checked_add_signed(Duration::days(DAYS_PER_WEEK * step as i64))
                .unwrap_or(self.anchor),
        };
    }

    pub fn select(&mut self, date: NaiveDate) {
        self.selected = date;
        let outside = match self.mode {
            CalendarMode::Month => first_day_of_month(date) != self.anchor,
            CalendarMode::Week => start_of_week(date, self.week_start) != self.anchor,
        };
        if outside {
            self.anchor = anchor_for(self.mode, date, self.week_start);
        }
    }

    pub fn set_mode(&mut self, mode: CalendarMode) {
        self.mode = mode;
        self.anchor = anchor_for(mode, self.selected, self.week_start);
    }

    pub fn today(&mut self, today: NaiveDate) {
        self.selected = today;
        self.anchor = anchor_for(self.mode, today, self.week_start);
    }

    pub fn month_grid(&self, today: NaiveDate) -> MonthGrid {
        month_grid(self.anchor, self.selected, today, self.week_start)
    }

    pub fn week_grid(&self, today: NaiveDate) -> [Cell; 7] {
        week_grid(self.anchor, self.selected, today, self.week_start)
    }
}

fn anchor_for(mode: CalendarMode, date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    match mode {
        CalendarMode::Month => first_day_of_month(date),
        CalendarMode::Week => start_of_week(date, week_start),
    }
}
