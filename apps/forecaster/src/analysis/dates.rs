use chrono::{Datelike, Days, NaiveDate};

/// Format used for every date that is shown to the generator.
pub const PROMPT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default forecasting horizon: questions must resolve within this many days.
pub const DEFAULT_HORIZON_DAYS: u32 = 21;

/// The reference dates a generated question is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDates {
    pub today: NaiveDate,
    pub horizon: NaiveDate,
    pub last_day_of_month: NaiveDate,
    pub last_day_of_year: NaiveDate,
}

impl ReferenceDates {
    pub fn from_today(today: NaiveDate, horizon_days: u32) -> Self {
        Self {
            today,
            horizon: today
                .checked_add_days(Days::new(u64::from(horizon_days)))
                .unwrap_or(NaiveDate::MAX),
            last_day_of_month: last_day_of_month(today),
            last_day_of_year: last_day_of_year(today),
        }
    }
}

pub fn format_prompt_date(date: NaiveDate) -> String {
    date.format(PROMPT_DATE_FORMAT).to_string()
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

fn last_day_of_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}
