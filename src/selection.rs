use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Exact English month name, e.g. "March".
    pub fn from_name(name: &str) -> Option<Month> {
        Month::ALL.into_iter().find(|m| m.name() == name)
    }

    /// 1-based month number, as returned by `chrono::Datelike::month`.
    pub fn from_number(n: u32) -> Option<Month> {
        Month::ALL.get((n as usize).checked_sub(1)?).copied()
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Step forward or back, wrapping around the year.
    pub fn offset(self, delta: i32) -> Month {
        let idx = (self.index() as i32 + delta).rem_euclid(12) as usize;
        Month::ALL[idx]
    }
}

/// The four selectable years: two before the seed year through one after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    years: [i32; 4],
}

impl YearWindow {
    pub fn around(current: i32) -> Self {
        Self {
            years: [current - 2, current - 1, current, current + 1],
        }
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.years[0], self.years[3])
    }
}

/// Month/year the dashboard is viewed for. Display only: changing it does
/// not change which data is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    month: Month,
    year: i32,
    window: YearWindow,
}

impl Selection {
    pub fn seeded(today: NaiveDate) -> Self {
        let year = today.year();
        Self {
            month: Month::from_number(today.month()).unwrap_or(Month::January),
            year,
            window: YearWindow::around(year),
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn window(&self) -> &YearWindow {
        &self.window
    }

    pub fn set_month(&mut self, month: Month) {
        self.month = month;
    }

    /// Returns false and leaves the selection alone for unknown names.
    pub fn set_month_name(&mut self, name: &str) -> bool {
        match Month::from_name(name) {
            Some(m) => {
                self.month = m;
                true
            }
            None => false,
        }
    }

    /// Returns false and leaves the selection alone for years outside the window.
    pub fn set_year(&mut self, year: i32) -> bool {
        if !self.window.contains(year) {
            return false;
        }
        self.year = year;
        true
    }

    pub fn step_month(&mut self, delta: i32) {
        self.month = self.month.offset(delta);
    }

    /// Stops at either end of the window.
    pub fn step_year(&mut self, delta: i32) {
        self.year = self.window.clamp(self.year.saturating_add(delta));
    }
}
