use chrono::{DateTime, Duration, Months, Utc};

/// Length of a purchased plan, as carried in the checkout session's
/// `duration` metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanDuration {
    SevenDays,
    OneMonth,
    ThreeMonths,
    /// A label the checkout flow sent that has no known period.
    /// The subscription window collapses to zero length until product decides
    /// whether to default or reject these.
    Unrecognized(String),
}

impl PlanDuration {
    pub fn parse(label: &str) -> Self {
        match label {
            "7 días" => PlanDuration::SevenDays,
            "1 mes" => PlanDuration::OneMonth,
            "3 meses" => PlanDuration::ThreeMonths,
            other => PlanDuration::Unrecognized(other.to_string()),
        }
    }

    pub fn as_label(&self) -> &str {
        match self {
            PlanDuration::SevenDays => "7 días",
            PlanDuration::OneMonth => "1 mes",
            PlanDuration::ThreeMonths => "3 meses",
            PlanDuration::Unrecognized(label) => label,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, PlanDuration::Unrecognized(_))
    }

    /// End of the validity window starting at `start`.
    ///
    /// Calendar months clamp to the last day of the target month
    /// (Jan 31 + 1 month = Feb 28/29).
    pub fn end_date(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            PlanDuration::SevenDays => start + Duration::days(7),
            PlanDuration::OneMonth => add_months(start, 1),
            PlanDuration::ThreeMonths => add_months(start, 3),
            PlanDuration::Unrecognized(_) => start,
        }
    }
}

fn add_months(start: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
