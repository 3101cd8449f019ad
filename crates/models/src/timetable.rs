use chrono::NaiveTime;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// Teaching days of the week
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[cfg_attr(feature = "database", derive(sea_orm::DeriveActiveEnum))]
#[cfg_attr(feature = "database", sea_orm(rs_type = "String", db_type = "Text"))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Weekday {
    #[cfg_attr(feature = "database", sea_orm(string_value = "monday"))]
    Monday,
    #[cfg_attr(feature = "database", sea_orm(string_value = "tuesday"))]
    Tuesday,
    #[cfg_attr(feature = "database", sea_orm(string_value = "wednesday"))]
    Wednesday,
    #[cfg_attr(feature = "database", sea_orm(string_value = "thursday"))]
    Thursday,
    #[cfg_attr(feature = "database", sea_orm(string_value = "friday"))]
    Friday,
    #[cfg_attr(feature = "database", sea_orm(string_value = "saturday"))]
    Saturday,
}

impl Weekday {
    pub fn all() -> Vec<Weekday> {
        Weekday::iter().collect()
    }

    /// Monday to Friday
    pub fn working_week() -> Vec<Weekday> {
        Weekday::iter().take(5).collect()
    }

    /// Maps a calendar weekday, `None` on Sunday
    pub fn from_chrono(day: chrono::Weekday) -> Option<Self> {
        match day {
            chrono::Weekday::Mon => Some(Self::Monday),
            chrono::Weekday::Tue => Some(Self::Tuesday),
            chrono::Weekday::Wed => Some(Self::Wednesday),
            chrono::Weekday::Thu => Some(Self::Thursday),
            chrono::Weekday::Fri => Some(Self::Friday),
            chrono::Weekday::Sat => Some(Self::Saturday),
            chrono::Weekday::Sun => None,
        }
    }

    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

/// What a period in the day is used for
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[cfg_attr(feature = "database", derive(sea_orm::DeriveActiveEnum))]
#[cfg_attr(feature = "database", sea_orm(rs_type = "String", db_type = "Text"))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PeriodType {
    #[default]
    #[cfg_attr(feature = "database", sea_orm(string_value = "class"))]
    Class,
    #[cfg_attr(feature = "database", sea_orm(string_value = "break"))]
    Break,
    #[cfg_attr(feature = "database", sea_orm(string_value = "lunch"))]
    Lunch,
}

impl PeriodType {
    pub fn is_teaching(self) -> bool {
        self == Self::Class
    }
}

/// Custom error type for timetable templates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TemplateError {
    NoDays,
    NoSlots,
    NoRooms,
    InvalidTime(String),
    EndBeforeStart { start: String, end: String },
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NoDays => write!(f, "At least one day is required"),
            Self::NoSlots => write!(f, "At least one time slot is required"),
            Self::NoRooms => write!(f, "At least one room is required"),
            Self::InvalidTime(time) => write!(f, "Invalid time '{time}', expected HH:MM"),
            Self::EndBeforeStart { start, end } => {
                write!(f, "Slot ending at {end} must end after its start {start}")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// One slot of the daily template, times are `HH:MM`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotTemplate {
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub period_type: PeriodType,
}

impl SlotTemplate {
    pub fn new(start_time: &str, end_time: &str, period_type: PeriodType) -> Self {
        Self {
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            period_type,
        }
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;
        if end <= start {
            return Err(TemplateError::EndBeforeStart {
                start: self.start_time.clone(),
                end: self.end_time.clone(),
            });
        }
        Ok(())
    }
}

pub fn parse_time(time: &str) -> Result<NaiveTime, TemplateError> {
    NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| TemplateError::InvalidTime(time.into()))
}

/// The standard college day: seven teaching periods with a short break and lunch
pub fn default_slots() -> Vec<SlotTemplate> {
    vec![
        SlotTemplate::new("09:00", "09:50", PeriodType::Class),
        SlotTemplate::new("09:50", "10:40", PeriodType::Class),
        SlotTemplate::new("10:40", "10:55", PeriodType::Break),
        SlotTemplate::new("10:55", "11:45", PeriodType::Class),
        SlotTemplate::new("11:45", "12:35", PeriodType::Class),
        SlotTemplate::new("12:35", "13:20", PeriodType::Lunch),
        SlotTemplate::new("13:20", "14:10", PeriodType::Class),
        SlotTemplate::new("14:10", "15:00", PeriodType::Class),
        SlotTemplate::new("15:00", "15:50", PeriodType::Class),
    ]
}

pub fn default_rooms() -> Vec<String> {
    ["Room 101", "Room 102", "Room 201", "Room 202", "Lab 1"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// How often a subject must appear in the week
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectLoad<T> {
    pub subject: T,
    pub faculty: Option<T>,
    pub periods_per_week: u32,
}

/// A period produced by [`generate`]
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPeriod<T> {
    pub day: Weekday,
    /// 1-based position in the day, breaks included
    pub period_number: u32,
    pub start_time: String,
    pub end_time: String,
    pub period_type: PeriodType,
    pub subject: Option<T>,
    pub faculty: Option<T>,
    pub room: Option<String>,
}

/// Fills a week of slots with subjects in round-robin order.
///
/// Breaks and lunch are copied from the template. Every teaching slot takes the
/// next subject (after the one last placed) that has not yet reached its weekly
/// quota, and a random room. When every quota is met the slot is left free.
/// Nothing checks whether the faculty or room is already booked elsewhere.
pub fn generate<T: Clone, R: Rng + ?Sized>(
    loads: &[SubjectLoad<T>],
    days: &[Weekday],
    slots: &[SlotTemplate],
    rooms: &[String],
    rng: &mut R,
) -> Result<Vec<GeneratedPeriod<T>>, TemplateError> {
    if days.is_empty() {
        return Err(TemplateError::NoDays);
    }
    if slots.is_empty() {
        return Err(TemplateError::NoSlots);
    }
    if rooms.is_empty() {
        return Err(TemplateError::NoRooms);
    }
    for slot in slots {
        slot.validate()?;
    }

    let mut scheduled = vec![0u32; loads.len()];
    let mut cursor = 0usize;
    let mut periods = Vec::with_capacity(days.len() * slots.len());

    for &day in days {
        for (idx, slot) in slots.iter().enumerate() {
            let mut period = GeneratedPeriod {
                day,
                period_number: idx as u32 + 1,
                start_time: slot.start_time.clone(),
                end_time: slot.end_time.clone(),
                period_type: slot.period_type,
                subject: None,
                faculty: None,
                room: None,
            };

            if slot.period_type.is_teaching()
                && let Some(next) = next_under_quota(loads, &scheduled, cursor)
            {
                let load = &loads[next];
                scheduled[next] += 1;
                cursor = (next + 1) % loads.len();

                period.subject = Some(load.subject.clone());
                period.faculty = load.faculty.clone();
                period.room = rooms.choose(rng).cloned();
            }

            periods.push(period);
        }
    }

    Ok(periods)
}

fn next_under_quota<T>(loads: &[SubjectLoad<T>], scheduled: &[u32], cursor: usize) -> Option<usize> {
    (0..loads.len())
        .map(|offset| (cursor + offset) % loads.len())
        .find(|&idx| scheduled[idx] < loads[idx].periods_per_week)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashMap;
    use std::str::FromStr;

    fn load(subject: &'static str, periods_per_week: u32) -> SubjectLoad<&'static str> {
        SubjectLoad {
            subject,
            faculty: Some("prof"),
            periods_per_week,
        }
    }

    #[test]
    fn test_weekday_from_str() {
        assert_eq!(Weekday::from_str("monday").unwrap(), Weekday::Monday);
        assert_eq!(Weekday::from_str("Friday").unwrap(), Weekday::Friday);
        assert_eq!(Weekday::working_week().len(), 5);
        assert_eq!(
            Weekday::from_chrono(chrono::Weekday::Sun),
            None
        );
    }

    #[test]
    fn test_slot_validation() {
        assert!(SlotTemplate::new("09:00", "09:50", PeriodType::Class).validate().is_ok());
        assert_eq!(
            SlotTemplate::new("9am", "09:50", PeriodType::Class).validate(),
            Err(TemplateError::InvalidTime("9am".into()))
        );
        assert!(matches!(
            SlotTemplate::new("10:00", "09:00", PeriodType::Class).validate(),
            Err(TemplateError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn test_generate_round_robin_order() {
        let loads = [load("math", 2), load("physics", 2), load("chem", 1)];
        let slots = vec![
            SlotTemplate::new("09:00", "10:00", PeriodType::Class),
            SlotTemplate::new("10:00", "11:00", PeriodType::Class),
            SlotTemplate::new("11:00", "11:15", PeriodType::Break),
            SlotTemplate::new("11:15", "12:15", PeriodType::Class),
        ];
        let mut rng = StdRng::seed_from_u64(7);

        let periods = generate(
            &loads,
            &[Weekday::Monday, Weekday::Tuesday],
            &slots,
            &default_rooms(),
            &mut rng,
        )
        .unwrap();

        let subjects: Vec<Option<&str>> = periods.iter().map(|p| p.subject).collect();
        assert_eq!(
            subjects,
            vec![
                Some("math"),
                Some("physics"),
                None,
                Some("chem"),
                Some("math"),
                Some("physics"),
                None,
                None,
            ]
        );
        assert_eq!(periods[2].period_type, PeriodType::Break);
        assert_eq!(periods[7].period_type, PeriodType::Class);
        assert!(periods[7].room.is_none());
    }

    #[test]
    fn test_generate_respects_quotas() {
        let loads = [load("math", 4), load("physics", 3), load("lab", 0)];
        let mut rng = StdRng::seed_from_u64(1);

        let periods = generate(
            &loads,
            &Weekday::working_week(),
            &default_slots(),
            &default_rooms(),
            &mut rng,
        )
        .unwrap();

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for subject in periods.iter().filter_map(|p| p.subject) {
            *counts.entry(subject).or_default() += 1;
        }

        assert_eq!(counts.get("math"), Some(&4));
        assert_eq!(counts.get("physics"), Some(&3));
        assert_eq!(counts.get("lab"), None);
        assert_eq!(periods.len(), 5 * default_slots().len());
    }

    #[test]
    fn test_generate_assigns_rooms_from_list() {
        let loads = [load("math", 10)];
        let rooms = vec!["A".to_string(), "B".to_string()];
        let mut rng = StdRng::seed_from_u64(42);

        let periods = generate(&loads, &[Weekday::Monday], &default_slots(), &rooms, &mut rng)
            .unwrap();

        for period in periods.iter().filter(|p| p.subject.is_some()) {
            let room = period.room.as_deref().unwrap();
            assert!(room == "A" || room == "B");
            assert_eq!(period.faculty, Some("prof"));
        }
        for period in periods.iter().filter(|p| !p.period_type.is_teaching()) {
            assert!(period.subject.is_none());
            assert!(period.room.is_none());
        }
    }

    #[test]
    fn test_generate_no_subjects_leaves_slots_free() {
        let loads: [SubjectLoad<&str>; 0] = [];
        let mut rng = StdRng::seed_from_u64(3);
        let periods = generate(
            &loads,
            &[Weekday::Monday],
            &default_slots(),
            &default_rooms(),
            &mut rng,
        )
        .unwrap();
        assert!(periods.iter().all(|p| p.subject.is_none()));
    }

    #[test]
    fn test_generate_rejects_empty_inputs() {
        let loads = [load("math", 1)];
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            generate(&loads, &[], &default_slots(), &default_rooms(), &mut rng),
            Err(TemplateError::NoDays)
        );
        assert_eq!(
            generate(&loads, &[Weekday::Monday], &[], &default_rooms(), &mut rng),
            Err(TemplateError::NoSlots)
        );
        assert_eq!(
            generate(&loads, &[Weekday::Monday], &default_slots(), &[], &mut rng),
            Err(TemplateError::NoRooms)
        );
    }
}
