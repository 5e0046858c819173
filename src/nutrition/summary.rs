use serde::Serialize;
use time::{Date, UtcOffset};

use super::aggregate::{aggregate_daily, aggregate_range};
use super::alerts::{generate_alerts, Alert};
use super::dates::iso_date;
use super::error::Result;
use super::limits::compute_limits;
use super::status::StatusReport;
use super::types::{FoodLogEntry, NutrientAmount, NutrientLimitSet, NutrientTable, Profile};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub totals: NutrientTable<NutrientAmount>,
    pub limits: NutrientLimitSet,
    pub status: NutrientTable<StatusReport>,
    pub meal_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(flatten)]
    pub intake: NutrientTable<f64>,
    pub meal_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub days: Vec<DayPoint>,
    pub limits: NutrientTable<f64>,
}

// Limits are computed first so an invalid profile fails before any entry is read.

pub fn daily_summary(
    profile: &Profile,
    entries: &[FoodLogEntry],
    day: Date,
    offset: UtcOffset,
) -> Result<DailySummary> {
    let limits = compute_limits(profile)?;
    let day_totals = aggregate_daily(entries, day, offset)?;
    let status = NutrientTable::try_from_fn(|n| {
        StatusReport::evaluate(day_totals.totals.get(n).value(), limits.get(n).value())
    })?;
    Ok(DailySummary {
        date: day_totals.date,
        totals: day_totals.totals,
        limits,
        status,
        meal_count: day_totals.meal_count,
    })
}

pub fn daily_alerts(
    profile: &Profile,
    entries: &[FoodLogEntry],
    day: Date,
    offset: UtcOffset,
) -> Result<Vec<Alert>> {
    let limits = compute_limits(profile)?;
    let day_totals = aggregate_daily(entries, day, offset)?;
    generate_alerts(&day_totals, &limits)
}

pub fn weekly_summary(
    profile: &Profile,
    entries: &[FoodLogEntry],
    start_day: Date,
    num_days: u32,
    offset: UtcOffset,
) -> Result<WeeklySummary> {
    let limits = compute_limits(profile)?;
    let days = aggregate_range(entries, start_day, num_days, offset)
        .map(|day| {
            day.map(|d| DayPoint {
                date: d.date,
                intake: d.totals.values(),
                meal_count: d.meal_count,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(WeeklySummary {
        days,
        limits: limits.values(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::error::NutritionError;
    use crate::nutrition::status::NutrientStatus;
    use crate::nutrition::types::ActivityLevel;
    use time::macros::{date, datetime, offset};
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn profile() -> Profile {
        Profile {
            ckd_stage: 3,
            weight_kg: 70.0,
            activity_level: ActivityLevel::Moderate,
        }
    }

    fn meal(
        at: OffsetDateTime,
        protein: f64,
        potassium: f64,
        phosphorus: f64,
        sodium: f64,
    ) -> FoodLogEntry {
        FoodLogEntry {
            id: Uuid::new_v4(),
            food_name: "meal".into(),
            portion_size: 150.0,
            portion_unit: "g".into(),
            nutrients: NutrientTable {
                protein: Some(protein),
                potassium: Some(potassium),
                phosphorus: Some(phosphorus),
                sodium: Some(sodium),
            },
            confidence_score: 0.82,
            image_url: None,
            logged_at: at,
        }
    }

    fn day_entries() -> Vec<FoodLogEntry> {
        vec![
            meal(datetime!(2025-05-02 08:00 UTC), 25.0, 1000.0, 200.0, 400.0),
            meal(datetime!(2025-05-02 13:00 UTC), 35.0, 1500.0, 300.0, 600.0),
            meal(datetime!(2025-05-04 19:00 UTC), 5.0, 100.0, 50.0, 80.0),
        ]
    }

    #[test]
    fn daily_summary_scenario() {
        let summary =
            daily_summary(&profile(), &day_entries(), date!(2025 - 05 - 02), offset!(UTC)).unwrap();
        assert_eq!(summary.meal_count, 2);
        assert_eq!(summary.totals.values(), NutrientTable {
            protein: 60.0,
            potassium: 2500.0,
            phosphorus: 500.0,
            sodium: 1000.0,
        });
        assert_eq!(summary.status.protein.status, NutrientStatus::High);
        assert_eq!(summary.status.potassium.status, NutrientStatus::Warning);
        assert_eq!(summary.status.phosphorus.status, NutrientStatus::Safe);
        assert_eq!(summary.status.sodium.status, NutrientStatus::Safe);
        assert!((summary.status.sodium.percent_of_limit - 50.0).abs() < 1e-9);
    }

    #[test]
    fn daily_summary_json_shape() {
        let summary =
            daily_summary(&profile(), &day_entries(), date!(2025 - 05 - 02), offset!(UTC)).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["date"], "2025-05-02");
        assert_eq!(json["totals"]["protein"]["unit"], "g");
        assert_eq!(json["limits"]["sodium"]["value"], 2000.0);
        assert_eq!(json["status"]["potassium"]["status"], "warning");
        assert_eq!(json["status"]["protein"]["color"], "red");
        assert_eq!(json["meal_count"], 2);
    }

    #[test]
    fn alerts_for_empty_day_are_all_low() {
        let alerts =
            daily_alerts(&profile(), &day_entries(), date!(2025 - 05 - 03), offset!(UTC)).unwrap();
        assert_eq!(alerts.len(), 4);
        assert!(alerts.iter().all(|a| a.priority == 2));
    }

    #[test]
    fn weekly_has_point_per_day() {
        let weekly =
            weekly_summary(&profile(), &day_entries(), date!(2025 - 04 - 28), 7, offset!(UTC))
                .unwrap();
        assert_eq!(weekly.days.len(), 7);
        assert_eq!(weekly.days[4].date, date!(2025 - 05 - 02));
        assert_eq!(weekly.days[4].intake.protein, 60.0);
        assert_eq!(weekly.days[6].meal_count, 1);
        assert_eq!(weekly.days[0].intake, NutrientTable::default());
        assert_eq!(weekly.limits.potassium, 3000.0);

        let json = serde_json::to_value(&weekly).unwrap();
        assert_eq!(json["days"][4]["sodium"], 1000.0);
    }

    #[test]
    fn invalid_profile_fails_fast() {
        let bad = Profile {
            ckd_stage: 7,
            ..profile()
        };
        assert!(matches!(
            daily_summary(&bad, &day_entries(), date!(2025 - 05 - 02), offset!(UTC)),
            Err(NutritionError::InvalidProfile(_))
        ));
        assert!(matches!(
            weekly_summary(&bad, &[], date!(2025 - 05 - 02), 7, offset!(UTC)),
            Err(NutritionError::InvalidProfile(_))
        ));
    }
}
