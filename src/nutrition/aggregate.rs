use serde::Serialize;
use time::{Date, UtcOffset};

use super::dates::{iso_date, local_date};
use super::error::Result;
use super::types::{FoodLogEntry, NutrientAmount, NutrientTable};

/// Summed intake of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub totals: NutrientTable<NutrientAmount>,
    pub meal_count: usize,
}

impl DailyTotals {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            totals: NutrientTable::zeroed(),
            meal_count: 0,
        }
    }

    // Every value is checked before any is added.
    fn add_entry(&mut self, entry: &FoodLogEntry) -> Result<()> {
        let values = entry.nutrient_values()?;
        for (nutrient, value) in values.iter() {
            self.totals.get_mut(nutrient).add(*value);
        }
        self.meal_count += 1;
        Ok(())
    }
}

pub fn aggregate_daily(
    entries: &[FoodLogEntry],
    day: Date,
    offset: UtcOffset,
) -> Result<DailyTotals> {
    let mut totals = DailyTotals::empty(day);
    for entry in entries
        .iter()
        .filter(|e| local_date(e.logged_at, offset) == day)
    {
        totals.add_entry(entry)?;
    }
    Ok(totals)
}

/// Lazy per-day totals over `[start, start + num_days - 1]`, stopping at
/// the last supported date. A clone replays the remaining days from the
/// same borrowed entries.
#[derive(Debug, Clone)]
pub struct DailyRange<'a> {
    entries: &'a [FoodLogEntry],
    next_day: Date,
    remaining: u32,
    offset: UtcOffset,
}

impl<'a> Iterator for DailyRange<'a> {
    type Item = Result<DailyTotals>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let day = self.next_day;
        self.remaining -= 1;
        // remaining is clamped at construction, so this only fails on the last item
        if let Some(next) = day.next_day() {
            self.next_day = next;
        }
        Some(aggregate_daily(self.entries, day, self.offset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for DailyRange<'_> {}

pub fn aggregate_range(
    entries: &[FoodLogEntry],
    start_day: Date,
    num_days: u32,
    offset: UtcOffset,
) -> DailyRange<'_> {
    let days_left = Date::MAX.to_julian_day() - start_day.to_julian_day() + 1;
    let remaining = u32::try_from(days_left).map_or(num_days, |left| num_days.min(left));
    DailyRange {
        entries,
        next_day: start_day,
        remaining,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::error::NutritionError;
    use crate::nutrition::types::Nutrient;
    use time::macros::{date, datetime, offset};
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn entry(at: OffsetDateTime, values: [f64; 4]) -> FoodLogEntry {
        FoodLogEntry {
            id: Uuid::new_v4(),
            food_name: "test meal".into(),
            portion_size: 100.0,
            portion_unit: "g".into(),
            nutrients: NutrientTable {
                protein: Some(values[0]),
                potassium: Some(values[1]),
                phosphorus: Some(values[2]),
                sodium: Some(values[3]),
            },
            confidence_score: 0.8,
            image_url: None,
            logged_at: at,
        }
    }

    fn sample() -> Vec<FoodLogEntry> {
        vec![
            entry(datetime!(2025-03-10 00:00 UTC), [10.0, 100.0, 50.0, 200.0]),
            entry(datetime!(2025-03-10 12:15 UTC), [20.0, 300.0, 100.0, 400.0]),
            entry(datetime!(2025-03-10 23:59:59.999 UTC), [1.5, 5.0, 5.0, 5.0]),
            entry(datetime!(2025-03-11 00:00 UTC), [7.0, 70.0, 7.0, 70.0]),
            entry(datetime!(2025-03-13 08:00 UTC), [3.0, 30.0, 3.0, 30.0]),
        ]
    }

    #[test]
    fn daily_sums_entries_inside_day_bounds() {
        let totals = aggregate_daily(&sample(), date!(2025 - 03 - 10), offset!(UTC)).unwrap();
        assert_eq!(totals.meal_count, 3);
        assert_eq!(totals.totals.values(), NutrientTable {
            protein: 31.5,
            potassium: 405.0,
            phosphorus: 155.0,
            sodium: 605.0,
        });
    }

    #[test]
    fn day_boundaries_follow_reference_offset() {
        // 23:59 UTC on the 10th is the 11th at +01:00.
        let totals = aggregate_daily(&sample(), date!(2025 - 03 - 11), offset!(+1)).unwrap();
        assert_eq!(totals.meal_count, 2);
        assert_eq!(totals.totals.protein.value(), 8.5);
    }

    #[test]
    fn daily_is_idempotent() {
        let entries = sample();
        let first = aggregate_daily(&entries, date!(2025 - 03 - 10), offset!(UTC)).unwrap();
        let second = aggregate_daily(&entries, date!(2025 - 03 - 10), offset!(UTC)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn range_includes_empty_days() {
        let days: Vec<DailyTotals> =
            aggregate_range(&sample(), date!(2025 - 03 - 09), 6, offset!(UTC))
                .collect::<Result<_>>()
            .unwrap();
        let counts: Vec<usize> = days.iter().map(|d| d.meal_count).collect();
        assert_eq!(counts, vec![0, 3, 1, 0, 1, 0]);
        assert_eq!(days[0].date, date!(2025 - 03 - 09));
        assert_eq!(days[5].date, date!(2025 - 03 - 14));
        assert_eq!(days[3].totals, NutrientTable::zeroed());
    }

    #[test]
    fn range_matches_daily_for_each_day() {
        let entries = sample();
        let start = date!(2025 - 03 - 08);
        for (i, day) in aggregate_range(&entries, start, 8, offset!(-3)).enumerate() {
            let day = day.unwrap();
            let expected_date = start + time::Duration::days(i as i64);
            let daily = aggregate_daily(&entries, expected_date, offset!(-3)).unwrap();
            assert_eq!(day, daily);
        }
    }

    #[test]
    fn range_is_restartable_and_sized() {
        let entries = sample();
        let range = aggregate_range(&entries, date!(2025 - 03 - 10), 4, offset!(UTC));
        assert_eq!(range.len(), 4);
        let first: Vec<_> = range.clone().collect();
        let second: Vec<_> = range.collect();
        assert_eq!(first, second);
        assert_eq!(aggregate_range(&entries, date!(2025 - 03 - 10), 0, offset!(UTC)).count(), 0);
    }

    #[test]
    fn range_length_stops_at_last_supported_day() {
        let range = aggregate_range(&[], Date::MAX, 3, offset!(UTC));
        assert_eq!(range.len(), 1);
        assert_eq!(range.count(), 1);

        let near_end = Date::MAX.previous_day().unwrap();
        let days: Vec<Date> = aggregate_range(&[], near_end, 5, offset!(UTC))
            .map(|d| d.unwrap().date)
            .collect();
        assert_eq!(days, vec![near_end, Date::MAX]);
    }

    #[test]
    fn malformed_entry_is_not_zeroed() {
        let mut entries = sample();
        entries[1].nutrients.sodium = None;
        let bad_id = entries[1].id;
        let err = aggregate_daily(&entries, date!(2025 - 03 - 10), offset!(UTC)).unwrap_err();
        assert_eq!(
            err,
            NutritionError::MalformedEntry {
                entry_id: bad_id,
                nutrient: Nutrient::Sodium
            }
        );

        // Days without the broken entry still aggregate.
        assert!(aggregate_daily(&entries, date!(2025 - 03 - 11), offset!(UTC)).is_ok());
    }

    #[test]
    fn negative_value_is_malformed() {
        let entries = vec![entry(datetime!(2025-03-10 09:00 UTC), [1.0, -4.0, 1.0, 1.0])];
        assert!(matches!(
            aggregate_daily(&entries, date!(2025 - 03 - 10), offset!(UTC)),
            Err(NutritionError::MalformedEntry { nutrient: Nutrient::Potassium, .. })
        ));
    }
}
