//! Consumption domain models.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::TREND_WINDOW_DAYS;
use crate::errors::{Error, Result};

/// A single domestic consumption event.
///
/// Events are immutable once created by the store; `id` is store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionEvent {
    pub id: String,
    pub user_id: String,
    pub product_name: String,
    pub quantity_used: f64,
    pub timestamp: DateTime<Utc>,
}

/// Input model for recording consumption
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewConsumptionEvent {
    pub product_name: String,
    pub quantity_used: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewConsumptionEvent {
    /// Validates the input and stamps it with `now` when no timestamp is given.
    pub fn normalized(self, now: DateTime<Utc>) -> Result<Self> {
        if self.product_name.trim().is_empty() {
            return Err(Error::missing_field("productName"));
        }
        if !self.quantity_used.is_finite() || self.quantity_used <= 0.0 {
            return Err(Error::invalid_input(format!(
                "Consumed quantity must be positive, got {}",
                self.quantity_used
            )));
        }
        Ok(Self {
            product_name: self.product_name.trim().to_string(),
            quantity_used: self.quantity_used,
            timestamp: Some(self.timestamp.unwrap_or(now)),
        })
    }
}

/// Total consumed quantity for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyConsumption {
    pub date: NaiveDate,
    pub total: f64,
}

/// First day of the trend window ending at `today`.
///
/// Fails for dates so close to the calendar minimum that the window would
/// start before it.
pub fn trend_start(today: NaiveDate) -> Result<NaiveDate> {
    today
        .checked_sub_signed(Duration::days(TREND_WINDOW_DAYS - 1))
        .ok_or_else(|| Error::invalid_input(format!("Trend date out of range: {}", today)))
}

/// Sums consumed quantities per day over the trend window ending at `today`.
///
/// Days without events are reported with a zero total; the result is ordered
/// oldest day first.
pub fn weekly_trend(
    events: &[ConsumptionEvent],
    today: NaiveDate,
) -> Result<Vec<DailyConsumption>> {
    let first_day = trend_start(today)?;
    let mut days: Vec<DailyConsumption> = (0..TREND_WINDOW_DAYS)
        .map(|offset| DailyConsumption {
            date: first_day + Duration::days(offset),
            total: 0.0,
        })
        .collect();

    for event in events {
        let date = event.timestamp.date_naive();
        if let Some(day) = days.iter_mut().find(|d| d.date == date) {
            day.total += event.quantity_used;
        }
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, quantity: f64, timestamp: DateTime<Utc>) -> ConsumptionEvent {
        ConsumptionEvent {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            product_name: "Café".to_string(),
            quantity_used: quantity,
            timestamp,
        }
    }

    #[test]
    fn test_normalized_stamps_missing_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 3, 17, 8, 0, 0).unwrap();
        let normalized = NewConsumptionEvent {
            product_name: " Eau ".to_string(),
            quantity_used: 2.0,
            timestamp: None,
        }
        .normalized(now)
        .unwrap();
        assert_eq!(normalized.product_name, "Eau");
        assert_eq!(normalized.timestamp, Some(now));
    }

    #[test]
    fn test_normalized_rejects_non_positive_quantity() {
        let now = Utc::now();
        for quantity in [0.0, -1.0, f64::NAN] {
            let result = NewConsumptionEvent {
                product_name: "Eau".to_string(),
                quantity_used: quantity,
                timestamp: None,
            }
            .normalized(now);
            assert!(result.is_err(), "quantity {} should be rejected", quantity);
        }
    }

    #[test]
    fn test_weekly_trend_buckets_by_day() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        let events = vec![
            event(
                "a",
                1.0,
                Utc.with_ymd_and_hms(2025, 3, 17, 9, 0, 0).unwrap(),
            ),
            event(
                "b",
                2.5,
                Utc.with_ymd_and_hms(2025, 3, 17, 18, 0, 0).unwrap(),
            ),
            event(
                "c",
                4.0,
                Utc.with_ymd_and_hms(2025, 3, 11, 7, 0, 0).unwrap(),
            ),
            event(
                "d",
                9.0,
                Utc.with_ymd_and_hms(2025, 3, 10, 23, 0, 0).unwrap(),
            ),
        ];

        let trend = weekly_trend(&events, today).unwrap();
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        assert_eq!(trend[0].total, 4.0);
        assert_eq!(trend[6].date, today);
        assert_eq!(trend[6].total, 3.5);
        assert_eq!(trend.iter().map(|d| d.total).sum::<f64>(), 7.5);
    }

    #[test]
    fn test_weekly_trend_at_calendar_minimum() {
        let err = weekly_trend(&[], NaiveDate::MIN).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let earliest = NaiveDate::MIN + Duration::days(TREND_WINDOW_DAYS - 1);
        let trend = weekly_trend(&[], earliest).unwrap();
        assert_eq!(trend.first().map(|d| d.date), Some(NaiveDate::MIN));
        assert_eq!(trend.last().map(|d| d.date), Some(earliest));
    }
}
