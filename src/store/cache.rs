use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use moka::future::Cache;

use super::HolidayCalendar;
use crate::error::StoreError;

/// Holiday calendar that loads an organization's holidays one calendar year
/// at a time and keeps them for `ttl`.
pub struct CachedCalendar<C> {
    inner: C,
    years: Cache<(u64, i32), Arc<Vec<NaiveDate>>>,
}

impl<C: HolidayCalendar> CachedCalendar<C> {
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            years: Cache::builder()
                .max_capacity(10_000) // org-years
                .time_to_live(ttl)
                .build(),
        }
    }

    async fn year(&self, organization_id: u64, year: i32) -> Result<Arc<Vec<NaiveDate>>, StoreError> {
        self.years
            .try_get_with((organization_id, year), async {
                let (first, last) = year_bounds(year)?;
                let holidays = self.inner.holidays_between(organization_id, first, last).await?;
                tracing::debug!(organization_id, year, count = holidays.len(), "Holiday year cached");
                Ok::<_, StoreError>(Arc::new(holidays))
            })
            .await
            .map_err(StoreError::from)
    }
}

fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), StoreError> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .zip(NaiveDate::from_ymd_opt(year, 12, 31))
        .ok_or_else(|| StoreError::Corrupt {
            table: "holidays",
            message: format!("year {year} out of range"),
        })
}

#[async_trait]
impl<C: HolidayCalendar> HolidayCalendar for CachedCalendar<C> {
    async fn holidays_between(
        &self,
        organization_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        let mut found = Vec::new();
        if from > to {
            return Ok(found);
        }

        for year in from.year()..=to.year() {
            let holidays = self.year(organization_id, year).await?;
            found.extend(holidays.iter().copied().filter(|d| *d >= from && *d <= to));
        }

        Ok(found)
    }
}
