//! Abandoned-Hold Reaper
//!
//! 周期任务：把超龄的 draft 记录转成 timeout，容量随之回到票池。
//!
//! Registered as a `TaskKind::Periodic` in `start_background_tasks()`. Each
//! sweep is bounded; a daily pass drains whatever backlog the bounded sweeps
//! left behind. Re-running is harmless — the guarded per-record update only
//! fires while the record is still in `draft`.

use crate::core::state::AvailabilityVersions;
use crate::db::repository::AttendeeRepository;
use crate::utils::time::stale_cutoff_millis;
use shared::models::AttendeeStatus;
use shared::util::now_millis;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

pub struct HoldReaper {
    attendees: AttendeeRepository,
    availability: Arc<AvailabilityVersions>,
    interval: Duration,
    max_age_minutes: u64,
    batch_limit: i64,
    shutdown: CancellationToken,
}

impl HoldReaper {
    pub fn new(
        db: Surreal<Db>,
        availability: Arc<AvailabilityVersions>,
        interval: Duration,
        max_age_minutes: u64,
        batch_limit: i64,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            attendees: AttendeeRepository::new(db),
            availability,
            interval,
            max_age_minutes,
            batch_limit,
            shutdown,
        }
    }

    /// 主循环：周期扫描 + 每日兜底排空
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            max_age_minutes = self.max_age_minutes,
            "Hold reaper started"
        );

        // One bounded sweep per interval; a full drain once per day
        let ticks_per_day = (86_400 / self.interval.as_secs().max(1)).max(1);
        let mut tick: u64 = 0;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Hold reaper received shutdown signal");
                    return;
                }
            }

            tick += 1;
            if tick % ticks_per_day == 0 {
                self.drain().await;
            } else {
                self.sweep().await;
            }
        }
    }

    /// One bounded sweep: stale drafts → timeout
    ///
    /// Returns how many records actually transitioned.
    pub async fn sweep(&self) -> usize {
        let cutoff = stale_cutoff_millis(now_millis(), self.max_age_minutes);

        let stale = match self.attendees.find_stale_drafts(cutoff, self.batch_limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "Reaper failed to select stale drafts");
                return 0;
            }
        };

        let mut reaped = 0usize;
        for record in stale {
            match self
                .attendees
                .transition_if(record.id, AttendeeStatus::Draft, AttendeeStatus::Timeout)
                .await
            {
                Ok(true) => {
                    reaped += 1;
                    self.availability.bump(record.ticket_type_id);
                }
                // Settled (or already reaped) between select and update
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        attendee_id = record.id,
                        error = %e,
                        "Reaper failed to time out record"
                    );
                }
            }
        }

        if reaped > 0 {
            tracing::info!(reaped, "Stale draft holds timed out");
        }
        reaped
    }

    /// Drain the whole backlog in bounded batches (daily pass)
    pub async fn drain(&self) -> usize {
        let mut total = 0usize;
        loop {
            let reaped = self.sweep().await;
            total += reaped;
            if reaped == 0 {
                break;
            }
            if self.shutdown.is_cancelled() {
                break;
            }
        }
        if total > 0 {
            tracing::info!(total, "Daily reaper drain finished");
        }
        total
    }
}
