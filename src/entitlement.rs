//! Round allowances: subscribers play without limit, everyone else gets a
//! fixed number of rounds per UTC day.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use futures::future::BoxFuture;
use time::{Date, OffsetDateTime};
use tracing::debug;

/// Allowance details for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitlementStatus {
    /// Whether the account holds an active subscription.
    pub subscriber: bool,
    /// Rounds started during the current UTC day.
    pub rounds_today: u32,
    /// Rounds allowed per day, `None` when unlimited.
    pub daily_limit: Option<u32>,
}

impl EntitlementStatus {
    /// Whether another round may be started.
    pub fn can_start_round(&self) -> bool {
        match self.daily_limit {
            Some(limit) => self.rounds_today < limit,
            None => true,
        }
    }
}

/// Decides whether an account may start another round. Consulted before a
/// round starts; the connection engine itself knows nothing about limits.
pub trait EntitlementGate: Send + Sync {
    /// Whether the account may start another round today.
    fn can_start_round(&self, account_id: &str) -> BoxFuture<'static, bool>;
    /// Current allowance details for the account.
    fn status(&self, account_id: &str) -> BoxFuture<'static, EntitlementStatus>;
    /// Check the allowance and count one round in a single step. `false`
    /// means the allowance is used up and nothing was counted.
    fn try_reserve_round(&self, account_id: &str) -> BoxFuture<'static, bool>;
    /// Give back a reservation whose round never started.
    fn release_round(&self, account_id: &str);
}

#[derive(Debug, Clone, Copy)]
struct DailyUsage {
    day: Date,
    rounds: u32,
}

struct AllowanceInner {
    daily_limit: u32,
    subscribers: DashSet<String>,
    usage: DashMap<String, DailyUsage>,
}

/// In-process gate with a per-day allowance for non-subscribers.
#[derive(Clone)]
pub struct DailyAllowanceGate {
    inner: Arc<AllowanceInner>,
}

impl DailyAllowanceGate {
    /// Build a gate allowing `daily_limit` rounds per day, with the given subscribers.
    pub fn new(daily_limit: u32, subscribers: impl IntoIterator<Item = String>) -> Self {
        Self {
            inner: Arc::new(AllowanceInner {
                daily_limit,
                subscribers: subscribers.into_iter().collect(),
                usage: DashMap::new(),
            }),
        }
    }

    /// Mark the account as subscribed.
    pub fn grant_subscription(&self, account_id: &str) {
        self.inner.subscribers.insert(account_id.to_string());
    }

    /// Remove the account's subscription.
    pub fn revoke_subscription(&self, account_id: &str) {
        self.inner.subscribers.remove(account_id);
    }

    /// Allowance details as of `day`.
    pub fn status_on(&self, account_id: &str, day: Date) -> EntitlementStatus {
        let subscriber = self.inner.subscribers.contains(account_id);
        let rounds_today = self
            .inner
            .usage
            .get(account_id)
            .filter(|usage| usage.day == day)
            .map(|usage| usage.rounds)
            .unwrap_or(0);

        EntitlementStatus {
            subscriber,
            rounds_today,
            daily_limit: (!subscriber).then_some(self.inner.daily_limit),
        }
    }

    /// Count a round on `day` if the allowance permits it. The usage entry
    /// stays locked between the check and the increment.
    pub fn try_reserve_round_on(&self, account_id: &str, day: Date) -> bool {
        let subscriber = self.inner.subscribers.contains(account_id);
        let mut entry = self
            .inner
            .usage
            .entry(account_id.to_string())
            .or_insert(DailyUsage { day, rounds: 0 });
        if entry.day != day {
            *entry = DailyUsage { day, rounds: 0 };
        }
        if !subscriber && entry.rounds >= self.inner.daily_limit {
            return false;
        }
        entry.rounds += 1;
        debug!(account = %account_id, rounds = entry.rounds, "round counted against allowance");
        true
    }

    /// Undo a reservation made on `day`. Reservations from an earlier day
    /// already expired with the reset.
    pub fn release_round_on(&self, account_id: &str, day: Date) {
        if let Some(mut usage) = self.inner.usage.get_mut(account_id) {
            if usage.day == day {
                usage.rounds = usage.rounds.saturating_sub(1);
                debug!(account = %account_id, rounds = usage.rounds, "round reservation released");
            }
        }
    }
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

impl EntitlementGate for DailyAllowanceGate {
    fn can_start_round(&self, account_id: &str) -> BoxFuture<'static, bool> {
        let allowed = self.status_on(account_id, today()).can_start_round();
        Box::pin(async move { allowed })
    }

    fn status(&self, account_id: &str) -> BoxFuture<'static, EntitlementStatus> {
        let status = self.status_on(account_id, today());
        Box::pin(async move { status })
    }

    fn try_reserve_round(&self, account_id: &str) -> BoxFuture<'static, bool> {
        let reserved = self.try_reserve_round_on(account_id, today());
        Box::pin(async move { reserved })
    }

    fn release_round(&self, account_id: &str) {
        self.release_round_on(account_id, today());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    fn day(n: u8) -> Date {
        Date::from_calendar_date(2026, Month::March, n).unwrap()
    }

    #[test]
    fn free_accounts_are_limited_per_day() {
        let gate = DailyAllowanceGate::new(2, Vec::new());

        assert!(gate.status_on("uid-1", day(1)).can_start_round());
        assert!(gate.try_reserve_round_on("uid-1", day(1)));
        assert!(gate.try_reserve_round_on("uid-1", day(1)));
        assert!(!gate.try_reserve_round_on("uid-1", day(1)));

        let status = gate.status_on("uid-1", day(1));
        assert_eq!(status.rounds_today, 2);
        assert_eq!(status.daily_limit, Some(2));
        assert!(!status.can_start_round());

        assert!(gate.status_on("uid-2", day(1)).can_start_round());
    }

    #[test]
    fn allowance_resets_on_new_day() {
        let gate = DailyAllowanceGate::new(1, Vec::new());
        assert!(gate.try_reserve_round_on("uid-1", day(1)));
        assert!(!gate.status_on("uid-1", day(1)).can_start_round());
        assert!(gate.status_on("uid-1", day(2)).can_start_round());

        assert!(gate.try_reserve_round_on("uid-1", day(2)));
        assert_eq!(gate.status_on("uid-1", day(2)).rounds_today, 1);

        gate.release_round_on("uid-1", day(1));
        assert_eq!(gate.status_on("uid-1", day(2)).rounds_today, 1);
    }

    #[test]
    fn released_reservation_frees_the_slot() {
        let gate = DailyAllowanceGate::new(1, Vec::new());
        assert!(gate.try_reserve_round_on("uid-1", day(1)));
        assert!(!gate.try_reserve_round_on("uid-1", day(1)));

        gate.release_round_on("uid-1", day(1));
        assert_eq!(gate.status_on("uid-1", day(1)).rounds_today, 0);
        assert!(gate.try_reserve_round_on("uid-1", day(1)));

        gate.release_round_on("uid-2", day(1));
        assert_eq!(gate.status_on("uid-2", day(1)).rounds_today, 0);
    }

    #[test]
    fn subscribers_are_unlimited() {
        let gate = DailyAllowanceGate::new(0, vec!["uid-vip".to_string()]);
        for _ in 0..10 {
            assert!(gate.try_reserve_round_on("uid-vip", day(1)));
        }
        let status = gate.status_on("uid-vip", day(1));
        assert!(status.subscriber);
        assert_eq!(status.daily_limit, None);
        assert!(status.can_start_round());

        gate.revoke_subscription("uid-vip");
        assert!(!gate.status_on("uid-vip", day(1)).can_start_round());
        gate.grant_subscription("uid-vip");
        assert!(gate.status_on("uid-vip", day(1)).can_start_round());
    }

    #[tokio::test]
    async fn trait_predicate_uses_current_day() {
        let gate = DailyAllowanceGate::new(1, Vec::new());
        assert!(gate.can_start_round("uid-1").await);
        assert!(gate.try_reserve_round("uid-1").await);
        assert!(!gate.can_start_round("uid-1").await);
        assert!(!gate.try_reserve_round("uid-1").await);
        assert_eq!(gate.status("uid-1").await.rounds_today, 1);
    }
}
