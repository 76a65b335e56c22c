//! Edge-triggered budget alerts.
//!
//! [`BudgetNotifier`] remembers the last status it observed and raises a
//! notification only when the status changes. The remembered status lives in
//! memory only, so a fresh process re-alerts once if the budget is already in
//! warning or exceeded.

use crate::core::budget::{self, BudgetStatus, MonthlyBudget};
use crate::core::converter::format_amount;
use crate::core::currency::Currency;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

/// Something that can put an alert in front of the user.
pub trait NotificationSink {
    fn notify(&self, notification: &Notification);
}

impl<S: NotificationSink + ?Sized> NotificationSink for &S {
    fn notify(&self, notification: &Notification) {
        (**self).notify(notification)
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn notify(&self, notification: &Notification) {
        (**self).notify(notification)
    }
}

pub struct BudgetNotifier<S: NotificationSink> {
    sink: S,
    last_status: Option<BudgetStatus>,
}

impl<S: NotificationSink> BudgetNotifier<S> {
    pub fn new(sink: S) -> Self {
        BudgetNotifier {
            sink,
            last_status: None,
        }
    }

    /// Last status seen, or `None` before the first enabled evaluation.
    pub fn last_status(&self) -> Option<BudgetStatus> {
        self.last_status
    }

    /// Records the current status without raising anything, so the next
    /// [`evaluate`](Self::evaluate) only alerts on a change from here.
    /// A disabled budget leaves the remembered status untouched.
    pub fn observe(&mut self, total_spend: f64, budget: MonthlyBudget) {
        if budget.is_enabled() {
            self.last_status = Some(budget::status(total_spend, budget));
        }
    }

    /// One evaluation tick. Returns the notification raised, if any.
    ///
    /// A disabled budget skips evaluation entirely and leaves the remembered
    /// status untouched.
    pub fn evaluate(&mut self, total_spend: f64, budget: MonthlyBudget) -> Option<Notification> {
        if !budget.is_enabled() {
            return None;
        }

        let current = budget::status(total_spend, budget);
        if self.last_status == Some(current) {
            return None;
        }

        debug!(from = ?self.last_status, to = %current, "Budget status changed");
        self.last_status = Some(current);

        let notification = build_notification(current, total_spend, budget)?;
        self.sink.notify(&notification);
        Some(notification)
    }
}

fn build_notification(
    status: BudgetStatus,
    total_spend: f64,
    budget: MonthlyBudget,
) -> Option<Notification> {
    match status {
        BudgetStatus::Safe => None,
        BudgetStatus::Warning => {
            let percentage = total_spend / budget.limit() * 100.0;
            let remaining = budget.limit() - total_spend;
            Some(Notification {
                severity: Severity::Warning,
                title: "Budget Warning".to_string(),
                body: format!(
                    "You've used {percentage:.1}% of your budget. Only {} remaining.",
                    format_amount(remaining, Currency::BASE)
                ),
            })
        }
        BudgetStatus::Exceeded => {
            let overage = total_spend - budget.limit();
            Some(Notification {
                severity: Severity::Error,
                title: "Budget Exceeded!".to_string(),
                body: format!(
                    "You have exceeded your monthly budget by {}. Please review your expenses.",
                    format_amount(overage, Currency::BASE)
                ),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        received: RefCell<Vec<Notification>>,
    }

    impl NotificationSink for RecordingSink {
        fn notify(&self, notification: &Notification) {
            self.received.borrow_mut().push(notification.clone());
        }
    }

    fn budget(limit: f64) -> MonthlyBudget {
        MonthlyBudget::new(limit).unwrap()
    }

    #[test]
    fn test_fires_once_per_transition() {
        let sink = RecordingSink::default();
        let mut notifier = BudgetNotifier::new(&sink);
        let limit = budget(1000.0);

        assert!(notifier.evaluate(100.0, limit).is_none());
        assert_eq!(notifier.last_status(), Some(BudgetStatus::Safe));

        let fired = notifier.evaluate(850.0, limit).unwrap();
        assert_eq!(fired.severity, Severity::Warning);
        assert_eq!(sink.received.borrow().len(), 1);

        assert!(notifier.evaluate(860.0, limit).is_none());
        assert!(notifier.evaluate(900.0, limit).is_none());
        assert_eq!(sink.received.borrow().len(), 1);

        let fired = notifier.evaluate(1000.0, limit).unwrap();
        assert_eq!(fired.severity, Severity::Error);
        assert_eq!(sink.received.borrow().len(), 2);

        assert!(notifier.evaluate(1500.0, limit).is_none());
        assert_eq!(sink.received.borrow().len(), 2);
    }

    #[test]
    fn test_observe_sets_baseline_silently() {
        let sink = RecordingSink::default();
        let mut notifier = BudgetNotifier::new(&sink);
        let limit = budget(1000.0);

        notifier.observe(900.0, limit);
        assert_eq!(notifier.last_status(), Some(BudgetStatus::Warning));
        assert!(sink.received.borrow().is_empty());

        assert!(notifier.evaluate(950.0, limit).is_none());
        assert!(notifier.evaluate(1100.0, limit).is_some());
        assert_eq!(sink.received.borrow().len(), 1);

        notifier.observe(5000.0, MonthlyBudget::DISABLED);
        assert_eq!(notifier.last_status(), Some(BudgetStatus::Exceeded));
    }

    #[test]
    fn test_first_evaluation_in_warning_fires() {
        let sink = RecordingSink::default();
        let mut notifier = BudgetNotifier::new(&sink);

        assert!(notifier.evaluate(900.0, budget(1000.0)).is_some());
        assert_eq!(sink.received.borrow().len(), 1);
    }

    #[test]
    fn test_warning_body_mentions_percentage_and_headroom() {
        let sink = RecordingSink::default();
        let mut notifier = BudgetNotifier::new(&sink);

        let fired = notifier.evaluate(850.0, budget(1000.0)).unwrap();
        assert_eq!(fired.title, "Budget Warning");
        assert_eq!(
            fired.body,
            "You've used 85.0% of your budget. Only ₦150.00 remaining."
        );
    }

    #[test]
    fn test_exceeded_body_mentions_overage() {
        let sink = RecordingSink::default();
        let mut notifier = BudgetNotifier::new(&sink);

        let fired = notifier.evaluate(1250.0, budget(1000.0)).unwrap();
        assert_eq!(fired.title, "Budget Exceeded!");
        assert!(fired.body.contains("₦250.00"));
    }

    #[test]
    fn test_disabled_budget_pauses_tracking() {
        let sink = RecordingSink::default();
        let mut notifier = BudgetNotifier::new(&sink);

        notifier.evaluate(900.0, budget(1000.0));
        assert_eq!(notifier.last_status(), Some(BudgetStatus::Warning));

        assert!(notifier.evaluate(5000.0, MonthlyBudget::DISABLED).is_none());
        assert_eq!(notifier.last_status(), Some(BudgetStatus::Warning));

        // Still warning after re-enabling: no repeat alert
        assert!(notifier.evaluate(900.0, budget(1000.0)).is_none());
        assert_eq!(sink.received.borrow().len(), 1);
    }

    #[test]
    fn test_recovery_to_safe_is_silent_then_rearms() {
        let sink = RecordingSink::default();
        let mut notifier = BudgetNotifier::new(&sink);
        let limit = budget(1000.0);

        notifier.evaluate(900.0, limit);
        assert!(notifier.evaluate(100.0, limit).is_none());
        assert_eq!(notifier.last_status(), Some(BudgetStatus::Safe));

        assert!(notifier.evaluate(900.0, limit).is_some());
        assert_eq!(sink.received.borrow().len(), 2);
    }
}
