use crate::types::AppointmentStatus;
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Default,
    Destructive,
}

/// Short-lived message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub severity: Severity,
}

impl Notification {
    pub fn status_changed(status: AppointmentStatus) -> Self {
        let severity = match status {
            AppointmentStatus::Cancelled => Severity::Destructive,
            _ => Severity::Default,
        };
        Self {
            title: format!("Appointment {status}"),
            description: None,
            severity,
        }
    }

    pub fn booked(doctor_name: Option<&str>, date: &str) -> Self {
        let description = match doctor_name {
            Some(name) => format!("With {name} on {date}"),
            None => format!("On {date}"),
        };
        Self {
            title: "Appointment booked!".into(),
            description: Some(description),
            severity: Severity::Default,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<A: NotificationSink, B: NotificationSink> NotificationSink for (A, B) {
    fn notify(&self, notification: Notification) {
        self.0.notify(notification.clone());
        self.1.notify(notification);
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Default => info!(title = %notification.title, description = ?notification.description, "Notification"),
            Severity::Destructive => warn!(title = %notification.title, description = ?notification.description, "Notification"),
        }
    }
}

/// Keeps the most recent notifications until someone drains them.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    capacity: usize,
    pending: Arc<Mutex<VecDeque<Notification>>>,
}

impl NotificationQueue {
    pub const DEFAULT_CAPACITY: usize = 16;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            pending: Arc::new(Mutex::default()),
        }
    }

    pub fn drain(&self) -> Vec<Notification> {
        let mut pending = self.pending.lock().unwrap_or_else(|err| err.into_inner());
        pending.drain(..).collect()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl NotificationSink for NotificationQueue {
    fn notify(&self, notification: Notification) {
        let mut pending = self.pending.lock().unwrap_or_else(|err| err.into_inner());
        if pending.len() == self.capacity {
            pending.pop_front();
        }
        pending.push_back(notification);
    }
}
