//! Which actions a dashboard offers for an appointment.
//!
//! This is the only place that knows which status transitions are valid. The
//! transition handler itself accepts any status.

use crate::types::AppointmentStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Confirm,
    Complete,
    Cancel,
}

impl Action {
    pub fn target_status(&self) -> AppointmentStatus {
        match self {
            Action::Confirm => AppointmentStatus::Confirmed,
            Action::Complete => AppointmentStatus::Completed,
            Action::Cancel => AppointmentStatus::Cancelled,
        }
    }

    /// The action that leads to `status`, if any. Nothing leads back to pending.
    pub fn leading_to(status: AppointmentStatus) -> Option<Action> {
        match status {
            AppointmentStatus::Pending => None,
            AppointmentStatus::Confirmed => Some(Action::Confirm),
            AppointmentStatus::Completed => Some(Action::Complete),
            AppointmentStatus::Cancelled => Some(Action::Cancel),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Confirm => "confirm",
            Action::Complete => "complete",
            Action::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardRole {
    Patient,
    Doctor,
}

pub fn available_actions(role: DashboardRole, status: AppointmentStatus) -> &'static [Action] {
    match (role, status) {
        (DashboardRole::Patient, AppointmentStatus::Pending | AppointmentStatus::Confirmed) => {
            &[Action::Cancel]
        }
        (DashboardRole::Doctor, AppointmentStatus::Pending) => &[Action::Confirm, Action::Cancel],
        (DashboardRole::Doctor, AppointmentStatus::Confirmed) => {
            &[Action::Complete, Action::Cancel]
        }
        (_, AppointmentStatus::Completed | AppointmentStatus::Cancelled) => &[],
    }
}

pub fn is_action_available(role: DashboardRole, status: AppointmentStatus, action: Action) -> bool {
    available_actions(role, status).contains(&action)
}
