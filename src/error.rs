use crate::{
    affordance::Action,
    types::{AppointmentId, AppointmentStatus},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("Appointment {0} does not exist")]
    NotFound(AppointmentId),

    #[error("Action {action} is not offered for a {status} appointment")]
    ActionNotAllowed {
        action: Action,
        status: AppointmentStatus,
    },

    #[error("No action leads to {0}")]
    StatusNotReachable(AppointmentStatus),

    #[error("Only {0} dashboards can do this")]
    WrongDashboard(&'static str),
}
