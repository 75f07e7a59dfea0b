use crate::types::{Appointment, AppointmentStatus, DashboardStats};
use std::collections::HashSet;

impl DashboardStats {
    /// Counters computed from the live store, so they follow every transition.
    pub fn from_appointments(appointments: &[Appointment]) -> Self {
        let count = |status: AppointmentStatus| {
            appointments
                .iter()
                .filter(|appointment| appointment.status == status)
                .count()
        };
        Self {
            total_appointments: appointments.len(),
            upcoming_appointments: count(AppointmentStatus::Pending)
                + count(AppointmentStatus::Confirmed),
            completed_appointments: count(AppointmentStatus::Completed),
            cancelled_appointments: count(AppointmentStatus::Cancelled),
        }
    }
}

pub fn is_upcoming(appointment: &Appointment) -> bool {
    !appointment.status.is_terminal()
}

pub fn upcoming_appointments(appointments: &[Appointment]) -> Vec<Appointment> {
    appointments.iter().filter(|a| is_upcoming(a)).cloned().collect()
}

/// Appointments on `day` (`YYYY-MM-DD`), whatever their status.
pub fn todays_appointments(appointments: &[Appointment], day: &str) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|appointment| appointment.date == day)
        .cloned()
        .collect()
}

/// Number of distinct patients with an appointment on `day`.
pub fn patients_on(appointments: &[Appointment], day: &str) -> usize {
    appointments
        .iter()
        .filter(|appointment| appointment.date == day)
        .map(|appointment| appointment.patient_id)
        .collect::<HashSet<_>>()
        .len()
}
