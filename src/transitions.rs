use crate::{
    error::BookingError,
    types::{Appointment, AppointmentId, AppointmentStatus},
};

/// Returns a copy of `appointments` where the record with `id` carries
/// `status`. An unknown `id` leaves the copy unchanged.
///
/// Any status is accepted here; which transitions a user may trigger is
/// decided by [`crate::affordance`].
pub fn apply_status(
    appointments: &[Appointment],
    id: AppointmentId,
    status: AppointmentStatus,
) -> Vec<Appointment> {
    appointments
        .iter()
        .map(|appointment| {
            if appointment.id == id {
                Appointment {
                    status,
                    ..appointment.clone()
                }
            } else {
                appointment.clone()
            }
        })
        .collect()
}

/// Like [`apply_status`] but reports an unknown `id`.
pub fn try_apply_status(
    appointments: &[Appointment],
    id: AppointmentId,
    status: AppointmentStatus,
) -> Result<Vec<Appointment>, BookingError> {
    if !appointments.iter().any(|appointment| appointment.id == id) {
        return Err(BookingError::NotFound(id));
    }
    Ok(apply_status(appointments, id, status))
}
