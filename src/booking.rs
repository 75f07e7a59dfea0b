use crate::{
    directory::DoctorDirectory,
    types::{Appointment, AppointmentId, AppointmentStatus, BookingForm},
};
use chrono::Utc;
use tracing::warn;

/// Builds a pending appointment from `form` and puts it in front of
/// `appointments`.
///
/// The form is not validated here. A doctor id that the directory does not
/// know still produces a booking, just without the doctor snapshot.
pub fn create_booking<D: DoctorDirectory>(
    appointments: &[Appointment],
    form: &BookingForm,
    patient_id: i64,
    directory: &D,
    id: AppointmentId,
) -> (Vec<Appointment>, Appointment) {
    let doctor = directory.find(form.doctor_id);
    if doctor.is_none() {
        warn!(doctor_id = form.doctor_id, "Booking for unknown doctor");
    }

    let created = Appointment {
        id,
        patient_id,
        doctor_id: form.doctor_id,
        date: form.date.clone(),
        time: form.time.clone(),
        status: AppointmentStatus::Pending,
        reason: form.reason.clone(),
        notes: None,
        doctor,
        patient: None,
    };

    let mut next = Vec::with_capacity(appointments.len() + 1);
    next.push(created.clone());
    next.extend_from_slice(appointments);
    (next, created)
}

/// Hands out ids derived from the creation time in milliseconds.
///
/// Ids are strictly increasing per generator and never collide with an id
/// already present in the store they are issued for.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn next_id(&mut self, appointments: &[Appointment]) -> AppointmentId {
        self.next_id_at(Utc::now().timestamp_millis(), appointments)
    }

    fn next_id_at(&mut self, now_millis: i64, appointments: &[Appointment]) -> AppointmentId {
        let mut candidate = now_millis.max(self.last + 1);
        while appointments
            .iter()
            .any(|appointment| appointment.id.0 == candidate)
        {
            candidate += 1;
        }
        self.last = candidate;
        AppointmentId(candidate)
    }
}
