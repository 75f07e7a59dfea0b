//! Initial data the dashboards are mounted with.
//!
//! The built-in set stands in for a backend. A JSON file with the same shape
//! can be loaded instead.

use crate::types::{Appointment, AppointmentId, AppointmentStatus, Doctor, Patient};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate appointment id {0} in seed data")]
    DuplicateId(AppointmentId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    pub doctors: Vec<Doctor>,
    pub patients: Vec<Patient>,
    /// Appointments shown on every patient dashboard.
    pub patient_appointments: Vec<Appointment>,
    /// Appointments shown on every doctor dashboard.
    pub doctor_appointments: Vec<Appointment>,
}

impl SeedData {
    pub fn from_file(path: &Path) -> Result<Self, SeedError> {
        let contents = fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&contents)?;
        seed.check_unique_ids()?;
        Ok(seed)
    }

    fn check_unique_ids(&self) -> Result<(), SeedError> {
        for appointments in [&self.patient_appointments, &self.doctor_appointments] {
            for (index, appointment) in appointments.iter().enumerate() {
                if appointments[..index].iter().any(|a| a.id == appointment.id) {
                    return Err(SeedError::DuplicateId(appointment.id));
                }
            }
        }
        Ok(())
    }

    pub fn doctor(&self, id: i64) -> Option<&Doctor> {
        self.doctors.iter().find(|doctor| doctor.id == id)
    }

    pub fn patient(&self, id: i64) -> Option<&Patient> {
        self.patients.iter().find(|patient| patient.id == id)
    }
}

fn mock_doctor(
    id: i64,
    name: &str,
    specialty: &str,
    experience_years: u32,
    available: bool,
) -> Doctor {
    let handle = name
        .trim_start_matches("Dr. ")
        .to_lowercase()
        .replace(' ', ".");
    Doctor {
        id,
        name: name.into(),
        email: format!("{handle}@medicare.example"),
        specialty: specialty.into(),
        phone: format!("+1 555 010{id}"),
        experience_years,
        avatar: None,
        bio: Some(format!("{specialty} specialist with {experience_years} years of practice.")),
        available,
    }
}

fn mock_patient(id: i64, name: &str, date_of_birth: &str, gender: &str) -> Patient {
    let handle = name.to_lowercase().replace(' ', ".");
    Patient {
        id,
        name: name.into(),
        email: format!("{handle}@mail.example"),
        phone: format!("+1 555 020{id}"),
        date_of_birth: date_of_birth.into(),
        gender: gender.into(),
        address: None,
        avatar: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn mock_appointment(
    id: i64,
    patient: &Patient,
    doctor: &Doctor,
    date: &str,
    time: &str,
    status: AppointmentStatus,
    reason: &str,
    snapshot_doctor: bool,
) -> Appointment {
    Appointment {
        id: AppointmentId(id),
        patient_id: patient.id,
        doctor_id: doctor.id,
        date: date.into(),
        time: time.into(),
        status,
        reason: reason.into(),
        notes: None,
        doctor: snapshot_doctor.then(|| doctor.clone()),
        patient: (!snapshot_doctor).then(|| patient.clone()),
    }
}

impl Default for SeedData {
    fn default() -> Self {
        use AppointmentStatus::*;

        let doctors = vec![
            mock_doctor(1, "Dr. Sarah Johnson", "Cardiology", 15, true),
            mock_doctor(2, "Dr. Michael Chen", "Neurology", 12, true),
            mock_doctor(3, "Dr. Emily Rodriguez", "Pediatrics", 8, true),
            mock_doctor(4, "Dr. James Wilson", "Orthopedics", 20, false),
            mock_doctor(5, "Dr. Priya Patel", "Dermatology", 10, true),
            mock_doctor(6, "Dr. Robert Taylor", "General Medicine", 18, true),
        ];
        let patients = vec![
            mock_patient(1, "John Smith", "1985-06-15", "Male"),
            mock_patient(2, "Maria Garcia", "1992-03-22", "Female"),
            mock_patient(3, "David Lee", "1978-11-08", "Male"),
            mock_patient(4, "Aisha Khan", "2001-01-30", "Female"),
        ];

        let patient = &patients[0];
        let patient_appointments: Vec<Appointment> = [
            (1, 0, "2026-02-20", "10:00", Confirmed, "Annual heart checkup"),
            (2, 1, "2026-02-25", "14:30", Pending, "Recurring headaches"),
            (3, 4, "2026-01-15", "09:00", Completed, "Skin rash follow-up"),
            (4, 5, "2026-01-05", "11:00", Cancelled, "General consultation"),
        ]
        .into_iter()
        .map(|(id, doctor, date, time, status, reason)| {
            mock_appointment(id, patient, &doctors[doctor], date, time, status, reason, true)
        })
        .collect();

        let doctor = &doctors[0];
        let doctor_appointments: Vec<Appointment> = [
            (101, 0, "2026-02-20", "10:00", Confirmed, "Annual heart checkup"),
            (102, 1, "2026-02-20", "11:30", Pending, "Chest pain"),
            (103, 2, "2026-02-20", "15:00", Pending, "Blood pressure review"),
            (104, 3, "2026-02-22", "09:30", Confirmed, "Palpitations"),
            (105, 2, "2026-01-28", "13:00", Completed, "ECG results"),
        ]
        .into_iter()
        .map(|(id, patient, date, time, status, reason)| {
            mock_appointment(id, &patients[patient], doctor, date, time, status, reason, false)
        })
        .collect();

        Self {
            doctors,
            patients,
            patient_appointments,
            doctor_appointments,
        }
    }
}
