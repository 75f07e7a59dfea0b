//! Patient and doctor dashboards.
//!
//! A dashboard owns one [`AppointmentStore`] for as long as it is mounted. User
//! actions are checked against the affordances of the dashboard's role, turned
//! into a new snapshot by the handlers and swapped into the store in one step.

use crate::{
    affordance::{available_actions, is_action_available, Action, DashboardRole},
    booking::{create_booking, IdGenerator},
    directory::DoctorDirectory,
    error::BookingError,
    notification::{Notification, NotificationSink},
    session::Session,
    stats,
    store::AppointmentStore,
    transitions::try_apply_status,
    types::{Appointment, AppointmentId, AppointmentStatus, BookingForm, DashboardStats, Doctor},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// An appointment together with the actions offered for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRow {
    pub appointment: Appointment,
    pub actions: Vec<Action>,
}

fn rows(store: &AppointmentStore, role: DashboardRole) -> Vec<AppointmentRow> {
    store
        .appointments()
        .into_iter()
        .map(|appointment| AppointmentRow {
            actions: available_actions(role, appointment.status).to_vec(),
            appointment,
        })
        .collect()
}

fn perform<N: NotificationSink>(
    store: &AppointmentStore,
    role: DashboardRole,
    notifier: &N,
    id: AppointmentId,
    action: Action,
) -> Result<Appointment, BookingError> {
    let appointments = store.appointments();
    let current = appointments
        .iter()
        .find(|appointment| appointment.id == id)
        .ok_or(BookingError::NotFound(id))?;

    if !is_action_available(role, current.status, action) {
        warn!(%id, %action, status = %current.status, "Action not offered");
        return Err(BookingError::ActionNotAllowed {
            action,
            status: current.status,
        });
    }

    let status = action.target_status();
    let next = try_apply_status(&appointments, id, status)?;
    let updated = next
        .iter()
        .find(|appointment| appointment.id == id)
        .cloned()
        .ok_or(BookingError::NotFound(id))?;
    store.replace_all(next);

    info!(%id, %status, ?role, "Appointment status changed");
    notifier.notify(Notification::status_changed(status));
    Ok(updated)
}

pub struct PatientDashboard<D: DoctorDirectory, N: NotificationSink> {
    session: Session,
    store: AppointmentStore,
    directory: D,
    notifier: N,
    ids: IdGenerator,
}

impl<D: DoctorDirectory, N: NotificationSink> PatientDashboard<D, N> {
    pub fn mount(session: Session, seed: Vec<Appointment>, directory: D, notifier: N) -> Self {
        let store = AppointmentStore::default();
        store.initialize(seed);
        Self {
            session,
            store,
            directory,
            notifier,
            ids: IdGenerator::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &AppointmentStore {
        &self.store
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.store.appointments()
    }

    pub fn rows(&self) -> Vec<AppointmentRow> {
        rows(&self.store, DashboardRole::Patient)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_appointments(&self.store.appointments())
    }

    /// Doctors offered in the booking form.
    pub fn bookable_doctors(&self) -> Vec<Doctor> {
        self.directory.bookable()
    }

    pub fn book(&mut self, form: &BookingForm) -> Appointment {
        let appointments = self.store.appointments();
        let id = self.ids.next_id(&appointments);
        let (next, created) = create_booking(
            &appointments,
            form,
            self.session.user_id,
            &self.directory,
            id,
        );
        self.store.replace_all(next);

        info!(id = %created.id, doctor_id = created.doctor_id, "Appointment booked");
        self.notifier.notify(Notification::booked(
            created.doctor.as_ref().map(|doctor| doctor.name.as_str()),
            &created.date,
        ));
        created
    }

    pub fn perform(&self, id: AppointmentId, action: Action) -> Result<Appointment, BookingError> {
        perform(
            &self.store,
            DashboardRole::Patient,
            &self.notifier,
            id,
            action,
        )
    }

    pub fn cancel(&self, id: AppointmentId) -> Result<Appointment, BookingError> {
        self.perform(id, Action::Cancel)
    }

    /// Unmounts the dashboard. Its appointments are gone afterwards.
    pub fn logout(self) -> Session {
        self.session
    }
}

pub struct DoctorDashboard<N: NotificationSink> {
    session: Session,
    store: AppointmentStore,
    notifier: N,
}

impl<N: NotificationSink> DoctorDashboard<N> {
    pub fn mount(session: Session, seed: Vec<Appointment>, notifier: N) -> Self {
        let store = AppointmentStore::default();
        store.initialize(seed);
        Self {
            session,
            store,
            notifier,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &AppointmentStore {
        &self.store
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.store.appointments()
    }

    pub fn rows(&self) -> Vec<AppointmentRow> {
        rows(&self.store, DashboardRole::Doctor)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_appointments(&self.store.appointments())
    }

    pub fn todays_schedule(&self, today: &str) -> Vec<Appointment> {
        stats::todays_appointments(&self.store.appointments(), today)
    }

    pub fn patients_today(&self, today: &str) -> usize {
        stats::patients_on(&self.store.appointments(), today)
    }

    pub fn upcoming(&self) -> Vec<Appointment> {
        stats::upcoming_appointments(&self.store.appointments())
    }

    pub fn perform(&self, id: AppointmentId, action: Action) -> Result<Appointment, BookingError> {
        perform(&self.store, DashboardRole::Doctor, &self.notifier, id, action)
    }

    pub fn change_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, BookingError> {
        let action = Action::leading_to(status).ok_or(BookingError::StatusNotReachable(status))?;
        self.perform(id, action)
    }

    pub fn logout(self) -> Session {
        self.session
    }
}

/// Either dashboard, as mounted for a logged in session.
pub enum Dashboard<D: DoctorDirectory, N: NotificationSink> {
    Patient(PatientDashboard<D, N>),
    Doctor(DoctorDashboard<N>),
}

impl<D: DoctorDirectory, N: NotificationSink> Dashboard<D, N> {
    pub fn role(&self) -> DashboardRole {
        match self {
            Dashboard::Patient(_) => DashboardRole::Patient,
            Dashboard::Doctor(_) => DashboardRole::Doctor,
        }
    }

    pub fn session(&self) -> &Session {
        match self {
            Dashboard::Patient(dashboard) => dashboard.session(),
            Dashboard::Doctor(dashboard) => dashboard.session(),
        }
    }

    pub fn store(&self) -> &AppointmentStore {
        match self {
            Dashboard::Patient(dashboard) => dashboard.store(),
            Dashboard::Doctor(dashboard) => dashboard.store(),
        }
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.store().appointments()
    }

    pub fn rows(&self) -> Vec<AppointmentRow> {
        match self {
            Dashboard::Patient(dashboard) => dashboard.rows(),
            Dashboard::Doctor(dashboard) => dashboard.rows(),
        }
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_appointments(&self.appointments())
    }

    /// Empty on a doctor dashboard, which has no booking form.
    pub fn bookable_doctors(&self) -> Vec<Doctor> {
        match self {
            Dashboard::Patient(dashboard) => dashboard.bookable_doctors(),
            Dashboard::Doctor(_) => vec![],
        }
    }

    pub fn book(&mut self, form: &BookingForm) -> Result<Appointment, BookingError> {
        match self {
            Dashboard::Patient(dashboard) => Ok(dashboard.book(form)),
            Dashboard::Doctor(_) => Err(BookingError::WrongDashboard("patient")),
        }
    }

    pub fn perform(&self, id: AppointmentId, action: Action) -> Result<Appointment, BookingError> {
        match self {
            Dashboard::Patient(dashboard) => dashboard.perform(id, action),
            Dashboard::Doctor(dashboard) => dashboard.perform(id, action),
        }
    }

    pub fn change_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, BookingError> {
        let action = Action::leading_to(status).ok_or(BookingError::StatusNotReachable(status))?;
        self.perform(id, action)
    }
}
