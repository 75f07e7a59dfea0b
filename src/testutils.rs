use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

use crate::{
    directory::DoctorDirectory,
    http::{create_app, AppState},
    seed::SeedData,
    session::Session,
    types::{Appointment, AppointmentId, AppointmentStatus, Doctor, UserType},
};

pub fn doctor(id: i64, name: &str, specialty: &str, available: bool) -> Doctor {
    Doctor {
        id,
        name: name.into(),
        email: format!("doctor{id}@medicare.example"),
        specialty: specialty.into(),
        phone: String::new(),
        experience_years: 10,
        avatar: None,
        bio: None,
        available,
    }
}

pub fn appointment(id: i64, status: AppointmentStatus) -> Appointment {
    Appointment {
        id: AppointmentId(id),
        patient_id: 1,
        doctor_id: 2,
        date: "2026-02-20".into(),
        time: "10:00".into(),
        status,
        reason: format!("Reason {id}"),
        notes: None,
        doctor: Some(doctor(2, "Dr. X", "Cardiology", true)),
        patient: None,
    }
}

pub fn patient_session() -> Session {
    Session {
        access_token: "patient-token".into(),
        user_type: UserType::Patient,
        user_id: 1,
        user_name: "John Smith".into(),
    }
}

pub fn doctor_session() -> Session {
    Session {
        access_token: "doctor-token".into(),
        user_type: UserType::Doctor,
        user_id: 2,
        user_name: "Dr. X".into(),
    }
}

pub async fn read_from_appointment_stream(
    stream: &mut WatchStream<Vec<Appointment>>,
) -> Vec<Appointment> {
    tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("No snapshot received")
        .expect("Snapshot stream closed")
}

pub struct MockDirectoryInner {
    pub calls_to_doctors: AtomicU64,
    pub doctors: Mutex<Vec<Doctor>>,
}

/// Directory that counts how often it is asked for doctors.
#[derive(Clone)]
pub struct MockDirectory(pub Arc<MockDirectoryInner>);

impl MockDirectory {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self(Arc::new(MockDirectoryInner {
            calls_to_doctors: AtomicU64::default(),
            doctors: Mutex::new(doctors),
        }))
    }
}

impl DoctorDirectory for MockDirectory {
    fn doctors(&self) -> Vec<Doctor> {
        self.0.calls_to_doctors.fetch_add(1, Ordering::SeqCst);
        self.0.doctors.lock().unwrap().clone()
    }
}

/// Serves the API on an ephemeral port.
pub async fn spawn_server<D: DoctorDirectory>(
    directory: D,
    seed: SeedData,
) -> (JoinHandle<()>, SocketAddr) {
    spawn_app(AppState::new(
        directory,
        seed,
        Duration::ZERO,
        "2026-02-20".into(),
    ))
    .await
}

pub async fn spawn_app<D: DoctorDirectory>(state: AppState<D>) -> (JoinHandle<()>, SocketAddr) {
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (server, address)
}
