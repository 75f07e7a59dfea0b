//! Typed client for the clinic REST API.
//!
//! The remote counterparts of the dashboard handlers: booking and status
//! changes take the same inputs and return the same records, but are
//! asynchronous and can fail.

use crate::{
    affordance::Action,
    dashboard::AppointmentRow,
    notification::Notification,
    types::{
        Appointment, AppointmentId, AppointmentStatus, AuthResponse, BookingForm, DashboardStats,
        Doctor, LoginCredentials, SignupData,
    },
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx answer. `detail` is the message sent by the server.
    #[error("{detail} (HTTP {status})")]
    Api { status: u16, detail: String },
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: AppointmentStatus,
}

#[derive(Debug, Clone)]
pub struct ClinicClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ClinicClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// `base_url` is the API root, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Self::DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.authorized(builder).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorDetail>()
            .await
            .map(|body| body.detail)
            .unwrap_or_else(|_| "Request failed".into());
        debug!(status = status.as_u16(), %detail, "API request rejected");
        Err(ClientError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        Ok(self.send(builder).await?.json().await?)
    }

    async fn authenticate(
        &mut self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<AuthResponse, ClientError> {
        let response: AuthResponse = self
            .request(self.client.post(self.url(path)).json(body))
            .await?;
        self.token = Some(response.access_token.clone());
        Ok(response)
    }

    pub async fn login_patient(
        &mut self,
        credentials: &LoginCredentials,
    ) -> Result<AuthResponse, ClientError> {
        self.authenticate("/auth/patient/login", credentials).await
    }

    pub async fn login_doctor(
        &mut self,
        credentials: &LoginCredentials,
    ) -> Result<AuthResponse, ClientError> {
        self.authenticate("/auth/doctor/login", credentials).await
    }

    pub async fn signup_patient(&mut self, data: &SignupData) -> Result<AuthResponse, ClientError> {
        self.authenticate("/auth/patient/signup", data).await
    }

    pub async fn signup_doctor(&mut self, data: &SignupData) -> Result<AuthResponse, ClientError> {
        self.authenticate("/auth/doctor/signup", data).await
    }

    /// Ends the session on the server and forgets the token.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.send(self.client.post(self.url("/auth/logout"))).await?;
        self.token = None;
        Ok(())
    }

    pub async fn doctors(&self) -> Result<Vec<Doctor>, ClientError> {
        self.request(self.client.get(self.url("/doctors"))).await
    }

    pub async fn search_doctors(
        &self,
        query: &str,
        specialty: Option<&str>,
    ) -> Result<Vec<Doctor>, ClientError> {
        let mut params = vec![("q", query)];
        if let Some(specialty) = specialty {
            params.push(("specialty", specialty));
        }
        self.request(self.client.get(self.url("/doctors")).query(&params))
            .await
    }

    pub async fn doctor(&self, id: i64) -> Result<Doctor, ClientError> {
        self.request(self.client.get(self.url(&format!("/doctors/{id}"))))
            .await
    }

    pub async fn my_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        self.request(self.client.get(self.url("/appointments/me")))
            .await
    }

    pub async fn my_rows(&self) -> Result<Vec<AppointmentRow>, ClientError> {
        self.request(self.client.get(self.url("/appointments/me/rows")))
            .await
    }

    pub async fn create_appointment(&self, form: &BookingForm) -> Result<Appointment, ClientError> {
        self.request(self.client.post(self.url("/appointments")).json(form))
            .await
    }

    pub async fn update_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, ClientError> {
        let path = format!("/appointments/{id}/status");
        self.request(self.client.patch(self.url(&path)).json(&StatusBody { status }))
            .await
    }

    pub async fn perform(
        &self,
        id: AppointmentId,
        action: Action,
    ) -> Result<Appointment, ClientError> {
        match action {
            Action::Cancel => self.cancel(id).await,
            action => self.update_status(id, action.target_status()).await,
        }
    }

    pub async fn cancel(&self, id: AppointmentId) -> Result<Appointment, ClientError> {
        let path = format!("/appointments/{id}/cancel");
        self.request(self.client.patch(self.url(&path))).await
    }

    pub async fn stats(&self) -> Result<DashboardStats, ClientError> {
        self.request(self.client.get(self.url("/dashboard/stats")))
            .await
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.request(self.client.get(self.url("/notifications")))
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        directory::StaticDirectory,
        notification::Severity,
        seed::SeedData,
        testutils::spawn_server,
        types::{User, UserType},
    };
    use std::net::SocketAddr;
    use tokio::task::JoinHandle;

    async fn init() -> (JoinHandle<()>, SocketAddr, SeedData) {
        let seed = SeedData::default();
        let (server, address) =
            spawn_server(StaticDirectory::new(seed.doctors.clone()), seed.clone()).await;
        (server, address, seed)
    }

    fn credentials() -> LoginCredentials {
        LoginCredentials {
            email: "john.smith@mail.example".into(),
            password: "secret".into(),
        }
    }

    #[tokio::test]
    async fn test_patient_books_and_cancels() {
        let (server, address, seed) = init().await;
        let mut client = ClinicClient::new(format!("http://{address}/api/")).unwrap();

        let auth = client.login_patient(&credentials()).await.unwrap();
        assert_eq!(auth.user_type, UserType::Patient);
        assert_eq!(auth.token_type, "bearer");
        assert_eq!(auth.user.name(), "John Smith");
        assert_eq!(client.token(), Some(auth.access_token.as_str()));

        let before = client.my_appointments().await.unwrap();
        assert_eq!(before, seed.patient_appointments);

        let created = client
            .create_appointment(&BookingForm {
                doctor_id: 2,
                date: "2026-03-02".into(),
                time: "09:30".into(),
                reason: "Follow-up".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.status, AppointmentStatus::Pending);
        assert_eq!(created.patient_id, auth.user.id());
        assert_eq!(created.doctor.as_ref().unwrap().name, "Dr. Michael Chen");

        let after = client.my_appointments().await.unwrap();
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0], created);

        let rows = client.my_rows().await.unwrap();
        assert_eq!(rows[0].actions, vec![Action::Cancel]);

        let cancelled = client.perform(created.id, Action::Cancel).await.unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        let stats = client.stats().await.unwrap();
        let appointments = client.my_appointments().await.unwrap();
        assert_eq!(stats, DashboardStats::from_appointments(&appointments));
        assert_eq!(stats.total_appointments, before.len() + 1);

        let notifications = client.notifications().await.unwrap();
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].title, "Appointment booked!");
        assert_eq!(notifications[1].severity, Severity::Destructive);
        assert!(client.notifications().await.unwrap().is_empty());

        client.logout().await.unwrap();
        assert!(client.token().is_none());
        server.abort();
    }

    #[tokio::test]
    async fn test_doctor_confirms_then_completes() {
        let (server, address, _) = init().await;
        let mut client = ClinicClient::new(format!("http://{address}/api")).unwrap();
        client.login_doctor(&credentials()).await.unwrap();

        let rows = client.my_rows().await.unwrap();
        let pending = rows
            .iter()
            .find(|row| row.appointment.status == AppointmentStatus::Pending)
            .unwrap();
        assert_eq!(pending.actions, vec![Action::Confirm, Action::Cancel]);
        let id = pending.appointment.id;

        let confirmed = client
            .update_status(id, AppointmentStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
        let completed = client.perform(id, Action::Complete).await.unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);

        match client.update_status(id, AppointmentStatus::Cancelled).await {
            Err(ClientError::Api { status, detail }) => {
                assert_eq!(status, 409);
                assert_eq!(detail, "Action cancel is not offered for a completed appointment");
            }
            other => panic!("Unexpected result: {other:?}"),
        }

        match client
            .update_status(AppointmentId(99), AppointmentStatus::Cancelled)
            .await
        {
            Err(ClientError::Api { status, detail }) => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Appointment 99 does not exist");
            }
            other => panic!("Unexpected result: {other:?}"),
        }

        server.abort();
    }

    #[tokio::test]
    async fn test_signup_opens_session() {
        let (server, address, seed) = init().await;
        let mut client = ClinicClient::new(format!("http://{address}/api")).unwrap();

        let auth = client
            .signup_patient(&SignupData {
                name: "Jane Doe".into(),
                email: "jane@mail.example".into(),
                phone: "555".into(),
                password: "secret".into(),
                gender: Some("Female".into()),
                ..SignupData::default()
            })
            .await
            .unwrap();
        match &auth.user {
            User::Patient(patient) => {
                assert_eq!(patient.name, "Jane Doe");
                assert_eq!(patient.gender, "Female");
            }
            other => panic!("Unexpected user: {other:?}"),
        }
        assert_eq!(client.my_appointments().await.unwrap().len(), seed.patient_appointments.len());

        let result = client
            .signup_doctor(&SignupData {
                email: "nobody@example.com".into(),
                password: "secret".into(),
                ..SignupData::default()
            })
            .await;
        match result {
            Err(ClientError::Api { status, detail }) => {
                assert_eq!(status, 400);
                assert_eq!(detail, "Name is required");
            }
            other => panic!("Unexpected result: {other:?}"),
        }

        server.abort();
    }

    #[tokio::test]
    async fn test_doctor_directory_without_session() {
        let (server, address, _) = init().await;
        let client = ClinicClient::new(format!("http://{address}/api")).unwrap();

        assert_eq!(client.doctors().await.unwrap().len(), 6);
        let cardiology = client.search_doctors("", Some("Cardiology")).await.unwrap();
        assert_eq!(cardiology.len(), 1);
        assert_eq!(client.doctor(3).await.unwrap().specialty, "Pediatrics");

        match client.my_appointments().await {
            Err(ClientError::Api { status, detail }) => {
                assert_eq!(status, 401);
                assert_eq!(detail, "Missing credentials");
            }
            other => panic!("Unexpected result: {other:?}"),
        }

        server.abort();
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client = ClinicClient::new("http://127.0.0.1:9/api").unwrap();
        assert!(matches!(
            client.doctors().await,
            Err(ClientError::Request(_))
        ));
    }
}
