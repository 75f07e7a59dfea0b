use crate::{
    affordance::DashboardRole,
    configuration::Configuration,
    dashboard::{AppointmentRow, Dashboard, DoctorDashboard, PatientDashboard},
    directory::DoctorDirectory,
    error::BookingError,
    notification::{LogNotifier, Notification, NotificationQueue},
    seed::SeedData,
    session::{Session, SessionRegistry},
    types::{
        Appointment, AppointmentId, AppointmentStatus, AuthResponse, BookingForm, DashboardStats,
        Doctor, LoginCredentials, Patient, SignupData, User, UserType,
    },
};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, patch, post},
    Extension, Json, Router,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use validator::{Validate, ValidationErrors};

type SessionNotifier = (LogNotifier, NotificationQueue);

/// A dashboard mounted for one session, plus the notifications it produced
/// that the client has not fetched yet.
pub struct MountedDashboard<D: DoctorDirectory> {
    dashboard: Dashboard<D, SessionNotifier>,
    notifications: NotificationQueue,
}

#[derive(Clone)]
pub struct AppState<D: DoctorDirectory> {
    directory: D,
    seed: Arc<SeedData>,
    sessions: SessionRegistry<MountedDashboard<D>>,
    login_delay: Duration,
    today: String,
}

impl<D: DoctorDirectory> AppState<D> {
    pub fn new(directory: D, seed: SeedData, login_delay: Duration, today: String) -> Self {
        Self {
            directory,
            seed: Arc::new(seed),
            sessions: SessionRegistry::default(),
            login_delay,
            today,
        }
    }

    pub fn from_configuration<C: Configuration>(
        directory: D,
        seed: SeedData,
        configuration: &C,
    ) -> Self {
        Self::new(
            directory,
            seed,
            configuration.login_delay(),
            configuration.today(),
        )
        .with_session_limits(configuration.max_sessions(), configuration.session_ttl())
    }

    pub fn with_session_limits(mut self, max_sessions: usize, ttl: Duration) -> Self {
        self.sessions = SessionRegistry::new(max_sessions, ttl);
        self
    }

    fn mount(&self, session: Session) -> AuthResponse {
        let notifications = NotificationQueue::default();
        let notifier = (LogNotifier, notifications.clone());
        let dashboard = match session.user_type {
            UserType::Patient => Dashboard::Patient(PatientDashboard::mount(
                session.clone(),
                self.seed.patient_appointments.clone(),
                self.directory.clone(),
                notifier,
            )),
            UserType::Doctor => Dashboard::Doctor(DoctorDashboard::mount(
                session.clone(),
                self.seed.doctor_appointments.clone(),
                notifier,
            )),
        };
        let user = self.user_for(&session);
        self.sessions.open(
            session.access_token.clone(),
            MountedDashboard {
                dashboard,
                notifications,
            },
        );
        info!(user_type = ?session.user_type, user = %session.user_name, "Session opened");

        AuthResponse {
            access_token: session.access_token,
            token_type: "bearer".into(),
            user_type: session.user_type,
            user,
        }
    }

    fn user_for(&self, session: &Session) -> User {
        match session.user_type {
            UserType::Patient => User::Patient(
                self.seed
                    .patient(session.user_id)
                    .cloned()
                    .unwrap_or_else(|| Patient {
                        id: session.user_id,
                        name: session.user_name.clone(),
                        email: String::new(),
                        phone: String::new(),
                        date_of_birth: String::new(),
                        gender: String::new(),
                        address: None,
                        avatar: None,
                    }),
            ),
            UserType::Doctor => User::Doctor(
                self.seed
                    .doctor(session.user_id)
                    .cloned()
                    .unwrap_or_else(|| Doctor {
                        id: session.user_id,
                        name: session.user_name.clone(),
                        email: String::new(),
                        specialty: String::new(),
                        phone: String::new(),
                        experience_years: 0,
                        avatar: None,
                        bio: None,
                        available: false,
                    }),
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(_) => ApiError::NotFound(err.to_string()),
            BookingError::ActionNotAllowed { .. } | BookingError::StatusNotReachable(_) => {
                ApiError::Conflict(err.to_string())
            }
            BookingError::WrongDashboard(_) => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid {field}"),
                })
            })
            .collect();
        messages.sort();
        ApiError::Validation(messages.join(", "))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => {
                error!(err = %self, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// The dashboard of the caller, resolved from the bearer token.
#[derive(Clone)]
pub struct CurrentSession<D: DoctorDirectory> {
    token: String,
    mounted: Arc<Mutex<MountedDashboard<D>>>,
}

impl<D: DoctorDirectory> CurrentSession<D> {
    fn lock(&self) -> MutexGuard<'_, MountedDashboard<D>> {
        self.mounted.lock().unwrap_or_else(|err| err.into_inner())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorQuery {
    pub q: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub date: String,
    pub patients: usize,
    pub appointments: Vec<Appointment>,
}

pub fn create_app<D: DoctorDirectory>(state: AppState<D>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/auth/patient/login", post(login::<D, true>))
        .route("/auth/doctor/login", post(login::<D, false>))
        .route("/auth/patient/signup", post(signup::<D, true>))
        .route("/auth/doctor/signup", post(signup::<D, false>))
        .route("/doctors", get(list_doctors::<D>))
        .route("/doctors/specialties", get(list_specialties::<D>))
        .route("/doctors/:id", get(get_doctor::<D>));

    let authenticated = Router::new()
        .route("/auth/logout", post(logout::<D>))
        .route("/appointments", post(create_appointment::<D>))
        .route("/appointments/me", get(my_appointments::<D>))
        .route("/appointments/me/rows", get(my_rows::<D>))
        .route("/appointments/me/stream", get(appointment_stream::<D>))
        .route("/appointments/:id/status", patch(update_status::<D>))
        .route("/appointments/:id/cancel", patch(cancel_appointment::<D>))
        .route("/dashboard/stats", get(dashboard_stats::<D>))
        .route("/dashboard/today", get(todays_schedule::<D>))
        .route("/notifications", get(notifications::<D>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session::<D>,
        ));

    let api = Router::new().merge(public).merge(authenticated);

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(cors)
}

async fn require_session<D: DoctorDirectory>(
    State(state): State<AppState<D>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
        .ok_or(ApiError::Unauthorized("Missing credentials"))?;

    let mounted = state
        .sessions
        .get(&token)
        .ok_or(ApiError::Unauthorized("Unknown or expired session"))?;

    request
        .extensions_mut()
        .insert(CurrentSession { token, mounted });
    Ok(next.run(request).await)
}

fn credentials_user<D: DoctorDirectory>(
    state: &AppState<D>,
    patient: bool,
    email: &str,
) -> Result<User, ApiError> {
    // Any password is accepted. The email only picks which mock account to use.
    if patient {
        state
            .seed
            .patients
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .or_else(|| state.seed.patients.first())
            .cloned()
            .map(User::Patient)
            .ok_or_else(|| ApiError::Internal("No patient accounts available".into()))
    } else {
        state
            .seed
            .doctors
            .iter()
            .find(|d| d.email.eq_ignore_ascii_case(email))
            .or_else(|| state.seed.doctors.first())
            .cloned()
            .map(User::Doctor)
            .ok_or_else(|| ApiError::Internal("No doctor accounts available".into()))
    }
}

fn user_type(patient: bool) -> UserType {
    if patient {
        UserType::Patient
    } else {
        UserType::Doctor
    }
}

async fn login<D: DoctorDirectory, const PATIENT: bool>(
    State(state): State<AppState<D>>,
    credentials: Result<Json<LoginCredentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(credentials) = credentials?;
    credentials.validate()?;
    let user = credentials_user(&state, PATIENT, &credentials.email)?;

    tokio::time::sleep(state.login_delay).await;
    let session = Session::issue(user_type(PATIENT), &user);
    Ok(Json(state.mount(session)))
}

async fn signup<D: DoctorDirectory, const PATIENT: bool>(
    State(state): State<AppState<D>>,
    data: Result<Json<SignupData>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(data) = data?;
    data.validate()?;

    // Nothing is stored: the account lives as long as its session.
    let user = if PATIENT {
        let id = state.seed.patients.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        User::Patient(Patient {
            id,
            name: data.name,
            email: data.email,
            phone: data.phone,
            date_of_birth: data.date_of_birth.unwrap_or_default(),
            gender: data.gender.unwrap_or_default(),
            address: None,
            avatar: None,
        })
    } else {
        let id = state.seed.doctors.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        User::Doctor(Doctor {
            id,
            name: data.name,
            email: data.email,
            specialty: data.specialty.unwrap_or_default(),
            phone: data.phone,
            experience_years: 0,
            avatar: None,
            bio: None,
            available: false,
        })
    };

    tokio::time::sleep(state.login_delay).await;
    let session = Session::issue(user_type(PATIENT), &user);
    let mut response = state.mount(session);
    response.user = user;
    Ok(Json(response))
}

async fn logout<D: DoctorDirectory>(
    State(state): State<AppState<D>>,
    Extension(current): Extension<CurrentSession<D>>,
) -> StatusCode {
    state.sessions.logout(&current.token);
    StatusCode::NO_CONTENT
}

async fn list_doctors<D: DoctorDirectory>(
    State(state): State<AppState<D>>,
    Query(query): Query<DoctorQuery>,
) -> Json<Vec<Doctor>> {
    let doctors = state.directory.search(
        query.q.as_deref().unwrap_or_default(),
        query.specialty.as_deref().filter(|s| !s.is_empty()),
    );
    Json(doctors)
}

async fn list_specialties<D: DoctorDirectory>(
    State(state): State<AppState<D>>,
) -> Json<Vec<String>> {
    Json(state.directory.specialties())
}

async fn get_doctor<D: DoctorDirectory>(
    State(state): State<AppState<D>>,
    Path(id): Path<i64>,
) -> Result<Json<Doctor>, ApiError> {
    state
        .directory
        .find(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Doctor {id} does not exist")))
}

async fn my_appointments<D: DoctorDirectory>(
    Extension(current): Extension<CurrentSession<D>>,
) -> Json<Vec<Appointment>> {
    Json(current.lock().dashboard.appointments())
}

async fn my_rows<D: DoctorDirectory>(
    Extension(current): Extension<CurrentSession<D>>,
) -> Json<Vec<AppointmentRow>> {
    Json(current.lock().dashboard.rows())
}

async fn appointment_stream<D: DoctorDirectory>(
    Extension(current): Extension<CurrentSession<D>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = current.lock().dashboard.store().snapshot_stream();
    Sse::new(stream.map(|appointments| Event::default().json_data(appointments)))
        .keep_alive(KeepAlive::default())
}

async fn create_appointment<D: DoctorDirectory>(
    Extension(current): Extension<CurrentSession<D>>,
    form: Result<Json<BookingForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let Json(form) = form?;
    form.validate()?;

    let mut mounted = current.lock();
    if mounted.dashboard.role() != DashboardRole::Patient {
        return Err(BookingError::WrongDashboard("patient").into());
    }
    if !mounted
        .dashboard
        .bookable_doctors()
        .iter()
        .any(|doctor| doctor.id == form.doctor_id)
    {
        return Err(ApiError::Validation(format!(
            "Doctor {} is not available for booking",
            form.doctor_id
        )));
    }
    let created = mounted.dashboard.book(&form)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_status<D: DoctorDirectory>(
    Extension(current): Extension<CurrentSession<D>>,
    Path(id): Path<i64>,
    update: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Appointment>, ApiError> {
    let Json(update) = update?;
    let updated = current
        .lock()
        .dashboard
        .change_status(AppointmentId(id), update.status)?;
    Ok(Json(updated))
}

async fn cancel_appointment<D: DoctorDirectory>(
    Extension(current): Extension<CurrentSession<D>>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    let updated = current
        .lock()
        .dashboard
        .change_status(AppointmentId(id), AppointmentStatus::Cancelled)?;
    Ok(Json(updated))
}

async fn dashboard_stats<D: DoctorDirectory>(
    Extension(current): Extension<CurrentSession<D>>,
) -> Json<DashboardStats> {
    Json(current.lock().dashboard.stats())
}

async fn todays_schedule<D: DoctorDirectory>(
    State(state): State<AppState<D>>,
    Extension(current): Extension<CurrentSession<D>>,
) -> Result<Json<Schedule>, ApiError> {
    let mounted = current.lock();
    match &mounted.dashboard {
        Dashboard::Doctor(dashboard) => Ok(Json(Schedule {
            date: state.today.clone(),
            patients: dashboard.patients_today(&state.today),
            appointments: dashboard.todays_schedule(&state.today),
        })),
        Dashboard::Patient(_) => Err(BookingError::WrongDashboard("doctor").into()),
    }
}

async fn notifications<D: DoctorDirectory>(
    Extension(current): Extension<CurrentSession<D>>,
) -> Json<Vec<Notification>> {
    Json(current.lock().notifications.drain())
}
