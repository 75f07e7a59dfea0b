use clinic_booking::{
    configuration::Configuration, configuration_handler::ConfigurationHandler,
    directory::StaticDirectory, http::{create_app, AppState}, seed::SeedData,
};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let configuration = ConfigurationHandler::parse_arguments();

    let title = format!("# {} #", configuration.website_title());
    println!("{}", "#".repeat(title.len()));
    println!("{title}");
    println!("{}", "#".repeat(title.len()));

    let seed = match configuration.seed_file() {
        Some(path) => match SeedData::from_file(&path) {
            Ok(seed) => {
                info!(path = %path.display(), "Loaded seed data");
                seed
            }
            Err(err) => {
                error!(?err, path = %path.display(), "Failed to load seed data");
                return ExitCode::FAILURE;
            }
        },
        None => SeedData::default(),
    };

    let directory = StaticDirectory::new(seed.doctors.clone());
    let state = AppState::from_configuration(directory, seed, &configuration);
    let app = create_app(state);

    let address = format!("0.0.0.0:{}", configuration.port());
    println!("Accessible at:\n{}/api", address.clone());
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(?err, "Failed to bind {address}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = axum::serve(listener, app).await {
        error!(?err, "Server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
