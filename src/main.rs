use mimalloc::MiMalloc;
use modules::{
    bus::consumer::BusConsumer,
    common::signal::SignalManager,
    context::Initialize,
    database::manager::DatabaseManager,
    error::GraphMailerResult,
    logger,
    rest::start_http_server,
    settings::dir::DataDirManager,
    tasks::PeriodicTasks,
};
use tracing::info;

mod modules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

static LOGO: &str = r#"
   ____                 _     __  __       _ _
  / ___|_ __ __ _ _ __ | |__ |  \/  | __ _(_) | ___ _ __
 | |  _| '__/ _` | '_ \| '_ \| |\/| |/ _` | | |/ _ \ '__|
 | |_| | | | (_| | |_) | | | | |  | | (_| | | |  __/ |
  \____|_|  \__,_| .__/|_| |_|_|  |_|\__,_|_|_|\___|_|
                 |_|
"#;

#[tokio::main]
async fn main() -> GraphMailerResult<()> {
    logger::initialize_logging();
    info!("{}", LOGO);
    info!("Starting graphmailer-server");
    info!("Version:  {}", graphmailer_version!());
    info!("Git:      [{}]", env!("GIT_HASH"));

    if let Err(error) = initialize().await {
        eprintln!("{:?}", error);
        return Err(error);
    }

    start_http_server().await
}

/// Initialize the system by validating settings and starting necessary tasks.
async fn initialize() -> GraphMailerResult<()> {
    SignalManager::initialize().await?;
    DataDirManager::initialize().await?;
    DatabaseManager::initialize().await?;
    BusConsumer::start_if_configured();
    PeriodicTasks::start_background_tasks();
    Ok(())
}
