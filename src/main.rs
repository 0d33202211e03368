use paird::config;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("paird=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "ui")]
fn main() {
    config::load_dotenv();
    init_tracing();
    dioxus::launch(paird::ui::App);
}

#[cfg(not(feature = "ui"))]
fn main() -> anyhow::Result<()> {
    use paird::controller::ConversationController;
    use paird::error::AppError;
    use paird::session::SessionId;

    config::load_dotenv();
    init_tracing();

    let started = config::Settings::from_env()
        .map_err(AppError::from)
        .and_then(|settings| {
            let controller = ConversationController::from_settings(&settings)?;
            Ok((settings, controller))
        });
    let (settings, controller) = match started {
        Ok(started) => started,
        Err(err) if err.is_fatal() => {
            eprintln!("{err}");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let session_id = SessionId::current(settings.session_seed.as_deref()).clone();
        let mut ctx = controller.open_session(session_id);
        paird::console::run(&controller, &mut ctx).await
    })
}
