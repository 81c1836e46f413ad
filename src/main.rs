use anyhow::Context;
use tasktrack::{
    api::routes::build_app,
    auth::jwt::generate_secret,
    cli::{
        init::{self, InitConfig, InitResult},
        report::{Mark, Reporter},
        Cli, Commands,
    },
    AppState, TaskTrackConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let report = Reporter::new(!cli.no_color);

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            host,
            port,
        }) => {
            let result = init::run(
                InitConfig {
                    path,
                    force,
                    host,
                    port,
                },
                &report,
            );
            match result {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => anyhow::bail!("init failed: {}", e),
            }
        }
        Some(Commands::Secret) => {
            println!("{}", generate_secret());
            Ok(())
        }
        Some(Commands::Config { validate }) => {
            dotenvy::dotenv().ok();
            show_config(&cli.config, validate, &report)
        }
        None => serve(&cli.config, cli.verbose, &report).await,
    }
}

fn show_config(path: &std::path::Path, validate: bool, report: &Reporter) -> anyhow::Result<()> {
    report.title("Configuration");

    // `load` always validates; without --validate, parse only so a missing
    // secret does not hide the rest of the file.
    let config: TaskTrackConfig = if validate {
        match TaskTrackConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                report.emit(Mark::Failed, &e);
                anyhow::bail!("invalid configuration: {}", path.display());
            }
        }
    } else {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?
    };

    report.field("file", path.display());
    report.field("listen", config.bind_address());
    report.field("log_level", &config.server.log_level);
    report.field("database", &config.database.url);
    report.field("jwt_secret_env", &config.auth.jwt_secret_env);
    report.field("token_ttl_secs", config.auth.token_ttl_secs);

    if validate {
        report.emit(Mark::Done, "configuration is valid");
    }
    Ok(())
}

async fn serve(config_path: &std::path::Path, verbose: bool, report: &Reporter) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = match TaskTrackConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            report.emit(Mark::Failed, &e);
            report.emit(Mark::Note, "run `tasktrack-server init` to create one");
            anyhow::bail!("failed to load {}", config_path.display());
        }
    };

    let default_filter = if verbose {
        "debug".to_string()
    } else {
        format!("{},tower_http=info", config.server.log_level)
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = config.bind_address();
    let state = AppState::from_config(config)
        .await
        .context("failed to initialize application state")?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("TaskTrack listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
