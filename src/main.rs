use std::process;
use std::sync::Arc;

use stampa::application::SiteContext;
use stampa::application::archive::ArchiveWriter;
use stampa::application::export::{ExportCollaborators, ExportService};
use stampa::application::render::engine::{PdfEngine, RenderOptions};
use stampa::application::repos::{ContentFilters, ContentRepo, PassthroughFilters, SettingsRepo};
use stampa::application::tokens::TokenService;
use stampa::config;
use stampa::infra::archive::ZipArchiveWriter;
use stampa::infra::error::InfraError;
use stampa::infra::http::{self, AppState};
use stampa::infra::nonce::WindowedTokens;
use stampa::infra::pdf::CommandPdfEngine;
use stampa::infra::store::{FileContentRepo, FileSettingsRepo};
use stampa::infra::telemetry;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_startup_error(&error);
        process::exit(1);
    }
}

fn report_startup_error(error: &InfraError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "startup error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "startup error");
    });
}

async fn run() -> Result<(), InfraError> {
    let (_cli, settings) =
        config::load_with_cli().map_err(|err| InfraError::configuration(err.to_string()))?;

    telemetry::init(&settings.logging)?;

    let content: Arc<dyn ContentRepo> = Arc::new(FileContentRepo::load(&settings.content.library)?);
    let settings_repo: Arc<dyn SettingsRepo> =
        Arc::new(FileSettingsRepo::load(&settings.content.settings_file)?);
    let filters: Arc<dyn ContentFilters> = Arc::new(PassthroughFilters);
    let tokens: Arc<dyn TokenService> =
        Arc::new(WindowedTokens::new(settings.auth.nonce_secret.clone()));
    let engine: Arc<dyn PdfEngine> =
        Arc::new(CommandPdfEngine::new(settings.render.engine_path.clone()));
    let archive: Arc<dyn ArchiveWriter> = Arc::new(ZipArchiveWriter);

    let site = SiteContext {
        base_url: settings.site.base_url.clone(),
        name: settings.site.name.clone(),
    };
    let render_options = RenderOptions::for_site(settings.render.resource_root.clone());

    let export = Arc::new(ExportService::new(
        ExportCollaborators {
            content: Arc::clone(&content),
            settings: Arc::clone(&settings_repo),
            filters,
            tokens: Arc::clone(&tokens),
            engine,
            archive,
        },
        site,
        render_options,
    ));

    let state = AppState {
        export,
        content,
        settings: settings_repo,
        tokens,
    };

    let listener = tokio::net::TcpListener::bind(settings.server.addr).await?;
    info!(
        target = "infra::http",
        addr = %settings.server.addr,
        "stampa listening"
    );
    axum::serve(listener, http::router(state)).await?;

    Ok(())
}
