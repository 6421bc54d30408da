mod app;
mod config;
mod domain;
mod infra;
mod logging;
mod platform;
mod ui;
mod usecase;


use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::app::App;
use crate::config::AppConfig;
use crate::infra::http::client::HttpCatalogApi;
use crate::infra::sqlite::session_repo::SqliteSessionStore;
use crate::ui::state::app_state::{Services, Startup};
use crate::usecase::cache::CatalogCache;
use crate::usecase::ports::catalog_api::CatalogApi;
use crate::usecase::ports::session_store::SessionStore;
use crate::usecase::services::auth_service::AuthService;
use crate::usecase::services::product_service::ProductService;

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("logging disabled: {err}");
    }

    let webview_data_dir =
        default_webview_data_dir().expect("should resolve and create WebView2 data directory");

    let startup = match build_services() {
        Ok(services) => {
            tracing::info!("using catalog API at {}", services.config.api_base_url);
            Startup::Ready(services)
        }
        Err(err) => {
            tracing::error!("startup failed: {err:#}");
            Startup::Failed(format!("{err:#}"))
        }
    };

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Catalog Admin"))
                .with_data_directory(webview_data_dir),
        )
        .with_context(startup)
        .launch(App);
}

fn build_services() -> Result<Services> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("{err}; falling back to defaults");
            AppConfig::defaults()?
        }
    };

    let max_age = config
        .session_max_age_chrono()
        .ok_or_else(|| anyhow!("session max age is out of range"))?;
    let session: Arc<dyn SessionStore> = Arc::new(SqliteSessionStore::open(default_session_path()?)?);
    let api: Arc<dyn CatalogApi> = Arc::new(HttpCatalogApi::new(
        config.api_base_url.clone(),
        config.request_timeout,
        session.clone(),
    ));

    Ok(Services {
        products: Arc::new(ProductService::new(api.clone(), CatalogCache::new())),
        auth: Arc::new(AuthService::new(
            api,
            session,
            max_age,
        )),
        config,
    })
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "hellhbbd", "catalog-admin")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

fn default_session_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("session.sqlite"))
}

fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}

/// USD with thousands separators, e.g. `$1,234.50`.
pub(crate) fn format_price(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

pub(crate) fn table_container_style() -> &'static str {
    "flex: 1; min-height: 0; overflow: auto; border: 1px solid #bbb; border-radius: 6px;"
}

pub(crate) fn table_header_cell_style(sortable: bool) -> String {
    format!(
        "position: sticky; top: 0; background: #f3f3f3; border: 1px solid #bbb; padding: 6px; text-align: left; white-space: nowrap;{}",
        if sortable {
            " cursor: pointer; user-select: none;"
        } else {
            ""
        }
    )
}

pub(crate) fn category_badge_style() -> &'static str {
    "display: inline-block; padding: 2px 8px; border-radius: 999px; background: #eef4ff; color: #2a4a8a; font-size: 12px;"
}
