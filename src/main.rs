mod api;
mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;

use iced::window;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> iced::Result {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "immich_archive_downloader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    iced::application(app::DownloadApp::default, app::update, app::view)
        .title("Immich Downloader")
        .subscription(app::subscription)
        .window(window::Settings {
            size: iced::Size::new(760.0, 720.0),
            ..Default::default()
        })
        .run()
}
