use anyhow::Result;
use sysrec::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // The TUI owns the terminal, so logs go to a file.
    let file_appender = tracing_appender::rolling::never(".", "sysrec.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        db = %app_config.database.path,
        tick_interval_ms = app_config.monitoring.tick_interval_ms,
        "starting"
    );

    let store = store::RecordStore::open(&app_config.database.path).await?;
    let probe = probe::SysinfoProbe::new();
    let recorder =
        recorder::SampleLoop::new(probe, store, app_config.monitoring.tick_interval_ms);

    ui::run(recorder).await
}
