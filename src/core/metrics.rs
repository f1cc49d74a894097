use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder when the exporter is enabled.
/// The stored handle feeds [`render`] for the `/metrics` endpoint.
pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|err| anyhow::anyhow!("failed to install Prometheus recorder: {err}"))?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

/// Renders the current metric snapshot, or `None` when the exporter is off.
pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(PrometheusHandle::render)
}
