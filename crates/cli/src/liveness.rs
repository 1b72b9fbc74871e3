//! HTTP liveness endpoint polled by an external uptime pinger.

use afk::config::LivenessConfig;
use afk::monitor::SharedLiveness;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_PORT: u16 = 8000;

/// `--port`/`PORT` wins over the config file.
pub fn resolve_port(cli_port: Option<u16>, config: &LivenessConfig) -> u16 {
	cli_port.or(config.port).unwrap_or(DEFAULT_PORT)
}

pub fn router(liveness: SharedLiveness) -> Router {
	Router::new().route("/", get(ping)).with_state(liveness)
}

async fn ping(State(liveness): State<SharedLiveness>) -> &'static str {
	let pings = {
		let mut state = liveness.lock();
		state.record_ping(Instant::now());
		state.pings()
	};
	debug!(target = "afk.liveness", pings, "liveness ping");
	"OK"
}

/// Serves until `shutdown` fires.
pub async fn serve(listener: TcpListener, liveness: SharedLiveness, shutdown: CancellationToken) -> std::io::Result<()> {
	axum::serve(listener, router(liveness))
		.with_graceful_shutdown(async move { shutdown.cancelled().await })
		.await
}
