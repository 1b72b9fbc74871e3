use std::sync::Arc;

use afk::config::BotConfig;
use afk::{CronMonitor, LivenessState, Notifier, NullNotifier, Supervisor};
use afk_runtime::BridgeConnector;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{Cli, Commands};
use crate::liveness;
use crate::webhook::WebhookNotifier;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let config = BotConfig::load(&cli.config).with_context(|| format!("failed to load {}", cli.config.display()))?;

	match cli.command.unwrap_or_default() {
		Commands::Check => {
			println!("{}", serde_json::to_string_pretty(&summary(&config)?)?);
			Ok(())
		}
		Commands::Run => run(Arc::new(config), &cli.bridge, cli.port).await,
	}
}

/// Effective settings with secrets masked.
pub fn summary(config: &BotConfig) -> Result<Value> {
	let mut value = serde_json::to_value(config)?;
	for pointer in ["/bot-account/password", "/auto-auth/password", "/discord-webhook/url"] {
		if let Some(secret) = value.pointer_mut(pointer) {
			if secret.as_str().is_some_and(|s| !s.is_empty()) {
				*secret = json!("***");
			}
		}
	}
	Ok(value)
}

/// Wires the liveness server, cron monitor and supervisor, then waits for Ctrl-C.
pub async fn run(config: Arc<BotConfig>, bridge_url: &str, port: Option<u16>) -> Result<()> {
	let shutdown = CancellationToken::new();
	let liveness = LivenessState::shared();
	let notifier: Arc<dyn Notifier> = match WebhookNotifier::from_config(&config.discord_webhook) {
		Some(webhook) => Arc::new(webhook),
		None => Arc::new(NullNotifier),
	};

	let server = if config.liveness.enabled {
		let port = liveness::resolve_port(port, &config.liveness);
		let listener = TcpListener::bind(("0.0.0.0", port))
			.await
			.with_context(|| format!("failed to bind liveness port {port}"))?;
		info!(target = "afk.liveness", port, "liveness endpoint listening");
		Some(tokio::spawn(liveness::serve(listener, liveness.clone(), shutdown.clone())))
	} else {
		None
	};

	if let Some(monitor) = CronMonitor::from_config(&config.cron_monitor, liveness.clone(), Arc::clone(&notifier)) {
		info!(
			target = "afk.liveness",
			every_min = config.cron_monitor.check_every_minutes,
			max_gap_min = config.cron_monitor.max_gap_minutes,
			"cron monitor enabled"
		);
		tokio::spawn(monitor.run(shutdown.clone()));
	}

	tokio::spawn({
		let shutdown = shutdown.clone();
		async move {
			match tokio::signal::ctrl_c().await {
				Ok(()) => {
					info!(target = "afk", "interrupt received; shutting down");
					shutdown.cancel();
				}
				Err(err) => warn!(target = "afk", error = %err, "cannot listen for Ctrl-C"),
			}
		}
	});

	let connector = Arc::new(BridgeConnector::new(bridge_url).with_handshake_timeout(config.connect_timeout()));
	info!(target = "afk", bridge = %bridge_url, server = %config.connect_request().address(), "starting");
	let outcome = Supervisor::new(config, connector, notifier).run(shutdown.clone()).await;
	info!(target = "afk", outcome = %outcome.end, "supervisor stopped");

	if let Some(server) = server {
		if !shutdown.is_cancelled() {
			info!(target = "afk.liveness", "reconnect is off; liveness endpoint stays up until interrupted");
		}
		shutdown.cancelled().await;
		server
			.await
			.context("liveness task panicked")?
			.context("liveness server failed")?;
	}

	Ok(())
}
