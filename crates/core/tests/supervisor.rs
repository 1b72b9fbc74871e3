use std::sync::Arc;
use std::time::Duration;

use afk::session::SHUTDOWN_MESSAGE;
use afk::{BotConfig, RecordingNotifier, ReconnectPolicy, SessionEnd, Supervisor};
use afk_protocol::ClientCommand;
use afk_runtime::fake::FakeConnector;
use tokio_util::sync::CancellationToken;

fn config(json: &str) -> Arc<BotConfig> {
	Arc::new(BotConfig::from_json_str(json).unwrap())
}

const BASE: &str = r#"{
	"bot-account": { "username": "AfkBot" },
	"server": { "ip": "play.example.net", "port": 25570 },
	"anti-afk": { "enabled": false }
}"#;

async fn at(start: tokio::time::Instant, secs: u64) {
	tokio::time::sleep_until(start + Duration::from_secs(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn reconnects_with_base_and_conflict_delays() {
	let connector = Arc::new(FakeConnector::new());
	connector.push_failure("connection refused");
	let first = connector.push_link();
	first.connected("AfkBot", &["Steve"]);
	let second = connector.push_link();
	second.connected("AfkBot", &[]);

	let notifier = Arc::new(RecordingNotifier::new());
	let supervisor = Supervisor::new(config(BASE), connector.clone(), notifier.clone());
	let shutdown = CancellationToken::new();
	let start = tokio::time::Instant::now();
	let task = tokio::spawn({
		let shutdown = shutdown.clone();
		async move { supervisor.run(shutdown).await }
	});

	at(start, 29).await;
	assert_eq!(connector.requests().len(), 1);
	assert!(notifier.messages()[0].contains("connection refused"));

	at(start, 31).await;
	assert_eq!(connector.requests().len(), 2);

	// 30 s base plus 90 s after yielding to Steve.
	at(start, 149).await;
	assert_eq!(connector.requests().len(), 2);
	at(start, 151).await;
	assert_eq!(connector.requests().len(), 3);
	assert_eq!(connector.requests()[2].address(), "play.example.net:25570");

	shutdown.cancel();
	let outcome = task.await.unwrap();
	assert_eq!(outcome.end, SessionEnd::Shutdown);
	assert_eq!(
		second.take_sent(),
		[ClientCommand::Disconnect {
			reason: SHUTDOWN_MESSAGE.into()
		}]
	);
}

#[tokio::test(start_paused = true)]
async fn stops_when_reconnect_is_disabled() {
	let connector = Arc::new(FakeConnector::new());
	let link = connector.push_link();
	link.connected("AfkBot", &[]);
	link.close();

	let supervisor = Supervisor::new(config(BASE), connector.clone(), Arc::new(RecordingNotifier::new())).with_policy(
		ReconnectPolicy {
			enabled: false,
			..ReconnectPolicy::default()
		},
	);
	let outcome = supervisor.run(CancellationToken::new()).await;

	assert_eq!(outcome.end, SessionEnd::Closed("connection closed".into()));
	assert_eq!(connector.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_backoff_returns_promptly() {
	let connector = Arc::new(FakeConnector::new());
	connector.push_failure("refused");

	let supervisor = Supervisor::new(config(BASE), connector.clone(), Arc::new(RecordingNotifier::new()));
	let shutdown = CancellationToken::new();
	let task = tokio::spawn({
		let shutdown = shutdown.clone();
		async move { supervisor.run(shutdown).await }
	});

	tokio::time::sleep(Duration::from_secs(5)).await;
	shutdown.cancel();
	let outcome = task.await.unwrap();
	assert_eq!(outcome.end, SessionEnd::Shutdown);
	assert_eq!(connector.requests().len(), 1);
}
