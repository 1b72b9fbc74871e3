use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber; `RUST_LOG` overrides `verbose`.
pub fn init_logging(verbose: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_target(false).with_ansi(true))
		.try_init();
}

fn default_directives(verbose: u8) -> &'static str {
	match verbose {
		0 => "warn,afk=info,afk_cli=info,afk_runtime=info",
		1 => "info",
		_ => "debug,hyper=info,reqwest=info,rustls=info,tungstenite=info",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn directives_parse() {
		for verbose in 0..3 {
			assert!(EnvFilter::try_new(default_directives(verbose)).is_ok());
		}
	}
}
