use std::fmt::Display;

use anyhow::Result;
use smart_plug_monitor::{Config, PollingStation, StationState};
use tokio::{signal, time};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent; env vars may be set externally)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let station = PollingStation::from_config(&config);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut ticker = time::interval(config.display_interval);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => print_state(&station.snapshot()),
        }
    }

    station.shutdown().await;
    Ok(())
}

fn print_state(state: &StationState) {
    let latest = state.latest.as_ref();
    println!("time:            {}", show(latest.map(|s| &s.timestamp)));
    println!("online:          {}", state.online);
    println!("power:           {} W", show(latest.map(|s| s.power)));
    println!("voltage:         {} V", show(latest.map(|s| s.voltage)));
    println!("current:         {} A", show(latest.map(|s| s.current)));
    println!("power factor:    {}", show(latest.map(|s| s.power_factor)));
    println!("today:           {} kWh", show(latest.map(|s| s.power_today)));
    println!("yesterday:       {} kWh", show(latest.map(|s| s.power_yesterday)));
    println!();
}

fn show<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
