//! Router binary: compile the protocol, pass the liveness barrier, serve.

use anyhow::Context as _;
use clap::Parser;
use std::sync::Arc;
use switchboard_router::{
    app, config, liveness, AppState, Forwarder, RetryPolicy, RouterContext, RouterOptions,
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = RouterOptions::parse();
    match run(options).await {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error!("{error:#}");
            std::process::exit(1);
        }
    }
}

async fn run(options: RouterOptions) -> anyhow::Result<i32> {
    let protocol = config::load_protocol(&options.protocol)?;
    let forwarder =
        Forwarder::new(RetryPolicy::default()).context("failed to build the HTTP client")?;

    // Fails here, before anything is served, if the protocol is ill-formed
    let context = RouterContext::from_protocol(&protocol, forwarder.clone())?;

    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    let state = Arc::new(AppState::new(
        context,
        options.policy,
        forwarder.clone(),
        protocol.participants.clone(),
        shutdown_tx,
    ));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", protocol.router_port))
        .await
        .with_context(|| format!("failed to bind port {}", protocol.router_port))?;
    info!(
        party = %protocol.implementing_party,
        port = protocol.router_port,
        policy = ?options.policy,
        "router listening"
    );
    tokio::spawn({
        let app = app(state.clone());
        async move {
            if let Err(error) = axum::serve(listener, app).await {
                error!(%error, "http server failed");
                std::process::exit(1);
            }
        }
    });

    liveness::confirm_party_alive(&forwarder, &protocol).await?;
    state.mark_party_online();
    liveness::await_peer_routers(&forwarder, &protocol).await;
    liveness::signal_commence(&forwarder, &protocol).await?;
    state.mark_network_online();

    // Serve until the protocol finishes or a violation takes us down
    Ok(shutdown_rx.recv().await.unwrap_or(0))
}
