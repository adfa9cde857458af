// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `valet serve` command implementation.
//!
//! Wires the full pipeline -- SQLite storage, Redis presence, Gemini
//! provider, tool dispatcher, agent controller, delivery router -- and
//! runs the gateway until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use valet_agent::AgentController;
use valet_config::ValetConfig;
use valet_core::traits::NoRetrieval;
use valet_core::{NotificationAdapter, PluginAdapter, PresenceStore, StorageAdapter, ValetError};
use valet_delivery::DeliveryRouter;
use valet_gateway::{GatewayState, ServerConfig, WsTransport, start_server};
use valet_gemini::GeminiProvider;
use valet_notify::PushClient;
use valet_presence::RedisPresence;
use valet_storage::SqliteStorage;
use valet_tools::{
    CalendarTool, ClockTool, TaskTool, ToolDispatcher, UnconfiguredCalendar, UnconfiguredTasks,
};

/// Runs the `valet serve` command.
pub async fn run_serve(config: ValetConfig) -> Result<(), ValetError> {
    init_tracing(&config.agent.log_level);

    info!("starting valet serve");

    // Storage first: everything else depends on the durable store.
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    // Shared presence store, reachable by every worker in the fleet.
    let presence: Arc<dyn PresenceStore> = Arc::new(
        RedisPresence::connect(&config.presence).await.map_err(|e| {
            error!(error = %e, "failed to connect presence store");
            eprintln!(
                "error: presence store unreachable at {}. Every worker needs the shared Redis.",
                config.presence.redis_url
            );
            e
        })?,
    );

    // LLM provider.
    let provider = Arc::new(GeminiProvider::new(&config).await.map_err(|e| {
        error!(error = %e, "failed to initialize Gemini provider");
        eprintln!("error: Gemini API key required. Set gemini.api_key or GEMINI_API_KEY.");
        e
    })?);

    // Tool dispatcher. The concrete calendar/task clients are external
    // collaborators; until their credentials are wired in, the fallback
    // connectors make every tool call report "not configured" to the
    // model instead of failing the prompt.
    let mut dispatcher = ToolDispatcher::new(Duration::from_secs(config.limits.tool_timeout_secs));
    dispatcher.register_all(CalendarTool::all(Arc::new(UnconfiguredCalendar)));
    dispatcher.register_all(TaskTool::all(Arc::new(UnconfiguredTasks)));
    dispatcher.register(Arc::new(ClockTool));
    if config.connectors.calendar_credentials_path.is_none() {
        info!("calendar connector not configured; calendar tools will report errors");
    }
    if config.connectors.todoist_api_key.is_none() {
        info!("task tracker connector not configured; task tools will report errors");
    }
    info!(count = dispatcher.len(), "tool dispatcher initialized");

    // Agent loop controller with its session registry.
    let agent = Arc::new(AgentController::new(
        provider.clone(),
        Arc::new(dispatcher),
        Arc::new(NoRetrieval),
        config.gemini.model.clone(),
        config.gemini.max_tokens,
        &config.limits,
    ));
    info!(
        model = %config.gemini.model,
        turn_ceiling = config.limits.session_turn_ceiling,
        max_tool_rounds = config.limits.max_tool_rounds,
        "agent controller initialized"
    );

    // Live transport + delivery routing.
    let transport = Arc::new(WsTransport::new());
    let notifier: Option<Arc<dyn NotificationAdapter>> = match (
        &config.delivery.push_endpoint,
        &config.delivery.push_credential,
    ) {
        (Some(endpoint), Some(credential)) => {
            info!(endpoint = %endpoint, "push notifications enabled");
            Some(Arc::new(PushClient::new(
                endpoint.clone(),
                credential.clone(),
            )?))
        }
        _ => {
            info!("push notifications disabled (no endpoint configured)");
            None
        }
    };

    let delivery = Arc::new(DeliveryRouter::new(
        presence.clone(),
        storage.clone(),
        transport.clone(),
        notifier,
        config.delivery.clone(),
        config.agent.name.clone(),
    ));

    let state = GatewayState {
        storage: storage.clone(),
        presence: presence.clone(),
        transport,
        agent,
        delivery,
        start_time: std::time::Instant::now(),
    };

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    // Serve until the listener fails or a shutdown signal arrives.
    let cancel = install_signal_handler();
    tokio::select! {
        result = start_server(&server_config, state) => result?,
        _ = cancel.cancelled() => {
            info!("shutdown signal received, stopping gateway");
        }
    }

    // Flush the WAL on the way out.
    storage.shutdown().await?;
    if let Err(e) = presence.shutdown().await {
        error!(error = %e, "presence shutdown failed");
    }

    info!("valet serve shutdown complete");
    Ok(())
}

/// Installs SIGINT/SIGTERM handlers that trip a cancellation token.
fn install_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trip = cancel.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => {}
                _ = sigterm.recv() => {}
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
        }

        trip.cancel();
    });

    cancel
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("valet={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
