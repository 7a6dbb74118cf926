// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hackd`: the local developer-environment control-plane daemon (spec
//! §1, §4, §6). Dispatches a small supervisor subcommand set, then either
//! runs the daemon in the foreground (`run`) or talks to an already-running
//! instance over its pidfile/socket.

mod config;
mod logs;
mod paths;
mod server;
mod status_gather;
mod supervisor;

use std::sync::Arc;

use chrono::Utc;
use hack_core::SystemClock;
use hack_status::GatewayConfig;
use hack_storage::{RegistryStore, RuntimeCountersStore, TokenStore};
use parking_lot::RwLock;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::server::{AppState, Metrics};

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() -> std::process::ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let subcommand = args.get(1).map(String::as_str).unwrap_or("run");

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start tokio runtime: {e}");
            return std::process::ExitCode::from(EXIT_FAILURE as u8);
        }
    };

    let code = runtime.block_on(dispatch(subcommand));
    std::process::ExitCode::from(code as u8)
}

async fn dispatch(subcommand: &str) -> i32 {
    let config = Config::resolve();
    let exe = match std::env::current_exe() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("could not resolve hackd's own executable path: {e}");
            return EXIT_FAILURE;
        }
    };

    match subcommand {
        "run" => run_foreground(config).await,
        "start" => match supervisor::start(&config, &exe).await {
            Ok(()) => {
                println!("hackd started");
                EXIT_OK
            }
            Err(e) => {
                eprintln!("{e}");
                EXIT_FAILURE
            }
        },
        "stop" => match supervisor::stop(&config).await {
            Ok(()) => {
                println!("hackd stopped");
                EXIT_OK
            }
            Err(e) => {
                eprintln!("{e}");
                EXIT_FAILURE
            }
        },
        "restart" => match supervisor::restart(&config, &exe).await {
            Ok(()) => {
                println!("hackd restarted");
                EXIT_OK
            }
            Err(e) => {
                eprintln!("{e}");
                EXIT_FAILURE
            }
        },
        "status" => {
            let report = supervisor::status(&config).await;
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("failed to render status: {e}"),
            }
            if report.status == hack_wire::SupervisorStatus::Running { EXIT_OK } else { EXIT_FAILURE }
        }
        other => {
            eprintln!("usage: hackd [run|start|stop|restart|status], got {other:?}");
            EXIT_USAGE
        }
    }
}

fn init_logging(config: &Config) -> tracing_appender::non_blocking::WorkerGuard {
    let dir = config.log_path.parent().map(|p| p.to_path_buf()).unwrap_or_else(|| config.state_root.clone());
    let file_name = config.log_path.file_name().map(|f| f.to_os_string()).unwrap_or_else(|| "hackd.log".into());
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .json()
        .init();

    guard
}

async fn run_foreground(config: Config) -> i32 {
    if let Err(e) = crate::config::ensure_state_root(&config.state_root) {
        eprintln!("failed to create state root {}: {e}", config.state_root.display());
        return EXIT_FAILURE;
    }
    let _log_guard = init_logging(&config);

    let lock = match paths::acquire(&config) {
        Ok(guard) => guard,
        Err(paths::StartupError::AlreadyRunning) => {
            eprintln!("hackd is already running (pid file locked)");
            return EXIT_FAILURE;
        }
        Err(e) => {
            eprintln!("failed to acquire startup lock: {e}");
            return EXIT_FAILURE;
        }
    };

    let clock = SystemClock;
    let registry = Arc::new(RegistryStore::open(&config.registry_path, clock.clone()));
    let tokens = Arc::new(TokenStore::open(&config.tokens_path, clock.clone()));
    let runtime_counters = Arc::new(RuntimeCountersStore::open(&config.runtime_counters_path));
    let gateway_config: GatewayConfig = config.load_gateway_config();

    let state = AppState {
        config: config.clone(),
        clock: clock.clone(),
        started_at: Utc::now(),
        registry,
        tokens,
        runtime_counters,
        gateway_config: Arc::new(RwLock::new(gateway_config)),
        log_hub: logs::LogHub::new(),
        status_hub: server::StatusHub::new(),
        metrics: Arc::new(Metrics::default()),
    };

    let unix_listener = match tokio::net::UnixListener::bind(&config.socket_path) {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, "failed to bind unix socket");
            lock.release_and_cleanup();
            return EXIT_FAILURE;
        }
    };
    let _ = set_socket_permissions(&config.socket_path);

    let trusted_router = server::build_router(state.clone(), true);
    let trusted_server = axum::serve(unix_listener, trusted_router.into_make_service());

    let gateway_task = if state.gateway_config.read().enabled {
        let bind = state.gateway_config.read().bind.clone();
        let port = state.gateway_config.read().port;
        match (bind, port) {
            (Some(host), Some(port)) => match tokio::net::TcpListener::bind((host.as_str(), port)).await {
                Ok(listener) => {
                    let router = server::build_router(state.clone(), false);
                    Some(tokio::spawn(async move {
                        if let Err(e) = axum::serve(listener, router.into_make_service()).await {
                            error!(error = %e, "gateway TCP listener exited");
                        }
                    }))
                }
                Err(e) => {
                    error!(error = %e, host, port, "failed to bind gateway TCP listener");
                    None
                }
            },
            _ => None,
        }
    } else {
        None
    };

    info!(socket = %config.socket_path.display(), "hackd ready");

    tokio::select! {
        result = trusted_server => {
            if let Err(e) = result {
                error!(error = %e, "unix socket listener exited");
            }
        }
        _ = shutdown_signal() => {
            info!("received shutdown signal");
        }
    }

    if let Some(task) = gateway_task {
        task.abort();
    }
    lock.release_and_cleanup();
    EXIT_OK
}

#[cfg(unix)]
fn set_socket_permissions(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_socket_permissions(_path: &std::path::Path) -> std::io::Result<()> {
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
