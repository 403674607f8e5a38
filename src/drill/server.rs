// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::signal::ctrl_c;
use tokio::time::sleep;

use crate::collection::Collection;
use crate::drill::get::get_handler;
use crate::drill::post::post_handler;
use crate::drill::state::MutableState;
use crate::drill::state::ServerState;
use crate::error::Fallible;
use crate::generator::CommandGenerator;
use crate::ports::ContentGenerator;
use crate::scheduler::SchedulerEngine;
use crate::types::timestamp::Timestamp;

/// Command-line overrides of the deck's config.
#[derive(Default)]
pub struct DrillOptions {
    pub port: Option<u16>,
    pub seed: Option<u64>,
    pub open_browser: Option<bool>,
}

pub async fn start_server(
    directory: Option<String>,
    options: DrillOptions,
    session_started_at: Timestamp,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let config = coll.config;
    let port = options.port.unwrap_or(config.port);
    let open_browser = options.open_browser.unwrap_or(config.open_browser);

    let store = Box::new(coll.db.clone());
    let engine = match options.seed.or(config.seed) {
        Some(seed) => {
            log::debug!("Using seed {seed}.");
            SchedulerEngine::seeded(seed, store)
        }
        None => SchedulerEngine::new(store),
    };
    let mut engine = engine.with_policy(config.weights);
    log::debug!("Found {} cards.", coll.cards.len());
    engine.start_session(coll.cards, session_started_at)?;

    let generator: Option<Arc<dyn ContentGenerator + Send + Sync>> = match &config.generator {
        Some(generator) => Some(Arc::new(CommandGenerator::new(generator))),
        None => None,
    };

    let state = ServerState {
        generator,
        mutable: Arc::new(Mutex::new(MutableState {
            engine,
            db: coll.db,
            reveal: false,
            explanation: None,
            last_outcome: None,
            session_started_at,
            finished_at: None,
        })),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("127.0.0.1:{port}");

    // Start a separate task to open the browser.
    if open_browser {
        let bind = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(&bind).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            let url = format!("http://{bind}/");
            if let Err(e) = open::that(&url) {
                log::warn!("Failed to open {url}: {e}");
            }
        });
    }

    // Start the server.
    log::info!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
    }
    log::debug!("Shutting down.");
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
