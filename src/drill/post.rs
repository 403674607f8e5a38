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

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;
use tokio::task::spawn_blocking;

use crate::drill::state::ServerState;
use crate::error::Fallible;
use crate::generator::explain_prompt;
use crate::types::timestamp::Timestamp;

#[derive(Debug, Deserialize, PartialEq)]
enum Action {
    Reveal,
    Correct,
    Incorrect,
    Explain,
    End,
    Restart,
}

impl Action {
    /// Whether the action answers the current card, and how.
    fn answer(&self) -> Option<bool> {
        match self {
            Action::Correct => Some(true),
            Action::Incorrect => Some(false),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> Redirect {
    match action_handler(state, form.action).await {
        Ok(_) => {}
        Err(e) => {
            log::error!("{e}");
        }
    }
    Redirect::to("/")
}

async fn action_handler(state: ServerState, action: Action) -> Fallible<()> {
    if action == Action::Explain {
        return explain(state).await;
    }
    let mut mutable = state.lock();
    match action {
        Action::Reveal => {
            mutable.reveal = true;
        }
        Action::Correct | Action::Incorrect => {
            if !mutable.reveal {
                log::warn!("Answering a card that is not revealed.");
                return Ok(());
            }
            let is_correct = action.answer().unwrap_or_default();
            let outcome = mutable.engine.record_answer(is_correct, Timestamp::now())?;
            mutable.last_outcome = Some(outcome);
            mutable.reveal = false;
            mutable.explanation = None;
        }
        Action::End => {
            if mutable.finished_at.is_some() {
                return Ok(());
            }
            mutable.engine.end_session();
            let ended_at = Timestamp::now();
            let answered = mutable.engine.session_total();
            let correct = mutable.engine.session_correct();
            mutable
                .db
                .save_session(mutable.session_started_at, ended_at, answered, correct)?;
            mutable.finished_at = Some(ended_at);
            log::debug!("Session completed");
        }
        Action::Restart => {
            let now = Timestamp::now();
            mutable.engine.restart(now)?;
            mutable.reveal = false;
            mutable.explanation = None;
            mutable.last_outcome = None;
            mutable.session_started_at = now;
            mutable.finished_at = None;
        }
        Action::Explain => {}
    }
    Ok(())
}

/// Ask the generator to explain the current card. The lock is released while
/// the generator runs, and the explanation is dropped if the card changed in
/// the meantime.
async fn explain(state: ServerState) -> Fallible<()> {
    let Some(generator) = state.generator.clone() else {
        log::warn!("No generator configured.");
        return Ok(());
    };
    let (card_id, prompt) = {
        let mutable = state.lock();
        match mutable.engine.current_card() {
            Some(card) => (card.id(), explain_prompt(card)),
            None => return Ok(()),
        }
    };
    let text = spawn_blocking(move || generator.generate(&prompt)).await??;
    let mut mutable = state.lock();
    if mutable.engine.current_card().map(|card| card.id()) == Some(card_id) {
        mutable.explanation = Some(text);
    }
    Ok(())
}
