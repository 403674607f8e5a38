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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

use crate::drill::state::MutableState;
use crate::drill::state::ServerState;
use crate::drill::template::page_template;
use crate::markdown::markdown_to_html;
use crate::scheduler::Phase;
use crate::types::card::Card;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let mutable = state.lock();
    let body = match (mutable.engine.phase(), mutable.engine.current_card()) {
        (Phase::Active, Some(card)) => render_session(&state, &mutable, card),
        _ => render_completion(&mutable),
    };
    let html = page_template(body);
    (StatusCode::OK, Html(html.into_string()))
}

fn render_session(state: &ServerState, mutable: &MutableState, card: &Card) -> Markup {
    let engine = &mutable.engine;
    let progress = format!(
        "{} / {} correct",
        engine.session_correct(),
        engine.session_total()
    );
    let mastery = format!("Mastery {}", percent(engine.mastery_progress()));
    let streak = card.stats().streak();
    let streak_text = if streak > 0 {
        format!("{streak} correct in a row")
    } else if streak < 0 {
        format!("{} missed in a row", -streak)
    } else {
        "New card".to_string()
    };
    let can_explain = state.generator.is_some() && mutable.explanation.is_none();
    let card_content = html! {
        div.content {
            div .question .rich-text {
                (card.html_front())
            }
            div .answer .rich-text {
                @if mutable.reveal {
                    (card.html_back())
                }
            }
            @if let Some(explanation) = &mutable.explanation {
                div .explanation .rich-text {
                    (PreEscaped(markdown_to_html(explanation)))
                }
            }
        }
    };
    let card_controls = if mutable.reveal {
        html! {
            form action="/" method="post" {
                input id="end" type="submit" name="action" value="End" title="End the session.";
                div.spacer {}
                @if can_explain {
                    input id="explain" type="submit" name="action" value="Explain";
                }
                input id="incorrect" type="submit" name="action" value="Incorrect";
                input id="correct" type="submit" name="action" value="Correct";
            }
        }
    } else {
        html! {
            form action="/" method="post" {
                input id="end" type="submit" name="action" value="End" title="End the session.";
                div.spacer {}
                input id="reveal" type="submit" name="action" value="Reveal";
            }
        }
    };
    html! {
        div.root {
            div.progress {
                span { (progress) }
                span { (mastery) }
            }
            div.card {
                div.deck {
                    h1 {
                        (card.deck_name())
                    }
                }
                (card_content)
                div.streak {
                    (streak_text)
                }
                div.controls {
                    (card_controls)
                }
            }
        }
    }
}

fn render_completion(mutable: &MutableState) -> Markup {
    let engine = &mutable.engine;
    html! {
        div.root {
            div.finished {
                h1 {
                    "Session Completed"
                }
                table {
                    tr {
                        td { "Cards answered" }
                        td { (engine.session_total()) }
                    }
                    tr {
                        td { "Answered correctly" }
                        td { (engine.session_correct()) }
                    }
                    tr {
                        td { "Session accuracy" }
                        td { (percent(engine.session_accuracy())) }
                    }
                    tr {
                        td { "Mastery" }
                        td { (percent(engine.mastery_progress())) }
                    }
                }
                form action="/" method="post" {
                    input id="restart" type="submit" name="action" value="Restart"
                        title="Start over. This erases the history of every card.";
                }
            }
        }
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}
