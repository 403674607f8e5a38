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

use std::cmp::Ordering;
use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use maud::DOCTYPE;
use maud::html;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::scheduler::mastery_progress;
use crate::types::card_id::CardId;

/// How many of the most heavily weighted cards to list.
const HARDEST_CARD_COUNT: usize = 5;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// HTML output.
    Html,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Html => write!(f, "html"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_deck_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let stats = get_stats(&coll)?;
    match format {
        StatsFormat::Html => {
            println!("{}", render_html(&stats));
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{stats_json}");
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    card_count: usize,
    attempted_count: usize,
    mastery_progress: f64,
    session_count: usize,
    /// Attempted cards with the highest weight, heaviest first.
    hardest_cards: Vec<CardStats>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStats {
    id: CardId,
    deck_name: String,
    question: String,
    accuracy: f64,
    streak: i64,
    total_attempts: u64,
    /// Selection weight, leaving out recency and novelty.
    weight: f64,
}

fn get_stats(coll: &Collection) -> Fallible<Stats> {
    let policy = &coll.config.weights;
    let mut hardest: Vec<CardStats> = coll
        .cards
        .iter()
        .filter(|card| card.stats().total_attempts() > 0)
        .map(|card| CardStats {
            id: card.id(),
            deck_name: card.deck_name().to_string(),
            question: card.question().to_string(),
            accuracy: card.stats().accuracy(),
            streak: card.stats().streak(),
            total_attempts: card.stats().total_attempts(),
            weight: policy.base_weight(card.stats()),
        })
        .collect();
    let attempted_count = hardest.len();
    hardest.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
    hardest.truncate(HARDEST_CARD_COUNT);

    Ok(Stats {
        card_count: coll.cards.len(),
        attempted_count,
        mastery_progress: mastery_progress(&coll.cards),
        session_count: coll.db.session_count()?,
        hardest_cards: hardest,
    })
}

fn render_html(stats: &Stats) -> String {
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "streakcards stats" }
            }
            body {
                table {
                    tr { td { "Cards" } td { (stats.card_count) } }
                    tr { td { "Attempted" } td { (stats.attempted_count) } }
                    tr { td { "Mastery" } td { (format!("{:.1}%", stats.mastery_progress * 100.0)) } }
                    tr { td { "Sessions" } td { (stats.session_count) } }
                }
                @if !stats.hardest_cards.is_empty() {
                    h2 { "Hardest cards" }
                    table {
                        tr { th { "Deck" } th { "Question" } th { "Accuracy" } th { "Streak" } }
                        @for card in &stats.hardest_cards {
                            tr {
                                td { (card.deck_name) }
                                td { (card.question) }
                                td { (format!("{:.0}%", card.accuracy * 100.0)) }
                                td { (card.streak) }
                            }
                        }
                    }
                }
            }
        }
    };
    markup.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_copy_of_test_directory;
    use crate::ports::StatsStore;
    use crate::types::stats::StatsModel;
    use crate::types::timestamp::Timestamp;

    #[test]
    fn test_stats() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        let coll = Collection::new(Some(directory.clone()))?;
        let mut db = coll.db.clone();
        let now = Timestamp::now();
        let hard = coll.cards[0].id();
        let easy = coll.cards[1].id();
        db.save_stats(hard, &StatsModel::from_parts(0, 3, -3, Some(now)))?;
        db.save_stats(easy, &StatsModel::from_parts(5, 0, 5, Some(now)))?;

        let coll = Collection::new(Some(directory))?;
        let stats = get_stats(&coll)?;
        assert_eq!(stats.card_count, 4);
        assert_eq!(stats.attempted_count, 2);
        assert_eq!(stats.mastery_progress, 5.0 / 8.0);
        assert_eq!(stats.session_count, 0);
        assert_eq!(stats.hardest_cards.len(), 2);
        assert_eq!(stats.hardest_cards[0].id, hard);

        let json = serde_json::to_string(&stats)?;
        assert!(json.contains("\"masteryProgress\":0.625"));
        assert!(render_html(&stats).contains("Hardest cards"));
        Ok(())
    }

    #[test]
    fn test_stats_format_display() {
        assert_eq!(StatsFormat::Html.to_string(), "html");
        assert_eq!(StatsFormat::Json.to_string(), "json");
    }
}
