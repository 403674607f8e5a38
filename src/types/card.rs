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

use maud::Markup;
use maud::PreEscaped;
use maud::html;

use crate::markdown::markdown_to_html;
use crate::types::card_id::CardId;
use crate::types::stats::StatsModel;

#[derive(Clone, Debug)]
pub struct Card {
    /// The card's stable identifier.
    id: CardId,
    /// The name of the deck this card belongs to.
    deck_name: String,
    question: String,
    answer: String,
    /// The card's performance so far.
    stats: StatsModel,
}

impl Card {
    pub fn new(
        deck_name: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        let question = question.into().trim().to_string();
        let answer = answer.into().trim().to_string();
        let id = CardId::of_content(&question, &answer);
        Self {
            id,
            deck_name: deck_name.into(),
            question,
            answer,
            stats: StatsModel::default(),
        }
    }

    pub fn with_stats(mut self, stats: StatsModel) -> Self {
        self.stats = stats;
        self
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn deck_name(&self) -> &str {
        &self.deck_name
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn stats(&self) -> &StatsModel {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut StatsModel {
        &mut self.stats
    }

    pub fn html_front(&self) -> Markup {
        html! {
            (PreEscaped(markdown_to_html(&self.question)))
        }
    }

    pub fn html_back(&self) -> Markup {
        html! {
            (PreEscaped(markdown_to_html(&self.answer)))
        }
    }
}
