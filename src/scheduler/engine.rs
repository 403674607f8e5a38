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

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::error::SchedulerError;
use crate::ports::StatsStore;
use crate::scheduler::select::select_next;
use crate::scheduler::weight::WeightPolicy;
use crate::types::card::Card;
use crate::types::card_id::CardId;
use crate::types::stats::StatsModel;
use crate::types::timestamp::Timestamp;

/// Where a study session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// No session has been started.
    Idle,
    /// A card is being shown.
    Active,
    /// The session was ended. Statistics are frozen until a restart or a new
    /// session.
    Finished,
}

/// What happened when an answer was recorded.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// The card that was answered.
    pub previous_card_id: CardId,
    pub was_correct: bool,
    /// The answered card's statistics after the update.
    pub stats: StatsModel,
    /// The card now being shown.
    pub next_card_id: Option<CardId>,
}

/// Drives one study session over a pool of cards.
///
/// The engine owns the cards for the duration of the session. Every answer
/// updates the answered card's statistics, hands them to the store, and
/// draws the next card.
pub struct SchedulerEngine {
    phase: Phase,
    pool: Vec<Card>,
    current: Option<CardId>,
    session_correct: u64,
    session_total: u64,
    policy: WeightPolicy,
    rng: ChaCha8Rng,
    store: Box<dyn StatsStore + Send>,
}

impl SchedulerEngine {
    /// An engine drawing from OS entropy.
    pub fn new(store: Box<dyn StatsStore + Send>) -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy(), store)
    }

    /// An engine whose selections are reproducible for a given seed.
    pub fn seeded(seed: u64, store: Box<dyn StatsStore + Send>) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed), store)
    }

    pub fn with_rng(rng: ChaCha8Rng, store: Box<dyn StatsStore + Send>) -> Self {
        Self {
            phase: Phase::Idle,
            pool: Vec::new(),
            current: None,
            session_correct: 0,
            session_total: 0,
            policy: WeightPolicy::default(),
            rng,
            store,
        }
    }

    pub fn with_policy(mut self, policy: WeightPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Begin a session over `cards` and select the first card. Cards with a
    /// repeated id are dropped, keeping the first.
    pub fn start_session(&mut self, cards: Vec<Card>, now: Timestamp) -> Result<(), SchedulerError> {
        if cards.is_empty() {
            return Err(SchedulerError::EmptyPool);
        }
        let mut seen: HashSet<CardId> = HashSet::with_capacity(cards.len());
        let cards: Vec<Card> = cards
            .into_iter()
            .filter(|card| {
                let fresh = seen.insert(card.id());
                if !fresh {
                    log::warn!("Dropping duplicate card {}", card.id().short());
                }
                fresh
            })
            .collect();
        log::debug!("Starting session with {} cards", cards.len());
        self.pool = cards;
        self.session_correct = 0;
        self.session_total = 0;
        self.phase = Phase::Active;
        self.current = self.select(None, now);
        Ok(())
    }

    /// Record the answer to the current card and move on to the next one.
    pub fn record_answer(
        &mut self,
        is_correct: bool,
        now: Timestamp,
    ) -> Result<AnswerOutcome, SchedulerError> {
        match self.phase {
            Phase::Active => {}
            Phase::Finished => return Err(SchedulerError::NotActive),
            Phase::Idle => return Err(SchedulerError::NoActiveCard),
        }
        let card_id = self.current.ok_or(SchedulerError::NoActiveCard)?;
        let card = self
            .pool
            .iter_mut()
            .find(|card| card.id() == card_id)
            .ok_or(SchedulerError::NoActiveCard)?;
        card.stats_mut().record_outcome(is_correct, now);
        let stats = *card.stats();

        self.session_total += 1;
        if is_correct {
            self.session_correct += 1;
        }
        log::debug!(
            "{} {} streak={} accuracy={:.2}",
            card_id.short(),
            if is_correct { "correct" } else { "incorrect" },
            stats.streak(),
            stats.accuracy()
        );
        self.persist(card_id, &stats);

        let exclude = if self.pool.len() > 1 {
            Some(card_id)
        } else {
            None
        };
        self.current = self.select(exclude, now);

        Ok(AnswerOutcome {
            previous_card_id: card_id,
            was_correct: is_correct,
            stats,
            next_card_id: self.current,
        })
    }

    /// End the session. The current card and tallies stay readable.
    pub fn end_session(&mut self) {
        log::debug!(
            "Session ended: {}/{} correct",
            self.session_correct,
            self.session_total
        );
        self.phase = Phase::Finished;
    }

    /// Start over with the same cards.
    ///
    /// This erases the recorded history of every card in the pool, both here
    /// and in the store. It cannot be undone.
    pub fn restart(&mut self, now: Timestamp) -> Result<(), SchedulerError> {
        if self.pool.is_empty() {
            return Err(SchedulerError::EmptyPool);
        }
        log::info!("Resetting statistics of {} cards", self.pool.len());
        for index in 0..self.pool.len() {
            self.pool[index].stats_mut().reset();
            let card_id = self.pool[index].id();
            let stats = *self.pool[index].stats();
            self.persist(card_id, &stats);
        }
        let cards = std::mem::take(&mut self.pool);
        self.start_session(cards, now)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.current.and_then(|id| self.card(id))
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.pool.iter().find(|card| card.id() == card_id)
    }

    pub fn cards(&self) -> &[Card] {
        &self.pool
    }

    pub fn policy(&self) -> &WeightPolicy {
        &self.policy
    }

    pub fn session_correct(&self) -> u64 {
        self.session_correct
    }

    pub fn session_total(&self) -> u64 {
        self.session_total
    }

    /// The card's current selection weight under this engine's policy.
    pub fn weight_of(&self, card: &Card, now: Timestamp) -> f64 {
        self.policy.weight(card.stats(), now)
    }

    /// Fraction of all recorded attempts in the pool that were correct.
    pub fn mastery_progress(&self) -> f64 {
        mastery_progress(&self.pool)
    }

    /// Fraction of this session's answers that were correct.
    pub fn session_accuracy(&self) -> f64 {
        if self.session_total == 0 {
            0.0
        } else {
            self.session_correct as f64 / self.session_total as f64
        }
    }

    fn select(&mut self, exclude: Option<CardId>, now: Timestamp) -> Option<CardId> {
        let selected = select_next(&self.pool, exclude, &self.policy, now, &mut self.rng);
        if let Some(id) = selected {
            log::debug!("Selected {}", id.short());
        }
        selected
    }

    fn persist(&mut self, card_id: CardId, stats: &StatsModel) {
        if let Err(e) = self.store.save_stats(card_id, stats) {
            log::warn!("Failed to save stats for {}: {e}", card_id.short());
        }
    }
}

/// Fraction of all recorded attempts on `cards` that were correct, or zero
/// if none were attempted.
pub fn mastery_progress(cards: &[Card]) -> f64 {
    let (correct, total) = cards.iter().fold((0, 0), |(correct, total), card| {
        let stats = card.stats();
        (correct + stats.correct_count(), total + stats.total_attempts())
    });
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}
