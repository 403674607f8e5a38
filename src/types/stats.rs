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

use serde::Serialize;

use crate::types::timestamp::Timestamp;

/// Performance information for a single card.
///
/// The counters only grow, except through [`StatsModel::reset`]. The streak
/// is a signed run length: positive for a run of correct answers, negative
/// for a run of incorrect answers, and zero for a card that has never been
/// answered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsModel {
    correct_count: u64,
    incorrect_count: u64,
    last_reviewed: Option<Timestamp>,
    streak: i64,
}

impl StatsModel {
    /// Rebuild a stats record from stored values.
    pub fn from_parts(
        correct_count: u64,
        incorrect_count: u64,
        streak: i64,
        last_reviewed: Option<Timestamp>,
    ) -> Self {
        Self {
            correct_count,
            incorrect_count,
            last_reviewed,
            streak,
        }
    }

    pub fn correct_count(&self) -> u64 {
        self.correct_count
    }

    pub fn incorrect_count(&self) -> u64 {
        self.incorrect_count
    }

    pub fn last_reviewed(&self) -> Option<Timestamp> {
        self.last_reviewed
    }

    pub fn streak(&self) -> i64 {
        self.streak
    }

    pub fn total_attempts(&self) -> u64 {
        self.correct_count + self.incorrect_count
    }

    /// Fraction of attempts answered correctly, or zero if never attempted.
    pub fn accuracy(&self) -> f64 {
        let total = self.total_attempts();
        if total == 0 {
            0.0
        } else {
            self.correct_count as f64 / total as f64
        }
    }

    /// Record the outcome of showing this card.
    pub fn record_outcome(&mut self, correct: bool, now: Timestamp) {
        if correct {
            self.correct_count += 1;
            // A correct answer after a losing run starts a new run at +1.
            self.streak = if self.streak >= 0 { self.streak + 1 } else { 1 };
        } else {
            self.incorrect_count += 1;
            self.streak = if self.streak <= 0 { self.streak - 1 } else { -1 };
        }
        self.last_reviewed = Some(now);
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
