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

use rand::Rng;

use crate::scheduler::weight::WeightPolicy;
use crate::types::card::Card;
use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

/// Draw the next card from `pool`, with probability proportional to each
/// card's weight.
///
/// The excluded card is left out of the draw unless it is the only card in
/// the pool. Returns `None` only for an empty pool.
pub fn select_next<R: Rng>(
    pool: &[Card],
    exclude: Option<CardId>,
    policy: &WeightPolicy,
    now: Timestamp,
    rng: &mut R,
) -> Option<CardId> {
    let mut candidates: Vec<&Card> = pool
        .iter()
        .filter(|card| Some(card.id()) != exclude)
        .collect();
    if candidates.is_empty() {
        candidates = pool.iter().collect();
    }
    if candidates.is_empty() {
        return None;
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|card| policy.weight(card.stats(), now))
        .collect();
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        log::warn!("Degenerate total weight {total}, selecting uniformly.");
        let index = rng.gen_range(0..candidates.len());
        return Some(candidates[index].id());
    }

    let r: f64 = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (card, weight) in candidates.iter().zip(weights.iter()) {
        cumulative += weight;
        if cumulative >= r {
            return Some(card.id());
        }
    }
    // Rounding can leave the running sum a hair short of `r`.
    candidates.last().map(|card| card.id())
}
