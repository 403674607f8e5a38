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

//! Interfaces to the collaborators the scheduler relies on but does not
//! implement: somewhere to keep card statistics, and something that can
//! write text.

use crate::error::Fallible;
use crate::types::card_id::CardId;
use crate::types::stats::StatsModel;

/// Persists a card's statistics after they change.
///
/// The scheduler does not wait on or react to the result beyond logging a
/// failure: a study session continues even when a write is lost.
pub trait StatsStore {
    fn save_stats(&mut self, card_id: CardId, stats: &StatsModel) -> Fallible<()>;
}

/// A store that discards every write.
#[derive(Default)]
pub struct NullStore;

impl StatsStore for NullStore {
    fn save_stats(&mut self, _card_id: CardId, _stats: &StatsModel) -> Fallible<()> {
        Ok(())
    }
}

/// Request/response text generation.
pub trait ContentGenerator {
    fn generate(&self, prompt: &str) -> Fallible<String>;
}
