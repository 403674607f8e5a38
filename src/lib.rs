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

//! streakcards: a flashcard drill that picks the next card adaptively.
//!
//! After every answer the [`scheduler::SchedulerEngine`] updates the
//! answered card's [`types::stats::StatsModel`] and draws the next card at
//! random, weighting each card by how hard it has been, how recently it was
//! seen, whether it is new, and the momentum of its current streak.

pub mod cli;
pub mod cmd;
pub mod collection;
pub mod config;
pub mod db;
pub mod drill;
pub mod error;
pub mod generator;
pub mod markdown;
pub mod parser;
pub mod ports;
pub mod scheduler;
pub mod types;

#[cfg(test)]
mod helper;

pub use error::ErrorReport;
pub use error::Fallible;
pub use error::SchedulerError;
pub use scheduler::AnswerOutcome;
pub use scheduler::Phase;
pub use scheduler::SchedulerEngine;
pub use scheduler::WeightPolicy;
pub use types::card::Card;
pub use types::card_id::CardId;
pub use types::stats::StatsModel;
pub use types::timestamp::Timestamp;
