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
use std::sync::MutexGuard;

use crate::db::Database;
use crate::ports::ContentGenerator;
use crate::scheduler::AnswerOutcome;
use crate::scheduler::SchedulerEngine;
use crate::types::timestamp::Timestamp;

#[derive(Clone)]
pub struct ServerState {
    pub generator: Option<Arc<dyn ContentGenerator + Send + Sync>>,
    pub mutable: Arc<Mutex<MutableState>>,
}

pub struct MutableState {
    pub engine: SchedulerEngine,
    pub db: Database,
    pub reveal: bool,
    /// Explanation of the current card, if one was requested.
    pub explanation: Option<String>,
    pub last_outcome: Option<AnswerOutcome>,
    pub session_started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

impl ServerState {
    pub fn lock(&self) -> MutexGuard<'_, MutableState> {
        match self.mutable.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
