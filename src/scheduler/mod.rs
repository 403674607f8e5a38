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

//! Adaptive selection of the next card to show.

mod engine;
mod select;
mod weight;

pub use engine::AnswerOutcome;
pub use engine::Phase;
pub use engine::SchedulerEngine;
pub use engine::mastery_progress;
pub use select::select_next;
pub use weight::WeightPolicy;
pub use weight::accuracy_factor;
pub use weight::difficulty_factor;
