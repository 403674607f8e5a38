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

//! The selection weight of a card.
//!
//! A card's weight is the product of five independent factors, floored so
//! that no card ever drops out of the draw on weight alone:
//!
//! - difficulty: `(incorrect + 1) / (correct + 1)`;
//! - recency: suppresses cards seen in the last few minutes;
//! - novelty: a flat boost for cards that were never answered;
//! - accuracy: a boost for cards answered poorly on average;
//! - streak: amplifies losing runs and dampens winning runs.

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::stats::StatsModel;
use crate::types::timestamp::Timestamp;

/// Accuracy below which a card gets the large boost.
const LOW_ACCURACY: f64 = 0.5;

/// Accuracy below which a card gets the small boost.
const MID_ACCURACY: f64 = 0.75;

const LOW_ACCURACY_BOOST: f64 = 2.0;

const MID_ACCURACY_BOOST: f64 = 1.3;

/// Streak magnitude at which the streak factor kicks in.
const STREAK_THRESHOLD: i64 = 2;

/// Tunable constants of the weighting. The defaults are the reference
/// policy.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightPolicy {
    /// Lowest weight a card can have.
    pub floor: f64,
    /// Recency factor of a card that was never reviewed.
    pub unseen_recency: f64,
    /// Recency factor of a card reviewed just now.
    pub recency_min: f64,
    /// Recency factor of a card not seen for a long time.
    pub recency_max: f64,
    /// Factor for cards with no attempts.
    pub novelty_boost: f64,
    /// Added to the streak factor per incorrect answer in a losing run.
    pub struggle_step: f64,
    /// Scales the damping of a winning run.
    pub mastery_step: f64,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            floor: 0.1,
            unseen_recency: 2.5,
            recency_min: 0.5,
            recency_max: 4.0,
            novelty_boost: 1.5,
            struggle_step: 0.5,
            mastery_step: 0.3,
        }
    }
}

impl WeightPolicy {
    /// Check that every card keeps a positive, finite weight under this
    /// policy.
    pub fn validate(&self) -> Fallible<()> {
        let positive = [
            ("floor", self.floor),
            ("unseen_recency", self.unseen_recency),
            ("recency_min", self.recency_min),
            ("recency_max", self.recency_max),
            ("novelty_boost", self.novelty_boost),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return fail(format!("weights.{name} must be a positive number, got {value}"));
            }
        }
        let non_negative = [
            ("struggle_step", self.struggle_step),
            ("mastery_step", self.mastery_step),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return fail(format!("weights.{name} must not be negative, got {value}"));
            }
        }
        if self.recency_min > self.recency_max {
            return fail(format!(
                "weights.recency_min ({}) is greater than weights.recency_max ({})",
                self.recency_min, self.recency_max
            ));
        }
        Ok(())
    }

    /// The card's selection weight at time `now`.
    pub fn weight(&self, stats: &StatsModel, now: Timestamp) -> f64 {
        let weight = self.base_weight(stats)
            * self.recency_factor(stats, now)
            * self.novelty_factor(stats);
        weight.max(self.floor)
    }

    /// The weight without the time-dependent and first-exposure factors, and
    /// without the floor.
    pub fn base_weight(&self, stats: &StatsModel) -> f64 {
        difficulty_factor(stats) * accuracy_factor(stats) * self.streak_factor(stats)
    }

    pub fn recency_factor(&self, stats: &StatsModel, now: Timestamp) -> f64 {
        match stats.last_reviewed() {
            None => self.unseen_recency,
            Some(last) => {
                let minutes = now.minutes_since(last);
                // Not `clamp`, which panics on inverted or NaN bounds.
                (minutes / 2.0 + 0.5)
                    .max(self.recency_min)
                    .min(self.recency_max)
            }
        }
    }

    pub fn novelty_factor(&self, stats: &StatsModel) -> f64 {
        if stats.total_attempts() == 0 {
            self.novelty_boost
        } else {
            1.0
        }
    }

    pub fn streak_factor(&self, stats: &StatsModel) -> f64 {
        let streak = stats.streak();
        if streak <= -STREAK_THRESHOLD {
            1.0 + streak.unsigned_abs() as f64 * self.struggle_step
        } else if streak >= STREAK_THRESHOLD {
            1.0 / (1.0 + streak as f64 * self.mastery_step)
        } else {
            1.0
        }
    }
}

pub fn difficulty_factor(stats: &StatsModel) -> f64 {
    (stats.incorrect_count() as f64 + 1.0) / (stats.correct_count() as f64 + 1.0)
}

pub fn accuracy_factor(stats: &StatsModel) -> f64 {
    if stats.total_attempts() == 0 {
        return 1.0;
    }
    let accuracy = stats.accuracy();
    if accuracy < LOW_ACCURACY {
        LOW_ACCURACY_BOOST
    } else if accuracy < MID_ACCURACY {
        MID_ACCURACY_BOOST
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn minutes_later(ts: Timestamp, minutes: i64) -> Timestamp {
        Timestamp::new(ts.into_inner() + Duration::minutes(minutes))
    }

    #[test]
    fn test_new_card() {
        let policy = WeightPolicy::default();
        let stats = StatsModel::default();
        assert_eq!(difficulty_factor(&stats), 1.0);
        assert_eq!(accuracy_factor(&stats), 1.0);
        assert_eq!(policy.streak_factor(&stats), 1.0);
        assert_eq!(policy.novelty_factor(&stats), 1.5);
        assert_eq!(policy.recency_factor(&stats, Timestamp::now()), 2.5);
        assert_eq!(policy.weight(&stats, Timestamp::now()), 3.75);
    }

    #[test]
    fn test_struggling_card() {
        let policy = WeightPolicy::default();
        let stats = StatsModel::from_parts(0, 3, -3, Some(Timestamp::now()));
        assert_eq!(difficulty_factor(&stats), 4.0);
        assert_eq!(policy.streak_factor(&stats), 2.5);
        assert_eq!(accuracy_factor(&stats), 2.0);
        assert!(difficulty_factor(&stats) * policy.streak_factor(&stats) >= 10.0);
        let mastered = StatsModel::from_parts(10, 0, 10, Some(Timestamp::now()));
        assert!(policy.base_weight(&stats) > 50.0 * policy.base_weight(&mastered));
    }

    #[test]
    fn test_recency_curve() {
        let policy = WeightPolicy::default();
        let seen = Timestamp::now();
        let stats = StatsModel::from_parts(1, 0, 1, Some(seen));
        assert_eq!(policy.recency_factor(&stats, seen), 0.5);
        assert_eq!(policy.recency_factor(&stats, minutes_later(seen, 1)), 1.0);
        assert_eq!(policy.recency_factor(&stats, minutes_later(seen, 3)), 2.0);
        assert_eq!(policy.recency_factor(&stats, minutes_later(seen, 7)), 4.0);
        assert_eq!(policy.recency_factor(&stats, minutes_later(seen, 600)), 4.0);
        // A review timestamp in the future is treated as just seen.
        assert_eq!(policy.recency_factor(&stats, minutes_later(seen, -10)), 0.5);
    }

    #[test]
    fn test_accuracy_bands() {
        let poor = StatsModel::from_parts(1, 2, -2, None);
        let middling = StatsModel::from_parts(2, 1, 1, None);
        let good = StatsModel::from_parts(3, 1, 3, None);
        assert_eq!(accuracy_factor(&poor), 2.0);
        assert_eq!(accuracy_factor(&middling), 1.3);
        assert_eq!(accuracy_factor(&good), 1.0);
    }

    #[test]
    fn test_streak_bands() {
        let policy = WeightPolicy::default();
        let factor = |streak| policy.streak_factor(&StatsModel::from_parts(5, 5, streak, None));
        assert_eq!(factor(-1), 1.0);
        assert_eq!(factor(0), 1.0);
        assert_eq!(factor(1), 1.0);
        assert_eq!(factor(-2), 2.0);
        assert_eq!(factor(-4), 3.0);
        assert!((factor(2) - 1.0 / 1.6).abs() < 1e-12);
        assert!((factor(10) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_floor() {
        let policy = WeightPolicy::default();
        let seen = Timestamp::now();
        // difficulty 1/101, streak 1/31, recency 0.5: far below the floor.
        let stats = StatsModel::from_parts(100, 0, 100, Some(seen));
        assert_eq!(policy.weight(&stats, seen), 0.1);
    }

    #[test]
    fn test_default_policy_is_valid() -> Fallible<()> {
        WeightPolicy::default().validate()
    }

    #[test]
    fn test_invalid_policies() {
        let cases = [
            WeightPolicy {
                floor: 0.0,
                ..WeightPolicy::default()
            },
            WeightPolicy {
                novelty_boost: 0.0,
                ..WeightPolicy::default()
            },
            WeightPolicy {
                unseen_recency: -1.0,
                ..WeightPolicy::default()
            },
            WeightPolicy {
                recency_min: 5.0,
                recency_max: 1.0,
                ..WeightPolicy::default()
            },
            WeightPolicy {
                recency_max: f64::NAN,
                ..WeightPolicy::default()
            },
            WeightPolicy {
                floor: f64::INFINITY,
                ..WeightPolicy::default()
            },
            WeightPolicy {
                mastery_step: -0.5,
                ..WeightPolicy::default()
            },
        ];
        for policy in cases {
            assert!(policy.validate().is_err(), "{policy:?}");
        }
    }

    #[test]
    fn test_inverted_recency_bounds_do_not_panic() {
        let policy = WeightPolicy {
            recency_min: 5.0,
            recency_max: 1.0,
            ..WeightPolicy::default()
        };
        let seen = Timestamp::now();
        let stats = StatsModel::from_parts(1, 0, 1, Some(seen));
        assert_eq!(policy.recency_factor(&stats, minutes_later(seen, 3)), 1.0);
    }

    #[test]
    fn test_policy_from_toml() -> Result<(), toml::de::Error> {
        let policy: WeightPolicy = toml::from_str("floor = 0.2\nrecency_max = 6.0")?;
        assert_eq!(policy.floor, 0.2);
        assert_eq!(policy.recency_max, 6.0);
        assert_eq!(policy.novelty_boost, 1.5);
        Ok(())
    }
}
