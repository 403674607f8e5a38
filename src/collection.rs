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
use std::env::current_dir;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::db::DATABASE_FILE;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::parser::parse_deck;
use crate::types::card::Card;
use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

/// A deck directory, loaded: its config, database, and cards with their
/// stored stats.
pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
    pub db: Database,
    pub cards: Vec<Card>,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let config = Config::load(&directory)?;

        let db_path: PathBuf = directory.join(DATABASE_FILE);
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;

        let cards = {
            log::debug!("Loading deck...");
            let start = Instant::now();
            let cards = parse_deck(&directory)?;
            let duration = start.elapsed().as_millis();
            log::debug!("Deck loaded in {duration}ms.");
            cards
        };

        // Cards in the deck but not in the database are new.
        let known: HashSet<CardId> = db.card_ids()?;
        let now = Timestamp::now();
        let mut hydrated = Vec::with_capacity(cards.len());
        for card in cards {
            if known.contains(&card.id()) {
                let stats = db.get_stats(card.id())?;
                hydrated.push(card.with_stats(stats));
            } else {
                db.add_card(&card, now)?;
                hydrated.push(card);
            }
        }

        Ok(Self {
            directory,
            config,
            db,
            cards: hydrated,
        })
    }
}
