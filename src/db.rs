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
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::ports::StatsStore;
use crate::types::card::Card;
use crate::types::card_id::CardId;
use crate::types::stats::StatsModel;
use crate::types::timestamp::Timestamp;

/// Name of the database file in a deck directory.
pub const DATABASE_FILE: &str = "streakcards.db";

/// The card statistics store. Clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Return the set of all card ids in the database.
    pub fn card_ids(&self) -> Fallible<HashSet<CardId>> {
        let mut ids = HashSet::new();
        let conn = self.acquire();
        let mut stmt = conn.prepare("select card_id from cards;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id: CardId = row.get(0)?;
            ids.insert(id);
        }
        Ok(ids)
    }

    /// Add a new card to the database, with the card's current stats.
    pub fn add_card(&self, card: &Card, added_at: Timestamp) -> Fallible<()> {
        log::debug!("Adding new card: {}", card.id().short());
        let stats = card.stats();
        let sql = "insert into cards (card_id, deck_name, question, answer, correct_count, incorrect_count, streak, last_reviewed, added_at) values (?, ?, ?, ?, ?, ?, ?, ?, ?);";
        let conn = self.acquire();
        conn.execute(
            sql,
            (
                card.id(),
                card.deck_name(),
                card.question(),
                card.answer(),
                from_count(stats.correct_count())?,
                from_count(stats.incorrect_count())?,
                stats.streak(),
                stats.last_reviewed(),
                added_at,
            ),
        )?;
        Ok(())
    }

    /// Get a card's stats.
    ///
    /// If no card with the given id exists, returns an error.
    pub fn get_stats(&self, card_id: CardId) -> Fallible<StatsModel> {
        let conn = self.acquire();
        let sql = "select correct_count, incorrect_count, streak, last_reviewed from cards where card_id = ?;";
        let row: Option<(i64, i64, i64, Option<Timestamp>)> = conn
            .query_row(sql, [card_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .optional()?;
        match row {
            Some((correct, incorrect, streak, last_reviewed)) => Ok(StatsModel::from_parts(
                to_count(correct)?,
                to_count(incorrect)?,
                streak,
                last_reviewed,
            )),
            None => fail(format!("no card with id {card_id} in the database")),
        }
    }

    /// Overwrite a card's stats.
    ///
    /// If no card with the given id exists, returns an error.
    pub fn update_stats(&self, card_id: CardId, stats: &StatsModel) -> Fallible<()> {
        let sql = "update cards set correct_count = ?, incorrect_count = ?, streak = ?, last_reviewed = ? where card_id = ?;";
        let conn = self.acquire();
        let changed = conn.execute(
            sql,
            (
                from_count(stats.correct_count())?,
                from_count(stats.incorrect_count())?,
                stats.streak(),
                stats.last_reviewed(),
                card_id,
            ),
        )?;
        if changed == 0 {
            return fail(format!("no card with id {card_id} in the database"));
        }
        Ok(())
    }

    /// Zero the stats of every card. Returns the number of cards reset.
    pub fn reset_all(&self) -> Fallible<usize> {
        let sql = "update cards set correct_count = 0, incorrect_count = 0, streak = 0, last_reviewed = null;";
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let changed = tx.execute(sql, [])?;
        tx.commit()?;
        Ok(changed)
    }

    /// Save a summary of a finished study session.
    pub fn save_session(
        &self,
        started_at: Timestamp,
        ended_at: Timestamp,
        answered: u64,
        correct: u64,
    ) -> Fallible<()> {
        let sql = "insert into sessions (started_at, ended_at, answered, correct) values (?, ?, ?, ?);";
        let conn = self.acquire();
        conn.execute(
            sql,
            (
                started_at,
                ended_at,
                from_count(answered)?,
                from_count(correct)?,
            ),
        )?;
        Ok(())
    }

    pub fn card_count(&self) -> Fallible<usize> {
        let conn = self.acquire();
        let count: i64 = conn.query_row("select count(*) from cards;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn session_count(&self) -> Fallible<usize> {
        let conn = self.acquire();
        let count: i64 = conn.query_row("select count(*) from sessions;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl StatsStore for Database {
    fn save_stats(&mut self, card_id: CardId, stats: &StatsModel) -> Fallible<()> {
        self.update_stats(card_id, stats)
    }
}

fn to_count(value: i64) -> Fallible<u64> {
    u64::try_from(value).map_err(|_| ErrorReport::new("negative count in database"))
}

fn from_count(value: u64) -> Fallible<i64> {
    i64::try_from(value).map_err(|_| ErrorReport::new("count too large for database"))
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}
