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

use std::cmp::Ordering;
use std::fmt::Display;
use std::fmt::Formatter;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// A card's stable identifier: the BLAKE3 hash of its content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CardId {
    inner: blake3::Hash,
}

impl CardId {
    /// Derive the identifier of a question/answer pair.
    pub fn of_content(question: &str, answer: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(question.as_bytes());
        hasher.update(&[0]);
        hasher.update(answer.as_bytes());
        Self {
            inner: hasher.finalize(),
        }
    }

    pub fn to_hex(self) -> String {
        self.inner.to_hex().to_string()
    }

    /// The first eight hex digits, for log lines.
    pub fn short(self) -> String {
        self.to_hex()[..8].to_string()
    }

    pub fn from_hex(s: &str) -> Fallible<Self> {
        let inner = blake3::Hash::from_hex(s)
            .map_err(|_| ErrorReport::new("invalid card id in database"))?;
        Ok(Self { inner })
    }
}

impl PartialOrd for CardId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CardId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.as_bytes().cmp(other.inner.as_bytes())
    }
}

impl ToSql for CardId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_hex()))
    }
}

impl FromSql for CardId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        CardId::from_hex(&string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for CardId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_sensitivity() {
        let a = CardId::of_content("What is the capital of France?", "Paris");
        let b = CardId::of_content("What is the capital of France?", "Pariz");
        assert_ne!(a, b);
        assert_eq!(a, CardId::of_content("What is the capital of France?", "Paris"));
    }

    #[test]
    fn test_boundary_between_sides() {
        assert_ne!(CardId::of_content("ab", "c"), CardId::of_content("a", "bc"));
    }

    #[test]
    fn test_hex_roundtrip() -> Fallible<()> {
        let id = CardId::of_content("Q", "A");
        assert_eq!(CardId::from_hex(&id.to_hex())?, id);
        assert_eq!(id.short().len(), 8);
        Ok(())
    }

    #[test]
    fn test_invalid_hex() {
        assert!(CardId::from_hex("not a hash").is_err());
    }

    #[test]
    fn test_ordering() -> Fallible<()> {
        let a =
            CardId::from_hex("0000000000000000000000000000000000000000000000000000000000000000")?;
        let b =
            CardId::from_hex("0000000000000000000000000000000000000000000000000000000000000001")?;
        assert!(a < b);
        Ok(())
    }
}
