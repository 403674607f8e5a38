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
use std::fs::read_to_string;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card_id::CardId;

/// Separates a card's question from its answer.
const SEPARATOR: &str = " / ";

/// Parse every Markdown file under `directory` into cards. Each file is a
/// deck named after its file stem.
pub fn parse_deck(directory: &Path) -> Fallible<Vec<Card>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(directory) {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();

    let mut seen: HashSet<CardId> = HashSet::new();
    let mut all_cards = Vec::new();
    for path in paths {
        let deck_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let contents = read_to_string(&path)?;
        for card in parse_cards(&deck_name, &contents) {
            if seen.insert(card.id()) {
                all_cards.push(card);
            } else {
                log::debug!("Skipping duplicate card {} in {path:?}", card.id().short());
            }
        }
    }
    Ok(all_cards)
}

/// Parse the cards in a single file. Cards are separated by blank lines.
/// Blocks that are not of the form `question / answer` are ignored.
pub fn parse_cards(deck_name: &str, content: &str) -> Vec<Card> {
    content
        .split("\n\n")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|block| {
            let (question, answer) = block.split_once(SEPARATOR)?;
            let (question, answer) = (question.trim(), answer.trim());
            if question.is_empty() || answer.is_empty() {
                None
            } else {
                Some(Card::new(deck_name, question, answer))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_parse_basic() {
        let cards = parse_cards("Geography", "What is the capital of France? / Paris");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question(), "What is the capital of France?");
        assert_eq!(cards[0].answer(), "Paris");
        assert_eq!(cards[0].deck_name(), "Geography");
    }

    #[test]
    fn test_parse_multiple_cards() {
        let content = "What is the capital of France? / Paris\n\nWhat is 2+2? / 4";
        let cards = parse_cards("Deck", content);
        assert_eq!(cards.len(), 2);
    }

    #[test]
    fn test_parse_with_extra_whitespace() {
        let content = "  What is 2+2? / 4  \n\n\n  Largest ocean? /  Pacific ";
        let cards = parse_cards("Deck", content);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question(), "What is 2+2?");
        assert_eq!(cards[0].answer(), "4");
        assert_eq!(cards[1].answer(), "Pacific");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_cards("Deck", "").is_empty());
        assert!(parse_cards("Deck", "\n   \n  \n").is_empty());
    }

    #[test]
    fn test_empty_sides() {
        assert!(parse_cards("Deck", " / ").is_empty());
        assert!(parse_cards("Deck", "Question? / ").is_empty());
    }

    #[test]
    fn test_invalid_cards_ignored() {
        let content = "This is not a valid card\n\nWhat is valid? / Yes\n\nAlso not valid";
        let cards = parse_cards("Deck", content);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question(), "What is valid?");
    }

    #[test]
    fn test_multiline_question() {
        let cards = parse_cards("Deck", "What is\nthe capital of Russia? / Moscow");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question(), "What is\nthe capital of Russia?");
    }

    #[test]
    fn test_answer_may_contain_separator() {
        let cards = parse_cards("Deck", "Half of one? / 1 / 2");
        assert_eq!(cards[0].answer(), "1 / 2");
    }

    #[test]
    fn test_parse_deck() -> Fallible<()> {
        let dir = tempdir()?;
        create_dir_all(dir.path().join("nested"))?;
        write(dir.path().join("a.md"), "Q1 / A1\n\nQ2 / A2")?;
        write(dir.path().join("nested").join("b.md"), "Q3 / A3\n\nQ1 / A1")?;
        write(dir.path().join("notes.txt"), "Q4 / A4")?;
        let cards = parse_deck(dir.path())?;
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].deck_name(), "a");
        assert_eq!(cards[2].deck_name(), "b");
        Ok(())
    }
}
