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

use std::io::ErrorKind;
use std::io::Write;
use std::process::Command;
use std::process::Stdio;

use crate::config::GeneratorConfig;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::ports::ContentGenerator;
use crate::types::card::Card;

/// Generates text by running an external command: the prompt is written to
/// the command's stdin, and its stdout is the response.
pub struct CommandGenerator {
    command: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

impl ContentGenerator for CommandGenerator {
    fn generate(&self, prompt: &str) -> Fallible<String> {
        log::debug!("Running generator: {} {:?}", self.command, self.args);
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ErrorReport::new(&format!("failed to run {}: {e}", self.command)))?;
        if let Some(mut stdin) = child.stdin.take() {
            // A command that ignores its input may exit before reading it.
            if let Err(e) = stdin.write_all(prompt.as_bytes()) {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return fail(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            ));
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return fail(format!("{} produced no output", self.command));
        }
        Ok(text)
    }
}

/// The prompt asking for an explanation of a card's answer.
pub fn explain_prompt(card: &Card) -> String {
    format!(
        "Explain briefly, in Markdown, why the answer to this flashcard is correct.\n\nQuestion: {}\n\nAnswer: {}\n",
        card.question(),
        card.answer()
    )
}
