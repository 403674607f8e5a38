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

use clap::Parser;

use crate::cmd::reset::reset_collection;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_deck_stats;
use crate::drill::server::DrillOptions;
use crate::drill::server::start_server;
use crate::error::Fallible;
use crate::types::timestamp::Timestamp;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Drill cards in a local web interface.
    Drill {
        /// Path to the deck directory. By default, the current working directory is used.
        directory: Option<String>,
        /// The port to use for the web server. Overrides the config file.
        #[arg(long)]
        port: Option<u16>,
        /// Seed for card selection, for a reproducible session.
        #[arg(long)]
        seed: Option<u64>,
        /// Don't open the browser automatically.
        #[arg(long)]
        no_open: bool,
    },
    /// Print deck statistics.
    Stats {
        /// Path to the deck directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = StatsFormat::Json)]
        format: StatsFormat,
    },
    /// Erase the history of every card in the deck.
    Reset {
        /// Path to the deck directory. By default, the current working directory is used.
        directory: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill {
            directory,
            port,
            seed,
            no_open,
        } => {
            let options = DrillOptions {
                port,
                seed,
                open_browser: if no_open { Some(false) } else { None },
            };
            start_server(directory, options, Timestamp::now()).await
        }
        Command::Stats { directory, format } => print_deck_stats(directory, format),
        Command::Reset { directory } => reset_collection(directory),
    }
}
