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

mod get;
mod post;
pub mod server;
mod state;
mod template;

#[cfg(test)]
mod tests {
    use std::fs::write;
    use std::path::PathBuf;
    use std::time::Duration;

    use reqwest::StatusCode;
    use tempfile::tempdir;
    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::time::sleep;

    use crate::config::CONFIG_FILE;
    use crate::db::DATABASE_FILE;
    use crate::db::Database;
    use crate::drill::server::DrillOptions;
    use crate::drill::server::start_server;
    use crate::error::ErrorReport;
    use crate::error::Fallible;
    use crate::helper::create_tmp_copy_of_test_directory;
    use crate::types::timestamp::Timestamp;

    const QUESTIONS: [&str; 4] = [
        "What is the capital of France?",
        "What is the capital of <em>Peru</em>?",
        "Which river flows through Cairo?",
        "What is 7 × 8?",
    ];

    /// Start a server on a free port and wait until it accepts connections.
    async fn spawn_server(directory: String) -> Fallible<String> {
        let port =
            portpicker::pick_unused_port().ok_or_else(|| ErrorReport::new("no free port"))?;
        let options = DrillOptions {
            port: Some(port),
            seed: Some(1),
            open_browser: Some(false),
        };
        spawn(async move { start_server(Some(directory), options, Timestamp::now()).await });
        let bind = format!("127.0.0.1:{port}");
        loop {
            if let Ok(stream) = TcpStream::connect(&bind).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        Ok(format!("http://{bind}"))
    }

    async fn act(base: &str, action: &str) -> Fallible<String> {
        let response = reqwest::Client::new()
            .post(format!("{base}/"))
            .form(&[("action", action)])
            .send()
            .await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        Ok(response.text().await?)
    }

    fn open_db(directory: &str) -> Fallible<Database> {
        let path = PathBuf::from(directory).join(DATABASE_FILE);
        Database::new(&path.display().to_string())
    }

    #[tokio::test]
    async fn test_start_server_on_non_existent_directory() -> Fallible<()> {
        let result = start_server(
            Some("./derpherp".to_string()),
            DrillOptions::default(),
            Timestamp::now(),
        )
        .await;
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
        Ok(())
    }

    #[tokio::test]
    async fn test_start_server_on_empty_directory() -> Fallible<()> {
        let dir = tempdir()?;
        let result = start_server(
            Some(dir.path().display().to_string()),
            DrillOptions::default(),
            Timestamp::now(),
        )
        .await;
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: cannot start a session with no cards");
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        let base = spawn_server(directory.clone()).await?;

        // Hit the `style.css` endpoint.
        let response = reqwest::get(format!("{base}/style.css")).await?;
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "text/css");

        // Hit the not found endpoint.
        let response = reqwest::get(format!("{base}/herp-derp")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Hit the root endpoint.
        let response = reqwest::get(format!("{base}/")).await?;
        assert!(response.status().is_success());
        let html = response.text().await?;
        assert!(QUESTIONS.iter().any(|q| html.contains(q)));
        assert!(html.contains("0 / 0 correct"));
        assert!(html.contains("id=\"reveal\""));
        assert!(!html.contains("id=\"correct\""));

        // Answering before revealing does nothing.
        let html = act(&base, "Correct").await?;
        assert!(html.contains("0 / 0 correct"));

        let html = act(&base, "Reveal").await?;
        assert!(html.contains("id=\"correct\""));
        assert!(!html.contains("id=\"explain\""));

        let html = act(&base, "Correct").await?;
        assert!(html.contains("1 / 1 correct"));
        assert!(html.contains("id=\"reveal\""));

        act(&base, "Reveal").await?;
        let html = act(&base, "Incorrect").await?;
        assert!(html.contains("1 / 2 correct"));
        assert!(html.contains("Mastery 50%"));

        let html = act(&base, "End").await?;
        assert!(html.contains("Session Completed"));
        assert!(html.contains("50%"));

        // No more answers after the session ended.
        act(&base, "Reveal").await?;
        let html = act(&base, "Correct").await?;
        assert!(html.contains("Session Completed"));

        let db = open_db(&directory)?;
        assert_eq!(db.session_count()?, 1);
        let mut attempts = 0;
        for id in db.card_ids()? {
            attempts += db.get_stats(id)?.total_attempts();
        }
        assert_eq!(attempts, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_restart() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        let base = spawn_server(directory.clone()).await?;

        act(&base, "Reveal").await?;
        act(&base, "Incorrect").await?;
        act(&base, "End").await?;
        let html = act(&base, "Restart").await?;
        assert!(QUESTIONS.iter().any(|q| html.contains(q)));
        assert!(html.contains("0 / 0 correct"));
        assert!(html.contains("Mastery 0%"));

        let db = open_db(&directory)?;
        for id in db.card_ids()? {
            assert_eq!(db.get_stats(id)?.total_attempts(), 0);
        }
        Ok(())
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_explain() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        let config = "seed = 3\nopen_browser = false\n\n[generator]\ncommand = \"cat\"\n";
        write(PathBuf::from(&directory).join(CONFIG_FILE), config)?;
        let base = spawn_server(directory).await?;

        let html = act(&base, "Reveal").await?;
        assert!(html.contains("id=\"explain\""));
        let html = act(&base, "Explain").await?;
        assert!(html.contains("class=\"explanation rich-text\""));
        assert!(html.contains("Question: "));
        assert!(!html.contains("id=\"explain\""));

        // The explanation goes away with the card.
        let html = act(&base, "Correct").await?;
        assert!(!html.contains("class=\"explanation rich-text\""));
        Ok(())
    }
}
