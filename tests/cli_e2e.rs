//! End-to-end CLI tests for tg2mm.
//!
//! These tests run the actual binary against export directories built in a
//! temp dir and check exit codes, console output and the written files.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

const EXPORT: &str = r#"{
  "name": "Trains",
  "type": "private_supergroup",
  "messages": [
    {"id": 1, "type": "message", "date": "2024-01-15T10:30:00", "from": "Alice", "from_id": "user1", "text": "Which train?"},
    {"id": 2, "type": "service", "date": "2024-01-15T10:30:30", "actor": "Bob", "actor_id": "user2", "action": "pin_message"},
    {"id": 3, "type": "message", "date": "2024-01-15T10:31:00", "from": "Bob", "from_id": "user2", "text": "The 10:15", "reply_to_message_id": 1},
    {"id": 4, "type": "message", "date": "2024-01-15T10:32:00", "from": "Alice", "from_id": "user1", "text": "", "photo": "photos/ticket.jpg"}
  ]
}"#;

const CONFIG: &str = "chat_type: channel
users:
  user1: alice
  user2: bob
import_into:
  team: example
  channel: trains
timezone: UTC
";

/// Export directory with `result.json`, `config.yaml` and one photo.
fn setup_export() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("result.json"), EXPORT).unwrap();
    fs::write(dir.path().join("config.yaml"), CONFIG).unwrap();
    fs::create_dir_all(dir.path().join("photos")).unwrap();
    fs::write(dir.path().join("photos/ticket.jpg"), b"jpeg").unwrap();
    dir
}

fn tg2mm_cmd() -> Command {
    Command::cargo_bin("tg2mm").expect("Failed to find tg2mm binary")
}

fn output_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

// ============================================================================
// Basic functionality
// ============================================================================

mod basic_functionality {
    use super::*;

    #[test]
    fn test_archive_written() {
        let dir = setup_export();
        let output = output_path(&dir, "import.zip");

        tg2mm_cmd()
            .arg(dir.path())
            .arg("-o")
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::contains("Done!"))
            .stdout(predicate::str::contains("Posts:          3"))
            .stdout(predicate::str::contains("Skipped:        1"));

        assert!(output.exists());
        assert!(fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn test_default_output_name() {
        let dir = setup_export();

        tg2mm_cmd()
            .current_dir(dir.path())
            .arg(".")
            .assert()
            .success();

        assert!(dir.path().join("mattermost_import.zip").exists());
    }

    #[test]
    fn test_conversation_log_flag() {
        let dir = setup_export();
        let output = output_path(&dir, "import.zip");
        let log = output_path(&dir, "chat.txt");

        tg2mm_cmd()
            .arg(dir.path())
            .arg("-o")
            .arg(&output)
            .arg("--conversation-log")
            .arg(&log)
            .assert()
            .success();

        let content = fs::read_to_string(&log).unwrap();
        assert!(content.contains("@bob:"));
        assert!(content.contains("> @alice: Which train?"));
        assert!(content.contains("[PHOTO: ticket.jpg]"));
    }

    #[test]
    fn test_chat_type_override() {
        let dir = setup_export();
        let output = output_path(&dir, "import.zip");

        tg2mm_cmd()
            .arg(dir.path())
            .arg("-o")
            .arg(&output)
            .args(["--chat-type", "post"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Chat type: post"))
            .stdout(predicate::str::contains("Records:        4"));
    }
}

// ============================================================================
// Warnings
// ============================================================================

mod warnings {
    use super::*;

    #[test]
    fn test_missing_attachment_reported() {
        let dir = setup_export();
        fs::remove_file(dir.path().join("photos/ticket.jpg")).unwrap();
        let output = output_path(&dir, "import.zip");

        tg2mm_cmd()
            .arg(dir.path())
            .arg("-o")
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::contains("Warnings (1)"))
            .stdout(predicate::str::contains("photos/ticket.jpg"));

        assert!(output.exists());
    }
}

// ============================================================================
// Error handling
// ============================================================================

mod error_handling {
    use super::*;

    #[test]
    fn test_missing_config() {
        let dir = setup_export();
        fs::remove_file(dir.path().join("config.yaml")).unwrap();

        tg2mm_cmd()
            .arg(dir.path())
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Error"));
    }

    #[test]
    fn test_unresolved_user_writes_nothing() {
        let dir = setup_export();
        fs::write(
            dir.path().join("config.yaml"),
            CONFIG.replace("  user2: bob\n", ""),
        )
        .unwrap();
        let output = output_path(&dir, "import.zip");

        tg2mm_cmd()
            .arg(dir.path())
            .arg("-o")
            .arg(&output)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("user2"));

        assert!(!output.exists());
    }

    #[test]
    fn test_invalid_json() {
        let dir = setup_export();
        fs::write(dir.path().join("result.json"), "{ not json").unwrap();

        tg2mm_cmd()
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("result.json"))
            .stderr(predicate::str::contains("line 1 column"));
    }

    #[test]
    fn test_invalid_timezone() {
        let dir = setup_export();
        fs::write(
            dir.path().join("config.yaml"),
            CONFIG.replace("timezone: UTC", "timezone: Mars/Olympus"),
        )
        .unwrap();

        tg2mm_cmd()
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Mars/Olympus"));
    }

    #[test]
    fn test_missing_input_argument() {
        tg2mm_cmd().assert().failure();
    }

    #[test]
    fn test_invalid_chat_type_option() {
        let dir = setup_export();

        tg2mm_cmd()
            .arg(dir.path())
            .args(["--chat-type", "forum"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }
}

// ============================================================================
// Help and version
// ============================================================================

mod help_and_version {
    use super::*;

    #[test]
    fn test_help_flag() {
        tg2mm_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Mattermost"))
            .stdout(predicate::str::contains("--conversation-log"))
            .stdout(predicate::str::contains("result.json"));
    }

    #[test]
    fn test_version_flag() {
        tg2mm_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
