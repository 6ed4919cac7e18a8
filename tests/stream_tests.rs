//! QueryStream tests against a stand-in `claude` script
//!
//! Each scenario writes a small shell script that ignores its input and
//! replays canned stream-json output, then drives it through `ClaudeAgent`.

#![cfg(unix)]

use claude_smoke::{
    AgentClient, AgentMessage, ClaudeAgent, ClaudeCliBuilder, Error, MessageStream, Probe,
    ProbeConfig,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const INIT_WITH_ARGV: &str =
    r#"printf '{"type":"system","subtype":"init","session_id":"s-1","argv":"%s"}\n' "$*""#;
const HELLO: &str = r#"{"type":"assistant","message":{"model":"claude-sonnet-4-5","content":[{"type":"text","text":"Hello"}]},"session_id":"s-1"}"#;
const RESULT: &str = r#"{"type":"result","subtype":"success","is_error":false,"duration_ms":10,"duration_api_ms":8,"num_turns":1,"result":"Hello","session_id":"s-1","total_cost_usd":0.001}"#;

struct FakeCli {
    dir: PathBuf,
    path: PathBuf,
}

impl FakeCli {
    fn new(body: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("claude-smoke-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("claude");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, path }
    }

    fn agent(&self) -> ClaudeAgent {
        ClaudeAgent::new(ClaudeCliBuilder::new().command(&self.path)).check_version(false)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for FakeCli {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn echo(line: &str) -> String {
    format!("echo '{}'", line)
}

async fn collect_all<S: MessageStream>(stream: &mut S) -> Vec<Result<S::Item, Error>> {
    let mut items = Vec::new();
    while let Some(item) = stream.next_message().await {
        items.push(item);
    }
    items
}

// Scenarios run sequentially in one test: freshly written executables can hit
// ETXTBSY when another test thread forks at the same moment.
#[tokio::test]
async fn test_query_stream_scenarios() {
    streams_messages_until_clean_exit().await;
    non_zero_exit_becomes_process_failed().await;
    malformed_line_ends_the_stream().await;
    probe_report_end_to_end().await;
    stderr_flood_does_not_stall_the_stream().await;
    version_is_checked_once_per_process().await;
    #[cfg(target_os = "linux")]
    dropping_the_stream_kills_the_child().await;
}

async fn streams_messages_until_clean_exit() {
    let body = [
        INIT_WITH_ARGV.to_string(),
        "echo".to_string(),
        echo(HELLO),
        echo(RESULT),
    ]
    .join("\n");
    let cli = FakeCli::new(&body);

    let mut stream = cli.agent().query("Say hello in one word").await.unwrap();
    let items = collect_all(&mut stream).await;
    assert_eq!(items.len(), 3, "blank lines are skipped");

    let messages: Vec<AgentMessage> = items.into_iter().map(|item| item.unwrap()).collect();
    assert_eq!(messages[0].message_type(), "system");
    assert_eq!(messages[1].text_content(), Some("Hello".to_string()));
    assert!(messages[2].is_result());

    match &messages[0] {
        AgentMessage::System(sys) => {
            let argv = sys.data.get("argv").and_then(|v| v.as_str()).unwrap();
            assert!(argv.contains("--output-format stream-json --verbose"));
            assert!(argv.ends_with("--print -- Say hello in one word"));
        }
        other => panic!("Expected system message, got {:?}", other),
    }

    // The stream is not restartable
    assert!(stream.next_message().await.is_none());
}

async fn non_zero_exit_becomes_process_failed() {
    let body = [
        echo(r#"{"type":"system","subtype":"init","session_id":"s-2"}"#),
        "echo 'Invalid API key · Please run /login' >&2".to_string(),
        "exit 1".to_string(),
    ]
    .join("\n");
    let cli = FakeCli::new(&body);

    let mut stream = cli.agent().query("hi").await.unwrap();
    assert!(stream.next_message().await.unwrap().is_ok());

    match stream.next_message().await {
        Some(Err(Error::ProcessFailed { code, stderr })) => {
            assert_eq!(code, Some(1));
            assert!(stderr.contains("Invalid API key"));
        }
        other => panic!("Expected ProcessFailed, got {:?}", other.map(|r| r.is_ok())),
    }
    assert!(stream.next_message().await.is_none());
}

async fn malformed_line_ends_the_stream() {
    let body = ["echo 'this is not json'".to_string(), echo(RESULT)].join("\n");
    let cli = FakeCli::new(&body);

    let mut stream = cli.agent().query("hi").await.unwrap();
    match stream.next_message().await {
        Some(Err(Error::Deserialization(e))) => {
            assert_eq!(e.raw_line, "this is not json");
        }
        other => panic!("Expected Deserialization, got {:?}", other.map(|r| r.is_ok())),
    }
    assert!(stream.next_message().await.is_none());
}

async fn probe_report_end_to_end() {
    let body = [
        echo(HELLO),
        echo(RESULT),
        "echo 'overloaded' >&2".to_string(),
        "exit 2".to_string(),
    ]
    .join("\n");
    let cli = FakeCli::new(&body);

    let config = ProbeConfig {
        cli_path: cli.path().to_path_buf(),
        check_version: false,
        ..ProbeConfig::default()
    };
    let agent = ClaudeAgent::new(config.cli_builder()).check_version(false);
    let mut probe = Probe::new(config, Vec::new());
    let outcome = probe.run(&agent).await.unwrap();
    let report = String::from_utf8(probe.into_inner()).unwrap();

    assert_eq!(outcome.messages(), 2);
    assert!(!outcome.is_success());
    assert!(report.contains("Message class: AssistantMessage\n"));
    assert!(report.contains("Message class: ResultMessage\n"));
    assert!(report.contains("Error: Claude CLI exited with status 2: overloaded\n"));
}

async fn stderr_flood_does_not_stall_the_stream() {
    // 2 MB is far beyond any pipe buffer, so the script blocks unless stderr is drained
    let body = [
        "head -c 2097152 /dev/zero | tr '\\0' x >&2".to_string(),
        "echo >&2".to_string(),
        echo(RESULT),
    ]
    .join("\n");
    let cli = FakeCli::new(&body);

    let mut stream = cli.agent().query("hi").await.unwrap();
    let items = tokio::time::timeout(Duration::from_secs(30), collect_all(&mut stream))
        .await
        .expect("stream stalled behind a full stderr pipe");

    assert_eq!(items.len(), 1);
    assert!(items[0].as_ref().unwrap().is_result());
}

async fn version_is_checked_once_per_process() {
    let body = [
        r#"if [ "$1" = "--version" ]; then"#.to_string(),
        r#"  echo called >> "$(dirname "$0")/version-calls""#.to_string(),
        "  echo '2.1.47 (Claude Code)'".to_string(),
        "  exit 0".to_string(),
        "fi".to_string(),
        echo(RESULT),
    ]
    .join("\n");
    let cli = FakeCli::new(&body);
    let agent = ClaudeAgent::new(ClaudeCliBuilder::new().command(cli.path()));

    for _ in 0..2 {
        let mut stream = agent.query("hi").await.unwrap();
        let items = collect_all(&mut stream).await;
        assert!(items.iter().all(|item| item.is_ok()));
    }
    assert_eq!(
        claude_smoke::version::check_claude_version(cli.path()).await,
        Some("2.1.47".to_string())
    );

    let calls = fs::read_to_string(cli.dir().join("version-calls")).unwrap();
    assert_eq!(calls.lines().count(), 1);
}

/// Still running, i.e. neither gone nor a zombie waiting to be reaped
#[cfg(target_os = "linux")]
fn is_running(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .map(|rest| !rest.trim_start().starts_with('Z'))
            .unwrap_or(false),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
async fn dropping_the_stream_kills_the_child() {
    let body = [echo(HELLO), "exec sleep 30".to_string()].join("\n");
    let cli = FakeCli::new(&body);

    let mut stream = cli.agent().query("hi").await.unwrap();
    assert!(stream.next_message().await.unwrap().is_ok());
    let pid = stream.pid().unwrap();
    assert!(stream.is_alive());

    drop(stream);

    let mut waited = Duration::ZERO;
    while is_running(pid) {
        assert!(
            waited < Duration::from_secs(5),
            "child {} still running after drop",
            pid
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        waited += Duration::from_millis(50);
    }
}
