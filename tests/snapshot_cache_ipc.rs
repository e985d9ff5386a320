use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar(cache_ttl_secs: u64) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_pulsecheckd");
    let mut child = Command::new(exe)
        .env_remove("PULSECHECK_WORKSPACE")
        .env("PULSECHECK_ACCESS_CODE", "lucky")
        .env("PULSECHECK_TEST_ACCESS_CODE", "testenv")
        .env("PULSECHECK_CACHE_TTL_SECS", cache_ttl_secs.to_string())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn pulsecheckd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn open(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &std::path::Path,
) {
    let _ = request_ok(
        stdin,
        reader,
        "open-1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(stdin, reader, "open-2", "session.unlock", json!({ "code": "lucky" }));
}

fn student_names(result: &serde_json::Value) -> Vec<String> {
    result["students"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|s| s["name"].as_str().map(|n| n.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}


#[test]
fn cached_snapshot_is_stale_until_invalidated() {
    let workspace = temp_dir("pulsecheck-cache");
    let (mut reader_child, mut a_in, mut a_out) = spawn_sidecar(300);
    let (mut writer_child, mut b_in, mut b_out) = spawn_sidecar(300);
    open(&mut a_in, &mut a_out, &workspace);
    open(&mut b_in, &mut b_out, &workspace);

    let before = request_ok(&mut a_in, &mut a_out, "1", "students.list", json!({}));
    assert!(student_names(&before).is_empty());

    let _ = request_ok(
        &mut b_in,
        &mut b_out,
        "2",
        "students.register",
        json!({ "name": "Ada", "date": "2024-03-01" }),
    );

    let stale = request_ok(&mut a_in, &mut a_out, "3", "students.list", json!({}));
    assert!(student_names(&stale).is_empty());

    let _ = request_ok(&mut a_in, &mut a_out, "4", "cache.invalidate", json!({}));
    let fresh = request_ok(&mut a_in, &mut a_out, "5", "students.list", json!({}));
    assert_eq!(student_names(&fresh), vec!["Ada"]);

    // Mutations bypass the cache, so the other writer's row is kept.
    let _ = request_ok(
        &mut b_in,
        &mut b_out,
        "6",
        "students.register",
        json!({ "name": "Bo", "date": "2024-03-01" }),
    );
    let cy = request_ok(
        &mut a_in,
        &mut a_out,
        "7",
        "students.register",
        json!({ "name": "Cy", "date": "2024-03-02" }),
    );
    assert_eq!(cy["student"]["id"], 3);
    let after = request_ok(&mut a_in, &mut a_out, "8", "students.list", json!({}));
    assert_eq!(student_names(&after), vec!["Ada", "Bo", "Cy"]);

    drop(a_in);
    drop(b_in);
    let _ = reader_child.wait();
    let _ = writer_child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn zero_ttl_reads_through() {
    let workspace = temp_dir("pulsecheck-cache-zero");
    let (mut reader_child, mut a_in, mut a_out) = spawn_sidecar(0);
    let (mut writer_child, mut b_in, mut b_out) = spawn_sidecar(0);
    open(&mut a_in, &mut a_out, &workspace);
    open(&mut b_in, &mut b_out, &workspace);

    let _ = request_ok(&mut a_in, &mut a_out, "1", "students.list", json!({}));
    let _ = request_ok(
        &mut b_in,
        &mut b_out,
        "2",
        "students.register",
        json!({ "name": "Ada", "date": "2024-03-01" }),
    );
    let seen = request_ok(&mut a_in, &mut a_out, "3", "students.list", json!({}));
    assert_eq!(student_names(&seen), vec!["Ada"]);

    drop(a_in);
    drop(b_in);
    let _ = reader_child.wait();
    let _ = writer_child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
