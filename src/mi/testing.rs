//! Scripted stand-ins for gdb, driven through the real `MiSession`.

use crate::mi::MiSession;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

const PRELUDE: &str = r#"#!/bin/sh
say() { printf '%s\n' "$1"; }
say '=thread-group-added,id="i1"'
say '(gdb)'
while IFS= read -r line; do
  case "$line" in
"#;

const EPILOGUE: &str = r#"    -gdb-exit*) say '^exit'; exit 0 ;;
    *) say '^done'; say '(gdb)' ;;
  esac
done
"#;

/// Start a session on a shell script that answers with the `case` arms in
/// `arms`; anything else gets a bare `^done`.
pub fn fake_session(arms: &str) -> MiSession {
    let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "strongdb-fake-gdb-{}-{}.sh",
        std::process::id(),
        id
    ));
    fs::write(&path, format!("{}{}{}", PRELUDE, arms, EPILOGUE)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    let gdb = path.to_string_lossy().into_owned();

    // A fork in a sibling test thread can hold the script open for a moment.
    let mut attempts = 0;
    let mut session = loop {
        match MiSession::start(&gdb, "prog", &[], false) {
            Ok(s) => break s,
            Err(e) if e.to_string().contains("Text file busy") && attempts < 40 => {
                attempts += 1;
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(e) => panic!("cannot start {}: {}", gdb, e),
        }
    };
    session.drain_initial_output().unwrap();
    session
}
