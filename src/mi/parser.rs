use crate::mi::models::{BreakpointInfo, Instruction, MiStatus, RawRegister, StoppedLocation};
use regex::Regex;

pub(crate) fn parse_status(line: &str) -> MiStatus {
    if line.starts_with("^done") {
        MiStatus::Done
    } else if line.starts_with("^running") {
        MiStatus::Running
    } else if line.starts_with("^error") {
        let msg = parse_msg_field(line).unwrap_or_else(|| line.to_string());
        MiStatus::Error(msg)
    } else {
        MiStatus::Other(line.to_string())
    }
}

pub(crate) fn parse_msg_field(s: &str) -> Option<String> {
    parse_field(s, "msg")
}

pub(crate) fn parse_value_field(s: &str) -> Option<String> {
    parse_field(s, "value")
}

/// Extract `key="..."` from an MI record. The key must start a tuple item so
/// that `name` does not match inside `fullname`.
pub(crate) fn parse_field(s: &str, key: &str) -> Option<String> {
    let pattern = format!(r#"(?:^|[,{{\[]){}="((?:\\.|[^"\\])*)""#, regex::escape(key));
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(s).map(|c| unescape_value(&c[1])))
}

pub(crate) fn parse_hex_u64(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}

/// Decode the first `contents="aabb.."` of a `-data-read-memory-bytes` result.
pub(crate) fn parse_memory_contents(
    s: &str,
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(caps) = Regex::new(r#"contents="([0-9a-fA-F]*)""#)?.captures(s) {
        return hex_str_to_bytes(&caps[1]);
    }
    Err("no memory contents found".into())
}

pub(crate) fn hex_str_to_bytes(
    s: &str,
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    if s.len() % 2 != 0 {
        return Err("odd-length hex string in memory contents".into());
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let mut i = 0;
    while i < s.len() {
        let byte = &s[i..i + 2];
        let b = u8::from_str_radix(byte, 16)
            .map_err(|_| format!("invalid hex byte '{}' in memory contents", byte))?;
        out.push(b);
        i += 2;
    }
    Ok(out)
}

pub(crate) fn unescape_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.peek() {
                match *next {
                    '\\' => {
                        out.push('\\');
                        chars.next();
                        continue;
                    }
                    '"' => {
                        out.push('"');
                        chars.next();
                        continue;
                    }
                    'n' => {
                        out.push('\n');
                        chars.next();
                        continue;
                    }
                    't' => {
                        out.push('\t');
                        chars.next();
                        continue;
                    }
                    _ => {}
                }
            }
        }
        out.push(c);
    }
    out
}

pub(crate) fn mi_escape(expr: &str) -> String {
    // Wrap a CLI command or expression in MI quotes.
    let mut out = String::with_capacity(expr.len() + 2);
    out.push('"');
    for ch in expr.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Join the console stream records (`~"..."`) into plain text.
pub(crate) fn console_text(oob: &[String]) -> String {
    let mut out = String::new();
    for line in oob {
        if let Some(body) = line.strip_prefix('~') {
            out.push_str(&unquote_stream(body));
        }
    }
    out
}

/// Output produced by the inferior itself: target stream records and any
/// line that is not an MI record at all.
pub(crate) fn target_output(oob: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for line in oob {
        if let Some(body) = line.strip_prefix('@') {
            out.push(unquote_stream(body).trim_end_matches('\n').to_string());
        } else if !line.starts_with(['~', '&', '*', '=', '^', '+']) {
            out.push(line.clone());
        }
    }
    out
}

fn unquote_stream(body: &str) -> String {
    let inner = body
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(body);
    unescape_value(inner)
}

pub(crate) fn parse_stopped(line: &str) -> StoppedLocation {
    StoppedLocation {
        reason: parse_field(line, "reason"),
        addr: parse_field(line, "addr").and_then(|a| parse_hex_u64(&a)),
        func: parse_field(line, "func"),
        file: parse_field(line, "file"),
        line: parse_field(line, "line").and_then(|l| l.parse::<u32>().ok()),
        arch: parse_field(line, "arch"),
        exit_code: parse_field(line, "exit-code"),
        signal_name: parse_field(line, "signal-name"),
    }
}

pub(crate) fn parse_breakpoint(res: &str) -> BreakpointInfo {
    BreakpointInfo {
        number: parse_field(res, "number")
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(0),
        addr: parse_field(res, "addr"),
        file: parse_field(res, "file"),
        line: parse_field(res, "line").and_then(|l| l.parse::<u32>().ok()),
        func: parse_field(res, "func"),
    }
}

/// Parse the text of `info registers`: one register per line, name first,
/// raw value second. Lines with fewer than two fields are skipped.
pub(crate) fn parse_register_lines(text: &str) -> Vec<RawRegister> {
    let mut regs = Vec::new();
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        regs.push(RawRegister {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    regs
}

/// Parse `asm_insns=[{address=..,func-name=..,offset=..,inst=..},..]`.
pub(crate) fn parse_disassembly(s: &str) -> Vec<Instruction> {
    let mut insns = Vec::new();
    let Ok(block_re) = Regex::new(r#"\{(?:[^{}"]|"(?:\\.|[^"\\])*")*\}"#) else {
        return insns;
    };
    for block in block_re.find_iter(s) {
        let text = block.as_str();
        let Some(address) = parse_field(text, "address").and_then(|a| parse_hex_u64(&a)) else {
            continue;
        };
        let Some(inst) = parse_field(text, "inst") else {
            continue;
        };
        insns.push(Instruction {
            address,
            func: parse_field(text, "func-name"),
            offset: parse_field(text, "offset").and_then(|o| o.parse::<u64>().ok()),
            text: inst,
        });
    }
    insns
}

/// Split inferior text that ended without a newline off the MI record that
/// followed it on the same line. Returns `(prefix, record)`; the prefix is
/// `None` when the line already starts with a record or holds none.
pub(crate) fn split_glued_record(line: &str) -> (Option<&str>, &str) {
    if is_record_start(line) {
        return (None, line);
    }
    let Ok(re) = Regex::new(
        r#"\^(?:done|running|connected|error|exit)(?:,|$)|\*(?:stopped|running)(?:,|$)|=(?:thread|library|breakpoint|inferior|cmd-param|memory|record)[a-z-]*,|[~@&]"|\(gdb\)\s*$"#,
    ) else {
        return (None, line);
    };
    match re.find(line) {
        Some(m) if m.start() > 0 => (Some(&line[..m.start()]), &line[m.start()..]),
        _ => (None, line),
    }
}

fn is_record_start(line: &str) -> bool {
    line.starts_with(['^', '*', '+', '=', '~', '@', '&']) || line.starts_with("(gdb)")
}

/// First non-zero `pid="N"` among `-list-thread-groups` entries.
pub(crate) fn parse_thread_group_pid(s: &str) -> Option<u32> {
    let re = Regex::new(r#"pid="([0-9]+)""#).ok()?;
    let pid = re
        .captures_iter(s)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .find(|pid| *pid != 0);
    pid
}
