use std::fmt;

pub const USAGE: &str = "usage: strongdb [--verbose|-v] [--gdb <gdb-path>] [--log <file>] [--width <cols>] \
[--stack-bytes <n>] [--break <loc>] [--tty <path>] [--no-start] [--no-color] [--tui] <target> [args]";

const DEFAULT_STACK_BYTES: usize = 48;
const DEFAULT_LOG_FILE: &str = "strongdb.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub gdb_bin: String,
    pub target: String,
    pub target_args: Vec<String>,
    pub verbose: bool,
    pub log_path: String,
    /// Fixed terminal width; `None` means ask the terminal.
    pub width: Option<u16>,
    pub stack_bytes: usize,
    pub start_location: String,
    pub auto_start: bool,
    pub color: bool,
    pub tui: bool,
    /// Terminal for the inferior's stdio; `None` picks one per mode.
    pub tty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.0, USAGE)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Parse CLI arguments; `env` supplies fallbacks for unset flags.
    pub fn parse<I, F>(args: I, env: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut gdb_bin = env("GDB").unwrap_or_else(|| "gdb".to_string());
        let mut verbose = env("STRONGDB_VERBOSE").is_some_and(|v| is_truthy(&v));
        let mut log_path = env("STRONGDB_LOG").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
        let mut width = match env("STRONGDB_WIDTH") {
            Some(v) => Some(parse_width(&v)?),
            None => None,
        };
        let mut stack_bytes = match env("STRONGDB_STACK_BYTES") {
            Some(v) => parse_stack_bytes(&v)?,
            None => DEFAULT_STACK_BYTES,
        };
        let mut color = env("NO_COLOR").map_or(true, |v| v.is_empty());
        let mut start_location = "main".to_string();
        let mut auto_start = true;
        let mut tui = false;
        let mut tty = env("STRONGDB_TTY").filter(|v| !v.is_empty());
        let mut target: Option<String> = None;
        let mut target_args = Vec::new();

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--gdb" => gdb_bin = flag_value(&mut iter, "--gdb")?,
                "--log" => log_path = flag_value(&mut iter, "--log")?,
                "--width" => width = Some(parse_width(&flag_value(&mut iter, "--width")?)?),
                "--stack-bytes" => {
                    stack_bytes = parse_stack_bytes(&flag_value(&mut iter, "--stack-bytes")?)?
                }
                "--break" => start_location = flag_value(&mut iter, "--break")?,
                "--tty" => tty = Some(flag_value(&mut iter, "--tty")?),
                "--verbose" | "-v" => verbose = true,
                "--no-start" => auto_start = false,
                "--no-color" => color = false,
                "--tui" => tui = true,
                _ if arg.starts_with("--") => {
                    return Err(ConfigError(format!("unknown option: {}", arg)));
                }
                _ => {
                    target = Some(arg);
                    target_args.extend(iter);
                    break;
                }
            }
        }

        let target = target.ok_or_else(|| ConfigError("missing target".to_string()))?;
        Ok(Config {
            gdb_bin,
            target,
            target_args,
            verbose,
            log_path,
            width,
            stack_bytes,
            start_location,
            auto_start,
            color,
            tui,
            tty,
        })
    }
}

fn flag_value<I: Iterator<Item = String>>(iter: &mut I, flag: &str) -> Result<String, ConfigError> {
    iter.next()
        .ok_or_else(|| ConfigError(format!("{} needs a value", flag)))
}

fn parse_width(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(w) if w > 0 => Ok(w),
        _ => Err(ConfigError(format!("invalid width: {}", raw))),
    }
}

fn parse_stack_bytes(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError(format!("invalid stack byte count: {}", raw))),
    }
}

fn is_truthy(v: &str) -> bool {
    !matches!(v.trim(), "" | "0" | "false" | "no" | "off")
}
