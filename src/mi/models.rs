pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoppedLocation {
    pub reason: Option<String>,
    pub addr: Option<u64>,
    pub func: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub arch: Option<String>,
    pub exit_code: Option<String>,
    pub signal_name: Option<String>,
}

impl StoppedLocation {
    /// The inferior is gone; there is no frame to inspect.
    pub fn is_exit(&self) -> bool {
        self.reason
            .as_deref()
            .map(|r| r.starts_with("exited"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct BreakpointInfo {
    pub number: u32,
    pub addr: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub func: Option<String>,
}

/// One `name value [natural]` line of `info registers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRegister {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub address: u64,
    pub func: Option<String>,
    pub offset: Option<u64>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct MemoryBlock {
    pub address: u64,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MiResponse {
    pub status: MiStatus,
    pub result: String,
    pub oob: Vec<String>,
}

impl MiResponse {
    /// The async `*stopped` record that arrived with this response, if any.
    pub fn stopped_record(&self) -> Option<&str> {
        self.oob
            .iter()
            .find(|l| l.starts_with("*stopped"))
            .map(|s| s.as_str())
    }

    pub fn resumed(&self) -> bool {
        matches!(self.status, MiStatus::Running) || self.oob.iter().any(|l| l.starts_with("*running"))
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiStatus {
    Done,
    Running,
    Error(String),
    Other(String),
}
