/// Classification of an HTTP status for the registry retry loop.
///
/// # Behavior Summary
///
/// | Class | Retry? | Result at this tier |
/// |-------|--------|---------------------|
/// | `Success` | No | Parsed payload |
/// | `WithBackoff` | Yes, until the attempt budget is spent | Empty once exhausted |
/// | `Never` | No | Empty |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// 2xx response, parse the body.
    Success,

    /// Transient upstream condition: 429, 502, 503 or 504.
    /// Wait for the next backoff delay and try again.
    WithBackoff,

    /// Any other status. Retrying will not help.
    Never,
}

/// Status codes the registry uses for throttling and transient outages.
pub const RETRYABLE_STATUS_CODES: [u16; 4] = [429, 502, 503, 504];

impl RetryClass {
    /// Classify an HTTP status code.
    pub fn for_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            Self::Success
        } else if RETRYABLE_STATUS_CODES.contains(&status) {
            Self::WithBackoff
        } else {
            Self::Never
        }
    }
}
