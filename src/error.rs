use thiserror::Error;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please wait a moment.";
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to search flights. Please try again.";
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";

#[derive(Debug, Error)]
pub enum FlightError {
    #[error(
        "request timed out — the flight API may be slow or unreachable. \
         Try increasing --timeout or check your connection"
    )]
    Timeout,

    #[error("connection failed — check your internet connection ({0})")]
    ConnectionFailed(String),

    #[error("DNS resolution failed — check your internet connection ({0})")]
    DnsResolution(String),

    #[error("proxy error — check your --proxy URL is correct ({0})")]
    ProxyError(String),

    #[error("TLS/SSL error — connection to the flight API failed ({0})")]
    TlsError(String),

    #[error("rate limited by the flight API (HTTP 429) — wait a moment before retrying")]
    RateLimited,

    #[error("request rejected by the flight API (HTTP {0}) — check RAPIDAPI_KEY")]
    Unauthorized(u16),

    #[error("unexpected HTTP status {0} from the flight API")]
    HttpStatus(u16),

    #[error("flight API reported an error: {0}")]
    Provider(String),

    #[error("failed to decode flight API response — {0}")]
    Decode(String),

    #[error("invalid date \"{0}\" — must be YYYY-MM-DD format (e.g. 2026-03-01)")]
    InvalidDate(String),

    #[error("{0}")]
    Validation(String),

    #[error("RAPIDAPI_KEY is not set — export it or pass --api-key")]
    MissingApiKey,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FlightError {
    /// Short message suitable for showing to the person searching.
    ///
    /// Rate limiting gets its own wording; validation errors pass through;
    /// everything else collapses to a generic "try again".
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
            Self::Validation(_) | Self::InvalidDate(_) => self.to_string(),
            _ => SEARCH_FAILED_MESSAGE.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidDate(_) | Self::MissingApiKey | Self::Config(_)
        )
    }
}

pub fn from_http_error(err: wreq::Error) -> FlightError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if err.is_timeout() {
        return FlightError::Timeout;
    }

    if err.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("getaddrinfo") {
            return FlightError::DnsResolution(msg);
        }
        return FlightError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return FlightError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return FlightError::TlsError(msg);
    }

    if lower.contains("builder error") && lower.contains("uri") {
        return FlightError::ProxyError(msg);
    }

    FlightError::ConnectionFailed(msg)
}

/// Maps a non-success HTTP status to the matching error, `None` for success.
pub fn from_status(status: u16) -> Option<FlightError> {
    match status {
        200..=299 => None,
        429 => Some(FlightError::RateLimited),
        401 | 403 => Some(FlightError::Unauthorized(status)),
        _ if status >= 400 => Some(FlightError::HttpStatus(status)),
        _ => None,
    }
}
