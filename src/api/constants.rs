//! HTTP-level constants

/// Response header carrying the per-request UUID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Query flag set on QR-code links
pub const QR_QUERY_FLAG: &str = "qr";

/// Referer value recorded when the click has none
pub const DIRECT_REFERER: &str = "(direct)";
