#![forbid(unsafe_code)]

//! Error model for the trip-selection core.
//!
//! # Design Principles
//!
//! 1. **Result everywhere** — no panics in handler paths.
//! 2. **Domain-specific errors** — each seam has its own typed error so
//!    callers can match on what matters and let the rest propagate.
//! 3. **Two dispositions only** — configuration and view-binding failures
//!    abort startup with a typed error; everything reachable from a UI
//!    handler is logged and dropped so one failed handler never takes the
//!    page down or leaves the state machine mid-transition.
//! 4. **Observability** — errors carry enough context for tracing fields and
//!    the diagnostics ring without depending on tracing themselves.

use std::fmt;

// ── Domain-Specific Error Types ─────────────────────────────────────────

/// Page-seed parsing and validation errors (startup only).
#[derive(Debug)]
pub enum ConfigError {
    /// The seed JSON could not be decoded.
    Parse(serde_json::Error),
    /// An injected route had fewer than two coordinates.
    RouteTooShort { points: usize },
    /// An injected route contained a non-finite coordinate.
    RouteNotFinite { index: usize },
    /// Initial zoom outside the surface's usable range.
    InvalidZoom { zoom: u8 },
    /// Initial map center was NaN or infinite.
    CenterNotFinite,
    /// Results wait budget outside the accepted range.
    InvalidWaitBudget { ms: u64 },
}

/// View-binding resolution errors (startup only).
#[derive(Debug)]
pub enum BindingError {
    /// No document to resolve against (headless host or detached frame).
    NoDocument,
    /// One or more required element ids were absent. Collected in one pass so
    /// the embedder sees the full list instead of the first casualty.
    MissingElements(Vec<&'static str>),
}

/// Runtime host-page access errors.
#[derive(Debug)]
pub enum PageError {
    /// An element that existed at startup is no longer reachable.
    ElementGone(&'static str),
    /// Reading a field value failed.
    ReadFailed(&'static str),
    /// Writing a value, class, or style failed.
    WriteFailed(&'static str),
}

/// Map-surface operation errors.
#[derive(Debug)]
pub enum SurfaceError {
    /// A marker handle refers to a marker the surface no longer holds.
    MarkerNotFound { id: u32 },
    /// A path handle refers to a path the surface no longer holds.
    PathNotFound { id: u32 },
    /// An overlay handle refers to an overlay the surface no longer holds.
    OverlayNotFound { id: u32 },
    /// The underlying mapping library rejected the operation.
    Backend(String),
}

/// Route-geometry validation errors (runtime route application).
#[derive(Debug)]
pub enum GeometryError {
    /// A route needs at least two coordinates.
    TooFewPoints { count: usize },
    /// A coordinate was NaN or infinite.
    NotFinite { index: usize },
}

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for the interaction core.
///
/// Each variant wraps a domain-specific error. Use [`Error::disposition`] to
/// determine whether the error aborts startup or is logged and dropped.
#[derive(Debug)]
pub enum Error {
    /// Page-seed parsing or validation failure.
    Config(ConfigError),
    /// View-binding resolution failure.
    Binding(BindingError),
    /// Runtime host-page access failure.
    Page(PageError),
    /// Map-surface operation failure.
    Surface(SurfaceError),
    /// Route-geometry validation failure.
    Geometry(GeometryError),
}

/// Standard result type for core APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Disposition ─────────────────────────────────────────────────────────

/// What the app should do when an error occurs.
///
/// Handler entry points inspect this to decide between surfacing the error
/// to the embedder (startup only) and the fail-silently path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Surface the error from `init`; the page cannot operate.
    AbortInit,
    /// Log, record in the diagnostics ring, and continue. The triggering
    /// handler returns normally with state unchanged or partially applied.
    LogAndContinue,
}

impl Error {
    /// Determine the disposition for this error.
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::Config(_) | Self::Binding(_) => Disposition::AbortInit,
            Self::Page(_) | Self::Surface(_) | Self::Geometry(_) => Disposition::LogAndContinue,
        }
    }

    /// Error type label for tracing fields and diagnostics records.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Binding(_) => "binding",
            Self::Page(_) => "page",
            Self::Surface(_) => "surface",
            Self::Geometry(_) => "geometry",
        }
    }

    /// Whether the error is survivable after startup.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.disposition() == Disposition::LogAndContinue
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "seed parse: {err}"),
            Self::RouteTooShort { points } => {
                write!(f, "seed route needs >= 2 points, got {points}")
            }
            Self::RouteNotFinite { index } => {
                write!(f, "seed route coordinate {index} is not finite")
            }
            Self::InvalidZoom { zoom } => write!(f, "invalid initial zoom: {zoom}"),
            Self::CenterNotFinite => write!(f, "initial map center is not finite"),
            Self::InvalidWaitBudget { ms } => write!(f, "invalid results wait budget: {ms}ms"),
        }
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDocument => write!(f, "no document available for binding resolution"),
            Self::MissingElements(ids) => {
                write!(f, "missing required elements: {}", ids.join(", "))
            }
        }
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementGone(id) => write!(f, "element '{id}' disappeared"),
            Self::ReadFailed(id) => write!(f, "read of '{id}' failed"),
            Self::WriteFailed(id) => write!(f, "write to '{id}' failed"),
        }
    }
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkerNotFound { id } => write!(f, "marker {id} not found"),
            Self::PathNotFound { id } => write!(f, "path {id} not found"),
            Self::OverlayNotFound { id } => write!(f, "overlay {id} not found"),
            Self::Backend(msg) => write!(f, "map backend: {msg}"),
        }
    }
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewPoints { count } => {
                write!(f, "route needs >= 2 points, got {count}")
            }
            Self::NotFinite { index } => write!(f, "route coordinate {index} is not finite"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Binding(err) => write!(f, "{err}"),
            Self::Page(err) => write!(f, "{err}"),
            Self::Surface(err) => write!(f, "{err}"),
            Self::Geometry(err) => write!(f, "{err}"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for BindingError {}
impl std::error::Error for PageError {}
impl std::error::Error for SurfaceError {}
impl std::error::Error for GeometryError {}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Binding(err) => Some(err),
            Self::Page(err) => Some(err),
            Self::Surface(err) => Some(err),
            Self::Geometry(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<BindingError> for Error {
    fn from(err: BindingError) -> Self {
        Self::Binding(err)
    }
}

impl From<PageError> for Error {
    fn from(err: PageError) -> Self {
        Self::Page(err)
    }
}

impl From<SurfaceError> for Error {
    fn from(err: SurfaceError) -> Self {
        Self::Surface(err)
    }
}

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use super::*;

    // ── ConfigError ─────────────────────────────────────────────────

    #[test]
    fn config_parse_keeps_source() {
        let bad: std::result::Result<i32, _> = serde_json::from_str("not json");
        let err = ConfigError::from(bad.expect_err("must fail"));
        assert!(StdError::source(&err).is_some());
        assert!(format!("{err}").starts_with("seed parse:"));
    }

    #[test]
    fn config_route_too_short() {
        let err = ConfigError::RouteTooShort { points: 1 };
        assert!(format!("{err}").contains("got 1"));
        assert!(StdError::source(&err).is_none());
    }

    #[test]
    fn config_aborts_init() {
        let err = Error::from(ConfigError::InvalidZoom { zoom: 40 });
        assert_eq!(err.disposition(), Disposition::AbortInit);
        assert!(!err.is_recoverable());
        assert_eq!(err.error_type(), "config");
    }

    // ── BindingError ────────────────────────────────────────────────

    #[test]
    fn binding_lists_every_missing_id() {
        let err = BindingError::MissingElements(vec!["pickup_lat", "hour"]);
        let text = format!("{err}");
        assert!(text.contains("pickup_lat"));
        assert!(text.contains("hour"));
    }

    #[test]
    fn binding_aborts_init() {
        let err = Error::from(BindingError::NoDocument);
        assert_eq!(err.disposition(), Disposition::AbortInit);
        assert_eq!(err.error_type(), "binding");
    }

    // ── Runtime families log and continue ───────────────────────────

    #[test]
    fn page_errors_continue() {
        let err = Error::from(PageError::ElementGone("results-section"));
        assert_eq!(err.disposition(), Disposition::LogAndContinue);
        assert!(err.is_recoverable());
        assert_eq!(err.error_type(), "page");
    }

    #[test]
    fn surface_errors_continue() {
        let err = Error::from(SurfaceError::MarkerNotFound { id: 7 });
        assert_eq!(err.disposition(), Disposition::LogAndContinue);
        assert!(format!("{err}").contains('7'));
        assert_eq!(err.error_type(), "surface");
    }

    #[test]
    fn geometry_errors_continue() {
        let err = Error::from(GeometryError::TooFewPoints { count: 0 });
        assert_eq!(err.disposition(), Disposition::LogAndContinue);
        assert_eq!(err.error_type(), "geometry");
    }

    #[test]
    fn error_type_labels_are_distinct() {
        let labels = [
            Error::from(ConfigError::InvalidZoom { zoom: 0 }).error_type(),
            Error::from(BindingError::NoDocument).error_type(),
            Error::from(PageError::ReadFailed("date")).error_type(),
            Error::from(SurfaceError::Backend(String::from("boom"))).error_type(),
            Error::from(GeometryError::NotFinite { index: 2 }).error_type(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in labels.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn unified_error_exposes_source() {
        let err = Error::from(SurfaceError::Backend(String::from("tile host down")));
        let source = StdError::source(&err).expect("surface source");
        assert!(format!("{source}").contains("tile host down"));
    }
}
