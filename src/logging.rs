//! Library-level tracing that vanishes without the `logging` feature.
//!
//! Store and transfer code log through these names. With `logging` enabled
//! they are tracing's own macros; without it every call expands to nothing
//! and the crate carries no tracing dependency.
//!
//! ```rust,ignore
//! use crate::logging::{debug, warn};
//!
//! debug!(entries = document.len(), "importing document");
//! warn!(key = %key, applied = imported, "import aborted");
//! ```

#[cfg(feature = "logging")]
pub(crate) use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "logging"))]
mod disabled {
    macro_rules! swallow {
        ($($arg:tt)*) => {};
    }

    pub(crate) use swallow as debug;
    pub(crate) use swallow as error;
    pub(crate) use swallow as info;
    pub(crate) use swallow as trace;
    pub(crate) use swallow as warn;
}

#[cfg(not(feature = "logging"))]
pub(crate) use disabled::{debug, error, info, trace, warn};
