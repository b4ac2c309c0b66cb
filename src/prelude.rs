// Internal logging facade.
// `debug!`, `info!` and `warn!` resolve to `tracing`, `log`, or a no-op
// depending on enabled features.

pub(crate) use crate::observability::{log_debug as debug, log_info as info, log_warn as warn};
