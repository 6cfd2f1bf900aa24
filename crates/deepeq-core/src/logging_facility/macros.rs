//! Canonical logging macros
//!
//! Every event carries `component`, `op` and `event` fields using the names
//! from `deepeq_core_types::schema`. Extra fields follow the usual `tracing`
//! field syntax (`name = value`, `name = %display`, `name = ?debug`).

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use deepeq_core::log_op_start;
/// log_op_start!("compare");
/// log_op_start!("compare", type_name = "Person");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = deepeq_core_types::schema::EVENT_START,
            $($($field)*)?
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use deepeq_core::log_op_end;
/// log_op_end!("compare", duration_ms = 3u64, differences = 2u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = deepeq_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        );
    };
}

/// Log an operation error
///
/// `$err` is anything convertible into `ExError`. The event carries the
/// error kind and code plus the field path and runtime type the error was
/// raised for (empty when the error has none).
///
/// # Example
///
/// ```
/// # use deepeq_core::{log_op_error, errors::DeepEqError};
/// let err = DeepEqError::UnknownComparedField {
///     field: "home.zip".to_string(),
///     member: "zip".to_string(),
///     type_name: "Home".to_string(),
/// };
/// log_op_error!("compare", err, duration_ms = 0u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = deepeq_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            path = ex_err.path().unwrap_or(""),
            type_name = ex_err.type_name().unwrap_or(""),
            $($($field)*)?
        );
    }};
}
