//! Canonical logging macros
//!
//! Callers must depend on `hqw-core-types`, which holds the event names.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use hqw_core::log_op_start;
/// log_op_start!("checkout_batch");
/// log_op_start!("checkout_batch", batch_number = 3);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = hqw_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = hqw_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use hqw_core::log_op_end;
/// log_op_end!("checkout_batch", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = hqw_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = hqw_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```
/// # use hqw_core::log_op_error;
/// # use hqw_core::errors::WarehouseError;
/// let err = WarehouseError::BatchNotFound { batch_number: 999 };
/// log_op_error!("checkout_batch", err, duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let hq_err: $crate::errors::HqError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = hqw_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?hq_err.kind(),
            err_code = hq_err.code(),
            err_message = hq_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let hq_err: $crate::errors::HqError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = hqw_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?hq_err.kind(),
            err_code = hq_err.code(),
            err_message = hq_err.message(),
            $($field)*
        );
    }};
}
