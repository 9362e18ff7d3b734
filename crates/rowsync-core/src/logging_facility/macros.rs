//! Canonical logging macros
//!
//! Every operation boundary logs through these, so field names stay uniform
//! across the workspace.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use rowsync_core::log_op_start;
/// log_op_start!("initial_load");
/// log_op_start!("end_changes", txn_id = "t123");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowsync_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowsync_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use rowsync_core::log_op_end;
/// log_op_end!("initial_load", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowsync_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = rowsync_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```ignore
/// # use rowsync_core::{log_op_error, errors::RowSyncError};
/// let err = RowSyncError::NoOpenTransaction { op: "end".to_string() };
/// log_op_error!("end_changes", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::RowSyncError;
        let sync_err: RowSyncError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = rowsync_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?sync_err.kind(),
            err_code = sync_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::RowSyncError;
        let sync_err: RowSyncError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = rowsync_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?sync_err.kind(),
            err_code = sync_err.code(),
            $($field)*
        );
    }};
}
