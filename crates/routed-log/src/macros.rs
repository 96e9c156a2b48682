//! Convenience macros for structured logging

/// Build a list of [`Field`](crate::Field)s from `key => value` pairs.
///
/// Values go through `serde_json::json!`, so anything serializable works.
///
/// ```rust
/// let fields = routed_log::fields! { "port" => 8080, "tls" => true };
/// assert_eq!(fields[0].0, "port");
/// assert_eq!(fields[1].1, true);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        ::std::vec::Vec::<$crate::Field>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$((
            ::std::string::String::from($key),
            $crate::__private::json!($value),
        )),+]
    };
}

/// Log an error through a [`Logger`](crate::Logger) and return it
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $err:expr, $msg:expr) => {{
        let e = $err;
        $logger.error_cause(&e, $msg, &[]);
        e
    }};
    ($logger:expr, $err:expr, $msg:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let e = $err;
        $logger.error_cause(&e, $msg, &$crate::fields!($($key => $value),+));
        e
    }};
}
