/// Rejects an argument unless `expr` holds, returning early with an
/// `InvalidArgument` error that quotes the failed condition.
///
/// ```
/// fn bounds(min: u32, max: u32) -> concord_common::Result<()> {
///     concord_common::verify_arg!(min, min <= max);
///     Ok(())
/// }
/// assert!(bounds(1, 2).is_ok());
/// assert_eq!(
///     bounds(3, 2).unwrap_err().to_string(),
///     "invalid argument min: expected min <= max"
/// );
/// ```
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

/// Macro for handling `Result<T, E>` in functions that return `Option<Result<T, E>>`.
///
/// - If `expr` evaluates to `Ok(t)`, the macro yields `t`.
/// - If `expr` evaluates to `Err(e)`, the macro causes the enclosing function to
///   return `Some(Err(e))`.
///
/// Used inside `next()` of iterators over fallible cursors, such as the hit
/// iterator of a span cursor.
#[macro_export]
macro_rules! try_or_ret_some_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(err) => {
                return Some(Err(err));
            }
        }
    };
}
