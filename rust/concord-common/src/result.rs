pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Backs [`verify_arg!`](crate::verify_arg): turns a failed construction-time
/// check into an `InvalidArgument` error naming the argument and the condition.
#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: format!("expected {condition}"),
    }
    .into())
}
