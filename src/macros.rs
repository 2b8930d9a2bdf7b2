//! Convenience macros.

/// Build a [`Params`](crate::Params) set from `key => value` pairs.
///
/// ```rust,ignore
/// let p = params! {
///     "fields" => "id,name",
///     "limit" => 10i64,
/// };
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $(params.insert($key, $value);)+
        params
    }};
}
