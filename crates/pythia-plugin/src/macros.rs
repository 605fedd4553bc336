//! Convenience macros for building dispatch arguments and patches.

/// Macro for quickly building `HookArgs`.
///
/// # Example
/// ```rust,ignore
/// let args = hook_args! {
///     "full_config" => config.to_value()?,
///     "pixel" => json!({"lat": 9.5, "lng": 38.2}),
/// };
/// ```
#[macro_export]
macro_rules! hook_args {
    () => {
        $crate::hooks::definitions::HookArgs::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut args = $crate::hooks::definitions::HookArgs::new();
        $(
            args.insert($key, $value);
        )+
        args
    }};
}

/// Macro for quickly building a `HookPatch`.
///
/// # Example
/// ```rust,ignore
/// Ok(Some(hook_patch! { "full_config" => updated }))
/// ```
#[macro_export]
macro_rules! hook_patch {
    () => {
        $crate::hooks::definitions::HookPatch::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut patch = $crate::hooks::definitions::HookPatch::new();
        $(
            patch.insert($key, $value);
        )+
        patch
    }};
}
