/*!
Helpers that send failures through `tracing` before acting on them.

`trace_expect` panics exactly like `expect`, after logging the same message
with `error!`. `trace_warn` logs a recoverable failure with `warn!` and
discards it.
*/

pub trait TraceErrResult<T, E: std::fmt::Debug + std::fmt::Display> {
    /// `expect` the value, logging the failure with `error!` first
    #[track_caller]
    fn trace_expect(self, msg: &str) -> T;

    /// Log a failure with `warn!` and turn the result into an `Option`
    #[track_caller]
    fn trace_warn(self, msg: &str) -> Option<T>;
}

impl<T, E: std::fmt::Debug + std::fmt::Display> TraceErrResult<T, E> for Result<T, E> {
    fn trace_expect(self, msg: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                let caller = std::panic::Location::caller();
                tracing::error!(target: "expect", "{caller}: {msg}: {e}");
                panic!("{msg}: {e:?}")
            }
        }
    }

    fn trace_warn(self, msg: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{msg}: {e}");
                None
            }
        }
    }
}

pub trait TraceErrOption<T> {
    /// `expect` the value, logging its absence with `error!` first
    #[track_caller]
    fn trace_expect(self, msg: &str) -> T;
}

impl<T> TraceErrOption<T> for Option<T> {
    fn trace_expect(self, msg: &str) -> T {
        match self {
            Some(v) => v,
            None => {
                let caller = std::panic::Location::caller();
                tracing::error!(target: "expect", "{caller}: {msg}");
                panic!("{msg}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn passes_values_through() {
        init();
        assert_eq!(Ok::<_, String>(3).trace_expect("three"), 3);
        assert_eq!(Some(4).trace_expect("four"), 4);
        assert_eq!(Ok::<_, String>(5).trace_warn("five"), Some(5));
        assert_eq!(Err::<u8, _>("bad".to_string()).trace_warn("six"), None);
    }

    #[test]
    #[should_panic(expected = "lock poisoned")]
    fn panics_on_error() {
        init();
        Err::<(), _>("boom".to_string()).trace_expect("lock poisoned");
    }

    #[test]
    #[should_panic(expected = "missing")]
    fn panics_on_none() {
        init();
        None::<()>.trace_expect("missing");
    }
}
