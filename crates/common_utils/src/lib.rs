#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::expect_used,
    clippy::missing_panics_doc,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unreachable,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR" ), "/", "README.md"))]

pub mod consts;
pub mod errors;
pub mod ext_traits;
pub mod types;

/// Date-time utilities.
pub mod date_time {
    use time::{
        format_description::FormatItem, macros::format_description, OffsetDateTime,
        PrimitiveDateTime,
    };

    /// `YYYY-MM-DD HH:MM:SS`, the layout MySQL uses for `DATETIME` columns.
    const SQL_DATE_TIME: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    /// Create a new [`PrimitiveDateTime`] with the current date and time in UTC.
    pub fn now() -> PrimitiveDateTime {
        let utc_date_time = OffsetDateTime::now_utc();
        PrimitiveDateTime::new(utc_date_time.date(), utc_date_time.time())
    }

    /// The current calendar year in UTC.
    pub fn current_year() -> i32 {
        now().year()
    }

    /// Format a timestamp as `YYYY-MM-DD HH:MM:SS`.
    pub fn format_sql(date_time: PrimitiveDateTime) -> Result<String, time::error::Format> {
        date_time.format(&SQL_DATE_TIME)
    }
}

/// Functional programming helpers.
pub mod fp_utils {
    /// Run `f` only when `predicate` holds, otherwise succeed with `()`.
    pub fn when<E, F>(predicate: bool, f: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<(), E>,
    {
        if predicate {
            f()
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use time::macros::datetime;

    use super::*;

    #[test]
    fn sql_format_pads_every_component() {
        let formatted = date_time::format_sql(datetime!(2030-01-02 03:04:05)).unwrap();
        assert_eq!(formatted, "2030-01-02 03:04:05");
    }

    #[test]
    fn when_only_runs_closure_on_true() {
        let skipped: Result<(), &str> = fp_utils::when(false, || Err("ran"));
        assert!(skipped.is_ok());

        let ran: Result<(), &str> = fp_utils::when(true, || Err("ran"));
        assert_eq!(ran, Err("ran"));
    }
}
