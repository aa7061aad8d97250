//! JSON output formatting

use anyhow::Result;
use serde::Serialize;

pub struct JsonFormatter;

impl JsonFormatter {
    /// Print `value` as pretty JSON
    pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        println!("{json}");
        Ok(())
    }

    /// Print each item as one line of compact JSON
    pub fn print_lines<'a, T, I>(items: I) -> Result<()>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for item in items {
            println!("{}", serde_json::to_string(item)?);
        }
        Ok(())
    }
}
