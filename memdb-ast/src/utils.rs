use core::fmt;

pub(crate) struct DisplaySeparated<'a, T>
where
    T: fmt::Display,
{
    slice: &'a [T],
    sep: &'static str,
}

impl<'a, T: fmt::Display> fmt::Display for DisplaySeparated<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut delim = "";
        for item in self.slice {
            write!(f, "{}{}", delim, item)?;
            delim = self.sep;
        }
        Ok(())
    }
}

pub(crate) fn display_separated<'a, T: fmt::Display>(
    slice: &'a [T],
    sep: &'static str,
) -> DisplaySeparated<'a, T> {
    DisplaySeparated { slice, sep }
}

pub(crate) fn display_comma_separated<T: fmt::Display>(slice: &[T]) -> DisplaySeparated<'_, T> {
    DisplaySeparated { slice, sep: ", " }
}

pub(crate) fn escape_single_quote_string(s: &str) -> String {
    s.replace('\'', "''")
}
