use crate::grammar::Symbol;
use std::fmt;

pub fn display_fn(f: impl Fn(&mut fmt::Formatter<'_>) -> fmt::Result) -> impl fmt::Display {
    DisplayFn(f)
}

struct DisplayFn<F>(F);
impl<F> fmt::Display for DisplayFn<F>
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0)(formatter)
    }
}

/// Write a production body, optionally with the marker placed before `marker`.
///
/// An empty body is rendered as `ε`.
pub(crate) fn write_body(
    f: &mut fmt::Formatter<'_>,
    body: &[Symbol],
    marker: Option<usize>,
) -> fmt::Result {
    if body.is_empty() {
        return match marker {
            Some(_) => f.write_str(". ε"),
            None => f.write_str("ε"),
        };
    }
    for (i, symbol) in body.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        if marker == Some(i) {
            f.write_str(". ")?;
        }
        write!(f, "{}", symbol)?;
    }
    if marker == Some(body.len()) {
        f.write_str(" .")?;
    }
    Ok(())
}
