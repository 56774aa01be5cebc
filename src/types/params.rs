use crate::types::SqlValue;

/// Parameters bound to a statement or procedure call.
///
/// Positional parameters fill `?` placeholders in order. Named parameters
/// fill `:name` placeholders.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    #[default]
    Empty,
    Positional(Vec<SqlValue>),
    Named(Vec<(String, SqlValue)>),
}

impl Params {
    /// Build positional parameters from anything convertible to `SqlValue`.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Build named parameters from `(name, value)` pairs.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SqlValue>,
    {
        Params::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Number of bound values.
    pub fn len(&self) -> usize {
        match self {
            Params::Empty => 0,
            Params::Positional(values) => values.len(),
            Params::Named(pairs) => pairs.len(),
        }
    }

    /// Returns true if there is nothing to bind.
    /// Empty statements are sent as raw text rather than prepared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Placeholder list for a `CALL` statement, e.g. `?, ?` or `:a, :b`.
    pub(crate) fn placeholders(&self) -> String {
        match self {
            Params::Empty => String::new(),
            Params::Positional(values) => vec!["?"; values.len()].join(", "),
            Params::Named(pairs) => pairs
                .iter()
                .map(|(name, _)| format!(":{}", name))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
