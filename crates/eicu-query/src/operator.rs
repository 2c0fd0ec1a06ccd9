//! Filter operator tokens.

use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

/// Every operator token accepted by [`FilterOperator::from_str`], in display order.
pub const SUPPORTED_OPERATORS: [&str; 8] = ["==", "!=", ">", "<", ">=", "<=", "contains", "in"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    /// Case-sensitive substring match on the text form of the cell.
    Contains,
    /// Membership in a JSON list; list elements are not coerced.
    In,
}

impl FilterOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Contains => "contains",
            Self::In => "in",
        }
    }
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim() {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            "contains" => Ok(Self::Contains),
            "in" => Ok(Self::In),
            _ => Err(FilterError::UnsupportedOperator {
                operator: token.to_string(),
            }),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
