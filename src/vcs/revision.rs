use std::fmt;
use std::str::FromStr;

use super::VcsError;

/// Revision selector passed to listing, export, update and merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Revision {
    #[default]
    Head,
    Number(u64),
}

impl Revision {
    /// Form accepted by the `svn` command line (`-r` argument).
    pub fn as_arg(&self) -> String {
        match self {
            Revision::Head => "HEAD".to_string(),
            Revision::Number(n) => n.to_string(),
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Head => write!(f, "HEAD"),
            Revision::Number(n) => write!(f, "r{n}"),
        }
    }
}

impl FromStr for Revision {
    type Err = VcsError;

    /// Accepts `HEAD` (any case), `123` and `r123`. An empty string means HEAD.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("head") {
            return Ok(Revision::Head);
        }
        trimmed
            .trim_start_matches(['r', 'R'])
            .parse()
            .map(Revision::Number)
            .map_err(|_| VcsError::Revision(input.to_string()))
    }
}
