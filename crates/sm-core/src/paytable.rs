//! Win tables and outcome classification

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{MachineError, MachineResult};

/// Regular winning combinations of the words build
pub const WORD_WINS: &[&str] = &[
    // Words and acronyms
    "eon", "err", "nee", "nor", "nun", "one", "ore", "our", "roe", "rue", "run", "see", "son",
    "uss", "sos", "sue", "sun", "urn", "use", "usr", "ron", "seo", "uno", "eur", "ros", "rus",
    "sor", "nes", "noo", "nou", "soo", "neo", "rss", "ssn", "eos", "oss", "snu", "ero", "eru",
    "suo", "sur", "nos", "orr", "res", "roo", "esr", "srs", "usn", "unn", "rur", "sen", "ren",
    "sno", "sse", "neu", "sou", "oun", "urs", "uro", "nuo",
    // Heart standing in for a letter
    "hne", "shn", "shs", "rhn", "seh", "shr", "rhs", "ush", "neh", "hss", "enh", "hur", "nsh",
    "ssh", "eho", "nho", "sho",
    // Faces
    "oeo", "oro", "ono", "oso", "eoe", "ror", "uou", "ehe", "rhr", "nhn", "hrh", "oou", "uoo",
    "ere", "ene", "ooh", "hoo", "oor", "eoo", "ooe", "ueu", "oos",
    // Heart as love
    "hhu", "uhh", "hon", "roh", "noh", "urh", "hen", "hes", "hno", "hos", "hso", "hus", "heu",
    "orh", "soh", "hor",
];

/// Super winning combinations of the words build
pub const WORD_SUPER_WINS: &[&str] = &[
    // Three of a kind
    "eee", "rrr", "hhh", "nnn", "ooo", "sss", "uuu",
    // Words
    "non", "reo", "nhn", "erh",
    // Faces
    "ouo", "oho", "heh", "hoh", "hnh", "hsh", "huh",
    // Heart as love
    "hse", "hun", "rhe",
];

/// Categorical result of one pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinKind {
    #[default]
    None,
    Regular,
    Super,
}

impl WinKind {
    pub fn is_win(&self) -> bool {
        !matches!(self, WinKind::None)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WinKind::None => "no win",
            WinKind::Regular => "win",
            WinKind::Super => "super win",
        }
    }
}

impl std::fmt::Display for WinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The regular and super win tables
///
/// Membership only; order and duplicates in the source lists are irrelevant.
#[derive(Debug, Clone, Default)]
pub struct WinTables {
    regular: HashSet<String>,
    super_wins: HashSet<String>,
}

impl WinTables {
    /// Build tables from combination lists
    ///
    /// Empty entries are rejected. Entries listed in both tables are kept;
    /// they classify as [`WinKind::Super`].
    pub fn new<I, J, S, T>(regular: I, super_wins: J) -> MachineResult<Self>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let regular = collect_table(regular, "win")?;
        let super_wins = collect_table(super_wins, "super win")?;

        let tables = Self {
            regular,
            super_wins,
        };
        let overlap = tables.overlap();
        if !overlap.is_empty() {
            log::warn!(
                "{} combination(s) listed in both win tables, classifying as super: {}",
                overlap.len(),
                overlap.join(", ")
            );
        }
        Ok(tables)
    }

    /// Tables of the words build
    pub fn words() -> Self {
        Self {
            regular: WORD_WINS.iter().map(|s| s.to_string()).collect(),
            super_wins: WORD_SUPER_WINS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Classify a concatenated centre-row combination
    pub fn classify(&self, combination: &str) -> WinKind {
        if self.super_wins.contains(combination) {
            WinKind::Super
        } else if self.regular.contains(combination) {
            WinKind::Regular
        } else {
            WinKind::None
        }
    }

    /// Combinations present in both tables, sorted
    pub fn overlap(&self) -> Vec<&str> {
        let mut both: Vec<&str> = self
            .regular
            .intersection(&self.super_wins)
            .map(String::as_str)
            .collect();
        both.sort_unstable();
        both
    }

    pub fn regular_len(&self) -> usize {
        self.regular.len()
    }

    pub fn super_len(&self) -> usize {
        self.super_wins.len()
    }
}

fn collect_table<I, S>(entries: I, table: &'static str) -> MachineResult<HashSet<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut set = HashSet::new();
    for entry in entries {
        let entry = entry.into();
        if entry.is_empty() {
            return Err(MachineError::EmptyWinEntry { table });
        }
        set.insert(entry);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_win() {
        let tables = WinTables::words();
        assert_eq!(tables.classify("eon"), WinKind::Regular);
        assert_eq!(tables.classify("hon"), WinKind::Regular);
    }

    #[test]
    fn test_super_win() {
        let tables = WinTables::words();
        assert_eq!(tables.classify("eee"), WinKind::Super);
        assert_eq!(tables.classify("rhe"), WinKind::Super);
    }

    #[test]
    fn test_no_win() {
        let tables = WinTables::words();
        assert_eq!(tables.classify("xyz"), WinKind::None);
        assert_eq!(tables.classify(""), WinKind::None);
    }

    #[test]
    fn test_overlap_classifies_as_super() {
        let tables = WinTables::words();
        assert_eq!(tables.overlap(), vec!["nhn"]);
        assert_eq!(tables.classify("nhn"), WinKind::Super);
    }

    #[test]
    fn test_duplicates_collapse() {
        let tables = WinTables::new(["abc", "abc", "def"], ["ggg"]).unwrap();
        assert_eq!(tables.regular_len(), 2);
        assert_eq!(tables.super_len(), 1);
    }

    #[test]
    fn test_empty_entry_rejected() {
        let err = WinTables::new(["abc", ""], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, MachineError::EmptyWinEntry { table: "win" }));
    }

    #[test]
    fn test_empty_tables_never_win() {
        let tables = WinTables::new(Vec::<String>::new(), Vec::<String>::new()).unwrap();
        assert_eq!(tables.classify("eee"), WinKind::None);
    }

    #[test]
    fn test_win_kind_labels() {
        assert!(!WinKind::None.is_win());
        assert!(WinKind::Regular.is_win());
        assert_eq!(WinKind::Super.to_string(), "super win");
    }
}
