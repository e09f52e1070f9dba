//! Case selection: by name, category, and group.
//!
//! Selection never reorders: within a group cases keep catalog declaration
//! order, and groups keep catalog order.

use crate::case::{Category, TestCase, TestGroup};

/// A selected case together with the group it came from.
#[derive(Clone, Copy, Debug)]
pub struct ScheduledCase<'a> {
    pub group: &'a str,
    pub case: &'a TestCase,
}

/// Category filter lattice.
///
/// `WopiCore` cases are admitted by every filter; the two client-specific
/// categories exclude each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    WopiCore,
    OfficeNativeClient,
    OfficeOnline,
}

impl CategoryFilter {
    pub fn admits(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::WopiCore => category == Category::WopiCore,
            Self::OfficeNativeClient => {
                matches!(category, Category::WopiCore | Category::OfficeNativeClient)
            }
            Self::OfficeOnline => {
                matches!(category, Category::WopiCore | Category::OfficeOnline)
            }
        }
    }
}

/// Which cases a run executes.
#[derive(Clone, Debug, Default)]
pub struct TestFilter {
    /// Exactly-one-name short circuit: when set and exactly one case carries
    /// this name, that case is selected and the other filters are ignored.
    pub name: Option<String>,
    pub category: CategoryFilter,
    /// Case-insensitive group name equality.
    pub group: Option<String>,
}

impl TestFilter {
    pub fn select<'a>(&self, groups: &'a [TestGroup]) -> Vec<ScheduledCase<'a>> {
        if let Some(name) = self.name.as_deref() {
            let matches: Vec<_> = groups
                .iter()
                .flat_map(|group| {
                    group
                        .cases
                        .iter()
                        .filter(|case| case.name == name)
                        .map(|case| ScheduledCase {
                            group: &group.name,
                            case,
                        })
                })
                .collect();
            if matches.len() == 1 {
                return matches;
            }
            // Names are unique by invariant; if a malformed catalog repeats
            // one, fall back to the remaining filters over the matches.
            return matches
                .into_iter()
                .filter(|scheduled| self.admits(scheduled))
                .collect();
        }

        groups
            .iter()
            .flat_map(|group| {
                group.cases.iter().map(|case| ScheduledCase {
                    group: &group.name,
                    case,
                })
            })
            .filter(|scheduled| self.admits(scheduled))
            .collect()
    }

    fn admits(&self, scheduled: &ScheduledCase<'_>) -> bool {
        if !self.category.admits(scheduled.case.category) {
            return false;
        }
        match self.group.as_deref() {
            Some(group) => scheduled.group.eq_ignore_ascii_case(group),
            None => true,
        }
    }
}
