//! Paginated listing over the brief collection.
//!
//! `PageRequest` normalizes caller input, `BriefFilter` is the predicate
//! applied both to the slice and to the total count, and `PageResult` carries
//! the slice plus derived pagination metadata.

use models::{Brief, BriefStatus, Level};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pagination parameters, 1-based.
#[derive(Clone, Copy, Debug)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Clamp to >= 1; no upper bound here, the boundary layer may impose one.
    pub fn normalize(self) -> (u64, u64) {
        let page = self.page.max(1);
        let per_page = self.per_page.max(1);
        (page, per_page)
    }

    /// Derived page count: `ceil(total / per_page)`, 0 when the collection
    /// is empty.
    pub fn pages_for(total: u64, per_page: u64) -> u64 {
        if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, per_page: 10 }
    }
}

/// Filter predicate shared by the slice and the total count.
#[derive(Clone, Debug, Default)]
pub struct BriefFilter {
    pub level: Option<Level>,
    pub status: Option<BriefStatus>,
    /// Keep briefs referencing this competence id.
    pub competence: Option<Uuid>,
    /// Case-insensitive keyword over title, description and objectives.
    pub q: Option<String>,
}

impl BriefFilter {
    pub fn matches(&self, brief: &Brief) -> bool {
        if let Some(level) = self.level {
            if brief.level != level {
                return false;
            }
        }
        if let Some(status) = self.status {
            if brief.status != status {
                return false;
            }
        }
        if let Some(competence) = self.competence {
            if !brief.competences.contains(&competence) {
                return false;
            }
        }
        if let Some(q) = &self.q {
            let needle = q.to_lowercase();
            let hit = brief.title.to_lowercase().contains(&needle)
                || brief.description.to_lowercase().contains(&needle)
                || brief.objectives.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_one() {
        let (page, per) = PageRequest { page: 0, per_page: 0 }.normalize();
        assert_eq!(page, 1);
        assert_eq!(per, 1);
    }

    #[test]
    fn pages_is_ceiling_of_total_over_size() {
        assert_eq!(PageRequest::pages_for(0, 10), 0);
        assert_eq!(PageRequest::pages_for(1, 10), 1);
        assert_eq!(PageRequest::pages_for(10, 10), 1);
        assert_eq!(PageRequest::pages_for(11, 10), 2);
        assert_eq!(PageRequest::pages_for(25, 10), 3);
    }

    #[test]
    fn default_values_are_sane() {
        let d = PageRequest::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 10);
    }
}
