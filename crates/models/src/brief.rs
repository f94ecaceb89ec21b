use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::ModelError;

pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 2000;

/// Difficulty level of a brief.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        };
        f.write_str(s)
    }
}

/// Lifecycle status. Transitions are caller-driven:
/// `Draft -> Published`, `Draft -> Archived`, `Published -> Archived`.
/// `Archived` is terminal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BriefStatus {
    Draft,
    Published,
    Archived,
}

impl BriefStatus {
    pub fn can_transition(self, to: BriefStatus) -> bool {
        matches!(
            (self, to),
            (BriefStatus::Draft, BriefStatus::Published)
                | (BriefStatus::Draft, BriefStatus::Archived)
                | (BriefStatus::Published, BriefStatus::Archived)
        )
    }
}

impl fmt::Display for BriefStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BriefStatus::Draft => "Draft",
            BriefStatus::Published => "Published",
            BriefStatus::Archived => "Archived",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResourceKind {
    #[default]
    Document,
    Video,
    Link,
    Other,
}

/// A pedagogical resource attached to a brief.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub kind: ResourceKind,
}

impl Resource {
    fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::Validation("resource name is required".into()));
        }
        if self.url.trim().is_empty() {
            return Err(ModelError::Validation("resource url is required".into()));
        }
        Ok(())
    }
}

/// A project brief. Competence ids belong to the remote competence authority;
/// they are referenced, never owned, and each one was verified against that
/// authority by the write that introduced it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Brief {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub objectives: String,
    pub estimated_hours: u32,
    pub level: Level,
    pub competences: Vec<Uuid>,
    pub resources: Vec<Resource>,
    pub deliverables: Vec<String>,
    pub evaluation_criteria: Vec<String>,
    pub status: BriefStatus,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create input. Status defaults to `Draft` when omitted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BriefInput {
    pub title: String,
    pub description: String,
    pub objectives: String,
    pub estimated_hours: u32,
    pub level: Level,
    #[serde(default)]
    pub competences: Vec<Uuid>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub deliverables: Vec<String>,
    #[serde(default)]
    pub evaluation_criteria: Vec<String>,
    #[serde(default)]
    pub status: Option<BriefStatus>,
    pub author: String,
}

/// Partial update input. Only supplied fields are merged.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BriefPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub objectives: Option<String>,
    pub estimated_hours: Option<u32>,
    pub level: Option<Level>,
    pub competences: Option<Vec<Uuid>>,
    pub resources: Option<Vec<Resource>>,
    pub deliverables: Option<Vec<String>>,
    pub evaluation_criteria: Option<Vec<String>>,
    pub status: Option<BriefStatus>,
    pub author: Option<String>,
}

fn validate_title(title: &str) -> Result<(), ModelError> {
    if title.trim().is_empty() {
        return Err(ModelError::Validation("title is required".into()));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ModelError::Validation(format!(
            "title must not exceed {} characters",
            TITLE_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ModelError> {
    if description.trim().is_empty() {
        return Err(ModelError::Validation("description is required".into()));
    }
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(ModelError::Validation(format!(
            "description must not exceed {} characters",
            DESCRIPTION_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_hours(hours: u32) -> Result<(), ModelError> {
    if hours < 1 {
        return Err(ModelError::Validation(
            "estimated_hours must be at least 1".into(),
        ));
    }
    Ok(())
}

impl BriefInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        if self.objectives.trim().is_empty() {
            return Err(ModelError::Validation("objectives are required".into()));
        }
        validate_hours(self.estimated_hours)?;
        if self.author.trim().is_empty() {
            return Err(ModelError::Validation("author is required".into()));
        }
        for r in &self.resources {
            r.validate()?;
        }
        Ok(())
    }
}

impl BriefPatch {
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(t) = &self.title {
            validate_title(t)?;
        }
        if let Some(d) = &self.description {
            validate_description(d)?;
        }
        if let Some(o) = &self.objectives {
            if o.trim().is_empty() {
                return Err(ModelError::Validation("objectives are required".into()));
            }
        }
        if let Some(h) = self.estimated_hours {
            validate_hours(h)?;
        }
        if let Some(a) = &self.author {
            if a.trim().is_empty() {
                return Err(ModelError::Validation("author is required".into()));
            }
        }
        if let Some(resources) = &self.resources {
            for r in resources {
                r.validate()?;
            }
        }
        Ok(())
    }

    /// True when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.objectives.is_none()
            && self.estimated_hours.is_none()
            && self.level.is_none()
            && self.competences.is_none()
            && self.resources.is_none()
            && self.deliverables.is_none()
            && self.evaluation_criteria.is_none()
            && self.status.is_none()
            && self.author.is_none()
    }
}

/// Collapse duplicates; the reference set is unordered, so a sorted
/// canonical form keeps stored sets comparable.
pub fn dedup_references(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = ids.to_vec();
    out.sort();
    out.dedup();
    out
}

impl Brief {
    /// Build a new brief from validated input. The caller is responsible for
    /// having verified the competence references beforehand.
    pub fn from_input(input: BriefInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            objectives: input.objectives,
            estimated_hours: input.estimated_hours,
            level: input.level,
            competences: dedup_references(&input.competences),
            resources: input.resources,
            deliverables: input.deliverables,
            evaluation_criteria: input.evaluation_criteria,
            status: input.status.unwrap_or(BriefStatus::Draft),
            author: input.author,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge supplied patch fields; untouched fields keep their value.
    /// Status transitions are checked by the service layer before this runs.
    pub fn apply_patch(&mut self, patch: BriefPatch) {
        if let Some(t) = patch.title {
            self.title = t;
        }
        if let Some(d) = patch.description {
            self.description = d;
        }
        if let Some(o) = patch.objectives {
            self.objectives = o;
        }
        if let Some(h) = patch.estimated_hours {
            self.estimated_hours = h;
        }
        if let Some(l) = patch.level {
            self.level = l;
        }
        if let Some(c) = patch.competences {
            self.competences = dedup_references(&c);
        }
        if let Some(r) = patch.resources {
            self.resources = r;
        }
        if let Some(d) = patch.deliverables {
            self.deliverables = d;
        }
        if let Some(e) = patch.evaluation_criteria {
            self.evaluation_criteria = e;
        }
        if let Some(s) = patch.status {
            self.status = s;
        }
        if let Some(a) = patch.author {
            self.author = a;
        }
        self.updated_at = Utc::now();
    }
}
