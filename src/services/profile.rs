//! Job-seeker and company profile editors.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("skill is empty")]
    EmptySkill,
    #[error("skill already listed: {0}")]
    DuplicateSkill(String),
    #[error("{0} cannot be blank")]
    Blank(&'static str),
}

// =============================================================================
// JOB SEEKER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPreferences {
    pub remote: bool,
    pub full_time: bool,
    pub contract: bool,
    pub relocation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeekerProfile {
    pub name: String,
    pub title: String,
    pub location: String,
    pub about: String,
    pub skills: Vec<String>,
    pub preferences: JobPreferences,
}

/// Partial update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeekerProfileUpdate {
    pub name: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub preferences: Option<JobPreferences>,
}

impl Default for SeekerProfile {
    fn default() -> Self {
        Self {
            name: "David Smith".into(),
            title: "Frontend Developer".into(),
            location: "San Francisco, CA".into(),
            about: "Passionate developer with 5 years of experience in web technologies.".into(),
            skills: ["JavaScript", "React", "TypeScript", "CSS"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            preferences: JobPreferences { remote: true, full_time: true, contract: false, relocation: false },
        }
    }
}

impl SeekerProfile {
    /// Seed a profile, taking the display name from the account when known.
    #[must_use]
    pub fn for_user(name: Option<&str>) -> Self {
        let mut profile = Self::default();
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            name.clone_into(&mut profile.name);
        }
        profile
    }

    pub fn add_skill(&mut self, skill: &str) -> Result<(), ProfileError> {
        let skill = skill.trim();
        if skill.is_empty() {
            return Err(ProfileError::EmptySkill);
        }
        if self.skills.iter().any(|s| s == skill) {
            return Err(ProfileError::DuplicateSkill(skill.to_owned()));
        }
        self.skills.push(skill.to_owned());
        Ok(())
    }

    /// Remove a skill; returns whether it was present.
    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s != skill);
        self.skills.len() != before
    }

    pub fn apply(&mut self, update: SeekerProfileUpdate) -> Result<(), ProfileError> {
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ProfileError::Blank("name"));
        }
        if let Some(name) = update.name {
            self.name = name.trim().to_owned();
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(about) = update.about {
            self.about = about;
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
        Ok(())
    }
}

// =============================================================================
// COMPANY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyProfile {
    pub company_name: String,
    pub industry: String,
    pub website: String,
    pub location: String,
    pub about: String,
    pub size: String,
    pub founded: String,
    pub logo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyProfileUpdate {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub size: Option<String>,
    pub founded: Option<String>,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            company_name: "Acme Inc".into(),
            industry: "Technology".into(),
            website: "https://acme.example.com".into(),
            location: "San Francisco, CA".into(),
            about: "Acme Inc is a leading technology company specializing in cutting-edge solutions.".into(),
            size: "50-100".into(),
            founded: "2010".into(),
            logo: "/placeholder.svg".into(),
        }
    }
}

impl CompanyProfile {
    pub fn apply(&mut self, update: CompanyProfileUpdate) -> Result<(), ProfileError> {
        if update.company_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ProfileError::Blank("company name"));
        }
        let fields = [
            (&mut self.company_name, update.company_name),
            (&mut self.industry, update.industry),
            (&mut self.website, update.website),
            (&mut self.location, update.location),
            (&mut self.about, update.about),
            (&mut self.size, update.size),
            (&mut self.founded, update.founded),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
