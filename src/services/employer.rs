//! Employer-side views: job posting, the candidate queue and job analytics.
//!
//! Postings are accepted into the employer's workspace only; candidates and
//! stats come from seed data.

use serde::{Deserialize, Serialize};

use super::catalog::{self, Candidate, Job, JobStats};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EmployerError {
    #[error("Please fill out all required fields")]
    MissingFields,
    #[error("candidate not found: {0}")]
    CandidateNotFound(u32),
}

// =============================================================================
// JOB POSTING
// =============================================================================

/// Post-job form. `skills` is comma separated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPostingForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub skills: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedJob {
    #[serde(flatten)]
    pub job: Job,
    pub requirements: Option<String>,
}

/// Split a comma-separated skill list, dropping blanks.
#[must_use]
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Validate a posting form and assign it the next id after `existing`.
pub fn build_posting(form: JobPostingForm, existing: &[PostedJob]) -> Result<PostedJob, EmployerError> {
    let required = [&form.title, &form.company, &form.description];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(EmployerError::MissingFields);
    }

    let id = existing.iter().map(|p| p.job.id).max().unwrap_or(0) + 1;
    let requirements = Some(form.requirements.trim().to_owned()).filter(|r| !r.is_empty());
    Ok(PostedJob {
        job: Job {
            id,
            title: form.title.trim().to_owned(),
            company: form.company.trim().to_owned(),
            location: form.location.trim().to_owned(),
            salary: form.salary.trim().to_owned(),
            description: form.description.trim().to_owned(),
            skills: parse_skills(&form.skills),
        },
        requirements,
    })
}

// =============================================================================
// CANDIDATES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateDecision {
    Approved,
    Declined,
}

#[derive(Debug, Clone)]
pub struct CandidateQueue {
    candidates: Vec<Candidate>,
}

impl Default for CandidateQueue {
    fn default() -> Self {
        Self { candidates: catalog::sample_candidates() }
    }
}

impl CandidateQueue {
    #[must_use]
    pub fn pending(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Approve or decline a candidate. Either way they leave the queue.
    pub fn decide(&mut self, id: u32, approved: bool) -> Result<(Candidate, CandidateDecision), EmployerError> {
        let pos = self
            .candidates
            .iter()
            .position(|c| c.id == id)
            .ok_or(EmployerError::CandidateNotFound(id))?;
        let candidate = self.candidates.remove(pos);
        let decision = if approved { CandidateDecision::Approved } else { CandidateDecision::Declined };
        Ok((candidate, decision))
    }
}

// =============================================================================
// ANALYTICS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobAnalytics {
    pub title: String,
    #[serde(flatten)]
    pub stats: JobStats,
    pub match_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct AnalyticsTotals {
    pub views: u32,
    pub likes: u32,
    pub matches: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub totals: AnalyticsTotals,
    pub match_rate: f64,
    pub jobs: Vec<JobAnalytics>,
}

/// `matches / views * 100`, one decimal. Zero views is a zero rate.
#[must_use]
pub fn match_rate(matches: u32, views: u32) -> f64 {
    if views == 0 {
        return 0.0;
    }
    let pct = f64::from(matches) / f64::from(views) * 100.0;
    (pct * 10.0).round() / 10.0
}

#[must_use]
pub fn analytics(stats: &[(String, JobStats)]) -> AnalyticsReport {
    let totals = stats.iter().fold(AnalyticsTotals::default(), |acc, (_, s)| AnalyticsTotals {
        views: acc.views + s.views,
        likes: acc.likes + s.likes,
        matches: acc.matches + s.matches,
    });
    let jobs = stats
        .iter()
        .map(|(title, s)| JobAnalytics { title: title.clone(), stats: *s, match_rate: match_rate(s.matches, s.views) })
        .collect();
    AnalyticsReport { totals, match_rate: match_rate(totals.matches, totals.views), jobs }
}

#[cfg(test)]
#[path = "employer_test.rs"]
mod tests;
