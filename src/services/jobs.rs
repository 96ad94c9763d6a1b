//! Swipe-based job browser.
//!
//! The browser walks the job list in order. Each swipe records the job as seen
//! (and liked, on a right swipe) and advances, except on the last job where
//! the index stays put. The browser is exhausted once every job has been
//! swiped; `start_over` returns it to the first job with nothing recorded.

use serde::Serialize;

use super::catalog::{self, Job};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SwipeError {
    #[error("no more jobs to swipe")]
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwipeOutcome {
    pub job_id: u32,
    pub liked: bool,
    /// True when this swipe consumed the last job.
    pub exhausted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum JobBrowserView {
    Browsing {
        job: Job,
        /// 1-based position for "N of M jobs".
        position: usize,
        total: usize,
    },
    Exhausted {
        liked_jobs: Vec<Job>,
        total: usize,
    },
}

#[derive(Debug, Clone)]
pub struct JobBrowser {
    jobs: Vec<Job>,
    index: usize,
    swiped: Vec<u32>,
    liked: Vec<u32>,
}

impl Default for JobBrowser {
    fn default() -> Self {
        Self::new(catalog::sample_jobs())
    }
}

impl JobBrowser {
    #[must_use]
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs, index: 0, swiped: Vec::new(), liked: Vec::new() }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn swiped(&self) -> &[u32] {
        &self.swiped
    }

    #[must_use]
    pub fn liked(&self) -> &[u32] {
        &self.liked
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.swiped.len() >= self.jobs.len()
    }

    pub fn swipe(&mut self, liked: bool) -> Result<SwipeOutcome, SwipeError> {
        if self.is_exhausted() {
            return Err(SwipeError::Exhausted);
        }
        let job_id = self.jobs.get(self.index).ok_or(SwipeError::Exhausted)?.id;

        self.swiped.push(job_id);
        if liked {
            self.liked.push(job_id);
        }
        if self.index + 1 < self.jobs.len() {
            self.index += 1;
        }

        Ok(SwipeOutcome { job_id, liked, exhausted: self.is_exhausted() })
    }

    pub fn start_over(&mut self) {
        self.index = 0;
        self.swiped.clear();
        self.liked.clear();
    }

    #[must_use]
    pub fn view(&self) -> JobBrowserView {
        let total = self.jobs.len();
        match self.jobs.get(self.index) {
            Some(job) if !self.is_exhausted() => {
                JobBrowserView::Browsing { job: job.clone(), position: self.index + 1, total }
            }
            _ => JobBrowserView::Exhausted {
                liked_jobs: self
                    .liked
                    .iter()
                    .filter_map(|id| self.jobs.iter().find(|j| j.id == *id).cloned())
                    .collect(),
                total,
            },
        }
    }
}

#[cfg(test)]
#[path = "jobs_test.rs"]
mod tests;
