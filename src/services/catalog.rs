//! Seed data for the demo marketplace.
//!
//! Every workspace starts from these tables; nothing here is persisted.

use serde::{Deserialize, Serialize};

const PLACEHOLDER_LOGO: &str = "/placeholder.svg?height=40&width=40";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: u32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub id: u32,
    pub company: String,
    pub position: String,
    /// ISO date (`YYYY-MM-DD`).
    pub matched_on: String,
    pub logo: String,
    pub has_chat: bool,
    pub last_message: Option<String>,
    pub unread: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    pub id: u32,
    pub name: String,
    pub position: String,
    pub logo: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    User,
    Company,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: u32,
    pub sender: MessageSender,
    pub text: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: u32,
    pub name: String,
    pub title: String,
    pub location: String,
    pub skills: Vec<String>,
    pub match_score: u8,
    pub has_chat: bool,
    pub last_message: Option<String>,
    pub unread: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub id: u32,
    pub views: u32,
    pub likes: u32,
    pub matches: u32,
    pub days_active: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCard {
    pub title: &'static str,
    pub description: Option<&'static str>,
    pub action: &'static str,
    pub href: &'static str,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

#[must_use]
pub fn sample_jobs() -> Vec<Job> {
    vec![
        Job {
            id: 1,
            title: "Frontend Developer".into(),
            company: "TechCorp".into(),
            location: "San Francisco, CA".into(),
            salary: "$120,000 - $150,000".into(),
            description: "We're looking for a skilled Frontend Developer with experience in React and TypeScript."
                .into(),
            skills: strings(&["React", "TypeScript", "CSS", "HTML"]),
        },
        Job {
            id: 2,
            title: "Backend Engineer".into(),
            company: "DataSystems".into(),
            location: "Remote".into(),
            salary: "$130,000 - $160,000".into(),
            description: "Join our team as a Backend Engineer working with Node.js and PostgreSQL.".into(),
            skills: strings(&["Node.js", "PostgreSQL", "Express", "API Design"]),
        },
        Job {
            id: 3,
            title: "Full Stack Developer".into(),
            company: "StartupX".into(),
            location: "New York, NY".into(),
            salary: "$140,000 - $170,000".into(),
            description: "Looking for a Full Stack Developer to help build our next-generation platform.".into(),
            skills: strings(&["React", "Node.js", "MongoDB", "AWS"]),
        },
    ]
}

#[must_use]
pub fn sample_matches() -> Vec<Match> {
    vec![
        Match {
            id: 1,
            company: "TechCorp".into(),
            position: "Frontend Developer".into(),
            matched_on: "2025-03-01".into(),
            logo: PLACEHOLDER_LOGO.into(),
            has_chat: true,
            last_message: Some("Hi David, we'd love to schedule an interview with you.".into()),
            unread: true,
        },
        Match {
            id: 2,
            company: "StartupX".into(),
            position: "Full Stack Developer".into(),
            matched_on: "2025-02-28".into(),
            logo: PLACEHOLDER_LOGO.into(),
            has_chat: true,
            last_message: Some("Thanks for your interest in our position!".into()),
            unread: false,
        },
        Match {
            id: 3,
            company: "DataSystems".into(),
            position: "Backend Engineer".into(),
            matched_on: "2025-02-25".into(),
            logo: PLACEHOLDER_LOGO.into(),
            has_chat: false,
            last_message: None,
            unread: false,
        },
    ]
}

#[must_use]
pub fn company(id: u32) -> Option<Company> {
    let (name, position) = match id {
        1 => ("TechCorp", "Frontend Developer"),
        2 => ("StartupX", "Full Stack Developer"),
        3 => ("DataSystems", "Backend Engineer"),
        _ => return None,
    };
    Some(Company { id, name: name.into(), position: position.into(), logo: PLACEHOLDER_LOGO.into() })
}

/// Opening messages for a company's chat thread.
#[must_use]
pub fn initial_chat(company_id: u32) -> Vec<ChatMessage> {
    let opener = match company_id {
        1 => ("Hi David, we'd love to schedule an interview with you.", "2025-03-04T14:30:00Z"),
        2 => ("Thanks for your interest in our position!", "2025-03-03T10:15:00Z"),
        _ => return Vec::new(),
    };
    vec![ChatMessage { id: 1, sender: MessageSender::Company, text: opener.0.into(), timestamp: opener.1.into() }]
}

#[must_use]
pub fn sample_candidates() -> Vec<Candidate> {
    vec![
        Candidate {
            id: 1,
            name: "Sarah Johnson".into(),
            title: "Frontend Developer".into(),
            location: "San Francisco, CA".into(),
            skills: strings(&["React", "TypeScript", "CSS", "HTML"]),
            match_score: 95,
            has_chat: true,
            last_message: Some("Hi, I'm interested in learning more about the position.".into()),
            unread: true,
        },
        Candidate {
            id: 2,
            name: "Michael Chen".into(),
            title: "Backend Engineer".into(),
            location: "Remote".into(),
            skills: strings(&["Node.js", "PostgreSQL", "Express", "API Design"]),
            match_score: 87,
            has_chat: true,
            last_message: Some("Thanks for reaching out!".into()),
            unread: false,
        },
        Candidate {
            id: 3,
            name: "Alex Rodriguez".into(),
            title: "Full Stack Developer".into(),
            location: "New York, NY".into(),
            skills: strings(&["React", "Node.js", "MongoDB", "AWS"]),
            match_score: 82,
            has_chat: false,
            last_message: None,
            unread: false,
        },
    ]
}

/// Per-posting stats, paired with the posting title.
#[must_use]
pub fn sample_job_stats() -> Vec<(String, JobStats)> {
    vec![
        ("Frontend Developer".into(), JobStats { id: 1, views: 125, likes: 42, matches: 8, days_active: 7 }),
        ("Backend Engineer".into(), JobStats { id: 2, views: 98, likes: 33, matches: 5, days_active: 5 }),
        ("Full Stack Developer".into(), JobStats { id: 3, views: 156, likes: 51, matches: 12, days_active: 10 }),
    ]
}

#[must_use]
pub fn seeker_dashboard_cards() -> Vec<DashboardCard> {
    vec![
        DashboardCard {
            title: "Complete Your Profile",
            description: Some("Add your skills and experience"),
            action: "Update Profile",
            href: "/profile",
        },
        DashboardCard {
            title: "Start Job Search",
            description: Some("Find your perfect match"),
            action: "Browse Jobs",
            href: "/jobs",
        },
        DashboardCard {
            title: "Your Matches",
            description: Some("See who liked your profile"),
            action: "View Matches",
            href: "/matches",
        },
    ]
}

#[must_use]
pub fn employer_dashboard_cards() -> Vec<DashboardCard> {
    vec![
        DashboardCard { title: "Company Profile", description: None, action: "Update Profile", href: "/employer/profile" },
        DashboardCard {
            title: "Post a New Job",
            description: Some("Find the perfect candidate"),
            action: "Post Job",
            href: "/employer/post-job",
        },
        DashboardCard {
            title: "Candidate Matches",
            description: Some("See who matched with your jobs"),
            action: "View Candidates",
            href: "/employer/candidates",
        },
        DashboardCard {
            title: "Job Analytics",
            description: Some("Track your job performance"),
            action: "View Analytics",
            href: "/employer/analytics",
        },
    ]
}
