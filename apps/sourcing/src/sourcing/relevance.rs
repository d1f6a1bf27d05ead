//! Repository relevance: pure, deterministic keyword scorer.
//!
//! Algorithm, per repository:
//! - +0.30 per required skill equal (case-insensitive) to the primary language
//! - +0.20 per keyword found in `name + " " + description`
//! - +0.15 per (topic, keyword) pair where the topic contains the keyword
//! - +0.10 if the repository has more than 50 stars
//!
//! The sum is capped at 1.0. Points are counted in hundredths so threshold
//! comparisons are exact.

use crate::github::Repository;

// Weights in hundredths of a point.
const LANGUAGE_MATCH_POINTS: u32 = 30;
const KEYWORD_MATCH_POINTS: u32 = 20;
const TOPIC_MATCH_POINTS: u32 = 15;
const POPULARITY_POINTS: u32 = 10;
const MAX_POINTS: u32 = 100;
/// Repositories at or below this many points are not listed as relevant.
const RELEVANCE_THRESHOLD_POINTS: u32 = 30;

pub const POPULAR_STAR_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceAnalysis {
    pub score: f64,
    pub reasons: Vec<String>,
    points: u32,
}

impl RelevanceAnalysis {
    /// Strictly above 0.3.
    pub fn is_relevant(&self) -> bool {
        self.points > RELEVANCE_THRESHOLD_POINTS
    }
}

pub fn analyze_repository_relevance(
    repo: &Repository,
    required_skills: &[String],
    keywords: &[String],
) -> RelevanceAnalysis {
    let mut points = 0_u32;
    let mut reasons = Vec::new();

    if let Some(language) = repo.language.as_deref() {
        for skill in required_skills {
            if language.eq_ignore_ascii_case(skill.trim()) {
                points += LANGUAGE_MATCH_POINTS;
                reasons.push(format!("Uses {skill}"));
            }
        }
    }

    let text = format!(
        "{} {}",
        repo.name,
        repo.description.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    let keywords: Vec<(&String, String)> = keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .map(|k| (k, k.trim().to_lowercase()))
        .collect();

    for (keyword, keyword_lower) in &keywords {
        if text.contains(keyword_lower.as_str()) {
            points += KEYWORD_MATCH_POINTS;
            reasons.push(format!("Contains '{keyword}'"));
        }
    }

    for topic in &repo.topics {
        let topic_lower = topic.to_lowercase();
        for (_, keyword_lower) in &keywords {
            if topic_lower.contains(keyword_lower.as_str()) {
                points += TOPIC_MATCH_POINTS;
                reasons.push(format!("Topic: {topic}"));
            }
        }
    }

    if repo.stars > POPULAR_STAR_THRESHOLD {
        points += POPULARITY_POINTS;
        reasons.push("Popular project".to_string());
    }

    let points = points.min(MAX_POINTS);
    RelevanceAnalysis {
        score: f64::from(points) / 100.0,
        reasons,
        points,
    }
}
