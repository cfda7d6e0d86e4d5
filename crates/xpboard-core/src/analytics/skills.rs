//! Skill rankings

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{CategoricalSeries, Category, ProgressRecord, Transaction};

/// Share of one skill across declared project skills
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillShare {
    pub skill: String,
    pub count: usize,
    /// Rounded percent of all skill mentions
    pub percentage: u32,
}

/// Best score per `skill_<name>` transaction type, descending
///
/// Ties keep first-seen order.
pub fn top_skills_by_best_score(
    transactions: &[Transaction],
    limit: usize,
    color: &str,
) -> CategoricalSeries {
    let mut best: Vec<(String, i64)> = Vec::new();

    for t in transactions {
        let Some(name) = t.skill_name() else {
            continue;
        };
        match best.iter_mut().find(|(n, _)| n == name) {
            Some((_, score)) => *score = (*score).max(t.amount),
            None => best.push((name.to_string(), t.amount)),
        }
    }

    best.sort_by(|a, b| b.1.cmp(&a.1));
    best.truncate(limit);

    CategoricalSeries::new(
        best.into_iter()
            .map(|(name, score)| Category::new(name, score as f64, color))
            .collect(),
    )
}

fn skill_counts(progress: &[ProgressRecord]) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for skill in progress.iter().flat_map(ProgressRecord::skills) {
        let count = counts.entry(skill.clone()).or_insert(0);
        if *count == 0 {
            order.push(skill);
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|skill| {
            let count = counts.get(&skill).copied().unwrap_or(0);
            (skill, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Skills declared in project attributes, most frequent first
pub fn extract_skills(progress: &[ProgressRecord]) -> Vec<String> {
    skill_counts(progress).into_iter().map(|(s, _)| s).collect()
}

/// Frequency and share of each declared skill
pub fn skills_distribution(progress: &[ProgressRecord]) -> Vec<SkillShare> {
    let ranked = skill_counts(progress);
    let total: usize = ranked.iter().map(|(_, c)| c).sum();

    ranked
        .into_iter()
        .map(|(skill, count)| SkillShare {
            skill,
            count,
            percentage: if total == 0 {
                0
            } else {
                (count as f64 / total as f64 * 100.0).round() as u32
            },
        })
        .collect()
}
