//! Rule-based textual insights derived from the metrics engine outputs.
//!
//! The cascade runs in a fixed order: availability band, efficiency band,
//! critical-stoppage incidence, dominant-area concentration, then the
//! monthly trend check. Output order follows the cascade and carries no
//! further meaning.

use std::collections::BTreeMap;

/// Below this availability/efficiency the situation is urgent.
const URGENT_THRESHOLD: f64 = 70.0;
/// Between the urgent threshold and this one, moderate.
const MODERATE_THRESHOLD: f64 = 85.0;

/// Critical-incidence breakpoints, in percent of all stoppages.
const CRITICAL_HIGH: f64 = 20.0;
const CRITICAL_MODERATE: f64 = 10.0;

/// One area owning more than this share of stoppages triggers a targeted
/// recommendation.
const DOMINANT_AREA_THRESHOLD: f64 = 40.0;

/// Generates the ordered recommendation list for one snapshot.
///
/// `area_percentages` must be the count-share breakdown (descending) and
/// `monthly_occurrences` the chronological occurrence series.
pub fn generate(
    availability: f64,
    efficiency: f64,
    critical_percentage: f64,
    area_percentages: &[(String, f64)],
    monthly_occurrences: &BTreeMap<String, usize>,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if availability < URGENT_THRESHOLD {
        recommendations.push(
            "Availability is below the recommended level (70%). Prioritize reducing unplanned downtime."
                .to_string(),
        );
    } else if availability < MODERATE_THRESHOLD {
        recommendations.push(
            "Availability is at a moderate level. Consider improvements to the preventive maintenance process."
                .to_string(),
        );
    } else {
        recommendations.push(
            "Availability is at a good level. Keep monitoring to sustain this performance."
                .to_string(),
        );
    }

    if efficiency < URGENT_THRESHOLD {
        recommendations.push(
            "Efficiency is below the recommended level (70%). Review operational and organizational stoppage causes."
                .to_string(),
        );
    } else if efficiency < MODERATE_THRESHOLD {
        recommendations.push(
            "Efficiency is at a moderate level. Target the largest operational stoppage causes."
                .to_string(),
        );
    } else {
        recommendations.push(
            "Efficiency is at a good level. Keep monitoring to sustain this performance."
                .to_string(),
        );
    }

    if critical_percentage > CRITICAL_HIGH {
        recommendations.push(format!(
            "High incidence of critical stoppages ({:.1}%). Review corrective maintenance procedures.",
            critical_percentage
        ));
    } else if critical_percentage > CRITICAL_MODERATE {
        recommendations.push(format!(
            "Moderate incidence of critical stoppages ({:.1}%). Put an action plan in place to reduce this rate.",
            critical_percentage
        ));
    } else {
        recommendations.push(format!(
            "Low incidence of critical stoppages ({:.1}%). Keep monitoring to sustain this performance.",
            critical_percentage
        ));
    }

    if let Some((area, share)) = area_percentages.first() {
        if *share > DOMINANT_AREA_THRESHOLD {
            recommendations.push(format!(
                "The {} area accounts for {:.1}% of stoppages. Prioritize actions in this area.",
                area, share
            ));
        }
    }

    // 3-point trend check: first vs. last monthly occurrence count
    if monthly_occurrences.len() >= 3 {
        let first = *monthly_occurrences.values().next().unwrap() as i64;
        let last = *monthly_occurrences.values().next_back().unwrap() as i64;
        if last > first {
            recommendations.push(
                "Rising trend in the number of stoppages. Review preventive maintenance procedures."
                    .to_string(),
            );
        } else if last < first {
            recommendations.push(
                "Falling trend in the number of stoppages. Keep up the improvements already in place."
                    .to_string(),
            );
        }
    }

    recommendations
}
