//! Deterministic recommendation table
//!
//! Keyed by predicted category. Never fails and never touches the network.

use crate::types::{Category, ClassificationResult, PatientContext, RecommendationPayload, Urgency};

/// Canned guidance for one category
struct FallbackEntry {
    recommendation: &'static str,
    follow_up: &'static str,
    urgency: Urgency,
}

fn entry(category: Category) -> FallbackEntry {
    match category {
        Category::NoTumor => FallbackEntry {
            recommendation: "Routine follow-up recommended. Consider further evaluation to identify alternative causes for symptoms.",
            follow_up: "Follow-up imaging in 12 months as a precaution if symptoms persist.",
            urgency: Urgency::Low,
        },
        Category::Glioma => FallbackEntry {
            recommendation: "Immediate neurosurgical consultation required. Advanced imaging with contrast is needed to better characterize the lesion. Consider stereotactic biopsy to confirm diagnosis and determine genetic profile for targeted treatment planning.",
            follow_up: "Advanced MRI with contrast, potential biopsy recommendation within 7-10 days. Regular follow-up with a neuro-oncology team will be essential.",
            urgency: Urgency::High,
        },
        Category::Meningioma => FallbackEntry {
            recommendation: "Neurosurgical evaluation recommended. Many meningiomas can be observed with serial imaging if asymptomatic, but treatment decisions depend on size, location, and symptoms.",
            follow_up: "Follow-up MRI with contrast in 6-8 weeks to evaluate growth rate. Regular monitoring by a neurosurgeon is advised.",
            urgency: Urgency::Medium,
        },
        Category::Pituitary => FallbackEntry {
            recommendation: "Consultation with both neurosurgery and endocrinology is recommended. Hormonal evaluation is essential to determine if the tumor is secreting hormones. High-resolution MRI of the pituitary with contrast should be performed for detailed characterization.",
            follow_up: "Hormonal panel and visual field testing within 2 weeks. Regular follow-up with both neurosurgery and endocrinology specialists.",
            urgency: Urgency::Medium,
        },
    }
}

fn summary(result: &ClassificationResult, patient: &PatientContext) -> String {
    let subject = format!(
        "with {:.0}% confidence in a {}-year-old {} patient.",
        result.confidence_percent(),
        patient.age,
        patient.gender
    );

    match result.predicted {
        Category::NoTumor => format!("No evidence of brain tumor detected {}", subject),
        Category::Glioma => format!("MRI brain classification suggests a glioma {}", subject),
        Category::Meningioma => {
            format!("MRI brain classification suggests a meningioma {}", subject)
        }
        Category::Pituitary => format!(
            "MRI brain classification suggests a pituitary tumor {}",
            subject
        ),
    }
}

/// Payload for the predicted category, interpolated with confidence and patient details
pub fn fallback_payload(
    result: &ClassificationResult,
    patient: &PatientContext,
) -> RecommendationPayload {
    let entry = entry(result.predicted);
    RecommendationPayload {
        summary: summary(result, patient),
        recommendation: entry.recommendation.to_string(),
        follow_up: entry.follow_up.to_string(),
        urgency: entry.urgency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResultSource, CATEGORY_SET};

    fn result_for(category: Category) -> ClassificationResult {
        let mut distribution = [0.05f32; 4];
        distribution[category.index()] = 0.85;
        ClassificationResult::from_distribution(&distribution, ResultSource::Model).unwrap()
    }

    #[test]
    fn test_urgency_per_category() {
        let patient = PatientContext::new("Lee", 45, "female");
        let expected = [Urgency::Low, Urgency::High, Urgency::Medium, Urgency::Medium];
        for (category, urgency) in CATEGORY_SET.iter().zip(expected) {
            let payload = fallback_payload(&result_for(*category), &patient);
            assert_eq!(payload.urgency, urgency, "{}", category);
            assert!(payload.is_complete());
        }
    }

    #[test]
    fn test_summary_interpolation() {
        let patient = PatientContext::new("Lee", 45, "female");
        let payload = fallback_payload(&result_for(Category::Pituitary), &patient);
        assert_eq!(
            payload.summary,
            "MRI brain classification suggests a pituitary tumor with 85% confidence in a 45-year-old female patient."
        );

        let payload = fallback_payload(&result_for(Category::NoTumor), &patient);
        assert!(payload.summary.starts_with("No evidence of brain tumor detected with 85%"));
    }
}
