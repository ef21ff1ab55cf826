use crate::types::{ClassificationResult, PatientContext};

const NOT_PROVIDED: &str = "None provided";

/// Prompt asking the generator for a four-key JSON recommendation
pub fn build_prompt(result: &ClassificationResult, patient: &PatientContext) -> String {
    let distribution = result
        .probabilities
        .iter()
        .map(|p| format!("{}: {:.1}%", p.name, p.value * 100.0))
        .collect::<Vec<_>>()
        .join(", ");

    let history = non_empty(patient.medical_history.as_deref());
    let symptoms = non_empty(patient.symptoms.as_deref());

    format!(
        r#"You are a neuroradiology assistant. Write a medical recommendation based on an MRI brain tumor classification.

Patient Information:
Name: {name}
Age: {age}
Gender: {gender}
Medical History: {history}
Current Symptoms: {symptoms}

Classification Results:
Primary Diagnosis: {diagnosis}
Confidence: {confidence:.1}%
Probability Distribution: {distribution}

Provide:
1. A one-sentence summary of the findings, focused on the characteristics of the finding.
2. A recommended medical action in 2-3 lines of plain text.
3. Follow-up suggestions in 2-3 lines of plain text.
4. An urgency level: low, medium, or high.

Respond with a single JSON object with exactly these keys:
{{
    "summary": "Brief summary of findings",
    "recommendation": "Recommended medical action",
    "followUp": "Follow-up suggestions",
    "urgency": "low|medium|high"
}}

Formatting rules:
Use plain text only. Do not use markdown emphasis such as asterisks (*) and do not use bullet dashes.
Return only the JSON object with no additional text."#,
        name = patient.name,
        age = patient.age,
        gender = patient.gender,
        history = history,
        symptoms = symptoms,
        diagnosis = result.predicted,
        confidence = result.confidence_percent(),
        distribution = distribution,
    )
}

fn non_empty(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_PROVIDED)
}
