use serde::{Deserialize, Serialize};

/// Patient details supplied alongside an MRI scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientContext {
    pub name: String,
    pub age: u32,
    pub gender: String,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub symptoms: Option<String>,
}

impl PatientContext {
    pub fn new(name: impl Into<String>, age: u32, gender: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age,
            gender: gender.into(),
            medical_history: None,
            symptoms: None,
        }
    }

    pub fn with_medical_history(mut self, history: impl Into<String>) -> Self {
        self.medical_history = Some(history.into());
        self
    }

    pub fn with_symptoms(mut self, symptoms: impl Into<String>) -> Self {
        self.symptoms = Some(symptoms.into());
        self
    }
}
