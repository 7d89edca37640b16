use serde::{Deserialize, Serialize};

/// Days of symptom duration reported with every diagnosis request.
pub const SYMPTOM_DAYS: u32 = 3;

/// Text the diagnosis service uses when it has no description for a disease.
pub const NO_DESCRIPTION: &str = "No description available.";

pub const SYMPTOMS_PATH: &str = "get_symptoms";
pub const START_CONVERSATION_PATH: &str = "start_conversation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomCatalogResponse {
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    pub symptoms: Vec<String>,
    pub days: u32,
    pub additional_symptoms: Vec<String>,
}

impl DiagnosisRequest {
    pub fn for_symptoms(symptoms: Vec<String>) -> Self {
        Self {
            symptoms,
            days: SYMPTOM_DAYS,
            additional_symptoms: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub disease: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_list")]
    pub precautions: Vec<String>,
}

fn default_description() -> String {
    NO_DESCRIPTION.to_string()
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_always_carries_fixed_days_and_no_additional_symptoms() {
        let request = DiagnosisRequest::for_symptoms(vec!["cough".into(), "fever".into()]);
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "symptoms": ["cough", "fever"],
                "days": 3,
                "additional_symptoms": []
            })
        );
    }

    #[test]
    fn result_tolerates_missing_or_null_precautions() {
        let absent: DiagnosisResult =
            serde_json::from_str(r#"{"disease":"Flu","description":"d"}"#).expect("absent");
        assert!(absent.precautions.is_empty());

        let null: DiagnosisResult =
            serde_json::from_str(r#"{"disease":"Flu","description":"d","precautions":null}"#)
                .expect("null");
        assert!(null.precautions.is_empty());
    }

    #[test]
    fn result_falls_back_to_service_description_text() {
        let result: DiagnosisResult =
            serde_json::from_str(r#"{"disease":"Flu","precautions":["Rest"]}"#).expect("decode");
        assert_eq!(result.description, NO_DESCRIPTION);
        assert_eq!(result.precautions, vec!["Rest".to_string()]);
    }
}
