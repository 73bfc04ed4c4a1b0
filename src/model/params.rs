use serde::{Deserialize, Serialize};

use crate::controlled_vocabulary::CvTerm;

/// A CV parameter attached to a spectrum, chromatogram or shared record
pub type CvParam = CvTerm;

/// A free-form user parameter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserParam {
    /// Parameter name
    pub name: String,
    /// Parameter value
    pub value: String,
    /// Optional value type, e.g. `xsd:double`
    pub value_type: Option<String>,
    /// Optional unit accession
    pub unit_accession: Option<String>,
    /// Optional unit name
    pub unit_name: Option<String>,
}

impl UserParam {
    /// Create a user parameter without type or unit
    pub fn new(name: &str, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            ..Self::default()
        }
    }

    /// Set the value type
    pub fn with_type(mut self, value_type: &str) -> Self {
        self.value_type = Some(value_type.to_string());
        self
    }
}

/// CV parameters, user parameters and references to parameter groups
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParamList {
    /// CV parameters
    pub cv_params: Vec<CvParam>,
    /// User parameters
    pub user_params: Vec<UserParam>,
    /// Ids of referenced parameter groups
    pub param_group_refs: Vec<String>,
}

impl ParamList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a CV parameter (builder pattern)
    pub fn with_cv(mut self, param: CvParam) -> Self {
        self.cv_params.push(param);
        self
    }

    /// Add a user parameter (builder pattern)
    pub fn with_user(mut self, param: UserParam) -> Self {
        self.user_params.push(param);
        self
    }

    /// Add a parameter group reference (builder pattern)
    pub fn with_group_ref(mut self, id: &str) -> Self {
        self.param_group_refs.push(id.to_string());
        self
    }

    /// First CV parameter with the given accession
    pub fn cv(&self, accession: &str) -> Option<&CvParam> {
        self.cv_params.iter().find(|p| p.accession == accession)
    }

    /// Whether the list holds nothing at all
    pub fn is_empty(&self) -> bool {
        self.cv_params.is_empty() && self.user_params.is_empty() && self.param_group_refs.is_empty()
    }
}
