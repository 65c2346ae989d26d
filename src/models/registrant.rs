use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

use crate::constants::*;

lazy_static! {
    pub static ref MOBILE_REGEX: Regex = Regex::new(r"^[6-9]\d{9}$").unwrap();
    pub static ref NATIONAL_ID_REGEX: Regex = Regex::new(r"^\d{12}$").unwrap();
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkingCategory {
    Construction,
    Agriculture,
    Manufacturing,
    Domestic,
    Hospitality,
    Other,
}

/// Registrant fields, used to name the offending field of a rejection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum RegistrantField {
    Name,
    Age,
    Gender,
    WorkingCategory,
    MigrationPlace,
    Mobile,
    NationalId,
}

impl Display for RegistrantField {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Name => write!(f, "name"),
            Self::Age => write!(f, "age"),
            Self::Gender => write!(f, "gender"),
            Self::WorkingCategory => write!(f, "workingCategory"),
            Self::MigrationPlace => write!(f, "migrationPlace"),
            Self::Mobile => write!(f, "mobile"),
            Self::NationalId => write!(f, "nationalId"),
        }
    }
}

// user facing message of each field rule, in form order
const FIELD_MESSAGES: [(RegistrantField, &str); 7] = [
    (RegistrantField::Name, "Please enter your name"),
    (
        RegistrantField::Age,
        "You must be at least 18 years old to register",
    ),
    (RegistrantField::Gender, "Please select your gender"),
    (
        RegistrantField::WorkingCategory,
        "Please select your working category",
    ),
    (
        RegistrantField::MigrationPlace,
        "Please enter your place of migration",
    ),
    (
        RegistrantField::Mobile,
        "Please enter a valid 10-digit mobile number",
    ),
    (
        RegistrantField::NationalId,
        "Please enter a valid 12-digit Aadhaar number",
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ValidationIssue {
    pub field: RegistrantField,
    pub message: String,
}

impl ValidationIssue {
    fn for_field(field: RegistrantField) -> Self {
        let message = FIELD_MESSAGES
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, msg)| *msg)
            .unwrap_or_default();
        Self {
            field,
            message: message.to_owned(),
        }
    }

    /// Rebuild the issues from a joined user message such as the one sent
    /// in a 400 response. None when a part is not a registrant field rule.
    pub fn parse_joined(message: &str) -> Option<Vec<Self>> {
        message
            .split("; ")
            .map(|part| {
                FIELD_MESSAGES
                    .iter()
                    .find(|(_, msg)| *msg == part)
                    .map(|(field, _)| Self::for_field(*field))
            })
            .collect()
    }
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Issue of a mobile number which is not a valid domestic number
pub fn mobile_issue(mobile: &str) -> Option<ValidationIssue> {
    if MOBILE_REGEX.is_match(mobile) {
        return None;
    }
    Some(ValidationIssue::for_field(RegistrantField::Mobile))
}

/// Registrant collected from the form, not validated yet.
/// Also the request body of the registration endpoint, a missing field
/// is reported by `validate` instead of failing deserialization.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrantDraft {
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub working_category: Option<WorkingCategory>,
    pub migration_place: String,
    pub mobile: String,
    pub national_id: String,
    pub email: Option<String>,
}

impl RegistrantDraft {
    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.name = name.to_owned();
        self
    }

    pub fn set_age(&mut self, age: u32) -> &mut Self {
        self.age = Some(age);
        self
    }

    /// Set the age from raw text input, unparsable text clears the age
    pub fn set_age_text(&mut self, age: &str) -> &mut Self {
        self.age = age.trim().parse::<u32>().ok();
        self
    }

    pub fn set_gender(&mut self, gender: Gender) -> &mut Self {
        self.gender = Some(gender);
        self
    }

    pub fn set_working_category(&mut self, category: WorkingCategory) -> &mut Self {
        self.working_category = Some(category);
        self
    }

    pub fn set_migration_place(&mut self, place: &str) -> &mut Self {
        self.migration_place = place.to_owned();
        self
    }

    pub fn set_mobile(&mut self, mobile: &str) -> &mut Self {
        self.mobile = mobile.trim().to_owned();
        self
    }

    pub fn set_national_id(&mut self, national_id: &str) -> &mut Self {
        self.national_id = national_id.trim().to_owned();
        self
    }

    pub fn set_email(&mut self, email: Option<&str>) -> &mut Self {
        self.email = email.map(|e| e.trim().to_owned());
        self
    }

    /// Validate every field rule. Either a registrant candidate is returned
    /// or the list of all violated rules, in form order.
    pub fn validate(&self) -> Result<Registrant, Vec<ValidationIssue>> {
        let mut rejected = vec![];
        if self.name.trim().is_empty() {
            rejected.push(RegistrantField::Name);
        }
        if !matches!(self.age, Some(age) if age >= MIN_REGISTRATION_AGE) {
            rejected.push(RegistrantField::Age);
        }
        if self.gender.is_none() {
            rejected.push(RegistrantField::Gender);
        }
        if self.working_category.is_none() {
            rejected.push(RegistrantField::WorkingCategory);
        }
        if self.migration_place.trim().is_empty() {
            rejected.push(RegistrantField::MigrationPlace);
        }
        if !MOBILE_REGEX.is_match(&self.mobile) {
            rejected.push(RegistrantField::Mobile);
        }
        if !NATIONAL_ID_REGEX.is_match(&self.national_id) {
            rejected.push(RegistrantField::NationalId);
        }
        let issues: Vec<_> = rejected
            .into_iter()
            .map(ValidationIssue::for_field)
            .collect();
        let (true, Some(gender), Some(working_category)) =
            (issues.is_empty(), self.gender, self.working_category)
        else {
            return Err(issues);
        };
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_owned);
        Ok(Registrant {
            name: self.name.trim().to_owned(),
            age: self.age.unwrap_or_default(),
            gender,
            working_category,
            migration_place: self.migration_place.trim().to_owned(),
            mobile: self.mobile.clone(),
            national_id: self.national_id.clone(),
            email,
        })
    }
}

/// Registrant which passed every field rule.
/// Can only be built through `RegistrantDraft::validate`
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    name: String,
    age: u32,
    gender: Gender,
    working_category: WorkingCategory,
    migration_place: String,
    mobile: String,
    national_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl Registrant {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn working_category(&self) -> WorkingCategory {
        self.working_category
    }

    pub fn migration_place(&self) -> &str {
        &self.migration_place
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    pub fn national_id(&self) -> &str {
        &self.national_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Convert back into a draft, used to send the registrant over the wire
    pub fn to_draft(&self) -> RegistrantDraft {
        RegistrantDraft {
            name: self.name.clone(),
            age: Some(self.age),
            gender: Some(self.gender),
            working_category: Some(self.working_category),
            migration_place: self.migration_place.clone(),
            mobile: self.mobile.clone(),
            national_id: self.national_id.clone(),
            email: self.email.clone(),
        }
    }
}
