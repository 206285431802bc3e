use std::{collections::BTreeMap, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::{
    consts::consts::{PersonId, CPF_DIGITS, CPF_MASKED_LENGTH},
    model::person::{Address, Gender, Person, PersonRecord, PersonV2},
};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static CPF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$").expect("cpf pattern is valid"));

/// Live mask for CPF input: digits only, `.` after the 3rd and 6th digit, `-` after the 9th,
/// never longer than `000.000.000-00`
pub fn mask_cpf(input: &str) -> String {
    let mut masked = String::with_capacity(CPF_MASKED_LENGTH);

    for (index, digit) in input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(CPF_DIGITS)
        .enumerate()
    {
        match index {
            3 | 6 => masked.push('.'),
            9 => masked.push('-'),
            _ => {}
        }

        masked.push(digit);
    }

    masked
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationRules {
    pub require_email: bool,
    pub require_gender: bool,
    pub enforce_cpf_pattern: bool,
}

impl ValidationRules {
    /// Email required and shaped, CPF only required since the mask formats it
    pub fn standard() -> Self {
        Self {
            require_email: true,
            require_gender: false,
            enforce_cpf_pattern: false,
        }
    }

    /// Gender required and CPF checked against the full pattern, email optional
    pub fn strict() -> Self {
        Self {
            require_email: false,
            require_gender: true,
            enforce_cpf_pattern: true,
        }
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules::standard()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Field {
    Name,
    Cpf,
    Email,
    Gender,
    DateOfBirth,
    Nationality,
    Naturalness,
    Street,
    City,
    State,
    ZipCode,
}

impl Field {
    pub fn is_address(&self) -> bool {
        matches!(
            self,
            Field::Street | Field::City | Field::State | Field::ZipCode
        )
    }
}

#[derive(Error, Clone, Debug, PartialEq)]
pub enum FieldError {
    #[error("Required field")]
    Required,
    #[error("Invalid format")]
    InvalidEmail,
    #[error("Invalid format (XXX.XXX.XXX-XX)")]
    InvalidCpf,
}

#[derive(Error, Clone, Debug, PartialEq)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationFailure(pub BTreeMap<Field, FieldError>);

impl ValidationFailure {
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.get(&field)
    }
}

/// Builds a record of a given schema version out of validated form state
pub trait FormRecord: PersonRecord {
    /// Fields the form shows for this schema, in display order
    fn fields() -> &'static [Field];
    fn from_form(form: &PersonForm) -> Self;
}

/// Form state for the person editor, every field held as entered.
///
/// The editor never talks to the backend, `submit` hands the caller a complete record.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonForm {
    pub id: Option<PersonId>,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub date_of_birth: String,
    pub nationality: String,
    pub naturalness: String,
    pub address: Address,
}

impl PersonForm {
    /// Blank form, date of birth defaults to today
    pub fn new() -> Self {
        Self {
            id: None,
            name: String::new(),
            cpf: String::new(),
            email: String::new(),
            gender: None,
            date_of_birth: chrono::Local::now().format("%Y-%m-%d").to_string(),
            nationality: String::new(),
            naturalness: String::new(),
            address: Address::default(),
        }
    }

    pub fn from_record<R: PersonRecord>(record: &R) -> Self {
        Self {
            id: record.person_id(),
            name: record.name().to_string(),
            cpf: record.cpf().to_string(),
            email: record.email().to_string(),
            gender: record.gender(),
            date_of_birth: record.date_of_birth().to_string(),
            nationality: record.nationality().to_string(),
            naturalness: record.naturalness().to_string(),
            address: record.address().cloned().unwrap_or_default(),
        }
    }

    pub fn get(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.clone(),
            Field::Cpf => self.cpf.clone(),
            Field::Email => self.email.clone(),
            Field::Gender => self.gender.map(|g| g.to_string()).unwrap_or_default(),
            Field::DateOfBirth => self.date_of_birth.clone(),
            Field::Nationality => self.nationality.clone(),
            Field::Naturalness => self.naturalness.clone(),
            Field::Street => self.address.street.clone(),
            Field::City => self.address.city.clone(),
            Field::State => self.address.state.clone(),
            Field::ZipCode => self.address.zip_code.clone(),
        }
    }

    /// Applies one input event. CPF input is masked as it is typed, an unknown gender letter clears it.
    pub fn set(&mut self, field: Field, value: &str) {
        match field {
            Field::Name => self.name = value.to_string(),
            Field::Cpf => self.cpf = mask_cpf(value),
            Field::Email => self.email = value.trim().to_string(),
            Field::Gender => {
                self.gender = Gender::from_str(value.trim().to_uppercase().as_str()).ok()
            }
            Field::DateOfBirth => self.date_of_birth = value.trim().to_string(),
            Field::Nationality => self.nationality = value.to_string(),
            Field::Naturalness => self.naturalness = value.to_string(),
            Field::Street => self.address.street = value.to_string(),
            Field::City => self.address.city = value.to_string(),
            Field::State => self.address.state = value.to_string(),
            Field::ZipCode => self.address.zip_code = value.to_string(),
        }
    }

    pub fn validate(&self, rules: &ValidationRules) -> Result<(), ValidationFailure> {
        let mut errors = BTreeMap::new();

        if self.name.trim().is_empty() {
            errors.insert(Field::Name, FieldError::Required);
        }

        if self.cpf.trim().is_empty() {
            errors.insert(Field::Cpf, FieldError::Required);
        } else if rules.enforce_cpf_pattern && !CPF_PATTERN.is_match(&self.cpf) {
            errors.insert(Field::Cpf, FieldError::InvalidCpf);
        }

        if self.email.is_empty() {
            if rules.require_email {
                errors.insert(Field::Email, FieldError::Required);
            }
        } else if !EMAIL_PATTERN.is_match(&self.email) {
            errors.insert(Field::Email, FieldError::InvalidEmail);
        }

        if rules.require_gender && self.gender.is_none() {
            errors.insert(Field::Gender, FieldError::Required);
        }

        if self.date_of_birth.is_empty() {
            errors.insert(Field::DateOfBirth, FieldError::Required);
        }

        if errors.is_empty() {
            return Ok(());
        }

        Err(ValidationFailure(errors))
    }

    pub fn submit<R: FormRecord>(&self, rules: &ValidationRules) -> Result<R, ValidationFailure> {
        self.validate(rules)?;

        Ok(R::from_form(self))
    }
}

impl Default for PersonForm {
    fn default() -> Self {
        PersonForm::new()
    }
}

const PERSON_FIELDS: [Field; 7] = [
    Field::Name,
    Field::Cpf,
    Field::Email,
    Field::Gender,
    Field::DateOfBirth,
    Field::Nationality,
    Field::Naturalness,
];

const PERSON_V2_FIELDS: [Field; 11] = [
    Field::Name,
    Field::Cpf,
    Field::Email,
    Field::Gender,
    Field::DateOfBirth,
    Field::Nationality,
    Field::Naturalness,
    Field::Street,
    Field::City,
    Field::State,
    Field::ZipCode,
];

impl FormRecord for Person {
    fn fields() -> &'static [Field] {
        &PERSON_FIELDS
    }

    // The gender select always has a value, the first option when untouched
    fn from_form(form: &PersonForm) -> Self {
        Person {
            id: form.id.clone(),
            name: form.name.trim().to_string(),
            gender: form.gender.unwrap_or_default(),
            email: form.email.clone(),
            date_of_birth: form.date_of_birth.clone(),
            nationality: form.nationality.clone(),
            naturalness: form.naturalness.clone(),
            cpf: form.cpf.clone(),
        }
    }
}

impl FormRecord for PersonV2 {
    fn fields() -> &'static [Field] {
        &PERSON_V2_FIELDS
    }

    fn from_form(form: &PersonForm) -> Self {
        PersonV2 {
            id: form.id.as_ref().and_then(|id| id.as_str().parse().ok()),
            name: form.name.trim().to_string(),
            gender: form.gender,
            email: form.email.clone(),
            date_of_birth: form.date_of_birth.clone(),
            nationality: form.nationality.clone(),
            naturalness: form.naturalness.clone(),
            cpf: form.cpf.clone(),
            address: form.address.clone(),
        }
    }
}
