use std::fmt::Debug;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::consts::consts::PersonId;

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString,
)]
pub enum Gender {
    #[default]
    M,
    F,
    O,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::M => "Male",
            Gender::F => "Female",
            Gender::O => "Other",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl Address {
    /// Single line rendering, blank parts are skipped
    pub fn format(&self) -> String {
        [&self.street, &self.city, &self.state, &self.zip_code]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<&str>>()
            .join(", ")
    }
}

/// First schema version, a flat record without an address
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PersonId>,
    pub name: String,
    pub gender: Gender,
    pub email: String,
    pub date_of_birth: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub naturalness: String,
    pub cpf: String,
}

/// Second schema version, numeric ids, mandatory address and a gender the server may default
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonV2 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub email: String,
    pub date_of_birth: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub naturalness: String,
    pub cpf: String,
    pub address: Address,
}

/// Common surface of both schema versions, used by the list view, the controller and the editor
pub trait PersonRecord: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    fn person_id(&self) -> Option<PersonId>;
    fn name(&self) -> &str;
    fn cpf(&self) -> &str;
    fn email(&self) -> &str;
    fn gender(&self) -> Option<Gender>;
    fn date_of_birth(&self) -> &str;
    fn nationality(&self) -> &str;
    fn naturalness(&self) -> &str;
    fn address(&self) -> Option<&Address>;
}

impl PersonRecord for Person {
    fn person_id(&self) -> Option<PersonId> {
        self.id.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn cpf(&self) -> &str {
        &self.cpf
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn gender(&self) -> Option<Gender> {
        Some(self.gender)
    }

    fn date_of_birth(&self) -> &str {
        &self.date_of_birth
    }

    fn nationality(&self) -> &str {
        &self.nationality
    }

    fn naturalness(&self) -> &str {
        &self.naturalness
    }

    fn address(&self) -> Option<&Address> {
        None
    }
}

impl PersonRecord for PersonV2 {
    fn person_id(&self) -> Option<PersonId> {
        self.id.map(PersonId::from)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn cpf(&self) -> &str {
        &self.cpf
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn gender(&self) -> Option<Gender> {
        self.gender
    }

    fn date_of_birth(&self) -> &str {
        &self.date_of_birth
    }

    fn nationality(&self) -> &str {
        &self.nationality
    }

    fn naturalness(&self) -> &str {
        &self.naturalness
    }

    fn address(&self) -> Option<&Address> {
        Some(&self.address)
    }
}

impl Person {
    pub fn new_test() -> Self {
        Person {
            id: Some(PersonId("1".to_string())),
            name: "Full Name".to_string(),
            gender: Gender::F,
            email: "full.name@example.com".to_string(),
            date_of_birth: "1990-01-31".to_string(),
            nationality: "Brazilian".to_string(),
            naturalness: "Recife".to_string(),
            cpf: "123.456.789-01".to_string(),
        }
    }
}

impl PersonV2 {
    pub fn new_test() -> Self {
        PersonV2 {
            id: Some(1),
            name: "Full Name".to_string(),
            gender: Some(Gender::F),
            email: "full.name@example.com".to_string(),
            date_of_birth: "1990-01-31".to_string(),
            nationality: "Brazilian".to_string(),
            naturalness: "Recife".to_string(),
            cpf: "123.456.789-01".to_string(),
            address: Address {
                street: "Rua das Flores 10".to_string(),
                city: "Recife".to_string(),
                state: "PE".to_string(),
                zip_code: "50000-000".to_string(),
            },
        }
    }
}
