//! Student update builder.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct StudentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_issued_on: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_location: Option<Option<String>>,
}

pub struct StudentUpdateBuilder(StudentUpdate);

impl StudentUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(StudentUpdate::default())
    }

    #[must_use]
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.0.first_name = Some(first_name.into());
        self
    }

    #[must_use]
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.0.last_name = Some(last_name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: Option<String>) -> Self {
        self.0.email = Some(email);
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: Option<String>) -> Self {
        self.0.phone = Some(phone);
        self
    }

    #[must_use]
    pub fn address(mut self, address: Option<String>) -> Self {
        self.0.address = Some(address);
        self
    }

    #[must_use]
    pub fn date_of_birth(mut self, date_of_birth: Option<NaiveDate>) -> Self {
        self.0.date_of_birth = Some(date_of_birth);
        self
    }

    #[must_use]
    pub fn license_number(mut self, license_number: Option<String>) -> Self {
        self.0.license_number = Some(license_number);
        self
    }

    #[must_use]
    pub fn license_issued_on(mut self, license_issued_on: Option<NaiveDate>) -> Self {
        self.0.license_issued_on = Some(license_issued_on);
        self
    }

    #[must_use]
    pub fn preferred_location(mut self, preferred_location: Option<String>) -> Self {
        self.0.preferred_location = Some(preferred_location);
        self
    }

    #[must_use]
    pub fn build(self) -> StudentUpdate {
        self.0
    }
}

impl Default for StudentUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
