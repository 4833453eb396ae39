use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type CompanyId = i64;

/// A registered company as persisted in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub company_id: CompanyId,
    pub company_name: String,
    /// Stored normalized (no spaces, upper-case)
    pub pan_number: String,
    pub gst_number: Option<String>,
    pub mca_reg_details: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a company.
///
/// Required fields are optional here so that a missing field surfaces as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCompany {
    pub company_name: Option<String>,
    pub pan_number: Option<String>,
    pub gst_number: Option<String>,
    pub mca_reg_details: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl NewCompany {
    pub fn new(company_name: impl Into<String>, pan_number: impl Into<String>) -> Self {
        Self {
            company_name: Some(company_name.into()),
            pan_number: Some(pan_number.into()),
            ..Self::default()
        }
    }

    pub fn with_gst_number(mut self, gst_number: impl Into<String>) -> Self {
        self.gst_number = Some(gst_number.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// The fixed set of fields a company update may touch.
///
/// The outer `Option` tells whether the field was supplied at all. For
/// nullable columns the inner `Option` carries an explicit `null`, which
/// clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyPatch {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub pan_number: Option<String>,
    #[serde(default, deserialize_with = "supplied")]
    pub gst_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub mca_reg_details: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub notes: Option<Option<String>>,
}

/// Marks a present key as supplied, even when its value is `null`.
fn supplied<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl CompanyPatch {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.pan_number.is_none()
            && self.gst_number.is_none()
            && self.mca_reg_details.is_none()
            && self.address.is_none()
            && self.notes.is_none()
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    pub fn with_gst_number(mut self, gst_number: Option<String>) -> Self {
        self.gst_number = Some(gst_number);
        self
    }

    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }

    /// Merge the supplied fields over a persisted record. Untouched fields
    /// keep their current values; `updated_at` is left to the caller.
    pub fn apply_to(&self, company: &Company) -> Company {
        let mut merged = company.clone();

        if let Some(name) = &self.company_name {
            merged.company_name = name.clone();
        }
        if let Some(pan) = &self.pan_number {
            merged.pan_number = pan.clone();
        }
        if let Some(gst) = &self.gst_number {
            merged.gst_number = gst.clone();
        }
        if let Some(details) = &self.mca_reg_details {
            merged.mca_reg_details = details.clone();
        }
        if let Some(address) = &self.address {
            merged.address = address.clone();
        }
        if let Some(notes) = &self.notes {
            merged.notes = notes.clone();
        }

        merged
    }
}
