//! The normalized asset record and its status enums.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::alias::ManagedField;
use crate::sheet::CellValue;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Opaque record identifier assigned once at import time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Physical asset verification outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PavStatus {
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "Not Available")]
    NotAvailable,
    #[default]
    #[serde(rename = "Not Done")]
    NotDone,
}

impl PavStatus {
    pub const ALL: [PavStatus; 3] = [Self::Available, Self::NotAvailable, Self::NotDone];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::NotAvailable => "Not Available",
            Self::NotDone => "Not Done",
        }
    }

    /// Interpret an imported cell: trimmed, case-folded, and anything that is
    /// not "available" / "not available" counts as not done.
    pub fn from_import(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "available" => Self::Available,
            "not available" => Self::NotAvailable,
            _ => Self::NotDone,
        }
    }

    /// Coerce a form value. Only the exact display strings of the two
    /// verified outcomes survive; everything else is stored as not done.
    pub fn coerce(value: &str) -> Self {
        match value {
            "Available" => Self::Available,
            "Not Available" => Self::NotAvailable,
            _ => Self::NotDone,
        }
    }
}

impl std::fmt::Display for PavStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage state of the asset at the time of verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStatus {
    #[serde(rename = "In Use")]
    InUse,
    #[serde(rename = "Not In Use")]
    NotInUse,
    #[serde(rename = "Not Found")]
    NotFound,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 3] = [Self::InUse, Self::NotInUse, Self::NotFound];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InUse => "In Use",
            Self::NotInUse => "Not In Use",
            Self::NotFound => "Not Found",
        }
    }

    /// Trim and case-fold, then match a display string exactly.
    pub fn from_import(raw: &str) -> Option<Self> {
        let folded = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().to_lowercase() == folded)
    }

    /// Exact display-string match, as submitted by a form.
    pub fn from_display(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

/// Why the asset is (or is not) where the register says it is. Drives which
/// extra fields become mandatory on edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvailabilityRemarks {
    #[serde(rename = "Available in same branch")]
    SameBranch,
    #[serde(rename = "Available in different branch")]
    DifferentBranch,
    #[serde(rename = "Asset picked up by disposal vendor")]
    DisposalVendor,
    #[serde(rename = "Other")]
    Other,
}

impl AvailabilityRemarks {
    pub const ALL: [AvailabilityRemarks; 4] = [
        Self::SameBranch,
        Self::DifferentBranch,
        Self::DisposalVendor,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SameBranch => "Available in same branch",
            Self::DifferentBranch => "Available in different branch",
            Self::DisposalVendor => "Asset picked up by disposal vendor",
            Self::Other => "Other",
        }
    }

    pub fn from_import(raw: &str) -> Option<Self> {
        let folded = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().to_lowercase() == folded)
    }

    pub fn from_display(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }
}

// ---------------------------------------------------------------------------
// Asset record
// ---------------------------------------------------------------------------

/// One imported asset row: typed app-managed fields plus every other
/// original column carried verbatim in `passthrough`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: AssetId,
    #[serde(default)]
    pub edited: bool,

    pub asset_code: String,
    pub serial_number: String,
    pub make: String,
    pub model: String,
    pub asset_type: String,
    pub branch_code: String,
    pub branch_name: String,
    pub hub: String,
    pub status: String,
    pub sub_status: String,
    pub primary_owner: String,
    pub secondary_owner: String,
    pub warranty_start_date: String,
    pub warranty_end_date: String,
    pub found_asset: String,

    pub pav_status: PavStatus,
    pub asset_status: Option<AssetStatus>,
    #[serde(rename = "assetAvailabilityRemarks")]
    pub remarks: Option<AvailabilityRemarks>,
    pub new_branch_code: String,
    pub disposal_ticket: String,
    pub other_remarks: String,
    pub engineer_name: String,
    pub pav_date: String,

    /// Original columns not claimed by any managed field, keyed by the exact
    /// header text.
    #[serde(default)]
    pub passthrough: IndexMap<String, CellValue>,
}

impl AssetRecord {
    /// A record with every managed field empty and status not done.
    pub fn new(id: AssetId) -> Self {
        Self {
            id,
            edited: false,
            asset_code: String::new(),
            serial_number: String::new(),
            make: String::new(),
            model: String::new(),
            asset_type: String::new(),
            branch_code: String::new(),
            branch_name: String::new(),
            hub: String::new(),
            status: String::new(),
            sub_status: String::new(),
            primary_owner: String::new(),
            secondary_owner: String::new(),
            warranty_start_date: String::new(),
            warranty_end_date: String::new(),
            found_asset: String::new(),
            pav_status: PavStatus::NotDone,
            asset_status: None,
            remarks: None,
            new_branch_code: String::new(),
            disposal_ticket: String::new(),
            other_remarks: String::new(),
            engineer_name: String::new(),
            pav_date: String::new(),
            passthrough: IndexMap::new(),
        }
    }

    /// Mutable access to a free-text managed field. Returns `None` for the
    /// enum-typed fields (`pavStatus`, `assetStatus`, remarks).
    pub fn text_field_mut(&mut self, field: ManagedField) -> Option<&mut String> {
        let slot = match field {
            ManagedField::AssetCode => &mut self.asset_code,
            ManagedField::SerialNumber => &mut self.serial_number,
            ManagedField::Make => &mut self.make,
            ManagedField::Model => &mut self.model,
            ManagedField::AssetType => &mut self.asset_type,
            ManagedField::BranchCode => &mut self.branch_code,
            ManagedField::BranchName => &mut self.branch_name,
            ManagedField::Hub => &mut self.hub,
            ManagedField::Status => &mut self.status,
            ManagedField::SubStatus => &mut self.sub_status,
            ManagedField::PrimaryOwner => &mut self.primary_owner,
            ManagedField::SecondaryOwner => &mut self.secondary_owner,
            ManagedField::WarrantyStartDate => &mut self.warranty_start_date,
            ManagedField::WarrantyEndDate => &mut self.warranty_end_date,
            ManagedField::FoundAsset => &mut self.found_asset,
            ManagedField::NewBranchCode => &mut self.new_branch_code,
            ManagedField::DisposalTicket => &mut self.disposal_ticket,
            ManagedField::OtherRemarks => &mut self.other_remarks,
            ManagedField::EngineerName => &mut self.engineer_name,
            ManagedField::PavDate => &mut self.pav_date,
            ManagedField::PavStatus
            | ManagedField::AssetStatus
            | ManagedField::AssetAvailabilityRemarks => return None,
        };
        Some(slot)
    }

    /// Stringified value of a managed field; unset enums read as "".
    pub fn field_value(&self, field: ManagedField) -> &str {
        match field {
            ManagedField::AssetCode => &self.asset_code,
            ManagedField::SerialNumber => &self.serial_number,
            ManagedField::Make => &self.make,
            ManagedField::Model => &self.model,
            ManagedField::AssetType => &self.asset_type,
            ManagedField::BranchCode => &self.branch_code,
            ManagedField::BranchName => &self.branch_name,
            ManagedField::Hub => &self.hub,
            ManagedField::Status => &self.status,
            ManagedField::SubStatus => &self.sub_status,
            ManagedField::PrimaryOwner => &self.primary_owner,
            ManagedField::SecondaryOwner => &self.secondary_owner,
            ManagedField::WarrantyStartDate => &self.warranty_start_date,
            ManagedField::WarrantyEndDate => &self.warranty_end_date,
            ManagedField::FoundAsset => &self.found_asset,
            ManagedField::PavStatus => self.pav_status.as_str(),
            ManagedField::AssetStatus => self.asset_status.map_or("", AssetStatus::as_str),
            ManagedField::AssetAvailabilityRemarks => {
                self.remarks.map_or("", AvailabilityRemarks::as_str)
            }
            ManagedField::NewBranchCode => &self.new_branch_code,
            ManagedField::DisposalTicket => &self.disposal_ticket,
            ManagedField::OtherRemarks => &self.other_remarks,
            ManagedField::EngineerName => &self.engineer_name,
            ManagedField::PavDate => &self.pav_date,
        }
    }

    /// Passthrough cell stored under the exact header text.
    pub fn passthrough_value(&self, header: &str) -> Option<&CellValue> {
        self.passthrough.get(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pav_status_from_import_is_trimmed_and_case_folded() {
        assert_eq!(PavStatus::from_import("  AVAILABLE "), PavStatus::Available);
        assert_eq!(PavStatus::from_import("not available"), PavStatus::NotAvailable);
        assert_eq!(PavStatus::from_import("Done"), PavStatus::NotDone);
        assert_eq!(PavStatus::from_import(""), PavStatus::NotDone);
    }

    #[test]
    fn pav_status_coerce_requires_exact_display() {
        assert_eq!(PavStatus::coerce("Available"), PavStatus::Available);
        assert_eq!(PavStatus::coerce("Not Available"), PavStatus::NotAvailable);
        assert_eq!(PavStatus::coerce("available"), PavStatus::NotDone);
        assert_eq!(PavStatus::coerce("Pending"), PavStatus::NotDone);
    }

    #[test]
    fn asset_status_from_import() {
        assert_eq!(AssetStatus::from_import(" in use"), Some(AssetStatus::InUse));
        assert_eq!(AssetStatus::from_import("NOT FOUND"), Some(AssetStatus::NotFound));
        assert_eq!(AssetStatus::from_import("in-use"), None);
    }

    #[test]
    fn remarks_from_import() {
        assert_eq!(
            AvailabilityRemarks::from_import("available in different branch"),
            Some(AvailabilityRemarks::DifferentBranch)
        );
        assert_eq!(
            AvailabilityRemarks::from_import("OTHER "),
            Some(AvailabilityRemarks::Other)
        );
        assert_eq!(AvailabilityRemarks::from_import("elsewhere"), None);
    }

    #[test]
    fn field_value_reads_unset_enums_as_empty() {
        let record = AssetRecord::new(AssetId::new("a"));
        assert_eq!(record.field_value(ManagedField::AssetStatus), "");
        assert_eq!(record.field_value(ManagedField::AssetAvailabilityRemarks), "");
        assert_eq!(record.field_value(ManagedField::PavStatus), "Not Done");
    }

    #[test]
    fn text_field_mut_covers_every_string_field() {
        let mut record = AssetRecord::new(AssetId::new("a"));
        for field in ManagedField::ALL {
            if let Some(slot) = record.text_field_mut(field) {
                *slot = field.canonical_name().to_string();
            }
        }
        for field in ManagedField::ALL {
            if record.text_field_mut(field).is_some() {
                assert_eq!(record.field_value(field), field.canonical_name());
            }
        }
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let mut record = AssetRecord::new(AssetId::new("A1-0-1-abc"));
        record.remarks = Some(AvailabilityRemarks::Other);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "A1-0-1-abc");
        assert_eq!(json["pavStatus"], "Not Done");
        assert_eq!(json["assetAvailabilityRemarks"], "Other");
        assert!(json["assetStatus"].is_null());

        let back: AssetRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
