//! App-managed fields and their recognised header spellings.
//!
//! One static alias table serves both directions: the normalizer uses it to
//! find a managed field's value on an imported row, and the export projector
//! uses it to decide which original column a managed field writes back to.
//! Matching is exact after case-folding; whitespace is never normalized.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::sheet::{CellValue, RawRow};

// ---------------------------------------------------------------------------
// Managed fields
// ---------------------------------------------------------------------------

/// A semantic field the application interprets, validates, or stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ManagedField {
    AssetCode,
    SerialNumber,
    Make,
    Model,
    AssetType,
    BranchCode,
    BranchName,
    Hub,
    Status,
    SubStatus,
    PrimaryOwner,
    SecondaryOwner,
    WarrantyStartDate,
    WarrantyEndDate,
    FoundAsset,
    PavStatus,
    AssetStatus,
    AssetAvailabilityRemarks,
    NewBranchCode,
    DisposalTicket,
    OtherRemarks,
    EngineerName,
    PavDate,
}

impl ManagedField {
    /// Every managed field, in table order.
    pub const ALL: [ManagedField; 23] = [
        Self::AssetCode,
        Self::SerialNumber,
        Self::Make,
        Self::Model,
        Self::AssetType,
        Self::BranchCode,
        Self::BranchName,
        Self::Hub,
        Self::Status,
        Self::SubStatus,
        Self::PrimaryOwner,
        Self::SecondaryOwner,
        Self::WarrantyStartDate,
        Self::WarrantyEndDate,
        Self::FoundAsset,
        Self::PavStatus,
        Self::AssetStatus,
        Self::AssetAvailabilityRemarks,
        Self::NewBranchCode,
        Self::DisposalTicket,
        Self::OtherRemarks,
        Self::EngineerName,
        Self::PavDate,
    ];

    /// Accepted header spellings, canonical name first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::AssetCode => &["assetCode", "Asset Code", "Asset_Code"],
            Self::SerialNumber => &["serialNumber", "Serial Number", "Serial_Number"],
            Self::Make => &["make", "Make"],
            Self::Model => &["model", "Model"],
            Self::AssetType => &["assetType", "Asset Type"],
            Self::BranchCode => &["branchCode", "Branch code"],
            Self::BranchName => &["branchName", "Branch Name"],
            Self::Hub => &["hub", "Hub"],
            Self::Status => &["status", "Status"],
            Self::SubStatus => &["subStatus", "Sub status"],
            Self::PrimaryOwner => &["primaryOwner", "Primary Owner"],
            Self::SecondaryOwner => &["secondaryOwner", "Secondary owner"],
            Self::WarrantyStartDate => &["warrantyStartDate", "Warranty Start Date"],
            Self::WarrantyEndDate => &["warrantyEndDate", "Warranty End Date"],
            Self::FoundAsset => &["foundAsset", "Same Asset or Additional Found Asset"],
            Self::PavStatus => &["pavStatus", "PV Status", "PAV Status"],
            Self::AssetStatus => &["assetStatus", "Asset Status"],
            Self::AssetAvailabilityRemarks => {
                &["assetAvailabilityRemarks", "Asset Availability Remarks"]
            }
            Self::NewBranchCode => &["newBranchCode", "New Branch Code"],
            Self::DisposalTicket => &["disposalTicket", "Disposal Ticket"],
            Self::OtherRemarks => &["otherRemarks", "Other Remarks", "Comment", "Comments"],
            Self::EngineerName => &["engineerName", "Engineer Name", "Audited By"],
            Self::PavDate => &[
                "pavDate",
                "PAV Date",
                "PV Date",
                "Audit Date",
                "PAV Date of visit (DD-MMM-YYYY i.e: 15-Mar-2021)",
            ],
        }
    }

    /// The canonical (first) alias.
    pub fn canonical_name(self) -> &'static str {
        self.aliases()[0]
    }
}

impl std::fmt::Display for ManagedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_name())
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

static STANDARD: LazyLock<AliasResolver> = LazyLock::new(AliasResolver::build);

/// Case-insensitive lookup from header text to managed field.
#[derive(Debug, Clone)]
pub struct AliasResolver {
    reverse: HashMap<String, ManagedField>,
}

impl AliasResolver {
    /// The process-wide resolver built from the static alias table.
    pub fn standard() -> &'static AliasResolver {
        &STANDARD
    }

    fn build() -> Self {
        let mut reverse = HashMap::new();
        for field in ManagedField::ALL {
            for alias in field.aliases() {
                reverse.insert(alias.to_lowercase(), field);
            }
        }
        Self { reverse }
    }

    /// Ordered header spellings for `field`.
    pub fn aliases(&self, field: ManagedField) -> &'static [&'static str] {
        field.aliases()
    }

    /// Resolve an arbitrary header. `None` means the column is passthrough.
    pub fn resolve(&self, header: &str) -> Option<ManagedField> {
        self.reverse.get(&header.to_lowercase()).copied()
    }

    /// Find `field`'s value on a raw row.
    ///
    /// Aliases are tried in table order and, for each alias, row keys in
    /// column order; the first cell that is not [`CellValue::Empty`] and
    /// whose key matches wins. An empty string is a value and does match.
    pub fn find_in_row<'r>(&self, row: &'r RawRow, field: ManagedField) -> Option<&'r CellValue> {
        field.aliases().iter().find_map(|alias| {
            let wanted = alias.to_lowercase();
            row.iter()
                .find(|(key, value)| {
                    !matches!(value, CellValue::Empty) && key.to_lowercase() == wanted
                })
                .map(|(_, value)| value)
        })
    }
}
