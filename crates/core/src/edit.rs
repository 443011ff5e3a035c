//! Edit reconciler: validates a proposed edit to one asset record and
//! produces the replacement record.
//!
//! The form side effects (remarks switching, ticket sanitizing) live on
//! [`EditDraft`] so they apply while the user types; [`reconcile_edit`] runs
//! the save-time validation and stamping. Neither touches the original
//! record: a rejected edit leaves the caller's data exactly as it was.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::record::{AssetId, AssetRecord, AssetStatus, AvailabilityRemarks, PavStatus};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Value a new-branch-code field holds when it does not apply.
pub const BRANCH_CODE_PLACEHOLDER: &str = "N/A";

/// Prefix every disposal ticket starts with.
pub const TICKET_PREFIX: &str = "RITM";

/// Number of digits after [`TICKET_PREFIX`].
pub const TICKET_DIGITS: usize = 7;

static TICKET_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{7}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons an edit is rejected, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "Auditor Name is required. Please close this window and enter it in the field at the top of the page before saving."
    )]
    AuditorRequired,

    #[error("Asset must have either an Asset Code or a Serial Number.")]
    IdentityRequired,

    #[error("New Branch Code is required for this remark.")]
    BranchCodeRequired,

    #[error("Disposal Ticket must be \"RITM\" followed by exactly 7 digits.")]
    TicketFormatInvalid,

    #[error("Custom Comment is required for 'Other' remark.")]
    CustomRemarkRequired,
}

// ---------------------------------------------------------------------------
// Audit context
// ---------------------------------------------------------------------------

/// Who is auditing and on which day. Passed into every edit explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditContext {
    pub auditor_name: String,
    pub verification_date: Option<NaiveDate>,
}

impl AuditContext {
    pub fn new(auditor_name: impl Into<String>, verification_date: Option<NaiveDate>) -> Self {
        Self {
            auditor_name: auditor_name.into(),
            verification_date,
        }
    }

    /// Trimmed auditor name, `None` when blank.
    pub fn auditor(&self) -> Option<&str> {
        let name = self.auditor_name.trim();
        (!name.is_empty()).then_some(name)
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Editable inputs of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    AssetCode,
    SerialNumber,
    PavStatus,
    AssetStatus,
    AssetAvailabilityRemarks,
    NewBranchCode,
    DisposalTicket,
    OtherRemarks,
}

/// In-progress edit of one record's editable fields.
///
/// `pav_status` keeps the raw form value; it is coerced when the edit is
/// reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDraft {
    pub asset_code: String,
    pub serial_number: String,
    pub pav_status: String,
    pub asset_status: Option<AssetStatus>,
    pub remarks: Option<AvailabilityRemarks>,
    pub new_branch_code: String,
    pub disposal_ticket: String,
    pub other_remarks: String,
}

impl EditDraft {
    /// Prefill the form from the current record.
    pub fn from_record(record: &AssetRecord) -> Self {
        Self {
            asset_code: record.asset_code.clone(),
            serial_number: record.serial_number.clone(),
            pav_status: record.pav_status.as_str().to_string(),
            asset_status: record.asset_status,
            remarks: record.remarks,
            new_branch_code: record.new_branch_code.clone(),
            disposal_ticket: record.disposal_ticket.clone(),
            other_remarks: record.other_remarks.clone(),
        }
    }

    /// Apply one form input, including its side effects.
    ///
    /// Select inputs take the enum display string; anything unrecognised
    /// clears the selection.
    pub fn set_input(&mut self, field: DraftField, value: &str) {
        match field {
            DraftField::AssetCode => self.asset_code = value.to_string(),
            DraftField::SerialNumber => self.serial_number = value.to_string(),
            DraftField::PavStatus => self.pav_status = value.to_string(),
            DraftField::AssetStatus => self.asset_status = AssetStatus::from_display(value),
            DraftField::AssetAvailabilityRemarks => {
                self.set_remarks(AvailabilityRemarks::from_display(value))
            }
            DraftField::NewBranchCode => self.new_branch_code = value.to_string(),
            DraftField::DisposalTicket => self.set_ticket_input(value),
            DraftField::OtherRemarks => self.other_remarks = value.to_string(),
        }
    }

    /// Change the remarks selection.
    ///
    /// Resets the branch code ("" when a different branch is chosen so the
    /// user must type one, the placeholder otherwise) and the ticket (bare
    /// prefix). Other remarks are left alone.
    pub fn set_remarks(&mut self, remarks: Option<AvailabilityRemarks>) {
        self.remarks = remarks;
        self.new_branch_code = if remarks == Some(AvailabilityRemarks::DifferentBranch) {
            String::new()
        } else {
            BRANCH_CODE_PLACEHOLDER.to_string()
        };
        self.disposal_ticket = TICKET_PREFIX.to_string();
    }

    pub fn set_ticket_input(&mut self, value: &str) {
        self.disposal_ticket = sanitize_ticket_input(value);
    }
}

// ---------------------------------------------------------------------------
// Pure functions
// ---------------------------------------------------------------------------

/// Keep the prefix plus at most seven digits typed after it.
pub fn sanitize_ticket_input(value: &str) -> String {
    let rest = value.strip_prefix(TICKET_PREFIX).unwrap_or(value);
    let digits: String = rest
        .chars()
        .filter(char::is_ascii_digit)
        .take(TICKET_DIGITS)
        .collect();
    format!("{TICKET_PREFIX}{digits}")
}

/// Run the save-time checks in order and report the first failure.
pub fn validate_draft(draft: &EditDraft, ctx: &AuditContext) -> Result<(), ValidationError> {
    if ctx.auditor().is_none() {
        return Err(ValidationError::AuditorRequired);
    }

    if draft.asset_code.trim().is_empty() && draft.serial_number.trim().is_empty() {
        return Err(ValidationError::IdentityRequired);
    }

    match draft.remarks {
        Some(AvailabilityRemarks::DifferentBranch) => {
            let code = draft.new_branch_code.trim();
            if code.is_empty() || code == BRANCH_CODE_PLACEHOLDER {
                return Err(ValidationError::BranchCodeRequired);
            }
        }
        Some(AvailabilityRemarks::DisposalVendor) => {
            let number = draft.disposal_ticket.replacen(TICKET_PREFIX, "", 1);
            if !TICKET_NUMBER_RE.is_match(number.trim()) {
                return Err(ValidationError::TicketFormatInvalid);
            }
        }
        Some(AvailabilityRemarks::Other) => {
            if draft.other_remarks.trim().is_empty() {
                return Err(ValidationError::CustomRemarkRequired);
            }
        }
        Some(AvailabilityRemarks::SameBranch) | None => {}
    }

    Ok(())
}

/// Validate `draft` and build the replacement for `record`.
///
/// On success the returned record is marked edited, stamped with the
/// auditor, and (first verification only) stamped with the audit date.
pub fn reconcile_edit(
    record: &AssetRecord,
    draft: &EditDraft,
    ctx: &AuditContext,
) -> Result<AssetRecord, ValidationError> {
    if let Err(err) = validate_draft(draft, ctx) {
        tracing::debug!(asset_id = %record.id, error = %err, "Edit rejected");
        return Err(err);
    }

    let mut updated = record.clone();
    updated.asset_code = draft.asset_code.clone();
    updated.serial_number = draft.serial_number.clone();
    updated.pav_status = PavStatus::coerce(&draft.pav_status);
    updated.asset_status = draft.asset_status;
    updated.remarks = draft.remarks;
    updated.new_branch_code = draft.new_branch_code.clone();
    updated.disposal_ticket = draft.disposal_ticket.clone();
    updated.other_remarks = draft.other_remarks.clone();
    updated.edited = true;

    if let Some(auditor) = ctx.auditor() {
        updated.engineer_name = auditor.to_string();
    }
    if let Some(date) = ctx.verification_date {
        if record.pav_date.is_empty() && updated.pav_status != PavStatus::NotDone {
            updated.pav_date = date.format("%Y-%m-%d").to_string();
        }
    }

    Ok(updated)
}

/// Find `id` in `records` and reconcile `draft` against it.
///
/// Returns the position and the replacement record; `records` itself is
/// never touched, so the caller decides how to publish the new revision.
pub fn edit_record(
    records: &[AssetRecord],
    id: &AssetId,
    draft: &EditDraft,
    ctx: &AuditContext,
) -> Result<(usize, AssetRecord), CoreError> {
    let index = records
        .iter()
        .position(|r| &r.id == id)
        .ok_or_else(|| CoreError::NotFound(id.clone()))?;
    let updated = reconcile_edit(&records[index], draft, ctx)?;
    Ok((index, updated))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn make_record() -> AssetRecord {
        let mut r = AssetRecord::new(AssetId::new("A1-0-1-abcdefg"));
        r.asset_code = "A1".into();
        r.serial_number = "S1".into();
        r.model = "X".into();
        r
    }

    fn ctx() -> AuditContext {
        AuditContext::new(
            "  Jane Doe ",
            NaiveDate::from_ymd_opt(2024, 3, 15),
        )
    }

    fn draft_with(remarks: AvailabilityRemarks) -> EditDraft {
        let mut draft = EditDraft::from_record(&make_record());
        draft.set_remarks(Some(remarks));
        draft
    }

    // -- validation order --

    #[test]
    fn auditor_is_checked_first() {
        let mut draft = EditDraft::from_record(&make_record());
        draft.asset_code.clear();
        draft.serial_number.clear();
        let no_auditor = AuditContext::new("   ", None);
        assert_matches!(
            validate_draft(&draft, &no_auditor),
            Err(ValidationError::AuditorRequired)
        );
        assert_matches!(
            validate_draft(&draft, &ctx()),
            Err(ValidationError::IdentityRequired)
        );
    }

    #[test]
    fn serial_alone_is_enough_identity() {
        let mut draft = EditDraft::from_record(&make_record());
        draft.asset_code = "  ".into();
        assert_eq!(validate_draft(&draft, &ctx()), Ok(()));
    }

    #[test]
    fn different_branch_needs_real_code() {
        let mut draft = draft_with(AvailabilityRemarks::DifferentBranch);
        assert_matches!(
            validate_draft(&draft, &ctx()),
            Err(ValidationError::BranchCodeRequired)
        );
        draft.set_input(DraftField::NewBranchCode, " N/A ");
        assert_matches!(
            validate_draft(&draft, &ctx()),
            Err(ValidationError::BranchCodeRequired)
        );
        draft.set_input(DraftField::NewBranchCode, "BR-042");
        assert_eq!(validate_draft(&draft, &ctx()), Ok(()));
    }

    #[test]
    fn short_ticket_is_rejected_and_record_unchanged() {
        let record = make_record();
        let before = record.clone();
        let mut draft = EditDraft::from_record(&record);
        draft.remarks = Some(AvailabilityRemarks::DisposalVendor);
        draft.disposal_ticket = "RITM12".into();

        assert_matches!(
            reconcile_edit(&record, &draft, &ctx()),
            Err(ValidationError::TicketFormatInvalid)
        );
        assert_eq!(record, before);
    }

    #[test]
    fn seven_digit_ticket_passes() {
        let mut draft = draft_with(AvailabilityRemarks::DisposalVendor);
        draft.set_input(DraftField::DisposalTicket, "RITM1234567");
        assert_eq!(validate_draft(&draft, &ctx()), Ok(()));
    }

    #[test]
    fn non_ascii_digits_are_not_a_ticket() {
        let mut draft = draft_with(AvailabilityRemarks::DisposalVendor);
        for ticket in ["RITM\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}\u{667}", "RITM１２３４５６７"] {
            draft.disposal_ticket = ticket.into();
            assert_matches!(
                validate_draft(&draft, &ctx()),
                Err(ValidationError::TicketFormatInvalid)
            );
        }
    }

    #[test]
    fn other_needs_custom_remark() {
        let mut draft = draft_with(AvailabilityRemarks::Other);
        draft.other_remarks = "   ".into();
        assert_matches!(
            validate_draft(&draft, &ctx()),
            Err(ValidationError::CustomRemarkRequired)
        );
        draft.set_input(DraftField::OtherRemarks, "Sent for repair");
        assert_eq!(validate_draft(&draft, &ctx()), Ok(()));
    }

    // -- form side effects --

    #[test]
    fn switching_remarks_resets_dependent_fields() {
        let mut draft = EditDraft::from_record(&make_record());
        draft.other_remarks = "keep me".into();

        draft.set_input(DraftField::AssetAvailabilityRemarks, "Available in different branch");
        assert_eq!(draft.remarks, Some(AvailabilityRemarks::DifferentBranch));
        assert_eq!(draft.new_branch_code, "");
        assert_eq!(draft.disposal_ticket, "RITM");

        draft.set_input(
            DraftField::AssetAvailabilityRemarks,
            "Asset picked up by disposal vendor",
        );
        assert_eq!(draft.new_branch_code, "N/A");
        assert_eq!(draft.disposal_ticket, "RITM");
        assert_eq!(draft.other_remarks, "keep me");
    }

    #[test]
    fn ticket_input_keeps_only_seven_digits() {
        assert_eq!(sanitize_ticket_input("RITM12a3"), "RITM123");
        assert_eq!(sanitize_ticket_input("RITM123456789"), "RITM1234567");
        assert_eq!(sanitize_ticket_input("RITM"), "RITM");
        assert_eq!(sanitize_ticket_input("98-76"), "RITM9876");
    }

    // -- stamping --

    #[test]
    fn successful_edit_is_stamped() {
        let record = make_record();
        let mut draft = EditDraft::from_record(&record);
        draft.set_input(DraftField::PavStatus, "Available");
        draft.set_input(DraftField::AssetStatus, "In Use");

        let updated = reconcile_edit(&record, &draft, &ctx()).unwrap();
        assert!(updated.edited);
        assert_eq!(updated.engineer_name, "Jane Doe");
        assert_eq!(updated.pav_status, PavStatus::Available);
        assert_eq!(updated.asset_status, Some(AssetStatus::InUse));
        assert_eq!(updated.pav_date, "2024-03-15");
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.model, "X");
    }

    #[test]
    fn existing_pav_date_is_kept() {
        let mut record = make_record();
        record.pav_date = "01-Feb-2024".into();
        let mut draft = EditDraft::from_record(&record);
        draft.pav_status = "Not Available".into();

        let updated = reconcile_edit(&record, &draft, &ctx()).unwrap();
        assert_eq!(updated.pav_date, "01-Feb-2024");
    }

    #[test]
    fn not_done_is_not_dated() {
        let record = make_record();
        let mut draft = EditDraft::from_record(&record);
        draft.pav_status = "Pending".into();

        let updated = reconcile_edit(&record, &draft, &ctx()).unwrap();
        assert_eq!(updated.pav_status, PavStatus::NotDone);
        assert_eq!(updated.pav_date, "");
        assert!(updated.edited);
    }

    #[test]
    fn no_date_configured_leaves_pav_date_empty() {
        let record = make_record();
        let mut draft = EditDraft::from_record(&record);
        draft.pav_status = "Available".into();

        let updated = reconcile_edit(&record, &draft, &AuditContext::new("Jane", None)).unwrap();
        assert_eq!(updated.pav_date, "");
        assert_eq!(updated.engineer_name, "Jane");
    }

    // -- record set --

    #[test]
    fn edit_record_locates_by_id() {
        let records = vec![make_record()];
        let mut draft = EditDraft::from_record(&records[0]);
        draft.pav_status = "Available".into();

        let (index, updated) = edit_record(&records, &records[0].id, &draft, &ctx()).unwrap();
        assert_eq!(index, 0);
        assert_eq!(updated.pav_status, PavStatus::Available);
        assert_eq!(records[0].pav_status, PavStatus::NotDone);
    }

    #[test]
    fn edit_record_unknown_id() {
        let records = vec![make_record()];
        let draft = EditDraft::from_record(&records[0]);
        assert_matches!(
            edit_record(&records, &AssetId::new("missing"), &draft, &ctx()),
            Err(CoreError::NotFound(_))
        );
    }

    #[test]
    fn edit_record_surfaces_validation() {
        let records = vec![make_record()];
        let draft = EditDraft::from_record(&records[0]);
        assert_matches!(
            edit_record(&records, &records[0].id, &draft, &AuditContext::default()),
            Err(CoreError::Validation(ValidationError::AuditorRequired))
        );
    }
}
