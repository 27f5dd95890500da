use crate::action::SyncAction;
use crate::model::{ReconSummary, SyncResultRow};

/// Count result rows per action.
pub fn compute_summary(provided_rows: usize, current_rows: usize, rows: &[SyncResultRow]) -> ReconSummary {
    let mut summary = ReconSummary {
        provided_rows,
        current_rows,
        total_rows: rows.len(),
        ..Default::default()
    };

    for row in rows {
        match row.action {
            SyncAction::Add => summary.add += 1,
            SyncAction::Update => summary.update += 1,
            SyncAction::Delete => summary.delete += 1,
            SyncAction::Keep => {
                summary.keep += 1;
                if row.readmitted {
                    summary.readmitted_keep += 1;
                }
            }
        }
    }

    summary
}
