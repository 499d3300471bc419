use super::{dispatch_outbox::DispatchOutboxUseCase, refresh_unit::RefreshUnitUseCase};
use crate::shared::usecase::{execute, Subscriber};
use ward_calendar_domain::RefreshSummary;
use ward_calendar_infra::WardContext;

pub struct DispatchOutboxOnUnitRefreshed;

#[async_trait::async_trait(?Send)]
impl Subscriber<RefreshUnitUseCase> for DispatchOutboxOnUnitRefreshed {
    async fn notify(&self, summary: &RefreshSummary, ctx: &WardContext) {
        if summary.committed_changes().total() == 0 {
            return;
        }

        let dispatch_outbox = DispatchOutboxUseCase {
            unit_id: summary.unit_id,
        };

        // Sideeffect, ignore result. Whatever is left is picked up by the dispatch job
        let _ = execute(dispatch_outbox, ctx).await;
    }
}
