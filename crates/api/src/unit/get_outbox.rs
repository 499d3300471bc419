use crate::{
    error::WardError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use ward_calendar_api_structs::get_outbox::{APIResponse, PathParams, QueryParams};
use ward_calendar_domain::{OutboxRecord, ID};
use ward_calendar_infra::WardContext;

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 500;

fn error_handler(e: UseCaseError) -> WardError {
    match e {
        UseCaseError::UnitNotFound(unit_id) => {
            WardError::NotFound(format!("The unit with id: {}, was not found.", unit_id))
        }
        UseCaseError::StorageError => WardError::InternalError,
    }
}

pub async fn get_outbox_controller(
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<WardContext>,
) -> Result<HttpResponse, WardError> {
    let usecase = GetOutboxUseCase {
        unit_id: path_params.unit_id,
        after: query_params.after.unwrap_or(0),
        limit: query_params.limit.unwrap_or(DEFAULT_LIMIT),
    };

    execute(usecase, &ctx)
        .await
        .map(|records| HttpResponse::Ok().json(APIResponse::new(records)))
        .map_err(error_handler)
}

/// Replays the append-only outbox of a unit from a cursor
#[derive(Debug)]
pub struct GetOutboxUseCase {
    pub unit_id: ID,
    pub after: i64,
    pub limit: usize,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    UnitNotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetOutboxUseCase {
    type Response = Vec<OutboxRecord>;

    type Errors = UseCaseError;

    const NAME: &'static str = "GetOutbox";

    async fn execute(&mut self, ctx: &WardContext) -> Result<Self::Response, Self::Errors> {
        match ctx.repos.units.find(&self.unit_id).await {
            Ok(Some(_)) => (),
            Ok(None) => return Err(UseCaseError::UnitNotFound(self.unit_id)),
            Err(_) => return Err(UseCaseError::StorageError),
        };

        let limit = self.limit.clamp(1, MAX_LIMIT);
        ctx.repos
            .outbox
            .find_after(&self.unit_id, self.after, limit)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::test_helpers::{append_outbox, setup, TestContext};

    #[actix_web::test]
    async fn replays_from_cursor() {
        let TestContext { ctx, unit, .. } = setup(0).await;
        let records = append_outbox(&ctx, &unit, 4).await;

        let mut usecase = GetOutboxUseCase {
            unit_id: unit.id,
            after: records[1].id,
            limit: 1,
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res, vec![records[2].clone()]);

        let mut usecase = GetOutboxUseCase {
            unit_id: unit.id,
            after: 0,
            limit: 0,
        };
        assert_eq!(usecase.execute(&ctx).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn rejects_unknown_unit() {
        let TestContext { ctx, .. } = setup(0).await;
        let unit_id = ID::new();
        let mut usecase = GetOutboxUseCase {
            unit_id,
            after: 0,
            limit: 10,
        };
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::UnitNotFound(unit_id))
        );
    }
}
