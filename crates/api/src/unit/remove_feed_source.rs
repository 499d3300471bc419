use crate::{
    error::WardError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use ward_calendar_api_structs::remove_feed_source::{APIResponse, PathParams};
use ward_calendar_domain::{FeedSource, ID};
use ward_calendar_infra::WardContext;

fn error_handler(e: UseCaseError) -> WardError {
    match e {
        UseCaseError::NotFound(feed_source_id) => WardError::NotFound(format!(
            "The feed source with id: {}, was not found.",
            feed_source_id
        )),
        UseCaseError::StorageError => WardError::InternalError,
    }
}

pub async fn remove_feed_source_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<WardContext>,
) -> Result<HttpResponse, WardError> {
    let usecase = RemoveFeedSourceUseCase {
        unit_id: path_params.unit_id,
        feed_source_id: path_params.feed_source_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|feed_source| HttpResponse::Ok().json(APIResponse::new(feed_source)))
        .map_err(error_handler)
}

/// Stops reconciling a feed. Its stored events are handled by the
/// orphaned events policy of the unit on the next refresh.
#[derive(Debug)]
pub struct RemoveFeedSourceUseCase {
    pub unit_id: ID,
    pub feed_source_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for RemoveFeedSourceUseCase {
    type Response = FeedSource;

    type Errors = UseCaseError;

    const NAME: &'static str = "RemoveFeedSource";

    async fn execute(&mut self, ctx: &WardContext) -> Result<Self::Response, Self::Errors> {
        let configured = ctx
            .repos
            .feed_sources
            .find_by_unit(&self.unit_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if !configured.iter().any(|f| f.id == self.feed_source_id) {
            return Err(UseCaseError::NotFound(self.feed_source_id));
        }

        match ctx.repos.feed_sources.delete(&self.feed_source_id).await {
            Ok(Some(feed_source)) => Ok(feed_source),
            Ok(None) => Err(UseCaseError::NotFound(self.feed_source_id)),
            Err(_) => Err(UseCaseError::StorageError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::test_helpers::{setup, TestContext};

    #[actix_web::test]
    async fn removes_feed_source_of_the_unit_only() {
        let TestContext {
            ctx,
            unit,
            feed_sources,
            ..
        } = setup(1).await;

        let mut other_unit = RemoveFeedSourceUseCase {
            unit_id: ID::new(),
            feed_source_id: feed_sources[0].id,
        };
        assert_eq!(
            other_unit.execute(&ctx).await,
            Err(UseCaseError::NotFound(feed_sources[0].id))
        );

        let mut usecase = RemoveFeedSourceUseCase {
            unit_id: unit.id,
            feed_source_id: feed_sources[0].id,
        };
        assert_eq!(usecase.execute(&ctx).await, Ok(feed_sources[0].clone()));
        assert!(ctx
            .repos
            .feed_sources
            .find_by_unit(&unit.id)
            .await
            .unwrap()
            .is_empty());
    }
}
