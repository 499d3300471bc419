use crate::{
    error::WardError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use ward_calendar_api_structs::add_feed_source::{APIResponse, PathParams, RequestBody};
use ward_calendar_domain::{FeedSource, ID};
use ward_calendar_infra::WardContext;

fn error_handler(e: UseCaseError) -> WardError {
    match e {
        UseCaseError::UnitNotFound(unit_id) => {
            WardError::NotFound(format!("The unit with id: {}, was not found.", unit_id))
        }
        UseCaseError::InvalidUrl(url) => {
            WardError::BadClientData(format!("Invalid feed url given: {:?}", url))
        }
        UseCaseError::AlreadyConfigured => {
            WardError::Conflict("The feed url is already configured for this unit.".into())
        }
        UseCaseError::StorageError => WardError::InternalError,
    }
}

pub async fn add_feed_source_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<WardContext>,
) -> Result<HttpResponse, WardError> {
    let usecase = AddFeedSourceUseCase {
        unit_id: path_params.unit_id,
        url: body.0.url,
    };

    execute(usecase, &ctx)
        .await
        .map(|feed_source| HttpResponse::Created().json(APIResponse::new(feed_source)))
        .map_err(error_handler)
}

#[derive(Debug)]
pub struct AddFeedSourceUseCase {
    pub unit_id: ID,
    pub url: String,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    UnitNotFound(ID),
    InvalidUrl(String),
    AlreadyConfigured,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for AddFeedSourceUseCase {
    type Response = FeedSource;

    type Errors = UseCaseError;

    const NAME: &'static str = "AddFeedSource";

    async fn execute(&mut self, ctx: &WardContext) -> Result<Self::Response, Self::Errors> {
        let url = FeedSource::parse_url(&self.url)
            .ok_or_else(|| UseCaseError::InvalidUrl(self.url.clone()))?;

        match ctx.repos.units.find(&self.unit_id).await {
            Ok(Some(_)) => (),
            Ok(None) => return Err(UseCaseError::UnitNotFound(self.unit_id)),
            Err(_) => return Err(UseCaseError::StorageError),
        };

        let configured = ctx
            .repos
            .feed_sources
            .find_by_unit(&self.unit_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if configured.iter().any(|f| f.url == url) {
            return Err(UseCaseError::AlreadyConfigured);
        }

        let feed_source = FeedSource::new(&self.unit_id, url);
        ctx.repos
            .feed_sources
            .insert(&feed_source)
            .await
            .map(|_| feed_source)
            .map_err(|_| UseCaseError::StorageError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::test_helpers::{setup, TestContext};

    #[actix_web::test]
    async fn adds_webcal_feed_as_https() {
        let TestContext { ctx, unit, .. } = setup(0).await;
        let mut usecase = AddFeedSourceUseCase {
            unit_id: unit.id,
            url: "webcal://calendar.example.org/riverside.ics".into(),
        };

        let feed_source = usecase.execute(&ctx).await.unwrap();
        assert_eq!(
            feed_source.url.as_str(),
            "https://calendar.example.org/riverside.ics"
        );
        assert_eq!(
            ctx.repos.feed_sources.find_by_unit(&unit.id).await.unwrap(),
            vec![feed_source]
        );

        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::AlreadyConfigured)
        );
    }

    #[actix_web::test]
    async fn rejects_unsupported_url() {
        let TestContext { ctx, unit, .. } = setup(0).await;
        let mut usecase = AddFeedSourceUseCase {
            unit_id: unit.id,
            url: "ftp://calendar.example.org/riverside.ics".into(),
        };

        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::InvalidUrl(_))
        ));
    }
}
