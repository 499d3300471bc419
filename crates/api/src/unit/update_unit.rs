use crate::{
    error::WardError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use ward_calendar_api_structs::update_unit::{APIResponse, PathParams, RequestBody};
use ward_calendar_domain::{OrphanedEventsPolicy, Unit, ID};
use ward_calendar_infra::WardContext;

fn error_handler(e: UseCaseError) -> WardError {
    match e {
        UseCaseError::NotFound(unit_id) => {
            WardError::NotFound(format!("The unit with id: {}, was not found.", unit_id))
        }
        UseCaseError::InvalidSettings(e) => WardError::BadClientData(e),
        UseCaseError::StorageError => WardError::InternalError,
    }
}

pub async fn update_unit_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<WardContext>,
) -> Result<HttpResponse, WardError> {
    let body = body.0;
    let usecase = UpdateUnitUseCase {
        unit_id: path_params.unit_id,
        name: body.name,
        timezone: body.timezone,
        orphaned_events: body.orphaned_events,
    };

    execute(usecase, &ctx)
        .await
        .map(|unit| HttpResponse::Ok().json(APIResponse::new(unit)))
        .map_err(error_handler)
}

#[derive(Debug)]
pub struct UpdateUnitUseCase {
    pub unit_id: ID,
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub orphaned_events: Option<OrphanedEventsPolicy>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    InvalidSettings(String),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateUnitUseCase {
    type Response = Unit;

    type Errors = UseCaseError;

    const NAME: &'static str = "UpdateUnit";

    async fn execute(&mut self, ctx: &WardContext) -> Result<Self::Response, Self::Errors> {
        let mut unit = match ctx.repos.units.find(&self.unit_id).await {
            Ok(Some(unit)) => unit,
            Ok(None) => return Err(UseCaseError::NotFound(self.unit_id)),
            Err(_) => return Err(UseCaseError::StorageError),
        };

        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(UseCaseError::InvalidSettings(
                    "The unit name is empty".into(),
                ));
            }
            unit.name = name.to_string();
        }
        if let Some(timezone) = &self.timezone {
            if !unit.settings.set_timezone(timezone) {
                return Err(UseCaseError::InvalidSettings(format!(
                    "Invalid timezone given: {:?}",
                    timezone
                )));
            }
        }
        if let Some(orphaned_events) = self.orphaned_events {
            unit.settings.orphaned_events = orphaned_events;
        }

        ctx.repos
            .units
            .save(&unit)
            .await
            .map(|_| unit)
            .map_err(|_| UseCaseError::StorageError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::test_helpers::{setup, TestContext};

    #[actix_web::test]
    async fn updates_only_given_fields() {
        let TestContext { ctx, unit, .. } = setup(0).await;
        let mut usecase = UpdateUnitUseCase {
            unit_id: unit.id,
            name: None,
            timezone: None,
            orphaned_events: Some(OrphanedEventsPolicy::Purge),
        };

        let updated = usecase.execute(&ctx).await.unwrap();
        assert_eq!(updated.name, unit.name);
        assert_eq!(updated.settings.timezone, unit.settings.timezone);
        assert_eq!(updated.settings.orphaned_events, OrphanedEventsPolicy::Purge);
        assert_eq!(ctx.repos.units.find(&unit.id).await.unwrap(), Some(updated));
    }

    #[actix_web::test]
    async fn rejects_invalid_timezone() {
        let TestContext { ctx, unit, .. } = setup(0).await;
        let mut usecase = UpdateUnitUseCase {
            unit_id: unit.id,
            name: None,
            timezone: Some("Nowhere/Atlantis".into()),
            orphaned_events: None,
        };

        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::InvalidSettings(_))
        ));
        assert_eq!(ctx.repos.units.find(&unit.id).await.unwrap(), Some(unit));
    }
}
