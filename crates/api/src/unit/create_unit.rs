use crate::{
    error::WardError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use ward_calendar_api_structs::create_unit::{APIResponse, RequestBody};
use ward_calendar_domain::{OrphanedEventsPolicy, Unit};
use ward_calendar_infra::WardContext;

fn error_handler(e: UseCaseError) -> WardError {
    match e {
        UseCaseError::InvalidTimezone(timezone) => {
            WardError::BadClientData(format!("Invalid timezone given: {:?}", timezone))
        }
        UseCaseError::EmptyName => WardError::BadClientData("The unit name is empty".into()),
        UseCaseError::StorageError => WardError::InternalError,
    }
}

pub async fn create_unit_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<WardContext>,
) -> Result<HttpResponse, WardError> {
    let body = body.0;
    let usecase = CreateUnitUseCase {
        name: body.name,
        timezone: body.timezone,
        orphaned_events: body.orphaned_events.unwrap_or_default(),
    };

    execute(usecase, &ctx)
        .await
        .map(|unit| HttpResponse::Created().json(APIResponse::new(unit)))
        .map_err(error_handler)
}

#[derive(Debug)]
pub struct CreateUnitUseCase {
    pub name: String,
    pub timezone: Option<String>,
    pub orphaned_events: OrphanedEventsPolicy,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EmptyName,
    InvalidTimezone(String),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateUnitUseCase {
    type Response = Unit;

    type Errors = UseCaseError;

    const NAME: &'static str = "CreateUnit";

    async fn execute(&mut self, ctx: &WardContext) -> Result<Self::Response, Self::Errors> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(UseCaseError::EmptyName);
        }

        let mut unit = Unit::new(name);
        if let Some(timezone) = &self.timezone {
            if !unit.settings.set_timezone(timezone) {
                return Err(UseCaseError::InvalidTimezone(timezone.clone()));
            }
        }
        unit.settings.orphaned_events = self.orphaned_events;

        ctx.repos
            .units
            .insert(&unit)
            .await
            .map(|_| unit)
            .map_err(|_| UseCaseError::StorageError)
    }
}
