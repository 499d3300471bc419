use crate::{
    error::WardError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use ward_calendar_api_structs::get_unit::{APIResponse, PathParams};
use ward_calendar_domain::{Unit, ID};
use ward_calendar_infra::WardContext;

fn error_handler(e: UseCaseError) -> WardError {
    match e {
        UseCaseError::NotFound(unit_id) => {
            WardError::NotFound(format!("The unit with id: {}, was not found.", unit_id))
        }
        UseCaseError::StorageError => WardError::InternalError,
    }
}

pub async fn get_unit_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<WardContext>,
) -> Result<HttpResponse, WardError> {
    let usecase = GetUnitUseCase {
        unit_id: path_params.unit_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|unit| HttpResponse::Ok().json(APIResponse::new(unit)))
        .map_err(error_handler)
}

#[derive(Debug)]
pub struct GetUnitUseCase {
    pub unit_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetUnitUseCase {
    type Response = Unit;

    type Errors = UseCaseError;

    const NAME: &'static str = "GetUnit";

    async fn execute(&mut self, ctx: &WardContext) -> Result<Self::Response, Self::Errors> {
        match ctx.repos.units.find(&self.unit_id).await {
            Ok(Some(unit)) => Ok(unit),
            Ok(None) => Err(UseCaseError::NotFound(self.unit_id)),
            Err(_) => Err(UseCaseError::StorageError),
        }
    }
}
