use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::auth::Caller;
use crate::dto::api::ApiResponse;
use crate::dto::leads::{LeadPayload, LeadView, StatsPayload};
use crate::forms::leads::{CreateLeadForm, LeadListParams, UpdateLeadForm};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::leads as service;

#[get("/leads")]
pub async fn list_leads(
    caller: Caller,
    query: web::Query<Vec<(String, String)>>,
    repo: web::Data<DieselRepository>,
) -> HttpResponse {
    let params = LeadListParams::from_pairs(query.into_inner());
    match service::list_leads(repo.get_ref(), &caller, &params) {
        Ok(page) => HttpResponse::Ok().json(ApiResponse::success(page.map(LeadView::from))),
        Err(err) => error_response(err),
    }
}

#[post("/leads")]
pub async fn create_lead(
    caller: Caller,
    form: web::Json<CreateLeadForm>,
    repo: web::Data<DieselRepository>,
) -> HttpResponse {
    match service::create_lead(repo.get_ref(), &caller, form.into_inner()) {
        Ok(lead) => HttpResponse::Created().json(ApiResponse::with_message(
            "Lead created successfully",
            LeadPayload::from(lead),
        )),
        Err(err) => error_response(err),
    }
}

#[get("/leads/stats")]
pub async fn lead_stats(caller: Caller, repo: web::Data<DieselRepository>) -> HttpResponse {
    match service::lead_stats(repo.get_ref(), &caller) {
        Ok(stats) => HttpResponse::Ok().json(ApiResponse::success(StatsPayload { stats })),
        Err(err) => error_response(err),
    }
}

#[get("/leads/{id}")]
pub async fn get_lead(
    caller: Caller,
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> HttpResponse {
    match service::get_lead(repo.get_ref(), &caller, id.into_inner()) {
        Ok(lead) => HttpResponse::Ok().json(ApiResponse::success(LeadPayload::from(lead))),
        Err(err) => error_response(err),
    }
}

#[put("/leads/{id}")]
pub async fn update_lead(
    caller: Caller,
    id: web::Path<i32>,
    form: web::Json<UpdateLeadForm>,
    repo: web::Data<DieselRepository>,
) -> HttpResponse {
    match service::update_lead(repo.get_ref(), &caller, id.into_inner(), form.into_inner()) {
        Ok(lead) => HttpResponse::Ok().json(ApiResponse::with_message(
            "Lead updated successfully",
            LeadPayload::from(lead),
        )),
        Err(err) => error_response(err),
    }
}

#[delete("/leads/{id}")]
pub async fn delete_lead(
    caller: Caller,
    id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> HttpResponse {
    match service::delete_lead(repo.get_ref(), &caller, id.into_inner()) {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::message("Lead deleted successfully")),
        Err(err) => error_response(err),
    }
}
