use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use dealership_core::{CarId, QuestionId};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(ask_question))
        .route("/my", get(my_questions))
        .route("/:id/answer", put(answer_question))
}

pub async fn ask_question(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Query(query): Query<dto::AskQuestionQuery>,
) -> axum::response::Response {
    let car_id: CarId = match errors::parse_id(&query.car_id, "car") {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services
        .marketplace
        .ask_question(principal.principal(), car_id, &query.question)
        .await
    {
        Ok(question) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "question_id": question.id.to_string(), "message": "question sent" })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn my_questions(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
) -> axum::response::Response {
    match services.marketplace.my_questions(principal.principal()).await {
        Ok(questions) => {
            let items = questions.iter().map(dto::question_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn answer_question(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    Query(query): Query<dto::AnswerQuery>,
) -> axum::response::Response {
    let id: QuestionId = match errors::parse_id(&id, "question") {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services
        .marketplace
        .answer_question(principal.principal(), id, &query.answer)
        .await
    {
        Ok(question) => (StatusCode::OK, Json(dto::question_to_json(&question))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
