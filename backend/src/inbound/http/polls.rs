//! Voting handlers.

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Poll, PollDraft, PollId, PollView, Vote};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Body for `POST /api/v1/polls`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub title: String,
    pub description: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    #[schema(example = 48)]
    pub duration_hours: i64,
}

impl TryFrom<CreatePollRequest> for PollDraft {
    type Error = Error;

    fn try_from(value: CreatePollRequest) -> Result<Self, Self::Error> {
        Self::try_new(
            &value.title,
            &value.description,
            [&value.option1, &value.option2, &value.option3],
            value.duration_hours,
        )
    }
}

/// Body for `POST /api/v1/polls/{id}/votes`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct VoteRequest {
    pub option: String,
}

/// Votes received by one option.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OptionCount {
    pub option: String,
    pub count: u64,
}

/// Poll as seen by a community member.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollDto {
    pub id: PollId,
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub finished: bool,
    pub already_voted: bool,
    /// Counts in option order, once the viewer voted or the poll closed.
    pub results: Option<Vec<OptionCount>>,
}

impl PollDto {
    fn new(
        poll: Poll,
        finished: bool,
        already_voted: bool,
        results: Option<Vec<OptionCount>>,
    ) -> Self {
        Self {
            id: poll.id,
            title: poll.title,
            description: poll.description,
            options: poll.options.into(),
            created_at: poll.created_at,
            closes_at: poll.closes_at,
            finished,
            already_voted,
            results,
        }
    }
}

impl From<PollView> for PollDto {
    fn from(view: PollView) -> Self {
        let results = view.results.map(|tally| {
            tally
                .into_iter()
                .map(|(option, count)| OptionCount { option, count })
                .collect()
        });
        Self::new(view.poll, view.finished, view.already_voted, results)
    }
}

/// Recorded vote.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteDto {
    pub poll_id: PollId,
    pub option: String,
    pub cast_at: DateTime<Utc>,
}

impl From<Vote> for VoteDto {
    fn from(vote: Vote) -> Self {
        Self {
            poll_id: vote.poll_id,
            option: vote.option,
            cast_at: vote.cast_at,
        }
    }
}

fn poll_id(raw: &str) -> Result<PollId, Error> {
    parse_id(raw, FieldName::new("id"))
}

/// Open a poll. President only.
#[utoipa::path(
    post,
    path = "/api/v1/polls",
    request_body = CreatePollRequest,
    responses(
        (status = 201, description = "Poll opened", body = PollDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "President only", body = Error)
    ),
    tags = ["polls"],
    operation_id = "createPoll"
)]
#[post("/polls")]
pub async fn create_poll(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePollRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let draft = PollDraft::try_from(payload.into_inner())?;
    let poll = state.voting.create(&user_id, draft).await?;
    Ok(HttpResponse::Created().json(PollDto::new(poll, false, false, None)))
}

#[utoipa::path(
    post,
    path = "/api/v1/polls/{id}/votes",
    params(("id" = String, Path, description = "Poll id")),
    request_body = VoteRequest,
    responses(
        (status = 201, description = "Vote recorded", body = VoteDto),
        (status = 400, description = "Closed, repeated or unknown option", body = Error),
        (status = 404, description = "Unknown poll", body = Error),
        (status = 409, description = "Concurrent repeated vote", body = Error)
    ),
    tags = ["polls"],
    operation_id = "castVote"
)]
#[post("/polls/{id}/votes")]
pub async fn cast_vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id = poll_id(&path)?;
    let vote = state.voting.vote(&user_id, &id, &payload.option).await?;
    Ok(HttpResponse::Created().json(VoteDto::from(vote)))
}

#[utoipa::path(
    get,
    path = "/api/v1/polls/active",
    responses((status = 200, description = "Open polls", body = [PollDto])),
    tags = ["polls"],
    operation_id = "activePolls"
)]
#[get("/polls/active")]
pub async fn active_polls(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<PollDto>>> {
    let user_id = session.require_user_id()?;
    let polls = state.voting.active(&user_id).await?;
    Ok(web::Json(polls.into_iter().map(PollDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/polls/closed",
    responses((status = 200, description = "Finished polls with results", body = [PollDto])),
    tags = ["polls"],
    operation_id = "closedPolls"
)]
#[get("/polls/closed")]
pub async fn closed_polls(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<PollDto>>> {
    let user_id = session.require_user_id()?;
    let polls = state.voting.closed(&user_id).await?;
    Ok(web::Json(polls.into_iter().map(PollDto::from).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/polls/{id}",
    params(("id" = String, Path, description = "Poll id")),
    responses(
        (status = 204, description = "Poll deleted"),
        (status = 403, description = "Creator only", body = Error),
        (status = 404, description = "Unknown poll", body = Error)
    ),
    tags = ["polls"],
    operation_id = "deletePoll"
)]
#[delete("/polls/{id}")]
pub async fn delete_poll(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id = poll_id(&path)?;
    state.voting.delete(&user_id, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PollRepository;
    use crate::domain::test_support::{FixtureClock, fixture_date};
    use crate::domain::{Community, Role, User};
    use crate::inbound::http::test_utils::{TestWorld, login, send, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test::{self as actix_test, TestRequest};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn poll_body() -> Value {
        json!({
            "title": "Facade colour",
            "description": "Choose the new facade colour",
            "option1": "White",
            "option2": "Sand",
            "option3": "Grey",
            "durationHours": 48,
        })
    }

    async fn seed_closed_poll(world: &TestWorld, community: &Community, creator: &User) -> PollId {
        let opened_at = FixtureClock::at(fixture_date(), 9, 0).utc_now - chrono::Duration::days(3);
        let draft = PollDraft::try_new("Old", "Already decided", ["A", "B", "C"], 24).expect("draft");
        let poll = draft.open(PollId::random(), creator.id, community.id, opened_at);
        PollRepository::insert(world.store.as_ref(), &poll)
            .await
            .expect("poll seeded");
        poll.id
    }

    #[actix_web::test]
    async fn results_appear_after_voting() {
        let world = TestWorld::new();
        let (community, president) = world.community("SOL-01").await;
        let resident = world.member(&community, Role::Resident, "Luis Gómez").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let president_cookie = login(&app, &president).await;
        let (status, created) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/polls")
                .cookie(president_cookie)
                .set_json(poll_body()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["closesAt"], "2025-03-12T09:00:00Z");
        let id = created["id"].as_str().expect("id").to_owned();
        let cookie = login(&app, &resident).await;

        let (_, before) = send(&app, TestRequest::get().uri("/api/v1/polls/active").cookie(cookie.clone())).await;
        assert_eq!(before[0]["alreadyVoted"], false);
        assert_eq!(before[0]["results"], Value::Null);

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri(&format!("/api/v1/polls/{id}/votes"))
                .cookie(cookie.clone())
                .set_json(json!({"option": "Sand"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, after) = send(&app, TestRequest::get().uri("/api/v1/polls/active").cookie(cookie.clone())).await;
        assert_eq!(after[0]["alreadyVoted"], true);
        assert_eq!(
            after[0]["results"],
            json!([
                {"option": "White", "count": 0},
                {"option": "Sand", "count": 1},
                {"option": "Grey", "count": 0},
            ])
        );

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri(&format!("/api/v1/polls/{id}/votes"))
                .cookie(cookie)
                .set_json(json!({"option": "White"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case("Purple")]
    #[case("")]
    #[actix_web::test]
    async fn unknown_options_are_rejected(#[case] option: &str) {
        let world = TestWorld::new();
        let (_, president) = world.community("SOL-01").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &president).await;
        let (_, created) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/polls")
                .cookie(cookie.clone())
                .set_json(poll_body()),
        )
        .await;

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri(&format!("/api/v1/polls/{}/votes", created["id"].as_str().expect("id")))
                .cookie(cookie)
                .set_json(json!({"option": option})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn closed_polls_show_results_and_refuse_votes() {
        let world = TestWorld::new();
        let (community, president) = world.community("SOL-01").await;
        let resident = world.member(&community, Role::Resident, "Luis Gómez").await;
        let id = seed_closed_poll(&world, &community, &president).await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &resident).await;

        let (_, closed) = send(&app, TestRequest::get().uri("/api/v1/polls/closed").cookie(cookie.clone())).await;
        assert_eq!(closed[0]["finished"], true);
        assert_eq!(closed[0]["results"].as_array().map(Vec::len), Some(3));

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri(&format!("/api/v1/polls/{id}/votes"))
                .cookie(cookie)
                .set_json(json!({"option": "A"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(json!(0))]
    #[case(json!(-5))]
    #[actix_web::test]
    async fn durations_below_one_hour_are_rejected(#[case] hours: Value) {
        let world = TestWorld::new();
        let (_, president) = world.community("SOL-01").await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let cookie = login(&app, &president).await;
        let mut body = poll_body();
        body["durationHours"] = hours;

        let (status, body) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/polls")
                .cookie(cookie)
                .set_json(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "durationHours");
    }

    #[actix_web::test]
    async fn only_the_creator_deletes() {
        let world = TestWorld::new();
        let (community, president) = world.community("SOL-01").await;
        let admin = world.member(&community, Role::Administrator, "Finca Admin").await;
        let id = seed_closed_poll(&world, &community, &president).await;
        let app = actix_test::init_service(test_app(world.state.clone())).await;
        let uri = format!("/api/v1/polls/{id}");

        let admin_cookie = login(&app, &admin).await;
        let (status, _) = send(&app, TestRequest::delete().uri(&uri).cookie(admin_cookie)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let cookie = login(&app, &president).await;
        let (status, _) = send(&app, TestRequest::delete().uri(&uri).cookie(cookie)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
