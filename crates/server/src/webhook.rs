use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use scoreline_core::domain::identity::PhoneNumber;
use scoreline_core::reporting::ScoreReporter;
use scoreline_sms::{deliver_best_effort, SmsSender, TwilioInbound, EMPTY_TWIML, TWIML_CONTENT_TYPE};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

#[derive(Clone)]
pub struct WebhookState {
    reporter: ScoreReporter,
    sender: Arc<dyn SmsSender>,
}

impl WebhookState {
    pub fn new(reporter: ScoreReporter, sender: Arc<dyn SmsSender>) -> Self {
        Self { reporter, sender }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

pub fn router(state: WebhookState) -> Router {
    Router::new().route("/sms/webhook", post(receive)).with_state(state)
}

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Runs one unit of work per inbound SMS. The reply goes out through the
/// configured sender once the reporter has committed; Twilio itself only
/// ever receives an empty TwiML document.
pub async fn receive(
    State(state): State<WebhookState>,
    inbound: Result<Form<TwilioInbound>, FormRejection>,
) -> Response {
    let message = match inbound {
        Ok(Form(inbound)) => inbound.into_message(),
        Err(rejection) => {
            error!(
                event_name = "ingress.sms.rejected",
                status = rejection.status().as_u16(),
                error = %rejection.body_text(),
                "inbound sms payload could not be decoded"
            );
            return server_error();
        }
    };
    let masked = PhoneNumber::normalize(&message.sender).map(|phone| phone.masked());
    info!(
        event_name = "ingress.sms.received",
        correlation_id = %message.correlation_id,
        from = masked.as_deref().unwrap_or("***"),
        "inbound sms received"
    );

    let outcome = match state.reporter.handle(&message).await {
        Ok(outcome) => outcome,
        Err(application_error) => {
            let interface_error = application_error.into_interface(message.correlation_id.clone());
            error!(
                event_name = "ingress.sms.failed",
                correlation_id = %interface_error.correlation_id(),
                error = %interface_error,
                "inbound sms could not be processed"
            );
            return server_error();
        }
    };

    info!(
        event_name = "ingress.sms.handled",
        correlation_id = %message.correlation_id,
        outcome = outcome.kind(),
        "inbound sms handled"
    );

    if masked.is_some() {
        deliver_best_effort(
            state.sender.as_ref(),
            &message.sender,
            &outcome.reply(),
            &message.correlation_id,
        )
        .await;
    }

    twiml()
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error: "Server error" })).into_response()
}

fn twiml() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(TWIML_CONTENT_TYPE))],
        EMPTY_TWIML,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use chrono::NaiveDate;
    use scoreline_core::domain::fixture::{Fixture, FixtureId, SeasonId};
    use scoreline_core::domain::identity::{Identity, OrgId, PhoneNumber, TeamId, UserId};
    use scoreline_core::errors::StoreError;
    use scoreline_core::reporting::{ReportingStores, ScoreReporter};
    use scoreline_core::store::{IdentityDirectory, InMemoryLeague};
    use scoreline_sms::{RecordingSender, EMPTY_TWIML};
    use tower::ServiceExt;

    use super::{cors, router, WebhookState};

    const HOME: &str = "+15550001111";
    const AWAY: &str = "+15550002222";

    fn identity(user: &str, phone: &str, team: &str) -> Identity {
        Identity {
            user_id: UserId(user.to_string()),
            username: user.to_string(),
            phone: PhoneNumber::normalize(phone).expect("digits"),
            team_id: TeamId(team.to_string()),
            org_id: OrgId("org-1".to_string()),
        }
    }

    async fn league() -> InMemoryLeague {
        let league = InMemoryLeague::new();
        league.register(identity("hawks-captain", HOME, "hawks")).await;
        league.register(identity("owls-captain", AWAY, "owls")).await;
        league
            .schedule(Fixture {
                id: FixtureId("FX-7".to_string()),
                week: 7,
                home_team_id: TeamId("hawks".to_string()),
                away_team_id: TeamId("owls".to_string()),
                org_id: OrgId("org-1".to_string()),
                season_id: SeasonId("s-1".to_string()),
                match_date: NaiveDate::from_ymd_opt(2026, 5, 7).expect("valid date"),
            })
            .await;
        league
    }

    fn app(stores: ReportingStores, sender: RecordingSender) -> Router {
        router(WebhookState::new(ScoreReporter::new(stores), Arc::new(sender))).layer(cors())
    }

    fn sms(from: &str, body: &str) -> Request<Body> {
        let form = format!(
            "From={}&Body={}&MessageSid=SM-test",
            from.replace('+', "%2B"),
            body.replace(' ', "+")
        );
        Request::builder()
            .method(Method::POST)
            .uri("/sms/webhook")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .expect("request")
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    #[tokio::test]
    async fn agreeing_reports_answer_twiml_and_deliver_replies() {
        let league = Arc::new(league().await);
        let sender = RecordingSender::new();
        let app = app(ReportingStores::shared(league.clone()), sender.clone());

        let response = app.clone().oneshot(sms(HOME, "3-1")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|value| value.to_str().ok()),
            Some("text/xml")
        );
        assert_eq!(body_text(response).await, EMPTY_TWIML);

        let response = app.oneshot(sms(AWAY, "lost 3-1")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let sent = sender.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, HOME);
        assert_eq!(sent[0].body, "Submitted Week 7: 1-3. Waiting for opponent.");
        assert_eq!(sent[1].to, AWAY);
        assert_eq!(sent[1].body, "Confirmed! Week 7: 1-3 Final!");
        assert!(league.result_for(&FixtureId("FX-7".to_string())).await.is_some());
    }

    #[tokio::test]
    async fn unknown_sender_still_gets_twiml_and_a_reply() {
        let sender = RecordingSender::new();
        let app = app(ReportingStores::shared(Arc::new(league().await)), sender.clone());

        let response = app.oneshot(sms("+15559990000", "3-1")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sender.sent().len(), 1);
        assert!(sender.sent()[0].body.contains("not registered"));
    }

    #[tokio::test]
    async fn sender_without_digits_gets_no_outbound_message() {
        let sender = RecordingSender::new();
        let app = app(ReportingStores::shared(Arc::new(league().await)), sender.clone());

        let response = app.oneshot(sms("anonymous", "3-1")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(sender.sent().is_empty());
    }

    struct BrokenDirectory;

    #[async_trait]
    impl IdentityDirectory for BrokenDirectory {
        async fn find_by_phone(&self, _phone: &PhoneNumber) -> Result<Vec<Identity>, StoreError> {
            Err(StoreError::Unavailable("connection refused at 10.0.0.5".to_string()))
        }
    }

    #[tokio::test]
    async fn store_failure_maps_to_opaque_server_error() {
        let league = Arc::new(league().await);
        let stores = ReportingStores {
            identities: Arc::new(BrokenDirectory),
            fixtures: league.clone(),
            ledger: league,
        };
        let sender = RecordingSender::new();

        let response = app(stores, sender.clone()).oneshot(sms(HOME, "3-1")).await.expect("response");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert_eq!(body, r#"{"error":"Server error"}"#);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn undecodable_payload_maps_to_opaque_server_error() {
        let sender = RecordingSender::new();
        let app = app(ReportingStores::shared(Arc::new(league().await)), sender.clone());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/sms/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"From":"+15550001111","Body":"3-1"}"#))
            .expect("request");

        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, r#"{"error":"Server error"}"#);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn preflight_is_answered_with_cors_headers() {
        let sender = RecordingSender::new();
        let app = app(ReportingStores::shared(Arc::new(league().await)), sender.clone());

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/sms/webhook")
            .header(header::ORIGIN, "https://league.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "apikey, content-type")
            .body(Body::empty())
            .expect("request");

        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|value| value.to_str().ok()),
            Some("*")
        );
        let allowed = headers
            .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        assert!(allowed.contains("apikey"));
        assert!(allowed.contains("x-client-info"));
        assert!(sender.sent().is_empty());
    }
}
