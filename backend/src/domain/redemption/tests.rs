//! Behaviour of the redemption engine against mocked ports.

use std::sync::{Arc, Mutex};

use chrono::Duration;
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    CodeRepositoryError, EventPublishError, EventPublisher, MockCodeRepository,
    MockPlayerRepository, MockPrizeRepository, MockSpinLogRepository, NoOpEventPublisher,
    SpinLogRepositoryError,
};
use crate::domain::selection::MockDrawSource;
use crate::domain::test_support::{fixture_clock, fixture_timestamp, player, quiet_broadcaster};
use crate::domain::{
    CodeStatus, ErrorCode, LiveScope, Player, Prize, PrizeKey, SpinCode, SpinLog,
};

/// Publisher that remembers event names.
#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingPublisher {
    fn names(&self) -> Vec<&'static str> {
        self.events.lock().expect("events lock").clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, scope: LiveScope, event: LiveEvent) -> Result<usize, EventPublishError> {
        assert_eq!(scope, LiveScope::Admin);
        self.events.lock().expect("events lock").push(event.name());
        Ok(1)
    }
}

struct Harness {
    codes: MockCodeRepository,
    prizes: MockPrizeRepository,
    logs: MockSpinLogRepository,
    players: MockPlayerRepository,
    draw: MockDrawSource,
    publisher: Arc<dyn EventPublisher>,
}

impl Harness {
    fn build(self) -> RedemptionService {
        RedemptionService::new(
            RedemptionPorts {
                codes: Arc::new(self.codes),
                prizes: Arc::new(self.prizes),
                logs: Arc::new(self.logs),
                players: Arc::new(self.players),
            },
            quiet_broadcaster(self.publisher),
            fixture_clock(),
            Arc::new(self.draw),
        )
    }

    fn with_player(mut self, player: Player) -> Self {
        self.players
            .expect_find_by_username()
            .returning(move |_| Ok(Some(player.clone())));
        self
    }

    fn with_prizes(mut self, prizes: Vec<Prize>) -> Self {
        self.prizes
            .expect_list()
            .returning(move |_| Ok(prizes.clone()));
        self
    }

    fn with_draw(mut self, value: f64) -> Self {
        self.draw.expect_draw().returning(move |_| value);
        self
    }

    fn with_claim(mut self, outcome: bool) -> Self {
        self.codes.expect_claim().returning(move |_| Ok(outcome));
        self
    }

    fn with_stored_code(mut self, code: Option<SpinCode>) -> Self {
        self.codes
            .expect_find_by_code()
            .returning(move |_| Ok(code.clone()));
        self
    }

    fn with_log_append(mut self) -> Self {
        self.logs
            .expect_append()
            .returning(|entry| Ok(entry.clone().into_log()));
        self
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        codes: MockCodeRepository::new(),
        prizes: MockPrizeRepository::new(),
        logs: MockSpinLogRepository::new(),
        players: MockPlayerRepository::new(),
        draw: MockDrawSource::new(),
        publisher: Arc::new(NoOpEventPublisher),
    }
}

fn prize(name: &str, probability: f64, order: i32) -> Prize {
    Prize {
        id: Uuid::new_v4(),
        name: name.into(),
        color: "#10B981".into(),
        probability,
        is_active: true,
        order,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

fn request(code: Option<&str>, username: Option<&str>) -> SpinRequest {
    SpinRequest {
        code: code.map(str::to_owned),
        username: username.map(str::to_owned),
    }
}

fn stored_code(status: CodeStatus) -> SpinCode {
    let mut code = SpinCode::issue(
        CodeValue::parse("TEST001").expect("valid"),
        fixture_timestamp() - Duration::days(1),
    );
    code.status = status;
    code
}

#[rstest]
#[case(None, Some("alice"), "Code is required")]
#[case(Some("  "), Some("alice"), "Code is required")]
#[case(Some("TEST001"), None, "User is required")]
#[case(Some("TEST001"), Some(" "), "User is required")]
#[tokio::test]
async fn missing_fields_are_invalid_requests(
    harness: Harness,
    #[case] code: Option<&str>,
    #[case] username: Option<&str>,
    #[case] message: &str,
) {
    let service = harness.build();
    let err = service
        .spin(request(code, username))
        .await
        .expect_err("missing input rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), message);
}

#[rstest]
#[tokio::test]
async fn unknown_player_is_not_found(mut harness: Harness) {
    harness
        .players
        .expect_find_by_username()
        .returning(|_| Ok(None));
    let err = harness
        .build()
        .spin(request(Some("TEST001"), Some("ghost")))
        .await
        .expect_err("unknown player");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "User not found");
}

#[rstest]
#[tokio::test]
async fn blocked_player_is_forbidden(harness: Harness) {
    let mut blocked = player("mallory");
    blocked.is_blocked = true;
    let result = harness
        .with_player(blocked)
        .build()
        .redeem(request(Some("TEST001"), Some("mallory")))
        .await;
    assert_eq!(result, Err(RedemptionError::UserBlocked));
}

#[rstest]
#[tokio::test]
async fn successful_spin_reports_winner_and_notifies(harness: Harness) {
    let publisher = Arc::new(RecordingPublisher::default());
    let table = vec![prize("Coffee", 60.0, 0), prize("Tote Bag", 40.0, 1)];
    let tote_id = table[1].id;
    let alice = player("alice");
    let alice_id = alice.id;

    let mut harness = Harness {
        publisher: publisher.clone(),
        ..harness
    }
    .with_player(alice)
    .with_prizes(table)
    .with_draw(75.0)
    .with_log_append();
    harness
        .codes
        .expect_claim()
        .withf(move |claim| {
            claim.code.as_str() == "TEST001"
                && claim.player_id == alice_id
                && claim.prize == "Tote Bag"
                && claim.now == fixture_timestamp()
        })
        .times(1)
        .returning(|_| Ok(true));

    let outcome = harness
        .build()
        .redeem(request(Some(" test001 "), Some("ALICE")))
        .await
        .expect("spin succeeds");

    assert_eq!(outcome.winning_index, 1);
    assert_eq!(outcome.prize.id, PrizeKey::Stored(tote_id));
    assert_eq!(outcome.prize.text, "Tote Bag");
    assert_eq!(outcome.message, "Congratulations! You won Tote Bag");
    assert_eq!(publisher.names(), vec!["spin:new", "kpi:update"]);
}

#[rstest]
#[tokio::test]
async fn empty_prize_table_falls_back_to_defaults(harness: Harness) {
    let outcome = harness
        .with_player(player("alice"))
        .with_prizes(Vec::new())
        .with_draw(99.5)
        .with_claim(true)
        .with_log_append()
        .build()
        .redeem(request(Some("TEST001"), Some("alice")))
        .await
        .expect("spin succeeds");

    assert_eq!(outcome.winning_index, 5);
    assert_eq!(outcome.prize.id, PrizeKey::Builtin(6));
    assert_eq!(outcome.prize.text, "Jackpot");
    assert_eq!(outcome.prize.color, "#D4AF37");
}

#[rstest]
#[tokio::test]
async fn unknown_code_is_reported_after_failed_claim(harness: Harness) {
    let err = harness
        .with_player(player("alice"))
        .with_prizes(Vec::new())
        .with_draw(1.0)
        .with_claim(false)
        .with_stored_code(None)
        .build()
        .spin(request(Some("NOPE"), Some("alice")))
        .await
        .expect_err("unknown code");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Invalid Code");
}

#[rstest]
#[case(CodeStatus::Used, "used", "Code already used")]
#[case(CodeStatus::Disabled, "disabled", "Code is disabled")]
#[case(CodeStatus::Expired, "expired", "Code has expired")]
#[tokio::test]
async fn ineligible_codes_are_classified(
    harness: Harness,
    #[case] status: CodeStatus,
    #[case] reason: &str,
    #[case] message: &str,
) {
    let err = harness
        .with_player(player("bob"))
        .with_prizes(Vec::new())
        .with_draw(1.0)
        .with_claim(false)
        .with_stored_code(Some(stored_code(status)))
        .build()
        .spin(request(Some("TEST001"), Some("bob")))
        .await
        .expect_err("ineligible code");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), message);
    assert_eq!(err.details(), Some(&json!({ "reason": reason })));
}

#[rstest]
#[tokio::test]
async fn active_code_past_deadline_is_expired(harness: Harness) {
    let mut code = stored_code(CodeStatus::Active);
    code.expires_at = Some(fixture_timestamp());
    let result = harness
        .with_player(player("bob"))
        .with_prizes(Vec::new())
        .with_draw(1.0)
        .with_claim(false)
        .with_stored_code(Some(code))
        .build()
        .redeem(request(Some("TEST001"), Some("bob")))
        .await;
    assert_eq!(
        result,
        Err(RedemptionError::NotRedeemable(CodeRejection::Expired))
    );
}

#[rstest]
#[tokio::test]
async fn redeemable_code_after_failed_claim_is_a_conflict(harness: Harness) {
    let err = harness
        .with_player(player("bob"))
        .with_prizes(Vec::new())
        .with_draw(1.0)
        .with_claim(false)
        .with_stored_code(Some(stored_code(CodeStatus::Active)))
        .build()
        .spin(request(Some("TEST001"), Some("bob")))
        .await
        .expect_err("lost claim");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn claim_failures_surface_as_service_unavailable(mut harness: Harness) {
    harness
        .codes
        .expect_claim()
        .returning(|_| Err(CodeRepositoryError::connection("pool exhausted")));
    let err = harness
        .with_player(player("alice"))
        .with_prizes(Vec::new())
        .with_draw(1.0)
        .build()
        .spin(request(Some("TEST001"), Some("alice")))
        .await
        .expect_err("store down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn log_failure_does_not_fail_a_consumed_code(mut harness: Harness) {
    harness
        .logs
        .expect_append()
        .returning(|_| Err(SpinLogRepositoryError::query("disk full")));
    let outcome = harness
        .with_player(player("alice"))
        .with_prizes(vec![prize("Sticker", 100.0, 0)])
        .with_draw(10.0)
        .with_claim(true)
        .build()
        .redeem(request(Some("TEST001"), Some("alice")))
        .await
        .expect("spin still succeeds");
    assert_eq!(outcome.prize.text, "Sticker");
}

#[rstest]
fn errors_map_to_domain_codes() {
    let cases = [
        (RedemptionError::UserNotFound, ErrorCode::NotFound),
        (RedemptionError::CodeNotFound, ErrorCode::NotFound),
        (RedemptionError::UserBlocked, ErrorCode::Forbidden),
        (
            RedemptionError::NotRedeemable(CodeRejection::Used),
            ErrorCode::InvalidRequest,
        ),
        (RedemptionError::ClaimLost, ErrorCode::Conflict),
    ];
    for (error, expected) in cases {
        assert_eq!(Error::from(error).code(), expected);
    }
}

#[rstest]
fn spin_log_payload_type_is_reused() {
    let log: SpinLog = NewSpinLog {
        code: "TEST001".into(),
        prize: "Jackpot".into(),
        player_id: player("alice").id,
        username: "alice".into(),
        timestamp: fixture_timestamp(),
    }
    .into_log();
    assert_eq!(log.username, "alice");
}
