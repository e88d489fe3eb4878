//! In-process repositories for development servers and tests.
//!
//! `InMemoryStore` implements every repository port over plain vectors. Each
//! collection sits behind its own mutex and no lock is held across an await,
//! so the claim check-and-set happens inside a single critical section and
//! concurrent redemptions of one code observe exactly one winner.
//!
//! Data lives only as long as the process.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    CodeListQuery, CodeRepository, CodeRepositoryError, PlayerRepository, PlayerRepositoryError,
    PrizeRepository, PrizeRepositoryError, SpinLogRepository, SpinLogRepositoryError,
};
use crate::domain::{
    CodeStatus, CodeValue, NewSpinLog, Page, PageRequest, Player, PlayerId, Prize, PrizeDraft,
    PrizePatch, ProbabilityUpdate, Redemption, RedemptionClaim, SpinCode, SpinLog, SpinLogQuery,
    Username, assign_orders,
};

/// Volatile store backing all repository ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    codes: Mutex<Vec<SpinCode>>,
    prizes: Mutex<Vec<Prize>>,
    logs: Mutex<Vec<SpinLog>>,
    players: Mutex<Vec<Player>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Acquire a collection lock, recovering the data from a poisoned mutex.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Collection sizes saturate rather than wrap on exotic targets.
fn count_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

fn take_limit(limit: u32) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

/// Slice one page out of an already sorted collection.
fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let total = count_u64(items.len());
    let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let limit = take_limit(request.limit());
    let slice = items.iter().skip(start).take(limit).cloned().collect();
    Page::new(slice, total, request)
}

fn code_matches(code: &SpinCode, query: &CodeListQuery) -> bool {
    let status_ok = query.status.is_none_or(|status| code.status == status);
    let search_ok = query
        .search
        .as_deref()
        .map(str::trim)
        .is_none_or(|term| code.code.as_str().contains(&term.to_uppercase()));
    status_ok && search_ok
}

#[async_trait]
impl CodeRepository for InMemoryStore {
    async fn claim(&self, claim: &RedemptionClaim) -> Result<bool, CodeRepositoryError> {
        let mut codes = lock(&self.codes);
        let Some(code) = codes
            .iter_mut()
            .find(|code| code.code == claim.code && code.is_redeemable_at(claim.now))
        else {
            return Ok(false);
        };
        code.status = CodeStatus::Used;
        code.redemption = Some(Redemption {
            used_by: Some(claim.player_id),
            used_by_username: claim.username.clone(),
            used_at: claim.now,
            prize: claim.prize.clone(),
        });
        Ok(true)
    }

    async fn find_by_code(
        &self,
        code: &CodeValue,
    ) -> Result<Option<SpinCode>, CodeRepositoryError> {
        Ok(lock(&self.codes).iter().find(|c| &c.code == code).cloned())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<SpinCode>, CodeRepositoryError> {
        Ok(lock(&self.codes).iter().find(|c| &c.id == id).cloned())
    }

    async fn insert_batch(&self, codes: &[SpinCode]) -> Result<Vec<SpinCode>, CodeRepositoryError> {
        let mut stored = lock(&self.codes);
        let mut inserted = Vec::with_capacity(codes.len());
        for code in codes {
            if stored.iter().any(|existing| existing.code == code.code) {
                continue;
            }
            stored.push(code.clone());
            inserted.push(code.clone());
        }
        Ok(inserted)
    }

    async fn list(&self, query: &CodeListQuery) -> Result<Page<SpinCode>, CodeRepositoryError> {
        let mut matching: Vec<SpinCode> = lock(&self.codes)
            .iter()
            .filter(|code| code_matches(code, query))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.code.as_str().cmp(b.code.as_str()))
        });
        Ok(paginate(&matching, query.page))
    }

    async fn set_status(
        &self,
        id: &Uuid,
        status: CodeStatus,
    ) -> Result<Option<SpinCode>, CodeRepositoryError> {
        let mut codes = lock(&self.codes);
        Ok(codes.iter_mut().find(|c| &c.id == id).map(|code| {
            code.status = status;
            code.clone()
        }))
    }

    async fn reactivate(&self, id: &Uuid) -> Result<Option<SpinCode>, CodeRepositoryError> {
        let mut codes = lock(&self.codes);
        Ok(codes
            .iter_mut()
            .find(|c| &c.id == id && !c.has_been_redeemed())
            .map(|code| {
                code.status = CodeStatus::Active;
                code.clone()
            }))
    }

    async fn count(&self, status: Option<CodeStatus>) -> Result<u64, CodeRepositoryError> {
        let codes = lock(&self.codes);
        let total = codes
            .iter()
            .filter(|code| status.is_none_or(|wanted| code.status == wanted))
            .count();
        Ok(count_u64(total))
    }

    async fn recent_redemptions(&self, limit: u32) -> Result<Vec<SpinCode>, CodeRepositoryError> {
        let mut used: Vec<SpinCode> = lock(&self.codes)
            .iter()
            .filter(|code| code.status == CodeStatus::Used && code.redemption.is_some())
            .cloned()
            .collect();
        used.sort_by_key(|code| {
            std::cmp::Reverse(code.redemption.as_ref().map(|r| r.used_at))
        });
        used.truncate(take_limit(limit));
        Ok(used)
    }
}

fn sort_prizes(prizes: &mut [Prize]) {
    prizes.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[async_trait]
impl PrizeRepository for InMemoryStore {
    async fn list(&self, active_only: bool) -> Result<Vec<Prize>, PrizeRepositoryError> {
        let mut prizes: Vec<Prize> = lock(&self.prizes)
            .iter()
            .filter(|prize| !active_only || prize.is_active)
            .cloned()
            .collect();
        sort_prizes(&mut prizes);
        Ok(prizes)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Prize>, PrizeRepositoryError> {
        Ok(lock(&self.prizes).iter().find(|p| &p.id == id).cloned())
    }

    async fn insert(
        &self,
        drafts: &[PrizeDraft],
        now: DateTime<Utc>,
    ) -> Result<Vec<Prize>, PrizeRepositoryError> {
        let mut prizes = lock(&self.prizes);
        let max_order = prizes.iter().map(|prize| prize.order).max();
        let created: Vec<Prize> = drafts
            .iter()
            .zip(assign_orders(drafts, max_order))
            .map(|(draft, order)| Prize {
                id: Uuid::new_v4(),
                name: draft.name.clone(),
                color: draft.color.clone(),
                probability: draft.probability,
                is_active: draft.is_active,
                order,
                created_at: now,
                updated_at: now,
            })
            .collect();
        prizes.extend(created.iter().cloned());
        Ok(created)
    }

    async fn update(
        &self,
        id: &Uuid,
        patch: &PrizePatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Prize>, PrizeRepositoryError> {
        let mut prizes = lock(&self.prizes);
        Ok(prizes.iter_mut().find(|p| &p.id == id).map(|prize| {
            patch.apply(prize, now);
            prize.clone()
        }))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, PrizeRepositoryError> {
        let mut prizes = lock(&self.prizes);
        let before = prizes.len();
        prizes.retain(|prize| &prize.id != id);
        Ok(prizes.len() != before)
    }

    async fn update_probabilities(
        &self,
        updates: &[ProbabilityUpdate],
        now: DateTime<Utc>,
    ) -> Result<(), PrizeRepositoryError> {
        let mut prizes = lock(&self.prizes);
        if let Some(missing) = updates
            .iter()
            .find(|update| !prizes.iter().any(|prize| prize.id == update.id))
        {
            return Err(PrizeRepositoryError::unknown_prize(missing.id));
        }
        for update in updates {
            if let Some(prize) = prizes.iter_mut().find(|prize| prize.id == update.id) {
                prize.probability = update.probability;
                prize.updated_at = now;
            }
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, PrizeRepositoryError> {
        Ok(count_u64(lock(&self.prizes).len()))
    }
}

fn newest_first(logs: &mut [SpinLog]) {
    logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[async_trait]
impl SpinLogRepository for InMemoryStore {
    async fn append(&self, entry: &NewSpinLog) -> Result<SpinLog, SpinLogRepositoryError> {
        let log = entry.clone().into_log();
        lock(&self.logs).push(log.clone());
        Ok(log)
    }

    async fn history_for(
        &self,
        username: &str,
        limit: u32,
    ) -> Result<Vec<SpinLog>, SpinLogRepositoryError> {
        let key = username.to_lowercase();
        let mut history: Vec<SpinLog> = lock(&self.logs)
            .iter()
            .filter(|log| log.username.to_lowercase() == key)
            .cloned()
            .collect();
        newest_first(&mut history);
        history.truncate(take_limit(limit));
        Ok(history)
    }

    async fn list(&self, query: &SpinLogQuery) -> Result<Page<SpinLog>, SpinLogRepositoryError> {
        let mut matching: Vec<SpinLog> = lock(&self.logs)
            .iter()
            .filter(|log| query.matches(log))
            .cloned()
            .collect();
        newest_first(&mut matching);
        Ok(paginate(&matching, query.page))
    }

    async fn count(&self) -> Result<u64, SpinLogRepositoryError> {
        Ok(count_u64(lock(&self.logs).len()))
    }
}

#[async_trait]
impl PlayerRepository for InMemoryStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Player>, PlayerRepositoryError> {
        let key = username.lookup_key();
        Ok(lock(&self.players)
            .iter()
            .find(|player| player.username.lookup_key() == key)
            .cloned())
    }

    async fn find_by_id(&self, id: &PlayerId) -> Result<Option<Player>, PlayerRepositoryError> {
        Ok(lock(&self.players).iter().find(|p| &p.id == id).cloned())
    }

    async fn insert(&self, player: &Player) -> Result<(), PlayerRepositoryError> {
        let mut players = lock(&self.players);
        let key = player.username.lookup_key();
        if players
            .iter()
            .any(|existing| existing.username.lookup_key() == key)
        {
            return Err(PlayerRepositoryError::duplicate_username(
                player.username.to_string(),
            ));
        }
        players.push(player.clone());
        Ok(())
    }

    async fn count_regular(&self) -> Result<u64, PlayerRepositoryError> {
        Ok(count_u64(
            lock(&self.players).iter().filter(|p| p.is_regular()).count(),
        ))
    }

    async fn list_regular(&self) -> Result<Vec<Player>, PlayerRepositoryError> {
        let mut regular: Vec<Player> = lock(&self.players)
            .iter()
            .filter(|player| player.is_regular())
            .cloned()
            .collect();
        regular.sort_by_key(|player| std::cmp::Reverse(player.created_at));
        Ok(regular)
    }

    async fn set_blocked(
        &self,
        id: &PlayerId,
        blocked: bool,
    ) -> Result<Option<Player>, PlayerRepositoryError> {
        Ok(lock(&self.players)
            .iter_mut()
            .find(|player| &player.id == id)
            .map(|player| {
                player.is_blocked = blocked;
                player.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::PlayerRole;
    use chrono::Duration;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn code(raw: &str, at: DateTime<Utc>) -> SpinCode {
        SpinCode::issue(CodeValue::parse(raw).expect("valid code"), at)
    }

    fn claim(raw: &str, username: &str, at: DateTime<Utc>) -> RedemptionClaim {
        RedemptionClaim {
            code: CodeValue::parse(raw).expect("valid code"),
            player_id: PlayerId::random(),
            username: username.into(),
            prize: "Coffee".into(),
            now: at,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn claim_succeeds_once(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        store
            .insert_batch(&[code("TEST001", now)])
            .await
            .expect("insert");

        assert!(store.claim(&claim("TEST001", "alice", now)).await.expect("claim"));
        assert!(!store.claim(&claim("TEST001", "bob", now)).await.expect("claim"));

        let stored = store
            .find_by_code(&CodeValue::parse("TEST001").expect("valid code"))
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(stored.status, CodeStatus::Used);
        let redemption = stored.redemption.expect("redeemed");
        assert_eq!(redemption.used_by_username, "alice");
        assert_eq!(redemption.prize, "Coffee");
    }

    #[rstest]
    #[tokio::test]
    async fn claim_rejects_expired_code(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        let mut expiring = code("LATE", now);
        expiring.expires_at = Some(now);
        store.insert_batch(&[expiring]).await.expect("insert");

        assert!(!store.claim(&claim("LATE", "alice", now)).await.expect("claim"));
        let earlier = now - Duration::seconds(1);
        assert!(store.claim(&claim("LATE", "alice", earlier)).await.expect("claim"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_have_one_winner(now: DateTime<Utc>) {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_batch(&[code("RACE", now)])
            .await
            .expect("insert");

        let attempts = (0..16).map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.claim(&claim("RACE", &format!("p{i}"), now)).await })
        });
        let mut winners = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            if attempt.await.expect("join").expect("claim") {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn insert_batch_skips_existing_values(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        store.insert_batch(&[code("AAA111", now)]).await.expect("insert");
        let stored = store
            .insert_batch(&[code("AAA111", now), code("BBB222", now)])
            .await
            .expect("insert");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].code.as_str(), "BBB222");
        assert_eq!(CodeRepository::count(&store, None).await.expect("count"), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn list_filters_and_paginates(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        let codes: Vec<SpinCode> = (0..5)
            .map(|i| code(&format!("PROMO{i}"), now + Duration::seconds(i)))
            .chain([code("OTHER1", now)])
            .collect();
        store.insert_batch(&codes).await.expect("insert");

        let page = CodeRepository::list(
            &store,
            &CodeListQuery {
                status: Some(CodeStatus::Active),
                search: Some(" promo ".into()),
                page: PageRequest::new(Some(2), Some(2)),
            },
        )
        .await
        .expect("list");
        assert_eq!(page.total, 5);
        let values: Vec<&str> = page.items.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(values, vec!["PROMO2", "PROMO1"]);
    }

    #[rstest]
    #[tokio::test]
    async fn reactivate_refuses_redeemed_codes(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        let fresh = code("FRESH1", now);
        let spent = code("SPENT1", now);
        let (fresh_id, spent_id) = (fresh.id, spent.id);
        store.insert_batch(&[fresh, spent]).await.expect("insert");
        store.claim(&claim("SPENT1", "alice", now)).await.expect("claim");

        store
            .set_status(&fresh_id, CodeStatus::Disabled)
            .await
            .expect("disable");
        let enabled = store.reactivate(&fresh_id).await.expect("enable");
        assert_eq!(enabled.map(|c| c.status), Some(CodeStatus::Active));

        store
            .set_status(&spent_id, CodeStatus::Disabled)
            .await
            .expect("disable");
        assert!(store.reactivate(&spent_id).await.expect("enable").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn prizes_append_after_highest_order(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        PrizeRepository::insert(&store, &PrizeDraft::defaults(), now)
            .await
            .expect("seed");
        let draft = PrizeDraft::new("Sticker", None, None, None, None).expect("valid draft");
        let created = PrizeRepository::insert(&store, &[draft], now)
            .await
            .expect("insert");
        assert_eq!(created[0].order, 6);

        let names: Vec<String> = PrizeRepository::list(&store, false)
            .await
            .expect("list")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names.last().map(String::as_str), Some("Sticker"));
    }

    #[rstest]
    #[tokio::test]
    async fn probability_batch_is_all_or_nothing(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        let draft = PrizeDraft::new("Mug", None, Some(100.0), None, None).expect("valid draft");
        let created = PrizeRepository::insert(&store, &[draft], now)
            .await
            .expect("insert");
        let updates = [
            ProbabilityUpdate {
                id: created[0].id,
                probability: 50.0,
            },
            ProbabilityUpdate {
                id: Uuid::new_v4(),
                probability: 50.0,
            },
        ];

        let err = store
            .update_probabilities(&updates, now)
            .await
            .expect_err("unknown prize");
        assert!(matches!(err, PrizeRepositoryError::UnknownPrize { .. }));
        let kept = PrizeRepository::find_by_id(&store, &created[0].id)
            .await
            .expect("lookup")
            .expect("present");
        assert!((kept.probability - 100.0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[tokio::test]
    async fn history_is_case_insensitive_and_newest_first(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        let alice = PlayerId::random();
        for (offset, name) in [(0, "Alice"), (1, "alice"), (2, "bob")] {
            store
                .append(&NewSpinLog {
                    code: format!("C{offset}"),
                    prize: "Coffee".into(),
                    player_id: alice,
                    username: name.into(),
                    timestamp: now + Duration::seconds(offset),
                })
                .await
                .expect("append");
        }

        let history = store.history_for("ALICE", 10).await.expect("history");
        let codes: Vec<&str> = history.iter().map(|log| log.code.as_str()).collect();
        assert_eq!(codes, vec!["C1", "C0"]);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_username_differs_only_in_case(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        let first = Player::register(Username::new("Alice").expect("valid"), now);
        let second = Player::register(Username::new("ALICE").expect("valid"), now);
        PlayerRepository::insert(&store, &first)
            .await
            .expect("insert");

        let err = PlayerRepository::insert(&store, &second)
            .await
            .expect_err("duplicate");
        assert!(matches!(err, PlayerRepositoryError::DuplicateUsername { .. }));
        assert_eq!(store.count_regular().await.expect("count"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn regular_players_list_newest_first(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        let older = Player::register(Username::new("older").expect("valid"), now);
        let newer = Player::register(
            Username::new("newer").expect("valid"),
            now + Duration::minutes(1),
        );
        let mut admin = Player::register(
            Username::new("root").expect("valid"),
            now + Duration::minutes(2),
        );
        admin.role = PlayerRole::Admin;
        for player in [&older, &newer, &admin] {
            PlayerRepository::insert(&store, player)
                .await
                .expect("insert");
        }

        let listed = store.list_regular().await.expect("list");
        let names: Vec<&str> = listed.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["newer", "older"]);
    }

    #[rstest]
    #[tokio::test]
    async fn set_blocked_updates_the_stored_player(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        let alice = Player::register(Username::new("alice").expect("valid"), now);
        PlayerRepository::insert(&store, &alice)
            .await
            .expect("insert");

        let blocked = store
            .set_blocked(&alice.id, true)
            .await
            .expect("block")
            .expect("known player");
        assert!(blocked.is_blocked);
        let stored = PlayerRepository::find_by_id(&store, &alice.id)
            .await
            .expect("lookup")
            .expect("stored");
        assert!(stored.is_blocked);

        let missing = store
            .set_blocked(&PlayerId::random(), true)
            .await
            .expect("block unknown");
        assert!(missing.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn page_limits_larger_than_the_collection_return_everything(now: DateTime<Utc>) {
        let store = InMemoryStore::new();
        store
            .insert_batch(&[code("AAA111", now), code("BBB222", now)])
            .await
            .expect("insert");
        let page = CodeRepository::list(
            &store,
            &CodeListQuery {
                page: PageRequest::new(Some(1), Some(u32::MAX)),
                ..CodeListQuery::default()
            },
        )
        .await
        .expect("list");
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 2);
    }
}
