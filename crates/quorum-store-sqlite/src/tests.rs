//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, Weekday};
use uuid::Uuid;

use quorum_core::{
  availability::AvailabilityState,
  feed::{ChangeKind, FeedEvent},
  member::Member,
  party::Party,
  session::{HostDetails, NewSession},
  store::ScheduleStore,
  window::WeekdaySet,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(s: &str) -> NaiveDate { s.parse().expect("valid date") }

async fn seeded(s: &SqliteStore, member_count: usize) -> (Party, Vec<Member>) {
  let party = s
    .create_party(
      "Thursday Knights",
      d("2024-01-04"),
      WeekdaySet::new(&[Weekday::Thu, Weekday::Fri]),
    )
    .await
    .unwrap();

  let mut members = Vec::new();
  for n in 0..member_count {
    members.push(s.add_member(party.party_id, &format!("member-{n}")).await.unwrap());
  }
  (party, members)
}

// ─── Party & roster ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_party() {
  let s = store().await;
  let (party, _) = seeded(&s, 0).await;

  let fetched = s.get_party(party.party_id).await.unwrap().unwrap();
  assert_eq!(fetched.party_id, party.party_id);
  assert_eq!(fetched.name, "Thursday Knights");
  assert_eq!(fetched.created_on, d("2024-01-04"));
  assert!(fetched.weekdays.contains(Weekday::Thu));
  assert!(!fetched.weekdays.contains(Weekday::Sat));
}

#[tokio::test]
async fn get_party_missing_returns_none() {
  let s = store().await;
  let result = s.get_party(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn add_member_to_missing_party_fails() {
  let s = store().await;
  let err = s.add_member(Uuid::new_v4(), "nobody").await.unwrap_err();
  assert!(matches!(err, Error::PartyNotFound(_)));
}

#[tokio::test]
async fn list_members_scoped_to_party() {
  let s = store().await;
  let (party_a, _) = seeded(&s, 2).await;
  let party_b = s
    .create_party("Other Table", d("2024-02-02"), WeekdaySet::default())
    .await
    .unwrap();
  s.add_member(party_b.party_id, "stranger").await.unwrap();

  let roster = s.list_members(party_a.party_id).await.unwrap();
  assert_eq!(roster.len(), 2);
  assert!(roster.iter().all(|m| m.party_id == party_a.party_id));
}

// ─── Availability ────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_replaces_rather_than_duplicates() {
  let s = store().await;
  let (party, members) = seeded(&s, 1).await;
  let (pid, mid) = (party.party_id, members[0].member_id);
  let date = d("2024-06-06");

  s.upsert_availability(pid, mid, date, AvailabilityState::Available)
    .await
    .unwrap();
  s.upsert_availability(pid, mid, date, AvailabilityState::Unavailable)
    .await
    .unwrap();

  let rows = s.list_availability(pid, date, date).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].state, AvailabilityState::Unavailable);
}

#[tokio::test]
async fn delete_availability_is_idempotent() {
  let s = store().await;
  let (party, members) = seeded(&s, 1).await;
  let (pid, mid) = (party.party_id, members[0].member_id);
  let date = d("2024-06-06");

  s.upsert_availability(pid, mid, date, AvailabilityState::Available)
    .await
    .unwrap();
  s.delete_availability(pid, mid, date).await.unwrap();
  s.delete_availability(pid, mid, date).await.unwrap();

  let rows = s.list_availability(pid, date, date).await.unwrap();
  assert!(rows.is_empty());
}

#[tokio::test]
async fn list_availability_respects_date_range() {
  let s = store().await;
  let (party, members) = seeded(&s, 1).await;
  let (pid, mid) = (party.party_id, members[0].member_id);

  for date in ["2024-06-06", "2024-06-07", "2024-06-13"] {
    s.upsert_availability(pid, mid, d(date), AvailabilityState::Available)
      .await
      .unwrap();
  }

  let rows = s
    .list_availability(pid, d("2024-06-06"), d("2024-06-07"))
    .await
    .unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r.date <= d("2024-06-07")));
}

// ─── Change feed ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn feed_publishes_insert_update_delete() {
  let s = store().await;
  let (party, members) = seeded(&s, 1).await;
  let (pid, mid) = (party.party_id, members[0].member_id);
  let date = d("2024-06-06");

  let mut feed = s.subscribe();

  s.upsert_availability(pid, mid, date, AvailabilityState::Available)
    .await
    .unwrap();
  s.upsert_availability(pid, mid, date, AvailabilityState::Unavailable)
    .await
    .unwrap();
  s.delete_availability(pid, mid, date).await.unwrap();
  // A second delete hits no row and publishes nothing.
  s.delete_availability(pid, mid, date).await.unwrap();

  let kinds: Vec<ChangeKind> = (0..3)
    .map(|_| match feed.try_recv().unwrap() {
      FeedEvent::Change(change) => change.kind,
      FeedEvent::Reconnected => panic!("unexpected reconnect event"),
    })
    .collect();
  assert_eq!(
    kinds,
    vec![ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete]
  );
  assert!(feed.try_recv().is_err());
}

#[tokio::test]
async fn feed_change_carries_old_and_new_rows() {
  let s = store().await;
  let (party, members) = seeded(&s, 1).await;
  let (pid, mid) = (party.party_id, members[0].member_id);
  let date = d("2024-06-06");

  let mut feed = s.subscribe();
  s.upsert_availability(pid, mid, date, AvailabilityState::Available)
    .await
    .unwrap();
  s.upsert_availability(pid, mid, date, AvailabilityState::Unavailable)
    .await
    .unwrap();

  let FeedEvent::Change(insert) = feed.try_recv().unwrap() else {
    panic!("expected change event");
  };
  assert_eq!(insert.kind, ChangeKind::Insert);
  assert!(insert.old.is_none());
  assert_eq!(insert.new.as_ref().map(|r| r.state), Some(AvailabilityState::Available));

  let FeedEvent::Change(update) = feed.try_recv().unwrap() else {
    panic!("expected change event");
  };
  assert_eq!(update.kind, ChangeKind::Update);
  assert_eq!(update.old.as_ref().map(|r| r.state), Some(AvailabilityState::Available));
  assert_eq!(update.new.as_ref().map(|r| r.state), Some(AvailabilityState::Unavailable));
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_session_on_same_date_is_rejected() {
  let s = store().await;
  let (party, _) = seeded(&s, 0).await;
  let date = d("2024-06-06");

  s.insert_session(NewSession::confirmation(party.party_id, date))
    .await
    .unwrap();

  let err = s
    .insert_session(NewSession::confirmation(party.party_id, date))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SessionExists(day) if day == date));
}

#[tokio::test]
async fn sessions_listed_date_descending() {
  let s = store().await;
  let (party, _) = seeded(&s, 0).await;

  for date in ["2024-05-30", "2024-06-07", "2024-06-06"] {
    s.insert_session(NewSession::confirmation(party.party_id, d(date)))
      .await
      .unwrap();
  }

  let sessions = s.list_sessions(party.party_id).await.unwrap();
  let dates: Vec<NaiveDate> = sessions.iter().map(|x| x.date).collect();
  assert_eq!(dates, vec![d("2024-06-07"), d("2024-06-06"), d("2024-05-30")]);
}

#[tokio::test]
async fn session_host_roundtrips_through_json() {
  let s = store().await;
  let (party, members) = seeded(&s, 1).await;

  let host = HostDetails {
    member_id:  Some(members[0].member_id),
    venue:      None,
    address:    Some("12 Hill Road".into()),
    is_virtual: false,
    start_time: chrono::NaiveTime::from_hms_opt(19, 30, 0),
  };
  let session = s
    .insert_session(NewSession {
      party_id:     party.party_id,
      date:         d("2024-06-06"),
      host:         host.clone(),
      confirmed_by: Some(members[0].member_id),
    })
    .await
    .unwrap();

  let listed = s.list_sessions(party.party_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].session_id, session.session_id);
  assert_eq!(listed[0].host, host);
  assert_eq!(listed[0].confirmed_by, Some(members[0].member_id));
}

#[tokio::test]
async fn update_session_replaces_host_only() {
  let s = store().await;
  let (party, _) = seeded(&s, 0).await;
  let session = s
    .insert_session(NewSession::confirmation(party.party_id, d("2024-06-06")))
    .await
    .unwrap();

  let host = HostDetails {
    member_id:  None,
    venue:      Some("The Dragon's Den".into()),
    address:    None,
    is_virtual: false,
    start_time: None,
  };
  let updated = s.update_session(session.session_id, host.clone()).await.unwrap();
  assert_eq!(updated.date, session.date);
  assert_eq!(updated.host, host);

  let listed = s.list_sessions(party.party_id).await.unwrap();
  assert_eq!(listed[0].host, host);
}

#[tokio::test]
async fn update_missing_session_fails() {
  let s = store().await;
  seeded(&s, 0).await;

  let err = s
    .update_session(Uuid::new_v4(), HostDetails::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SessionNotFound(_)));
}

#[tokio::test]
async fn delete_session_frees_the_date() {
  let s = store().await;
  let (party, _) = seeded(&s, 0).await;
  let date = d("2024-06-06");

  let session = s
    .insert_session(NewSession::confirmation(party.party_id, date))
    .await
    .unwrap();
  s.delete_session(session.session_id).await.unwrap();

  assert!(s.list_sessions(party.party_id).await.unwrap().is_empty());

  // The date is available again.
  s.insert_session(NewSession::confirmation(party.party_id, date))
    .await
    .unwrap();
}
