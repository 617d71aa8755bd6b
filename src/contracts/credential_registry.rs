// src/contracts/credential_registry.rs
//! Credential Registry.
//!
//! The authoritative state machine for credentials: it assigns identifiers,
//! records issuer/subject/fingerprint bindings, enforces who may revoke, and
//! answers validity and lookup queries.
//!
//! # Concurrency
//! One `RwLock` guards the record table, every index, the id counter, the
//! event log and the journal. Mutations take the write lock and validate
//! completely before touching anything, so readers only ever see a record
//! together with all of its index entries, and a failed call leaves no trace.

use crate::errors::RegistryError;
use crate::models::credential::{Credential, CredentialId, Fingerprint, ValidityState};
use crate::models::event::{EventRecord, RegistryEvent};
use crate::models::identity::Identity;
use crate::storage::event_journal::EventJournal;
use crate::utils::clock::Clock;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Parameters of an issuance request.
///
/// # Fields
/// - `issuer`: Claimed issuer; must equal the authenticated caller
/// - `subject`: Identity the credential is about; must not be the zero address
/// - `fingerprint`: Content binding computed by the caller
/// - `validity_seconds`: Lifetime from issuance; must be strictly positive
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub issuer: Identity,
    pub subject: Identity,
    pub fingerprint: Fingerprint,
    pub validity_seconds: i64,
}

#[derive(Debug, Default)]
struct RegistryState {
    records: HashMap<CredentialId, Credential>,
    subject_index: HashMap<Identity, Vec<CredentialId>>,
    issuer_index: HashMap<Identity, Vec<CredentialId>>,
    fingerprint_index: HashMap<Fingerprint, Vec<CredentialId>>,
    last_id: u64,
    events: Vec<EventRecord>,
    journal: Option<EventJournal>,
}

impl RegistryState {
    fn next_seq(&self) -> u64 {
        self.events.len() as u64 + 1
    }

    /// Rejects events that cannot follow the current state.
    fn check_replayable(&self, record: &EventRecord) -> Result<(), RegistryError> {
        if record.seq != self.next_seq() {
            return Err(RegistryError::Replay(format!(
                "expected event #{}, found #{}",
                self.next_seq(),
                record.seq
            )));
        }

        match &record.event {
            RegistryEvent::CredentialIssued { id, issued_at, expires_at, .. } => {
                if id.0 != self.last_id + 1 {
                    return Err(RegistryError::Replay(format!(
                        "event #{} issues credential {} but next id is {}",
                        record.seq,
                        id,
                        self.last_id + 1
                    )));
                }
                if expires_at <= issued_at {
                    return Err(RegistryError::Replay(format!(
                        "event #{} has an empty validity window",
                        record.seq
                    )));
                }
            }
            RegistryEvent::CredentialRevoked { id, caller, .. } => {
                let credential = self.records.get(id).ok_or_else(|| {
                    RegistryError::Replay(format!("event #{} revokes unknown credential {}", record.seq, id))
                })?;
                if credential.revoked || credential.issuer != *caller {
                    return Err(RegistryError::Replay(format!(
                        "event #{} is not a valid revocation of credential {}",
                        record.seq, id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Applies an already-validated event to records and indices.
    fn apply(&mut self, record: EventRecord) {
        match &record.event {
            RegistryEvent::CredentialIssued { id, issuer, subject, fingerprint, issued_at, expires_at } => {
                self.records.insert(
                    *id,
                    Credential {
                        id: *id,
                        issuer: *issuer,
                        subject: *subject,
                        fingerprint: *fingerprint,
                        issued_at: *issued_at,
                        expires_at: *expires_at,
                        revoked: false,
                        revoked_at: None,
                    },
                );
                self.subject_index.entry(*subject).or_default().push(*id);
                self.issuer_index.entry(*issuer).or_default().push(*id);
                self.fingerprint_index.entry(*fingerprint).or_default().push(*id);
                self.last_id = id.0;
            }
            RegistryEvent::CredentialRevoked { id, revoked_at, .. } => {
                if let Some(credential) = self.records.get_mut(id) {
                    credential.revoked = true;
                    credential.revoked_at = Some(*revoked_at);
                }
            }
        }
        self.events.push(record);
    }

    /// Journals the event (if a journal is attached) and then applies it.
    /// Nothing is applied in memory when the journal write fails.
    fn commit(&mut self, event: RegistryEvent) -> Result<(), RegistryError> {
        let record = EventRecord { seq: self.next_seq(), event };
        if let Some(journal) = self.journal.as_mut() {
            journal.append(&record)?;
        }
        self.apply(record);
        Ok(())
    }
}

/// In-process credential registry.
///
/// Constructed explicitly and shared by `Arc`; every mutating call takes the
/// authenticated caller identity as a parameter.
pub struct CredentialRegistry {
    state: RwLock<RegistryState>,
    clock: Arc<dyn Clock>,
}

impl CredentialRegistry {
    /// Creates an empty, memory-only registry.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        CredentialRegistry {
            state: RwLock::new(RegistryState::default()),
            clock,
        }
    }

    /// Rebuilds a memory-only registry by replaying an event log.
    ///
    /// # Errors
    /// `Replay` if the log is out of sequence or contains an event that could
    /// not have been produced by the registry.
    pub fn from_events(clock: Arc<dyn Clock>, events: Vec<EventRecord>) -> Result<Self, RegistryError> {
        let mut state = RegistryState::default();
        for record in events {
            state.check_replayable(&record)?;
            state.apply(record);
        }
        info!(
            "Replayed {} events into {} credentials",
            state.events.len(),
            state.records.len()
        );
        Ok(CredentialRegistry {
            state: RwLock::new(state),
            clock,
        })
    }

    /// Rebuilds the registry from `events` and persists every later event to
    /// `journal`.
    pub fn with_journal(
        clock: Arc<dyn Clock>,
        journal: EventJournal,
        events: Vec<EventRecord>,
    ) -> Result<Self, RegistryError> {
        let registry = Self::from_events(clock, events)?;
        info!("Persisting registry events to {}", journal.path().display());
        registry.write().journal = Some(journal);
        Ok(registry)
    }

    /// Opens (or creates) the journal at `path` and restores the registry from it.
    pub fn open(clock: Arc<dyn Clock>, path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let (journal, events) = EventJournal::open(path)?;
        Self::with_journal(clock, journal, events)
    }

    // A poisoned lock is recoverable: mutations validate before writing,
    // so a panicking holder cannot leave a half-applied change behind.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current registry time in unix seconds.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Issues a new credential.
    ///
    /// # Arguments
    /// * `caller` - Authenticated identity invoking the operation
    /// * `request` - Issuer, subject, fingerprint and validity duration
    ///
    /// # Returns
    /// The freshly allocated credential id
    ///
    /// # Errors
    /// - `UnauthorizedIssuer` if `request.issuer` is not the caller
    /// - `InvalidSubject` if the subject is the zero address
    /// - `InvalidDuration` if the duration is not positive or overflows
    /// - `Journal` if the event could not be persisted
    pub fn issue(&self, caller: &Identity, request: IssueRequest) -> Result<CredentialId, RegistryError> {
        if request.issuer != *caller {
            debug!("Rejected issuance by {} on behalf of {}", caller, request.issuer);
            return Err(RegistryError::UnauthorizedIssuer {
                issuer: request.issuer.to_string(),
                caller: caller.to_string(),
            });
        }
        if request.subject.is_zero() {
            return Err(RegistryError::InvalidSubject(request.subject.to_string()));
        }
        let validity = u64::try_from(request.validity_seconds)
            .ok()
            .filter(|seconds| *seconds > 0)
            .ok_or(RegistryError::InvalidDuration(request.validity_seconds))?;

        let mut state = self.write();
        let issued_at = self.clock.now();
        let expires_at = issued_at
            .checked_add(validity)
            .ok_or(RegistryError::InvalidDuration(request.validity_seconds))?;

        if state.fingerprint_index.contains_key(&request.fingerprint) {
            warn!(
                "Fingerprint {:?} was already issued; recording a new credential for it",
                request.fingerprint
            );
        }

        let id = CredentialId(state.last_id + 1);
        state.commit(RegistryEvent::CredentialIssued {
            id,
            issuer: request.issuer,
            subject: request.subject,
            fingerprint: request.fingerprint,
            issued_at,
            expires_at,
        })?;

        info!(
            "Issued credential {} from {} to {} (expires at {})",
            id, request.issuer, request.subject, expires_at
        );
        Ok(id)
    }

    /// Reports the validity of a credential at the current time.
    ///
    /// Unknown ids report `NotFound`; this never fails.
    pub fn verify(&self, id: CredentialId) -> ValidityState {
        let now = self.clock.now();
        self.read()
            .records
            .get(&id)
            .map_or(ValidityState::NotFound, |credential| credential.validity_at(now))
    }

    /// Revokes a credential. Only its issuer may do so, and only once.
    ///
    /// # Errors
    /// - `NotFound` if no credential has this id
    /// - `UnauthorizedRevoker` if the caller is not the issuer
    /// - `AlreadyRevoked` if the credential was revoked before
    /// - `Journal` if the event could not be persisted
    pub fn revoke(&self, id: CredentialId, caller: &Identity) -> Result<(), RegistryError> {
        let mut state = self.write();
        let credential = state.records.get(&id).ok_or(RegistryError::NotFound(id))?;

        if credential.issuer != *caller {
            debug!("Rejected revocation of credential {} by {}", id, caller);
            return Err(RegistryError::UnauthorizedRevoker { id });
        }
        if credential.revoked {
            return Err(RegistryError::AlreadyRevoked(id));
        }

        let revoked_at = self.clock.now();
        state.commit(RegistryEvent::CredentialRevoked {
            id,
            caller: *caller,
            revoked_at,
        })?;

        info!("Revoked credential {} at {}", id, revoked_at);
        Ok(())
    }

    /// Returns a copy of one credential record.
    pub fn credential(&self, id: CredentialId) -> Option<Credential> {
        self.read().records.get(&id).cloned()
    }

    /// Ids issued to `subject`, in issuance order. Revoked and expired
    /// credentials are included.
    pub fn credentials_for_subject(&self, subject: &Identity) -> Vec<CredentialId> {
        self.read().subject_index.get(subject).cloned().unwrap_or_default()
    }

    /// Ids issued by `issuer`, in issuance order.
    pub fn credentials_for_issuer(&self, issuer: &Identity) -> Vec<CredentialId> {
        self.read().issuer_index.get(issuer).cloned().unwrap_or_default()
    }

    /// Ids carrying `fingerprint`, in issuance order.
    pub fn credentials_for_fingerprint(&self, fingerprint: &Fingerprint) -> Vec<CredentialId> {
        self.read().fingerprint_index.get(fingerprint).cloned().unwrap_or_default()
    }

    pub fn credential_count(&self) -> usize {
        self.read().records.len()
    }

    /// Events with a sequence number greater than `seq`, in order.
    pub fn events_since(&self, seq: u64) -> Vec<EventRecord> {
        let state = self.read();
        let start = usize::try_from(seq).unwrap_or(usize::MAX).min(state.events.len());
        state.events[start..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::content_binder::bind;
    use crate::utils::clock::ManualClock;
    use tokio_test::{assert_err, assert_ok};

    const START: u64 = 1_700_000_000;

    fn issuer() -> Identity {
        Identity::parse("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
    }

    fn subject() -> Identity {
        Identity::parse("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap()
    }

    fn stranger() -> Identity {
        Identity::parse("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC").unwrap()
    }

    fn setup() -> (Arc<ManualClock>, CredentialRegistry) {
        let clock = Arc::new(ManualClock::new(START));
        let registry = CredentialRegistry::new(clock.clone());
        (clock, registry)
    }

    fn request(claim: &str, validity_seconds: i64) -> IssueRequest {
        IssueRequest {
            issuer: issuer(),
            subject: subject(),
            fingerprint: bind(&issuer(), &subject(), claim).unwrap(),
            validity_seconds,
        }
    }

    #[test]
    fn test_issue_then_expire() {
        let (clock, registry) = setup();

        let id = assert_ok!(registry.issue(&issuer(), request("age>=18", 3600)));
        assert_eq!(id, CredentialId(1));
        assert_eq!(registry.verify(id), ValidityState::Valid);

        let credential = registry.credential(id).unwrap();
        assert_eq!(credential.issued_at, START);
        assert_eq!(credential.expires_at, START + 3600);
        assert!(!credential.revoked);

        clock.advance(3599);
        assert_eq!(registry.verify(id), ValidityState::Valid);
        clock.advance(1);
        assert_eq!(registry.verify(id), ValidityState::Expired);
        clock.advance(1);
        assert_eq!(registry.verify(id), ValidityState::Expired);
    }

    #[test]
    fn test_revoke_is_monotonic_past_expiry() {
        let (clock, registry) = setup();
        let id = registry.issue(&issuer(), request("age>=18", 3600)).unwrap();

        clock.advance(100);
        assert_ok!(registry.revoke(id, &issuer()));
        assert_eq!(registry.verify(id), ValidityState::Revoked);
        assert_eq!(registry.credential(id).unwrap().revoked_at, Some(START + 100));

        clock.set(START + 3700);
        assert_eq!(registry.verify(id), ValidityState::Revoked);
    }

    #[test]
    fn test_only_issuer_can_revoke() {
        let (_clock, registry) = setup();
        let id = registry.issue(&issuer(), request("age>=18", 3600)).unwrap();

        for caller in [stranger(), subject()] {
            let err = assert_err!(registry.revoke(id, &caller));
            assert!(matches!(err, RegistryError::UnauthorizedRevoker { .. }));
        }
        assert_eq!(registry.verify(id), ValidityState::Valid);
        assert!(!registry.credential(id).unwrap().revoked);
        assert_eq!(registry.events_since(0).len(), 1);
    }

    #[test]
    fn test_second_revocation_fails() {
        let (_clock, registry) = setup();
        let id = registry.issue(&issuer(), request("age>=18", 3600)).unwrap();

        registry.revoke(id, &issuer()).unwrap();
        let err = assert_err!(registry.revoke(id, &issuer()));
        assert!(matches!(err, RegistryError::AlreadyRevoked(found) if found == id));
        assert_eq!(registry.events_since(0).len(), 2);
    }

    #[test]
    fn test_revoke_unknown_id() {
        let (_clock, registry) = setup();
        let err = assert_err!(registry.revoke(CredentialId(42), &issuer()));
        assert!(matches!(err, RegistryError::NotFound(CredentialId(42))));
        assert_eq!(registry.verify(CredentialId(42)), ValidityState::NotFound);
    }

    #[test]
    fn test_zero_duration_leaves_no_trace() {
        let (_clock, registry) = setup();

        for bad in [0, -1, i64::MIN] {
            let err = assert_err!(registry.issue(&issuer(), request("age>=18", bad)));
            assert!(matches!(err, RegistryError::InvalidDuration(d) if d == bad));
        }

        assert!(registry.credentials_for_subject(&subject()).is_empty());
        assert!(registry.credentials_for_issuer(&issuer()).is_empty());
        assert_eq!(registry.credential_count(), 0);
        assert!(registry.events_since(0).is_empty());

        // The failed attempts did not consume an id
        assert_eq!(registry.issue(&issuer(), request("age>=18", 1)).unwrap(), CredentialId(1));
    }

    #[test]
    fn test_duration_overflow_is_rejected() {
        let clock = Arc::new(ManualClock::new(u64::MAX - 10));
        let registry = CredentialRegistry::new(clock);
        let err = assert_err!(registry.issue(&issuer(), request("age>=18", 11)));
        assert!(matches!(err, RegistryError::InvalidDuration(11)));
    }

    #[test]
    fn test_issue_on_behalf_of_another_fails() {
        let (_clock, registry) = setup();
        let err = assert_err!(registry.issue(&stranger(), request("age>=18", 3600)));
        assert!(matches!(err, RegistryError::UnauthorizedIssuer { .. }));
        assert_eq!(registry.credential_count(), 0);
    }

    #[test]
    fn test_zero_subject_is_rejected() {
        let (_clock, registry) = setup();
        let mut req = request("age>=18", 3600);
        req.subject = Identity::from(ethers_core::types::Address::zero());
        let err = assert_err!(registry.issue(&issuer(), req));
        assert!(matches!(err, RegistryError::InvalidSubject(_)));
    }

    #[test]
    fn test_lookups_keep_issuance_order_and_history() {
        let (_clock, registry) = setup();

        let first = registry.issue(&issuer(), request("age>=18", 3600)).unwrap();
        let other = registry
            .issue(
                &stranger(),
                IssueRequest {
                    issuer: stranger(),
                    subject: subject(),
                    fingerprint: bind(&stranger(), &subject(), "member").unwrap(),
                    validity_seconds: 60,
                },
            )
            .unwrap();
        let second = registry.issue(&issuer(), request("licensed", 3600)).unwrap();

        registry.revoke(first, &issuer()).unwrap();

        assert_eq!(registry.credentials_for_subject(&subject()), vec![first, other, second]);
        assert_eq!(registry.credentials_for_issuer(&issuer()), vec![first, second]);
        assert_eq!(registry.credentials_for_issuer(&stranger()), vec![other]);
        assert!(registry.credentials_for_subject(&stranger()).is_empty());
    }

    #[test]
    fn test_duplicate_fingerprint_is_indexed() {
        let (_clock, registry) = setup();
        let req = request("age>=18", 3600);
        let fingerprint = req.fingerprint;

        let a = registry.issue(&issuer(), req.clone()).unwrap();
        let b = registry.issue(&issuer(), req).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.credentials_for_fingerprint(&fingerprint), vec![a, b]);
    }

    #[test]
    fn test_events_since() {
        let (_clock, registry) = setup();
        let id = registry.issue(&issuer(), request("age>=18", 3600)).unwrap();
        registry.revoke(id, &issuer()).unwrap();

        let events = registry.events_since(0);
        assert_eq!(events.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![1, 2]);
        assert!(matches!(
            events[1].event,
            RegistryEvent::CredentialRevoked { caller, .. } if caller == issuer()
        ));
        assert_eq!(registry.events_since(1).len(), 1);
        assert!(registry.events_since(2).is_empty());
        assert!(registry.events_since(u64::MAX).is_empty());
    }

    #[test]
    fn test_replay_rebuilds_identical_state() {
        let (clock, registry) = setup();
        let a = registry.issue(&issuer(), request("age>=18", 3600)).unwrap();
        clock.advance(10);
        registry.issue(&issuer(), request("licensed", 60)).unwrap();
        registry.revoke(a, &issuer()).unwrap();

        let replayed = CredentialRegistry::from_events(clock.clone(), registry.events_since(0)).unwrap();

        for id in [CredentialId(1), CredentialId(2)] {
            assert_eq!(replayed.credential(id), registry.credential(id));
            assert_eq!(replayed.verify(id), registry.verify(id));
        }
        assert_eq!(replayed.credentials_for_subject(&subject()), registry.credentials_for_subject(&subject()));
        assert_eq!(replayed.credentials_for_issuer(&issuer()), registry.credentials_for_issuer(&issuer()));

        // The replayed registry continues the id sequence
        assert_eq!(replayed.issue(&issuer(), request("next", 60)).unwrap(), CredentialId(3));
    }

    #[test]
    fn test_replay_rejects_inconsistent_logs() {
        let (_clock, registry) = setup();
        let id = registry.issue(&issuer(), request("age>=18", 3600)).unwrap();
        registry.revoke(id, &issuer()).unwrap();
        let events = registry.events_since(0);
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(START));

        // Gap in sequence
        let gap = vec![events[1].clone()];
        assert!(matches!(
            CredentialRegistry::from_events(clock.clone(), gap),
            Err(RegistryError::Replay(_))
        ));

        // Revocation by someone other than the issuer
        let mut forged = events.clone();
        forged[1].event = RegistryEvent::CredentialRevoked {
            id,
            caller: stranger(),
            revoked_at: START,
        };
        assert!(matches!(
            CredentialRegistry::from_events(clock.clone(), forged),
            Err(RegistryError::Replay(_))
        ));

        // Double revocation
        let mut doubled = events.clone();
        let mut again = events[1].clone();
        again.seq = 3;
        doubled.push(again);
        assert!(matches!(
            CredentialRegistry::from_events(clock, doubled),
            Err(RegistryError::Replay(_))
        ));
    }

    #[test]
    fn test_journal_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let clock = Arc::new(ManualClock::new(START));

        {
            let registry = CredentialRegistry::open(clock.clone(), &path).unwrap();
            let id = registry.issue(&issuer(), request("age>=18", 3600)).unwrap();
            registry.revoke(id, &issuer()).unwrap();
            registry.issue(&issuer(), request("licensed", 3600)).unwrap();
        }

        let restored = CredentialRegistry::open(clock, &path).unwrap();
        assert_eq!(restored.credential_count(), 2);
        assert_eq!(restored.verify(CredentialId(1)), ValidityState::Revoked);
        assert_eq!(restored.verify(CredentialId(2)), ValidityState::Valid);
        assert_eq!(restored.events_since(0).len(), 3);
        assert_eq!(
            restored.issue(&issuer(), request("third", 3600)).unwrap(),
            CredentialId(3)
        );
    }

    #[test]
    fn test_restart_after_interrupted_append() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let clock = Arc::new(ManualClock::new(START));

        {
            let registry = CredentialRegistry::open(clock.clone(), &path).unwrap();
            registry.issue(&issuer(), request("age>=18", 3600)).unwrap();
        }
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"seq\":2,\"type\":\"CredentialRev").unwrap();
        drop(file);

        let restored = CredentialRegistry::open(clock.clone(), &path).unwrap();
        assert_eq!(restored.verify(CredentialId(1)), ValidityState::Valid);
        assert_ok!(restored.revoke(CredentialId(1), &issuer()));
        drop(restored);

        let restored = CredentialRegistry::open(clock, &path).unwrap();
        assert_eq!(restored.verify(CredentialId(1)), ValidityState::Revoked);
        assert_eq!(restored.events_since(0).len(), 2);
    }

    #[test]
    fn test_failed_journal_write_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let registry = CredentialRegistry::open(Arc::new(ManualClock::new(START)), &path).unwrap();
        let id = registry.issue(&issuer(), request("age>=18", 3600)).unwrap();

        registry.write().journal.as_mut().unwrap().mark_failed();

        assert!(matches!(
            registry.issue(&issuer(), request("licensed", 3600)),
            Err(RegistryError::Journal(_))
        ));
        assert!(matches!(registry.revoke(id, &issuer()), Err(RegistryError::Journal(_))));
        assert_eq!(registry.credential_count(), 1);
        assert_eq!(registry.verify(id), ValidityState::Valid);
        assert_eq!(registry.events_since(0).len(), 1);
        assert_eq!(registry.credentials_for_subject(&subject()), vec![id]);
    }

    #[test]
    fn test_concurrent_issuance_allocates_unique_ids() {
        let (_clock, registry) = setup();
        let registry = Arc::new(registry);
        let threads = 8;
        let per_thread = 50;

        std::thread::scope(|scope| {
            for t in 0..threads {
                let writer = registry.clone();
                scope.spawn(move || {
                    for n in 0..per_thread {
                        writer
                            .issue(&issuer(), request(&format!("claim-{}-{}", t, n), 3600))
                            .unwrap();
                    }
                });
                let reader = registry.clone();
                scope.spawn(move || {
                    for _ in 0..per_thread {
                        // Every indexed id must already resolve to a record
                        for id in reader.credentials_for_subject(&subject()) {
                            assert!(reader.credential(id).is_some());
                        }
                    }
                });
            }
        });

        let total = threads * per_thread;
        let mut ids = registry.credentials_for_subject(&subject());
        assert_eq!(ids.len(), total);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(registry.credentials_for_issuer(&issuer()).len(), total);
        assert_eq!(registry.events_since(0).len(), total);
    }
}
