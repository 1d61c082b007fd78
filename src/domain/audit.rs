//! Audit stamping for insert and update paths.
//!
//! Every mutable record carries `Created`/`CreatedBy` (write-once) and
//! `Modified`/`ModifiedBy` (refreshed by every mutation). The stamper itself
//! does no I/O; time and principal come from injectable sources so callers can
//! thread a real identity through and tests can control the clock.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::Actor;

/// Source of "now" for audit timestamps.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Resolves the principal performing the current mutation.
pub trait ActorResolver: Send + Sync + fmt::Debug {
    fn resolve(&self) -> Actor;
}

/// Resolver that always answers with one configured principal.
#[derive(Debug, Clone)]
pub struct FixedActor(Actor);

impl FixedActor {
    pub fn new(actor: Actor) -> Self {
        FixedActor(actor)
    }
}

impl ActorResolver for FixedActor {
    fn resolve(&self) -> Actor {
        self.0.clone()
    }
}

/// Audit columns shared by companies and contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub created_by: String,
    pub modified_by: String,
}

/// Values written to `Modified`/`ModifiedBy` by a mutating statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    pub at: DateTime<Utc>,
    pub by: Actor,
}

#[derive(Debug, Clone)]
pub struct AuditStamper {
    clock: Arc<dyn Clock>,
    actor: Arc<dyn ActorResolver>,
}

impl AuditStamper {
    pub fn new(clock: Arc<dyn Clock>, actor: Arc<dyn ActorResolver>) -> Self {
        Self { clock, actor }
    }

    /// Stamper using the wall clock and a fixed principal.
    pub fn system(actor: Actor) -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(FixedActor::new(actor)))
    }

    /// Timestamps are truncated to milliseconds so they survive a round trip
    /// through the TEXT column unchanged.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    /// Audit fields for a brand-new row: created and modified coincide.
    pub fn for_insert(&self) -> AuditFields {
        let at = self.now();
        let by = self.actor.resolve();
        AuditFields {
            created: at,
            modified: at,
            created_by: by.0.clone(),
            modified_by: by.0,
        }
    }

    /// Modification stamp for any later write.
    pub fn for_update(&self) -> Modification {
        Modification {
            at: self.now(),
            by: self.actor.resolve(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug)]
    struct FrozenClock(DateTime<Utc>);

    impl Clock for FrozenClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn stamper(at: DateTime<Utc>) -> AuditStamper {
        AuditStamper::new(
            Arc::new(FrozenClock(at)),
            Arc::new(FixedActor::new(Actor::new("conor"))),
        )
    }

    #[test]
    fn test_insert_stamp_sets_all_four_fields() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let fields = stamper(at).for_insert();
        assert_eq!(fields.created, at);
        assert_eq!(fields.modified, at);
        assert_eq!(fields.created_by, "conor");
        assert_eq!(fields.modified_by, "conor");
    }

    #[test]
    fn test_update_stamp_uses_resolved_actor() {
        let at = Utc.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap();
        let stamp = stamper(at).for_update();
        assert_eq!(stamp.at, at);
        assert_eq!(stamp.by, Actor::new("conor"));
    }

    #[test]
    fn test_sub_millisecond_precision_dropped() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let fields = stamper(at).for_insert();
        assert_eq!(fields.created.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_system_stamper_uses_wall_clock() {
        let before = Utc::now().trunc_subsecs(3);
        let fields = AuditStamper::system(Actor::new("ops")).for_insert();
        assert!(fields.created >= before);
        assert_eq!(fields.created_by, "ops");
    }
}
