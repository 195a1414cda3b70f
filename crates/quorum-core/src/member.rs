//! Member — a participant in a party.
//!
//! A member may be linked to a global user identity, but unlinked members are
//! first-class: they appear in the roster and count toward "everyone
//! available", they just cannot authenticate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A participant in a party. Party affiliation is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
  pub member_id:    Uuid,
  pub party_id:     Uuid,
  /// Raw name the member was created with.
  pub name:         String,
  /// Per-party display override.
  pub nickname:     Option<String>,
  /// Linked global user identity, if any.
  pub user_id:      Option<Uuid>,
  /// Profile name of the linked user.
  pub profile_name: Option<String>,
  /// Where this member usually hosts.
  pub address:      Option<String>,
}

impl Member {
  /// Resolved display name: per-party nickname, then the linked profile name,
  /// then the raw member name.
  pub fn display_name(&self) -> &str {
    self
      .nickname
      .as_deref()
      .or(self.profile_name.as_deref())
      .unwrap_or(&self.name)
  }
}
