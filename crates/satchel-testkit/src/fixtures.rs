//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use satchel::store::MemoryStore;
use satchel::{ExchangeService, Identity, Role, ServiceConfig};

/// Credential shared by every fixture identity.
pub const FIXTURE_CREDENTIAL: &str = "fixture-secret";

/// A bootstrapped exchange over a memory store.
pub struct TestFixture {
    pub service: ExchangeService<MemoryStore>,
    pub operator: Identity,
}

impl TestFixture {
    /// Bootstrap a fresh exchange with the default configuration.
    pub async fn new() -> Self {
        let service = ExchangeService::new(MemoryStore::new(), ServiceConfig::default());
        let operator = service.bootstrap().await.expect("bootstrap failed");
        Self { service, operator }
    }

    /// Create a plain member holding the fixture credential.
    pub async fn member(&self, username: &str) -> Identity {
        self.with_role(username, Role::Member).await
    }

    /// Create an identity with an explicit role.
    pub async fn with_role(&self, username: &str, role: Role) -> Identity {
        self.service
            .create_identity(username, FIXTURE_CREDENTIAL, role)
            .await
            .expect("identity creation failed")
    }

    /// Make two identities mutual contacts, as if `actor` scanned
    /// `target`'s share token.
    pub async fn connect(&self, actor: &Identity, target: &Identity) {
        self.service
            .connect_by_token(actor.id, &target.share_token)
            .await
            .expect("connect failed");
    }
}

/// Bootstrap a fixture holding `count` members named `member0..`.
pub async fn multi_identity(count: usize) -> (TestFixture, Vec<Identity>) {
    let fixture = TestFixture::new().await;
    let mut members = Vec::with_capacity(count);
    for i in 0..count {
        members.push(fixture.member(&format!("member{}", i)).await);
    }
    (fixture, members)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_seeds_operator() {
        let fixture = TestFixture::new().await;
        assert_eq!(fixture.operator.role, Role::Operator);
        assert!(fixture.operator.is_operator());
    }

    #[tokio::test]
    async fn test_members_get_distinct_share_tokens() {
        let (_fixture, members) = multi_identity(3).await;
        assert_ne!(members[0].share_token, members[1].share_token);
        assert_ne!(members[1].share_token, members[2].share_token);
        assert_ne!(members[0].share_token, members[2].share_token);
    }

    #[tokio::test]
    async fn test_connect_links_both_sides() {
        let (fixture, members) = multi_identity(2).await;
        fixture.connect(&members[0], &members[1]).await;

        let of_first = fixture.service.contacts_of(members[0].id).await.unwrap();
        let of_second = fixture.service.contacts_of(members[1].id).await.unwrap();
        assert!(of_first.iter().any(|c| c.id == members[1].id));
        assert!(of_second.iter().any(|c| c.id == members[0].id));
    }
}
