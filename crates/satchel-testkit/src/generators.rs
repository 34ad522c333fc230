//! Proptest generators for property-based testing.

use proptest::prelude::*;

use satchel::{MediaKind, Role};

/// Generate a username: leading letter, then word characters.
pub fn username() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,15}"
}

/// Generate a printable credential.
pub fn credential() -> impl Strategy<Value = String> {
    "[ -~]{1,32}"
}

/// Generate any role.
pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Operator),
        Just(Role::Admin),
        Just(Role::Member),
        Just(Role::NonPlayerMember),
    ]
}

/// Generate a role that passes the admin gate.
pub fn elevated_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Operator), Just(Role::Admin)]
}

/// Generate a media kind.
pub fn media_kind() -> impl Strategy<Value = MediaKind> {
    prop_oneof![
        Just(MediaKind::Text),
        Just(MediaKind::Image),
        Just(MediaKind::Audio),
        Just(MediaKind::Video),
    ]
}

/// Generate a storage reference shaped like a library deposit.
pub fn storage_ref() -> impl Strategy<Value = String> {
    ("[0-9]{10,13}", "[1-9][0-9]{0,8}", "[a-z]{1,12}", "(txt|png|ogg|mp4)").prop_map(
        |(millis, suffix, stem, ext)| format!("{}-{}-{}.{}", millis, suffix, stem, ext),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{TestFixture, FIXTURE_CREDENTIAL};

    proptest! {
        #[test]
        fn test_usernames_are_filename_safe(name in username()) {
            prop_assert!(!name.trim().is_empty());
            prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }

        #[test]
        fn test_elevated_roles_pass_the_gate(role in elevated_role()) {
            prop_assert!(role.is_elevated());
        }

        #[test]
        fn test_storage_refs_parse_back(reference in storage_ref()) {
            let mut parts = reference.splitn(3, '-');
            prop_assert!(parts.next().unwrap().parse::<u64>().is_ok());
            prop_assert!(parts.next().unwrap().parse::<u32>().is_ok());
            prop_assert!(parts.next().is_some());
        }
    }

    proptest! {
        // Each case costs several credential hashes; keep the count low.
        #![proptest_config(ProptestConfig::with_cases(4))]

        #[test]
        fn test_generated_identities_can_authenticate(name in username()) {
            // The bootstrap operator already owns this name.
            prop_assume!(name != "Operator");
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime");
            rt.block_on(async {
                let fixture = TestFixture::new().await;
                let identity = fixture.member(&name).await;
                let verified = fixture
                    .service
                    .verify_credentials(&identity.username, FIXTURE_CREDENTIAL)
                    .await
                    .expect("verification errored");
                prop_assert!(verified.is_some());
                Ok(())
            })?;
        }
    }
}
