//! Property tests for controller identity and key type parsing. No network.

use kmsc_client::{ControllerKey, FromSecretOptions, KeyType, KmsClient, KmsClientConfig};
use kmsc_core::Handle;
use kmsc_crypto::SeedCache;
use proptest::prelude::*;

fn offline_client() -> KmsClient {
    KmsClient::new(KmsClientConfig::local_mock("http://127.0.0.1:9").unwrap()).unwrap()
}

fn controller(secret: &str, handle: &str, cache: &SeedCache) -> ControllerKey {
    ControllerKey::from_secret(FromSecretOptions::new(secret, handle), cache, offline_client())
        .unwrap()
}

proptest! {
    #[test]
    fn same_inputs_give_same_controller(secret in ".{0,32}", handle in "[a-z0-9@.:/ ]{0,24}") {
        let cache = SeedCache::with_capacity(0);
        let a = controller(&secret, &handle, &cache);
        let b = controller(&secret, &handle, &cache);
        prop_assert_eq!(a.did(), b.did());
        prop_assert_eq!(a.id(), b.id());
        prop_assert!(a.id().starts_with(a.did().as_str()));
    }

    #[test]
    fn handle_salts_the_identity(secret in ".{1,32}", handle in "[a-z]{1,12}") {
        let cache = SeedCache::with_capacity(0);
        let other = format!("{handle}x");
        let a = controller(&secret, &handle, &cache);
        let b = controller(&secret, &other, &cache);
        prop_assert_ne!(a.did(), b.did());
    }

    #[test]
    fn cached_controller_matches_fresh(secret in ".{1,32}", handle in "[a-z]{1,12}") {
        let cache = SeedCache::default();
        let fresh = controller(&secret, &handle, &cache);
        let restored = ControllerKey::from_cache(&Handle::from(handle.as_str()), None, &cache, offline_client())
            .unwrap()
            .unwrap();
        prop_assert_eq!(fresh.did(), restored.did());
    }

    #[test]
    fn unknown_type_names_are_rejected(name in "[a-z]{1,16}") {
        prop_assume!(!["hmac", "kek"].contains(&name.as_str()));
        prop_assert!(KeyType::parse(&name).is_err());
    }
}
