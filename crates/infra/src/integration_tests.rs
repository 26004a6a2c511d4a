//! Integration tests for the request workflows over the in-memory store.
//!
//! Tests: registration → login → token resolution → catalog → deals/questions
//!
//! Verifies:
//! - Email uniqueness spans buyers and sellers
//! - Role gates and ownership checks surface as `Forbidden`
//! - Pending-deal dedup and the deal status policy
//! - Car deletion is refused while deals are active

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use dealership_auth::{
        BcryptHasher, Hs256Jwt, Principal, ResolveError, Role, RoleResolver, TokenConfig,
    };
    use dealership_catalog::{CarFilter, CarSpec, Condition, NewStore, Transmission};
    use dealership_core::{Clock, DomainError, FixedClock};
    use dealership_parties::{BuyerRegistration, CarProfile, Preferences, SellerRegistration};
    use dealership_sales::{DealStatus, TransitionPolicy};

    use crate::directory::AccountDirectory;
    use crate::error::ServiceError;
    use crate::store::{InMemoryMarketplace, MarketplaceStore, StoreError};
    use crate::workflows::{LOW_MILEAGE_CEILING, Marketplace, Profile};

    struct Harness {
        market: Marketplace,
        resolver: RoleResolver<AccountDirectory>,
        clock: Arc<FixedClock>,
    }

    fn harness_with(policy: TransitionPolicy) -> Harness {
        let store: Arc<dyn MarketplaceStore> = Arc::new(InMemoryMarketplace::new());
        let tokens = Arc::new(Hs256Jwt::new(&TokenConfig::new(
            "integration-secret",
            Duration::minutes(30),
        )));
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let market = Marketplace::new(
            store.clone(),
            Arc::new(BcryptHasher::with_cost(4)),
            tokens.clone(),
            clock.clone(),
            policy,
        );
        let resolver = RoleResolver::new(tokens, AccountDirectory::new(store), clock.clone());
        Harness {
            market,
            resolver,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(TransitionPolicy::Strict)
    }

    fn buyer_registration(email: &str) -> BuyerRegistration {
        BuyerRegistration {
            email: email.to_string(),
            password: "pw1".to_string(),
            full_name: "Bea Buyer".to_string(),
            contact_info: Some("555-0100".to_string()),
            preferences: Preferences::default(),
        }
    }

    fn seller_registration(email: &str) -> SellerRegistration {
        SellerRegistration {
            email: email.to_string(),
            password: "pw2".to_string(),
            full_name: "Sam Seller".to_string(),
            contact_info: None,
        }
    }

    fn camry(price: i64) -> CarSpec {
        CarSpec {
            brand: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2020,
            power: 181,
            transmission: Transmission::Automatic,
            condition: Condition::Used,
            mileage: 42_000,
            price,
            features: vec!["cruise control".to_string()],
        }
    }

    async fn login(h: &Harness, email: &str, password: &str) -> Principal {
        let outcome = h.market.login(email, password).await.unwrap();
        h.resolver.resolve(&outcome.access_token).await.unwrap()
    }

    async fn buyer(h: &Harness, email: &str) -> Principal {
        h.market.register_buyer(buyer_registration(email)).await.unwrap();
        login(h, email, "pw1").await
    }

    async fn seller(h: &Harness, email: &str) -> Principal {
        h.market.register_seller(seller_registration(email)).await.unwrap();
        login(h, email, "pw2").await
    }

    fn assert_forbidden<T: std::fmt::Debug>(result: Result<T, ServiceError>) {
        assert!(
            matches!(result, Err(ServiceError::Domain(DomainError::Forbidden(_)))),
            "expected Forbidden, got {result:?}"
        );
    }

    fn assert_conflict<T: std::fmt::Debug>(result: Result<T, ServiceError>) {
        assert!(
            matches!(result, Err(ServiceError::Store(StoreError::Conflict(_)))),
            "expected Conflict, got {result:?}"
        );
    }

    #[tokio::test]
    async fn email_is_unique_across_buyers_and_sellers() {
        let h = harness();
        h.market.register_buyer(buyer_registration("b@x.com")).await.unwrap();

        assert_conflict(h.market.register_seller(seller_registration("b@x.com")).await);
        assert_conflict(h.market.register_buyer(buyer_registration("B@X.com ")).await);

        h.market.register_seller(seller_registration("s@x.com")).await.unwrap();
        assert_conflict(h.market.register_buyer(buyer_registration("s@x.com")).await);
    }

    #[tokio::test]
    async fn login_picks_role_from_the_table_it_matched() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let s = seller(&h, "s@x.com").await;
        assert_eq!(b.role(), Role::Buyer);
        assert_eq!(s.role(), Role::Seller);
    }

    #[tokio::test]
    async fn unknown_identity_and_wrong_password_fail_alike() {
        let h = harness();
        h.market.register_buyer(buyer_registration("b@x.com")).await.unwrap();

        let unknown = h.market.login("nobody@x.com", "pw1").await.unwrap_err();
        let wrong = h.market.login("b@x.com", "nope").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(wrong, ServiceError::Domain(DomainError::Unauthenticated)));
    }

    #[tokio::test]
    async fn token_stops_resolving_after_ttl() {
        let h = harness();
        h.market.register_buyer(buyer_registration("b@x.com")).await.unwrap();
        let outcome = h.market.login("b@x.com", "pw1").await.unwrap();
        assert_eq!(outcome.expires_at.timestamp(), (h.clock.now() + Duration::minutes(30)).timestamp());

        h.clock.advance(Duration::minutes(30));
        let err = h.resolver.resolve(&outcome.access_token).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn role_gates_are_forbidden_not_unauthenticated() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let s = seller(&h, "s@x.com").await;
        let car = h.market.create_car(&s, None, camry(20_000)).await.unwrap();

        assert_forbidden(h.market.create_car(&b, None, camry(1)).await);
        assert_forbidden(h.market.create_deal(&s, car.id).await);
        assert_forbidden(h.market.favorites(&s).await);
        assert_forbidden(h.market.ask_question(&s, car.id, "hi").await);
    }

    #[tokio::test]
    async fn deal_scenario_snapshot_approve_and_reopen() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let s = seller(&h, "s@x.com").await;
        let car = h.market.create_car(&s, None, camry(20_000)).await.unwrap();

        let deal = h.market.create_deal(&b, car.id).await.unwrap();
        assert_eq!(deal.status, DealStatus::Pending);
        assert_eq!(deal.price, 20_000);

        // Later price edits do not touch the snapshot.
        h.market.update_car(&s, car.id, None, camry(25_000)).await.unwrap();

        h.market.set_deal_status(&s, deal.id, "approved").await.unwrap();
        let mine = h.market.my_deals(&b).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].deal.status, DealStatus::Approved);
        assert_eq!(mine[0].deal.price, 20_000);
        assert_eq!(mine[0].seller_name, "Sam Seller");

        // Only a pending deal blocks a new one.
        let second = h.market.create_deal(&b, car.id).await.unwrap();
        assert_eq!(second.price, 25_000);

        let sellers_view = h.market.my_deals(&s).await.unwrap();
        assert_eq!(sellers_view.len(), 2);
        assert_eq!(sellers_view[0].buyer_contact.as_deref(), Some("555-0100"));
    }

    #[tokio::test]
    async fn second_pending_deal_conflicts_until_first_closes() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let s = seller(&h, "s@x.com").await;
        let car = h.market.create_car(&s, None, camry(20_000)).await.unwrap();

        let first = h.market.create_deal(&b, car.id).await.unwrap();
        assert_conflict(h.market.create_deal(&b, car.id).await);

        h.market.set_deal_status(&s, first.id, "rejected").await.unwrap();
        h.market.create_deal(&b, car.id).await.unwrap();
    }

    #[tokio::test]
    async fn completed_deal_frees_the_pair_for_a_new_one() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let s = seller(&h, "s@x.com").await;
        let car = h.market.create_car(&s, None, camry(20_000)).await.unwrap();

        let first = h.market.create_deal(&b, car.id).await.unwrap();
        h.market.set_deal_status(&s, first.id, "approved").await.unwrap();
        h.market.set_deal_status(&s, first.id, "completed").await.unwrap();

        let next = h.market.create_deal(&b, car.id).await.unwrap();
        assert_ne!(next.id, first.id);
        assert_eq!(next.status, DealStatus::Pending);
        assert_conflict(h.market.create_deal(&b, car.id).await);
    }

    #[tokio::test]
    async fn concurrent_deal_creation_admits_exactly_one() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let s = seller(&h, "s@x.com").await;
        let car_id = h.market.create_car(&s, None, camry(20_000)).await.unwrap().id;

        let attempts = (0..8).map(|_| {
            let market = h.market.clone();
            let b = b.clone();
            tokio::spawn(async move { market.create_deal(&b, car_id).await.is_ok() })
        });
        let mut successes = 0;
        for handle in attempts.collect::<Vec<_>>() {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn status_change_checks_run_in_order() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let owner = seller(&h, "s@x.com").await;
        let other = seller(&h, "o@x.com").await;
        let car = h.market.create_car(&owner, None, camry(20_000)).await.unwrap();
        let deal = h.market.create_deal(&b, car.id).await.unwrap();

        let missing = h
            .market
            .set_deal_status(&owner, dealership_core::DealId::new(), "approved")
            .await;
        assert!(matches!(missing, Err(ServiceError::Domain(DomainError::NotFound(_)))));

        // Non-owner is forbidden even with a bogus label.
        assert_forbidden(h.market.set_deal_status(&other, deal.id, "bogus").await);

        let bad_label = h.market.set_deal_status(&owner, deal.id, "bogus").await;
        assert!(matches!(bad_label, Err(ServiceError::Domain(DomainError::InvalidValue(_)))));

        let skip = h.market.set_deal_status(&owner, deal.id, "completed").await;
        assert!(matches!(
            skip,
            Err(ServiceError::Domain(DomainError::InvalidTransition { .. }))
        ));
    }

    #[tokio::test]
    async fn non_owner_is_forbidden_in_every_deal_state() {
        let h = harness_with(TransitionPolicy::Relaxed);
        let b = buyer(&h, "b@x.com").await;
        let owner = seller(&h, "s@x.com").await;
        let other = seller(&h, "o@x.com").await;
        let car = h.market.create_car(&owner, None, camry(20_000)).await.unwrap();
        let deal = h.market.create_deal(&b, car.id).await.unwrap();

        for status in DealStatus::ALL {
            h.market.set_deal_status(&owner, deal.id, status.as_str()).await.unwrap();
            assert_forbidden(h.market.set_deal_status(&other, deal.id, "approved").await);
        }
    }

    #[tokio::test]
    async fn relaxed_policy_allows_reopening_a_closed_deal() {
        let h = harness_with(TransitionPolicy::Relaxed);
        let b = buyer(&h, "b@x.com").await;
        let s = seller(&h, "s@x.com").await;
        let car = h.market.create_car(&s, None, camry(20_000)).await.unwrap();
        let deal = h.market.create_deal(&b, car.id).await.unwrap();

        h.market.set_deal_status(&s, deal.id, "completed").await.unwrap();
        let reopened = h.market.set_deal_status(&s, deal.id, "pending").await.unwrap();
        assert_eq!(reopened.status, DealStatus::Pending);
    }

    #[tokio::test]
    async fn questions_allow_repeats_and_answer_overwrites() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let owner = seller(&h, "s@x.com").await;
        let other = seller(&h, "o@x.com").await;
        let car = h.market.create_car(&owner, None, camry(20_000)).await.unwrap();

        let q = h.market.ask_question(&b, car.id, "Any accidents?").await.unwrap();
        h.market.ask_question(&b, car.id, "Service history?").await.unwrap();
        assert_eq!(h.market.my_questions(&b).await.unwrap().len(), 2);
        assert_eq!(h.market.my_questions(&owner).await.unwrap().len(), 2);
        assert!(h.market.my_questions(&other).await.unwrap().is_empty());

        assert_forbidden(h.market.answer_question(&other, q.id, "No").await);

        h.market.answer_question(&owner, q.id, "No").await.unwrap();
        let updated = h.market.answer_question(&owner, q.id, "One, minor").await.unwrap();
        assert_eq!(updated.answer.as_deref(), Some("One, minor"));

        let missing_car = h.market.ask_question(&b, dealership_core::CarId::new(), "?").await;
        assert!(matches!(missing_car, Err(ServiceError::Domain(DomainError::NotFound(_)))));
    }

    #[tokio::test]
    async fn favorites_are_unique_per_pair() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let s = seller(&h, "s@x.com").await;
        let car = h.market.create_car(&s, None, camry(20_000)).await.unwrap();

        h.market.add_favorite(&b, car.id).await.unwrap();
        assert_conflict(h.market.add_favorite(&b, car.id).await);
        assert_eq!(h.market.favorites(&b).await.unwrap().len(), 1);

        h.market.remove_favorite(&b, car.id).await.unwrap();
        let again = h.market.remove_favorite(&b, car.id).await;
        assert!(matches!(again, Err(ServiceError::Store(StoreError::NotFound(_)))));
    }

    #[tokio::test]
    async fn car_with_active_deal_cannot_be_deleted() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let s = seller(&h, "s@x.com").await;
        let other = seller(&h, "o@x.com").await;
        let car = h.market.create_car(&s, None, camry(20_000)).await.unwrap();
        let deal = h.market.create_deal(&b, car.id).await.unwrap();

        assert_forbidden(h.market.delete_car(&other, car.id).await);
        assert_conflict(h.market.delete_car(&s, car.id).await);

        h.market.set_deal_status(&s, deal.id, "approved").await.unwrap();
        assert_conflict(h.market.delete_car(&s, car.id).await);

        h.market.set_deal_status(&s, deal.id, "completed").await.unwrap();
        h.market.delete_car(&s, car.id).await.unwrap();
        assert!(h.market.my_deals(&b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn car_listing_requires_existing_store() {
        let h = harness();
        let s = seller(&h, "s@x.com").await;

        let missing = h
            .market
            .create_car(&s, Some(dealership_core::StoreId::new()), camry(20_000))
            .await;
        assert!(matches!(missing, Err(ServiceError::Domain(DomainError::NotFound(_)))));

        let store = h
            .market
            .create_store(
                &s,
                NewStore {
                    name: "Downtown".to_string(),
                    address: "1 Main St".to_string(),
                },
            )
            .await
            .unwrap();
        h.market.create_car(&s, Some(store.id), camry(20_000)).await.unwrap();

        let stores = h.market.stores().await.unwrap();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].1, 1);
    }

    #[tokio::test]
    async fn search_and_buyer_matching() {
        let h = harness();
        let s = seller(&h, "s@x.com").await;
        let car = h.market.create_car(&s, None, camry(20_000)).await.unwrap();
        let mut bmw = camry(50_000);
        bmw.brand = "BMW".to_string();
        bmw.model = "X5".to_string();
        h.market.create_car(&s, None, bmw).await.unwrap();

        let filter = CarFilter {
            brand: Some("toy".to_string()),
            ..CarFilter::default()
        };
        assert_eq!(h.market.search_cars(&filter).await.unwrap().len(), 1);

        let mut picky = buyer_registration("picky@x.com");
        picky.preferences.max_price = Some(10_000);
        h.market.register_buyer(picky).await.unwrap();
        let mut fan = buyer_registration("fan@x.com");
        fan.preferences.preferred_brand = Some("toyota".to_string());
        h.market.register_buyer(fan).await.unwrap();
        h.market.register_buyer(buyer_registration("any@x.com")).await.unwrap();

        let matches = h.market.buyers_for_car(car.id).await.unwrap();
        let mut emails: Vec<&str> = matches.iter().map(|b| b.email.as_str()).collect();
        emails.sort();
        assert_eq!(emails, vec!["any@x.com", "fan@x.com"]);

        let analysis = h.market.market_analysis().await.unwrap();
        assert_eq!(analysis.buyers_count, 1);
        assert_eq!(analysis.total_car_value, 70_000);
    }

    #[tokio::test]
    async fn buyers_match_a_described_car_and_a_model() {
        let h = harness();
        let mut fan = buyer_registration("fan@x.com");
        fan.preferences.preferred_model = Some("Camry".to_string());
        fan.preferences.max_power = Some(150);
        h.market.register_buyer(fan).await.unwrap();
        let mut budget = buyer_registration("budget@x.com");
        budget.preferences.max_price = Some(10_000);
        h.market.register_buyer(budget).await.unwrap();

        // No power given: power bounds do not apply.
        let profile = CarProfile {
            brand: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2020,
            power: None,
            transmission: Transmission::Automatic,
            condition: Condition::Used,
            price: 20_000,
        };
        let matches = h.market.buyers_for_profile(&profile).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].email, "fan@x.com");

        let by_model = h.market.buyers_by_model("camry").await.unwrap();
        assert_eq!(by_model.len(), 1);
        assert_eq!(by_model[0].email, "fan@x.com");
        assert!(h.market.buyers_by_model("Corolla").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn curated_car_lists() {
        let h = harness();
        let s = seller(&h, "s@x.com").await;

        let none = h.market.most_expensive_car().await;
        assert!(matches!(none, Err(ServiceError::Domain(DomainError::NotFound(_)))));

        let mut fresh = camry(30_000);
        fresh.condition = Condition::New;
        fresh.mileage = 10;
        let fresh = h.market.create_car(&s, None, fresh).await.unwrap();
        let mut edge = camry(15_000);
        edge.mileage = LOW_MILEAGE_CEILING;
        h.market.create_car(&s, None, edge).await.unwrap();
        let mut tied = camry(30_000);
        tied.model = "Corolla".to_string();
        h.market.create_car(&s, None, tied).await.unwrap();

        let low = h.market.low_mileage_cars().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, fresh.id);

        let new = h.market.new_cars().await.unwrap();
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].seller_name.as_deref(), Some("Sam Seller"));

        // Earliest listing wins the price tie.
        let top = h.market.most_expensive_car().await.unwrap();
        assert_eq!(top.car.id, fresh.id);
        assert_eq!(top.seller.map(|s| s.full_name).as_deref(), Some("Sam Seller"));
    }

    #[tokio::test]
    async fn profile_reflects_principal_kind() {
        let h = harness();
        let b = buyer(&h, "b@x.com").await;
        let s = seller(&h, "s@x.com").await;
        h.market.create_car(&s, None, camry(20_000)).await.unwrap();

        assert!(matches!(h.market.profile(&b).await.unwrap(), Profile::Buyer(_)));
        match h.market.profile(&s).await.unwrap() {
            Profile::Seller { cars_count, role, .. } => {
                assert_eq!(cars_count, 1);
                assert_eq!(role, Role::Seller);
            }
            other => panic!("expected seller profile, got {other:?}"),
        }
    }
}
