use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dealership_catalog::Car;
use dealership_core::{BuyerId, CarId, DealId, DomainError, DomainResult, Entity, SellerId};

/// Deal status lifecycle.
///
/// `pending -> approved | rejected`, `approved -> completed`. `rejected` and
/// `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl DealStatus {
    pub const ALL: [DealStatus; 4] = [
        DealStatus::Pending,
        DealStatus::Approved,
        DealStatus::Rejected,
        DealStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Pending => "pending",
            DealStatus::Approved => "approved",
            DealStatus::Rejected => "rejected",
            DealStatus::Completed => "completed",
        }
    }

    /// Pending and approved deals block deletion of their car.
    pub fn is_active(&self) -> bool {
        matches!(self, DealStatus::Pending | DealStatus::Approved)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DealStatus::Rejected | DealStatus::Completed)
    }

    /// Only a pending deal prevents the same buyer opening another on the same car.
    pub fn blocks_new_deal(&self) -> bool {
        *self == DealStatus::Pending
    }

    /// Edges of the strict graph.
    pub fn can_transition_to(&self, next: DealStatus) -> bool {
        matches!(
            (self, next),
            (DealStatus::Pending, DealStatus::Approved)
                | (DealStatus::Pending, DealStatus::Rejected)
                | (DealStatus::Approved, DealStatus::Completed)
        )
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DealStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                DomainError::invalid_value(format!(
                    "deal status must be one of: pending, approved, rejected, completed (got '{s}')"
                ))
            })
    }
}

/// How status changes are checked once the label is recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Only edges of the lifecycle graph are accepted.
    #[default]
    Strict,
    /// Any recognised label may replace any other.
    Relaxed,
}

impl FromStr for TransitionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "relaxed" => Ok(TransitionPolicy::Relaxed),
            other => Err(DomainError::invalid_value(format!(
                "transition policy must be strict or relaxed (got '{other}')"
            ))),
        }
    }
}

/// A buyer's purchase inquiry on one car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub id: DealId,
    pub buyer_id: BuyerId,
    pub car_id: CarId,
    /// Car price at the moment the deal was opened.
    pub price: i64,
    pub status: DealStatus,
    pub deal_date: DateTime<Utc>,
}

impl Entity for Deal {
    type Id = DealId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Deal {
    /// New pending deal with the car's current price snapshotted.
    pub fn open(id: DealId, buyer_id: BuyerId, car: &Car, now: DateTime<Utc>) -> Self {
        Self {
            id,
            buyer_id,
            car_id: car.id,
            price: car.price(),
            status: DealStatus::Pending,
            deal_date: now,
        }
    }

    /// Decide the status a seller's request leads to, without mutating.
    ///
    /// Checks run in a fixed order: ownership (`Forbidden`), label
    /// membership (`InvalidValue`), then the policy (`InvalidTransition`).
    pub fn decide_status(
        &self,
        car_owner: SellerId,
        acting_seller: SellerId,
        requested: &str,
        policy: TransitionPolicy,
    ) -> DomainResult<DealStatus> {
        if car_owner != acting_seller {
            return Err(DomainError::forbidden("deal is on another seller's car"));
        }

        let next: DealStatus = requested.parse()?;

        match policy {
            TransitionPolicy::Relaxed => Ok(next),
            TransitionPolicy::Strict if self.status.can_transition_to(next) => Ok(next),
            TransitionPolicy::Strict => Err(DomainError::invalid_transition(
                self.status.as_str(),
                next.as_str(),
            )),
        }
    }

    /// Apply a decided status.
    pub fn apply_status(&mut self, next: DealStatus) {
        self.status = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealership_catalog::{CarSpec, Condition, NewCar, Transmission};
    use proptest::prelude::*;

    fn test_car(seller_id: SellerId, price: i64) -> Car {
        Car::list(
            CarId::new(),
            NewCar {
                seller_id,
                store_id: None,
                spec: CarSpec {
                    brand: "Toyota".to_string(),
                    model: "Camry".to_string(),
                    year: 2020,
                    power: 181,
                    transmission: Transmission::Automatic,
                    condition: Condition::Used,
                    mileage: 10_000,
                    price,
                    features: Vec::new(),
                },
            },
            test_time(),
        )
        .unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn deal_in(status: DealStatus) -> (Deal, SellerId) {
        let owner = SellerId::new();
        let mut deal = Deal::open(DealId::new(), BuyerId::new(), &test_car(owner, 20_000), test_time());
        deal.apply_status(status);
        (deal, owner)
    }

    fn status_strategy() -> impl Strategy<Value = DealStatus> {
        prop::sample::select(DealStatus::ALL.to_vec())
    }

    #[test]
    fn open_snapshots_price_and_starts_pending() {
        let car = test_car(SellerId::new(), 20_000);
        let deal = Deal::open(DealId::new(), BuyerId::new(), &car, test_time());
        assert_eq!(deal.status, DealStatus::Pending);
        assert_eq!(deal.price, 20_000);
        assert_eq!(deal.car_id, car.id);
    }

    #[test]
    fn strict_graph_edges() {
        use DealStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn unknown_label_is_invalid_value() {
        let (deal, owner) = deal_in(DealStatus::Pending);
        let err = deal
            .decide_status(owner, owner, "shipped", TransitionPolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue(_)));
    }

    #[test]
    fn strict_rejects_leaving_terminal_state() {
        let (deal, owner) = deal_in(DealStatus::Rejected);
        let err = deal
            .decide_status(owner, owner, "approved", TransitionPolicy::Strict)
            .unwrap_err();
        assert_eq!(err, DomainError::invalid_transition("rejected", "approved"));
    }

    #[test]
    fn relaxed_accepts_any_recognised_label() {
        let (deal, owner) = deal_in(DealStatus::Completed);
        let next = deal
            .decide_status(owner, owner, "pending", TransitionPolicy::Relaxed)
            .unwrap();
        assert_eq!(next, DealStatus::Pending);
    }

    #[test]
    fn decide_does_not_mutate() {
        let (deal, owner) = deal_in(DealStatus::Pending);
        let before = deal.clone();
        let _ = deal.decide_status(owner, owner, "approved", TransitionPolicy::Strict);
        assert_eq!(deal, before);
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Relaxed".parse::<TransitionPolicy>().unwrap(), TransitionPolicy::Relaxed);
        assert!("loose".parse::<TransitionPolicy>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            .. ProptestConfig::default()
        })]

        #[test]
        fn non_owner_is_always_forbidden(
            current in status_strategy(),
            requested in prop_oneof![
                status_strategy().prop_map(|s| s.as_str().to_string()),
                "[a-z]{0,12}",
            ],
            relaxed in any::<bool>(),
        ) {
            let (deal, _owner) = deal_in(current);
            let policy = if relaxed { TransitionPolicy::Relaxed } else { TransitionPolicy::Strict };
            let err = deal.decide_status(SellerId::new(), SellerId::new(), &requested, policy);
            prop_assert!(matches!(err, Err(DomainError::Forbidden(_))));
        }

        #[test]
        fn terminal_states_never_move_under_strict(
            current in prop::sample::select(vec![DealStatus::Rejected, DealStatus::Completed]),
            next in status_strategy(),
        ) {
            let (deal, owner) = deal_in(current);
            let result = deal.decide_status(owner, owner, next.as_str(), TransitionPolicy::Strict);
            let is_invalid_transition = matches!(result, Err(DomainError::InvalidTransition { .. }));
            prop_assert!(is_invalid_transition);
        }

        #[test]
        fn strict_accepts_exactly_the_graph(current in status_strategy(), next in status_strategy()) {
            let (deal, owner) = deal_in(current);
            let result = deal.decide_status(owner, owner, next.as_str(), TransitionPolicy::Strict);
            prop_assert_eq!(result.is_ok(), current.can_transition_to(next));
        }

        #[test]
        fn label_round_trips(status in status_strategy()) {
            prop_assert_eq!(status.as_str().parse::<DealStatus>().unwrap(), status);
        }
    }
}
