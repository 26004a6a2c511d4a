use chrono::{DateTime, Utc};

use dealership_core::{BuyerId, CarId, DomainError, DomainResult, Entity, QuestionId, SellerId};

/// A buyer's question on a car, with at most one (replaceable) seller answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub car_id: CarId,
    pub buyer_id: BuyerId,
    pub question: String,
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Question {
    type Id = QuestionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Question {
    /// Several questions per (buyer, car) are allowed.
    pub fn ask(
        id: QuestionId,
        buyer_id: BuyerId,
        car_id: CarId,
        text: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("question must not be empty"));
        }
        Ok(Self {
            id,
            car_id,
            buyer_id,
            question: text.to_string(),
            answer: None,
            created_at: now,
        })
    }

    /// Validate an answer from `acting_seller`, without mutating.
    pub fn decide_answer(
        &self,
        car_owner: SellerId,
        acting_seller: SellerId,
        text: &str,
    ) -> DomainResult<String> {
        if car_owner != acting_seller {
            return Err(DomainError::forbidden("question is on another seller's car"));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("answer must not be empty"));
        }
        Ok(text.to_string())
    }

    /// Overwrites any previous answer; no history is kept.
    pub fn apply_answer(&mut self, answer: String) {
        self.answer = Some(answer);
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}
