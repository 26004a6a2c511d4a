use tracing::instrument;

use dealership_auth::{Principal, require_buyer, require_seller};
use dealership_core::{CarId, QuestionId};
use dealership_sales::Question;

use crate::error::{ServiceError, ServiceResult};

use super::Marketplace;

impl Marketplace {
    #[instrument(skip(self, principal, text), err)]
    pub async fn ask_question(
        &self,
        principal: &Principal,
        car_id: CarId,
        text: &str,
    ) -> ServiceResult<Question> {
        let buyer = require_buyer(principal)?;
        let car = self.car(car_id).await?;

        let question = Question::ask(QuestionId::new(), buyer.id, car.id, text, self.clock.now())?;
        self.store.insert_question(&question).await?;
        Ok(question)
    }

    /// Buyers see what they asked; sellers see questions on their cars.
    pub async fn my_questions(&self, principal: &Principal) -> ServiceResult<Vec<Question>> {
        let questions = match principal {
            Principal::Buyer(b) => self.store.questions_by_buyer(b.id).await?,
            Principal::Seller(s) => self.store.questions_for_seller(s.id).await?,
        };
        Ok(questions)
    }

    /// Replaces any earlier answer.
    #[instrument(skip(self, principal, text), err)]
    pub async fn answer_question(
        &self,
        principal: &Principal,
        question_id: QuestionId,
        text: &str,
    ) -> ServiceResult<Question> {
        let seller = require_seller(principal)?;
        let mut question = self
            .store
            .question(question_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("question"))?;
        let car = self.car(question.car_id).await?;

        let answer = question.decide_answer(car.seller_id, seller.id, text)?;
        self.store.set_answer(question.id, &answer).await?;
        question.apply_answer(answer);
        Ok(question)
    }
}
