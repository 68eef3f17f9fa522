//! Mapping of a CyberSource decision onto the order.
//!
//! [`decide`] is a pure function of the decision, the reason code and the card that was
//! charged; [`apply`] carries the result out against the order.

use crate::{
    consts,
    services::order::OrderInterface,
    types::{CardType, Decision, Environment, OrderStatus, PaymentResult},
};

/// Card and environment details quoted in the approval note.
#[derive(Clone, Copy, Debug)]
pub struct DecisionContext<'a> {
    pub environment: Environment,
    pub card_type: CardType,
    pub last4: &'a str,
    /// `MM/YYYY`
    pub expiration: &'a str,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OrderAction {
    /// Record the approval note and mark the order paid.
    PaymentComplete { note: String },
    /// Move the order to `status`, or only add `note` when it is already there.
    Transition { status: OrderStatus, note: String },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentDecision {
    pub action: OrderAction,
    /// Error notice for the shopper.
    pub user_message: Option<String>,
    pub empty_cart: bool,
    pub result: PaymentResult,
}

/// What [`apply`] did to the order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AppliedAction {
    PaymentCompleted,
    StatusUpdated(OrderStatus),
    NoteAdded,
}

/// Shopper message for a declined request.
pub fn decline_message(reason_code: i64) -> Option<&'static str> {
    let message = match reason_code {
        202 => "The provided card is expired, please use an alternate card or other form of payment.",
        203 => "The provided card was declined, please use an alternate card or other form of payment.",
        204 => "Insufficient funds in account, please use an alternate card or other form of payment.",
        208 => "The card is inactivate or not authorized for card-not-present transactions, please use an alternate card or other form of payment.",
        210 => "The credit limit for the card has been reached, please use an alternate card or other form of payment.",
        211 => "The card verification number is invalid, please try again.",
        231 => "The provided card number was invalid, or card type was incorrect.  Please try again.",
        232 => "That card type is not accepted, please use an alternate card or other form of payment.",
        240 => "The card type is invalid or does not correlate with the credit card number.  Please try again or use an alternate card or other form of payment.",
        _ => return None,
    };
    Some(message)
}

pub fn approval_note(context: &DecisionContext<'_>) -> String {
    let prefix = if context.environment.is_production() {
        ""
    } else {
        consts::TEST_MODE_PREFIX
    };
    format!(
        "{prefix}Credit Card Transaction Approved: {} ending in {} ({})",
        context.card_type.display_name(),
        context.last4,
        context.expiration,
    )
}

pub fn decide(decision: Decision, reason_code: i64, context: &DecisionContext<'_>) -> PaymentDecision {
    match decision {
        Decision::Accept => PaymentDecision {
            action: OrderAction::PaymentComplete {
                note: approval_note(context),
            },
            user_message: None,
            empty_cart: true,
            result: PaymentResult::Success,
        },
        Decision::Review => {
            let is_cvn_review = reason_code == consts::REASON_CODE_CVN_REVIEW;
            let admin_detail = if is_cvn_review {
                consts::REVIEW_CVN_ADMIN_NOTE
            } else {
                ""
            };
            let user_message = if is_cvn_review {
                consts::REVIEW_CVN_MESSAGE
            } else {
                consts::REVIEW_GENERIC_MESSAGE
            };

            PaymentDecision {
                action: OrderAction::Transition {
                    status: OrderStatus::OnHold,
                    note: format!("Transaction requires review: code {reason_code}{admin_detail}"),
                },
                user_message: Some(user_message.to_string()),
                empty_cart: true,
                result: PaymentResult::Success,
            }
        }
        Decision::Error | Decision::Reject => {
            let generic = if decision == Decision::Error {
                consts::GENERIC_ERROR_MESSAGE
            } else {
                consts::GENERIC_REJECT_MESSAGE
            };

            PaymentDecision {
                action: OrderAction::Transition {
                    status: OrderStatus::Failed,
                    note: format!(
                        "CyberSource Credit Card payment failed (Reason Code: {reason_code})."
                    ),
                },
                user_message: Some(decline_message(reason_code).unwrap_or(generic).to_string()),
                empty_cart: false,
                result: PaymentResult::Failure,
            }
        }
    }
}

/// Carry out the order side of a decision. Repeated failures on an order that already has the
/// target status add a note each time instead of transitioning again.
pub fn apply<O>(decision: &PaymentDecision, order: &mut O, transaction_id: &str) -> AppliedAction
where
    O: OrderInterface + ?Sized,
{
    match &decision.action {
        OrderAction::PaymentComplete { note } => {
            order.add_order_note(note);
            order.payment_complete(transaction_id);
            AppliedAction::PaymentCompleted
        }
        OrderAction::Transition { status, note } if order.status() == *status => {
            order.add_order_note(note);
            AppliedAction::NoteAdded
        }
        OrderAction::Transition { status, note } => {
            order.update_status(*status, note);
            AppliedAction::StatusUpdated(*status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_db::MockOrder;

    fn context() -> DecisionContext<'static> {
        DecisionContext {
            environment: Environment::Production,
            card_type: CardType::Visa,
            last4: "1111",
            expiration: "12/2030",
        }
    }

    #[test]
    fn accept_is_paid_whatever_the_reason_code() {
        for reason_code in [100, 110, 0, 999, -1] {
            let decision = decide(Decision::Accept, reason_code, &context());
            assert!(matches!(decision.action, OrderAction::PaymentComplete { .. }));
            assert_eq!(decision.result, PaymentResult::Success);
            assert!(decision.empty_cart);
            assert_eq!(decision.user_message, None);
        }
    }

    #[test]
    fn approval_note_mentions_card() {
        assert_eq!(
            approval_note(&context()),
            "Credit Card Transaction Approved: Visa ending in 1111 (12/2030)"
        );

        let test_mode = DecisionContext {
            environment: Environment::Test,
            card_type: CardType::Amex,
            ..context()
        };
        assert_eq!(
            approval_note(&test_mode),
            "TEST MODE Credit Card Transaction Approved: American Express ending in 1111 (12/2030)"
        );
    }

    #[test]
    fn cvn_review_has_specific_messages() {
        let decision = decide(Decision::Review, 230, &context());
        assert_eq!(
            decision.action,
            OrderAction::Transition {
                status: OrderStatus::OnHold,
                note: format!("Transaction requires review: code 230{}", consts::REVIEW_CVN_ADMIN_NOTE),
            }
        );
        assert_eq!(decision.user_message.as_deref(), Some(consts::REVIEW_CVN_MESSAGE));
        assert_eq!(decision.result, PaymentResult::Success);
        assert!(decision.empty_cart);
    }

    #[test]
    fn other_reviews_are_generic() {
        let decision = decide(Decision::Review, 480, &context());
        assert_eq!(
            decision.action,
            OrderAction::Transition {
                status: OrderStatus::OnHold,
                note: "Transaction requires review: code 480".to_string(),
            }
        );
        assert_eq!(decision.user_message.as_deref(), Some(consts::REVIEW_GENERIC_MESSAGE));
    }

    #[test]
    fn declines_use_reason_code_table() {
        let decision = decide(Decision::Reject, 203, &context());
        assert_eq!(
            decision.user_message.as_deref(),
            Some("The provided card was declined, please use an alternate card or other form of payment.")
        );
        assert_eq!(
            decision.action,
            OrderAction::Transition {
                status: OrderStatus::Failed,
                note: "CyberSource Credit Card payment failed (Reason Code: 203).".to_string(),
            }
        );
        assert!(!decision.empty_cart);
        assert_eq!(decision.result, PaymentResult::Failure);
    }

    #[test]
    fn unlisted_codes_fall_back_per_decision() {
        let error = decide(Decision::Error, 150, &context());
        assert_eq!(error.user_message.as_deref(), Some(consts::GENERIC_ERROR_MESSAGE));

        let reject = decide(Decision::Reject, 102, &context());
        assert_eq!(reject.user_message.as_deref(), Some(consts::GENERIC_REJECT_MESSAGE));
    }

    #[test]
    fn every_listed_code_has_a_message() {
        for reason_code in [202, 203, 204, 208, 210, 211, 231, 232, 240] {
            assert!(decline_message(reason_code).is_some(), "{reason_code}");
        }
        assert!(decline_message(230).is_none());
    }

    #[test]
    fn repeated_review_on_held_order_only_adds_notes() {
        let mut order = MockOrder::with_status(OrderStatus::OnHold);
        let decision = decide(Decision::Review, 230, &context());

        assert_eq!(apply(&decision, &mut order, "req-1"), AppliedAction::NoteAdded);
        assert_eq!(apply(&decision, &mut order, "req-2"), AppliedAction::NoteAdded);

        assert_eq!(order.status_changes(), 0);
        assert_eq!(order.notes().len(), 2);
        assert_eq!(order.status(), OrderStatus::OnHold);
    }

    #[test]
    fn failure_transitions_once_then_adds_notes() {
        let mut order = MockOrder::default();
        let decision = decide(Decision::Error, 150, &context());

        assert_eq!(
            apply(&decision, &mut order, "req-1"),
            AppliedAction::StatusUpdated(OrderStatus::Failed)
        );
        assert_eq!(apply(&decision, &mut order, "req-2"), AppliedAction::NoteAdded);
        assert_eq!(order.status_changes(), 1);
        assert_eq!(order.status(), OrderStatus::Failed);
    }

    #[test]
    fn accept_completes_payment() {
        let mut order = MockOrder::default();
        let decision = decide(Decision::Accept, 100, &context());

        assert_eq!(apply(&decision, &mut order, "req-1"), AppliedAction::PaymentCompleted);
        assert!(order.status().is_paid());
        assert_eq!(order.transaction_id(), Some("req-1"));
        assert_eq!(order.notes().len(), 1);
    }
}
