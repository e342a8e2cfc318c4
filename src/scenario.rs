//! Scenario runner for batch deal evaluations
//!
//! Holds one deal and a price policy, then evaluates the deal under
//! every scenario of a price deck in parallel.

use rayon::prelude::*;

use crate::deal::DealInputs;
use crate::error::EvalError;
use crate::evaluation::{EvaluationSummary, MineralEvaluation};
use crate::library::{PriceDeck, PriceScenario};
use crate::pricing::{build_monthly_price_deck, PricePolicy};

/// Evaluates one deal across price scenarios
///
/// # Example
/// ```ignore
/// let deck = load_price_deck(Path::new("price_deck.csv"))?;
/// let runner = ScenarioRunner::new(deal, PricePolicy::default());
/// for (name, summary) in runner.run_scenarios(&deck)? {
///     println!("{}: {:?}", name, summary.irr);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    deal: DealInputs,
    policy: PricePolicy,
}

impl ScenarioRunner {
    pub fn new(deal: DealInputs, policy: PricePolicy) -> Self {
        Self { deal, policy }
    }

    /// Evaluate at the flat deal prices
    pub fn run_flat(&self) -> Result<MineralEvaluation, EvalError> {
        MineralEvaluation::evaluate(self.deal.clone())
    }

    /// Evaluate under a single price scenario
    pub fn run(&self, scenario: &PriceScenario) -> Result<MineralEvaluation, EvalError> {
        let deck = build_monthly_price_deck(&scenario.forward_curve(), &self.policy)?;
        log::debug!(
            "Scenario {}: {} priced months",
            scenario.name,
            deck.len()
        );
        MineralEvaluation::evaluate_with_deck(self.deal.clone(), &deck)
    }

    /// Evaluate under a scenario looked up by name
    pub fn run_named(&self, deck: &PriceDeck, name: &str) -> Result<MineralEvaluation, EvalError> {
        self.run(deck.scenario(name)?)
    }

    /// Evaluate every scenario in the deck, sorted by scenario name
    pub fn run_scenarios(
        &self,
        deck: &PriceDeck,
    ) -> Result<Vec<(String, EvaluationSummary)>, EvalError> {
        self.policy.validate()?;

        let scenarios: Vec<&PriceScenario> = deck.scenarios().collect();
        let mut results = scenarios
            .par_iter()
            .map(|scenario| {
                self.run(scenario)
                    .map(|eval| (scenario.name.clone(), eval.summary()))
            })
            .collect::<Result<Vec<_>, EvalError>>()?;

        results.sort_by(|a, b| a.0.cmp(&b.0));
        log::info!(
            "Evaluated '{}' under {} price scenarios",
            self.deal.deal_name,
            results.len()
        );
        Ok(results)
    }

    pub fn deal(&self) -> &DealInputs {
        &self.deal
    }

    pub fn policy(&self) -> &PricePolicy {
        &self.policy
    }
}
