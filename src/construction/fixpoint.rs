//! Outer fixpoint loop over all actions of a domain.
//!
//! Each pass rebuilds every action in declared order against the predicates
//! coined so far. Predicates coined late in one pass are visible to early
//! actions in the next, so passes repeat until one ends with no more
//! predicates than it started with.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::prune::{prune_predicates, prune_type_tree};
use super::refine::{RefinementLoop, RefinementStatus};
use crate::domain::{Action, DomainDescription, DomainDraft, Predicate, TypeNode};
use crate::error::Result;
use crate::llm::Usage;
use crate::pddl;

/// How one action fared in the final pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    pub name: String,
    pub attempts: usize,
    pub status: RefinementStatus,
    /// Predicates this action added to the registry
    pub coined: Vec<String>,
}

/// Everything a construction run produced
#[derive(Debug, Clone, Serialize)]
pub struct ConstructionReport {
    pub domain: String,
    pub actions: Vec<Action>,
    pub predicates: Vec<Predicate>,
    pub types: TypeNode,
    /// Passes run
    pub iterations: usize,
    /// Whether the last pass ended without growing the predicate count
    pub converged: bool,
    pub usage: Usage,
    pub model: String,
    pub per_action: Vec<ActionSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ConstructionReport {
    pub fn cost_usd(&self) -> f64 {
        self.usage.cost_usd(&self.model)
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    pub fn best_effort_actions(&self) -> impl Iterator<Item = &ActionSummary> {
        self.per_action.iter().filter(|a| a.status == RefinementStatus::BestEffort)
    }

    /// Render the result as a PDDL domain file
    pub fn to_pddl(&self, requirements: &[String]) -> String {
        pddl::render_domain(&self.domain, requirements, &self.types, &self.predicates, &self.actions)
    }
}

pub struct ActionConstructor {
    refiner: RefinementLoop,
    max_iters: usize,
}

impl ActionConstructor {
    pub fn new(refiner: RefinementLoop, max_iters: usize) -> Self {
        Self { refiner, max_iters }
    }

    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Build every action of `domain`, iterating to a predicate fixpoint.
    pub async fn construct(&self, domain: &DomainDescription) -> Result<ConstructionReport> {
        let started_at = Utc::now();
        let llm = self.refiner.llm();
        llm.reset_usage();

        let mut draft = DomainDraft::new();
        let mut per_action = Vec::new();
        let mut iterations = 0;
        let mut converged = false;

        for iteration in 1..=self.max_iters {
            iterations = iteration;
            let count_at_start = draft.predicates.len();
            draft.reset_actions();
            per_action.clear();

            for description in &domain.actions {
                let outcome = self.refiner.run(description, domain, &draft).await?;
                let added = draft.predicates.merge(outcome.new_predicates);
                draft.push_action(outcome.action);
                let pruned = draft.prune_predicates();
                if !pruned.is_empty() {
                    log::debug!("Pruned after '{}': {}", description.name, pruned.join(", "));
                }
                per_action.push(ActionSummary {
                    name: description.name.clone(),
                    attempts: outcome.attempts,
                    status: outcome.status,
                    coined: added.into_iter().map(|p| p.name).collect(),
                });
            }

            let count = draft.predicates.len();
            log::info!(
                "Pass {}/{}: {} action(s), {} predicate(s), {} at pass start",
                iteration,
                self.max_iters,
                draft.actions.len(),
                count,
                count_at_start
            );
            if count <= count_at_start {
                converged = true;
                break;
            }
        }

        if !converged {
            log::warn!(
                "FixpointNotReached: predicates still changing after {} pass(es)",
                iterations
            );
        }

        let predicates = prune_predicates(&draft.predicates.to_vec(), &draft.actions);
        let types = prune_type_tree(&domain.types, &predicates, &draft.actions);

        Ok(ConstructionReport {
            domain: domain.name.clone(),
            actions: draft.actions,
            predicates,
            types,
            iterations,
            converged,
            usage: llm.usage(),
            model: llm.model().to_string(),
            per_action,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActionDescription, PredicateRegistry};
    use crate::llm::MockLlmClient;
    use crate::validation::{ValidationOutcome, Validator};
    use std::sync::Arc;

    struct AcceptAll;

    impl Validator for AcceptAll {
        fn validate(&self, _output: &str, _current: &PredicateRegistry, _new: &[Predicate]) -> ValidationOutcome {
            ValidationOutcome::pass()
        }
    }

    fn domain(actions: &[&str]) -> DomainDescription {
        DomainDescription {
            name: "toy".into(),
            description: String::new(),
            types: TypeNode::root()
                .with_child(TypeNode::new("block", ""))
                .with_child(TypeNode::new("gripper", "")),
            actions: actions.iter().map(|a| ActionDescription::new(*a, "")).collect(),
        }
    }

    fn answer(pre: &str, eff: &str, new: &str) -> String {
        format!(
            "### Action Parameters\n- ?b - block\n\n### Action Preconditions\n```\n{pre}\n```\n\n\
             ### Action Effects\n```\n{eff}\n```\n\n### New Predicates\n{new}\n"
        )
    }

    #[tokio::test]
    async fn test_stable_answers_converge_on_second_pass() {
        let llm = Arc::new(MockLlmClient::with_responder(|_| {
            answer("(clear ?b)", "(not (clear ?b))", "- (clear ?b - block): b is clear")
        }));
        let constructor = ActionConstructor::new(RefinementLoop::new(llm.clone(), Box::new(AcceptAll)), 5);

        let report = constructor.construct(&domain(&["grab"])).await.unwrap();

        assert!(report.converged);
        assert_eq!(report.iterations, 2);
        assert_eq!(llm.call_count(), 2);
        assert_eq!(report.predicates.len(), 1);
        assert_eq!(report.types.flatten(), vec!["object", "block"]);
        assert!(report.per_action[0].coined.is_empty());
        assert!(report.usage.total() > 0);
    }

    #[tokio::test]
    async fn test_renamed_predicate_converges_on_stable_count() {
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let llm = Arc::new(MockLlmClient::with_responder(move |_| {
            let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            answer(&format!("(p{n} ?b)"), "", &format!("- (p{n} ?b - block): fresh"))
        }));
        let constructor = ActionConstructor::new(RefinementLoop::new(llm.clone(), Box::new(AcceptAll)), 5);

        let report = constructor.construct(&domain(&["grab"])).await.unwrap();

        // p1 replaces the pruned p0, so the count holds at one
        assert!(report.converged);
        assert_eq!(report.iterations, 2);
        assert_eq!(llm.call_count(), 2);
        let names: Vec<&str> = report.predicates.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["p1"]);
    }

    #[tokio::test]
    async fn test_soft_stop_at_max_iters() {
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let llm = Arc::new(MockLlmClient::with_responder(move |_| {
            let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let names: Vec<String> = (0..=n).map(|i| format!("p{n}_{i}")).collect();
            let pre = names.iter().map(|p| format!("({p} ?b)")).collect::<Vec<_>>().join(" ");
            let new = names
                .iter()
                .map(|p| format!("- ({p} ?b - block): fresh"))
                .collect::<Vec<_>>()
                .join("\n");
            answer(&format!("(and {pre})"), "", &new)
        }));
        let constructor = ActionConstructor::new(RefinementLoop::new(llm.clone(), Box::new(AcceptAll)), 3);

        let report = constructor.construct(&domain(&["grab"])).await.unwrap();

        assert!(!report.converged);
        assert_eq!(report.iterations, 3);
        assert_eq!(llm.call_count(), 3);
        assert_eq!(report.predicates.len(), 3);
        assert!(report.predicates.iter().all(|p| p.name.starts_with("p2_")));
    }

    #[tokio::test]
    async fn test_zero_iters_builds_nothing() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let constructor = ActionConstructor::new(RefinementLoop::new(llm, Box::new(AcceptAll)), 0);

        let report = constructor.construct(&domain(&["grab"])).await.unwrap();

        assert_eq!(report.iterations, 0);
        assert!(!report.converged);
        assert!(report.actions.is_empty());
        assert!(report.elapsed() >= chrono::Duration::zero());
    }

    #[tokio::test]
    async fn test_report_renders_pddl() {
        let llm = Arc::new(MockLlmClient::with_responder(|_| {
            answer("(clear ?b)", "(not (clear ?b))", "- (clear ?b - block): b is clear")
        }));
        let constructor = ActionConstructor::new(RefinementLoop::new(llm, Box::new(AcceptAll)), 2);

        let report = constructor.construct(&domain(&["grab"])).await.unwrap();
        let text = report.to_pddl(&pddl::default_requirements());

        assert!(text.starts_with("(define (domain toy)"));
        assert!(text.contains("(:action grab"));
        assert!(text.contains("(clear ?b - block) ; b is clear"));
        assert!(!text.contains("gripper"));
        assert_eq!(report.cost_usd(), 0.0);
        assert_eq!(report.best_effort_actions().count(), 0);
    }
}
