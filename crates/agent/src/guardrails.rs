//! Guardrail chain: deterministic corrections applied after classification
//!
//! Each guardrail is a pure function `Plan -> Plan` over a read-only
//! context. They run in a fixed order and each records its name on the
//! plan when it fires, so a plan's `guardrails` list doubles as a trace.
//! The chain is idempotent: applying it twice yields the same plan.

use tracing::debug;

use dishcovery_core::{Action, ChatState, GroundedState, Intent, Plan};
use dishcovery_text::{fuzzy_token_match, normalize, normalize_text};

use crate::planner::{is_what_is_question, search_params_from_intent};

/// Read-only inputs the guardrails judge a plan against
pub struct GuardrailContext<'a> {
    /// Raw user text for this turn
    pub query: &'a str,
    pub intent: &'a Intent,
    pub grounded: &'a GroundedState,
    pub chat: &'a ChatState,
}

type Guardrail = fn(Plan, &GuardrailContext) -> Plan;

/// The chain, in application order. Order matters: lookup forcing runs
/// before the EXPLAIN corrections, and the anti-loop check runs last so
/// it sees the final SEARCH/no-SEARCH decision.
const CHAIN: &[Guardrail] = &[
    force_restaurant_lookup,
    block_unsafe_explain,
    bare_dish_explain,
    menu_with_dish,
    vague_with_tags,
    ungrounded_followup,
    focused_constraint_search,
    anti_loop_reshow,
];

/// Run every guardrail over the plan, in order
pub fn apply_chain(mut plan: Plan, ctx: &GuardrailContext) -> Plan {
    for guardrail in CHAIN {
        let before = plan.action;
        plan = guardrail(plan, ctx);
        if plan.action != before {
            debug!(
                from = ?before,
                to = ?plan.action,
                guardrail = plan.guardrails.last().copied().unwrap_or(""),
                "guardrail rerouted plan"
            );
        }
    }
    plan
}

/// Switch a plan to SEARCH, attaching params derived from the intent if
/// the classifier didn't already build them
fn to_search(mut plan: Plan, ctx: &GuardrailContext, name: &'static str) -> Plan {
    plan.action = Action::Search;
    if plan.search.is_none() {
        plan.search = Some(search_params_from_intent(ctx.intent));
    }
    plan.record_guardrail(name)
}

/// 1. A detected restaurant lookup always wins over whatever the
/// classifier picked.
fn force_restaurant_lookup(mut plan: Plan, ctx: &GuardrailContext) -> Plan {
    if ctx.intent.is_restaurant_lookup && plan.action != Action::RestaurantLookup {
        plan.action = Action::RestaurantLookup;
        plan.search = None;
        return plan.record_guardrail("force_restaurant_lookup");
    }
    plan
}

/// 2. Never answer strict-diet or allergy questions from parametric
/// knowledge: reroute EXPLAIN to grounded FOLLOWUP, or SEARCH when
/// nothing is grounded.
fn block_unsafe_explain(mut plan: Plan, ctx: &GuardrailContext) -> Plan {
    let safety = !ctx.intent.hard_tags.is_empty() || !ctx.intent.allergy.is_empty();
    if plan.action == Action::Explain && safety {
        if ctx.grounded.is_grounded() {
            plan.action = Action::Followup;
            return plan.record_guardrail("block_unsafe_explain");
        }
        return to_search(plan, ctx, "block_unsafe_explain");
    }
    plan
}

/// 3. A bare dish name is a search, not an explanation. EXPLAIN is kept
/// only for explicit "what is X" phrasing.
fn bare_dish_explain(plan: Plan, ctx: &GuardrailContext) -> Plan {
    if plan.action == Action::Explain
        && ctx.intent.dish_query.is_some()
        && !is_what_is_question(&normalize_text(ctx.query))
    {
        return to_search(plan, ctx, "bare_dish_explain");
    }
    plan
}

/// 4. SHOW_MENU carrying a dish query means the user wants that dish,
/// not the whole menu.
fn menu_with_dish(plan: Plan, ctx: &GuardrailContext) -> Plan {
    if plan.action == Action::ShowMenu && ctx.intent.dish_query.is_some() {
        return to_search(plan, ctx, "menu_with_dish");
    }
    plan
}

/// 5. A vague query that still carries tags is answerable: run a
/// tag-only search instead of asking for clarification.
fn vague_with_tags(plan: Plan, ctx: &GuardrailContext) -> Plan {
    if plan.action == Action::Clarify
        && ctx.intent.is_vague
        && (!ctx.intent.hard_tags.is_empty() || !ctx.intent.dietary.is_empty())
    {
        return to_search(plan, ctx, "vague_with_tags");
    }
    plan
}

/// 6. FOLLOWUP with nothing grounded has nothing to follow up on;
/// downgrade to SEARCH.
fn ungrounded_followup(plan: Plan, ctx: &GuardrailContext) -> Plan {
    if plan.action == Action::Followup && !ctx.grounded.is_grounded() {
        return to_search(plan, ctx, "ungrounded_followup");
    }
    plan
}

/// Whether the utterance names one of the grounded dishes
fn references_grounded_dish(ctx: &GuardrailContext) -> bool {
    let query_tokens = match ctx.intent.dish_query.as_deref() {
        Some(q) => normalize(q),
        None => return false,
    };
    ctx.grounded.last_dishes.iter().any(|dish| {
        let name_tokens = normalize(&dish.name);
        query_tokens
            .iter()
            .any(|qt| name_tokens.iter().any(|nt| fuzzy_token_match(qt, nt)))
    })
}

/// 7. Inside restaurant focus, new constraints without an explicit dish
/// reference are a fresh (scoped) search, not a followup.
fn focused_constraint_search(plan: Plan, ctx: &GuardrailContext) -> Plan {
    let has_constraints = !ctx.intent.hard_tags.is_empty()
        || ctx.intent.dish_query.is_some()
        || !ctx.intent.ingredients.is_empty();
    if plan.action == Action::Followup
        && ctx.chat.is_focused()
        && has_constraints
        && !references_grounded_dish(ctx)
    {
        return to_search(plan, ctx, "focused_constraint_search");
    }
    plan
}

/// Same-query check for the anti-loop guardrail: normalized containment
/// in either direction.
fn is_repeat_query(current: &str, last: &str) -> bool {
    let current = normalize_text(current);
    let last = normalize_text(last);
    if current.is_empty() || last.is_empty() {
        return false;
    }
    current.contains(&last) || last.contains(&current)
}

fn same_dietary_set(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().all(|term| b.contains(term))
}

/// 8. Re-running the query that produced the current results re-presents
/// them instead of re-querying. Only fires when the last search actually
/// returned something and no dietary constraint changed.
fn anti_loop_reshow(mut plan: Plan, ctx: &GuardrailContext) -> Plan {
    if plan.action != Action::Search
        || !ctx.grounded.is_grounded()
        || ctx.grounded.last_was_empty
    {
        return plan;
    }
    let repeat = ctx
        .grounded
        .last_query
        .as_deref()
        .map(|last| is_repeat_query(ctx.query, last))
        .unwrap_or(false);
    if repeat && same_dietary_set(&ctx.intent.dietary, &ctx.grounded.last_dietary) {
        plan.action = Action::Reshow;
        plan.search = None;
        return plan.record_guardrail("anti_loop_reshow");
    }
    plan
}
