//! Planning for application sites.

use serde_json::Value;

use super::model::{ApplicationSite, ApplicationSiteConfig};
use super::schema::ATTRIBUTES;
use crate::error::ProviderError;
use crate::types::{AttributeChange, PlanResult};

/// Plan the transition from `prior` state to the `proposed` configuration.
///
/// The planned state is the proposal with schema defaults filled in, the
/// known `primary_category` carried over, and the prior `id`. A `null`
/// proposal plans the destruction of `prior`. Application sites are always
/// updated in place.
pub fn plan(
    prior: Option<&ApplicationSite>,
    proposed: &Value,
) -> Result<PlanResult, ProviderError> {
    if proposed.is_null() {
        return plan_destroy(prior);
    }

    let planned = ApplicationSiteConfig::from_value(proposed)?.with_defaults(prior);
    let mut planned_state = serde_json::to_value(&planned)?;
    if let Value::Object(map) = &mut planned_state {
        let id = prior.map(|p| Value::String(p.id.clone())).unwrap_or(Value::Null);
        map.insert("id".to_string(), id);
    }

    let changes = match prior {
        None => ATTRIBUTES
            .iter()
            .filter_map(|name| {
                let after = planned_state.get(*name)?;
                (!is_empty(after)).then(|| AttributeChange::added(*name, after.clone()))
            })
            .collect(),
        Some(prior) => {
            let before = prior.to_value()?;
            let after = planned.resolve(Some(prior)).to_value()?;
            ATTRIBUTES
                .iter()
                .filter_map(|name| {
                    let old = before.get(*name).cloned().unwrap_or(Value::Null);
                    let new = after.get(*name).cloned().unwrap_or(Value::Null);
                    (old != new).then(|| AttributeChange::modified(*name, old, new))
                })
                .collect()
        },
    };

    Ok(PlanResult::in_place(planned_state, changes))
}

fn plan_destroy(prior: Option<&ApplicationSite>) -> Result<PlanResult, ProviderError> {
    let Some(prior) = prior else {
        return Ok(PlanResult::no_change(Value::Null));
    };
    let before = prior.to_value()?;
    let changes = ATTRIBUTES
        .iter()
        .filter_map(|name| {
            let old = before.get(*name)?;
            (!is_empty(old)).then(|| AttributeChange::removed(*name, old.clone()))
        })
        .collect();
    Ok(PlanResult::in_place(Value::Null, changes))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
