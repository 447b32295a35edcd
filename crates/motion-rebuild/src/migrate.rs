// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Parameter table copy and behaviour migration.

use motion_graph::{Behaviour, Field, FieldValue, ParameterTable};

use crate::identity::IdentityMap;
use crate::ledger::{IssueKind, Ledger};

/// Copies `source` in order. Duplicate names are skipped and recorded.
pub fn migrate_parameter_table(source: &ParameterTable, ledger: &mut Ledger) -> ParameterTable {
    let mut table = ParameterTable::new();
    for parameter in source {
        if let Err(err) = table.push(parameter.clone()) {
            ledger.record(
                IssueKind::ParameterSkipped,
                format!("parameter {:?} not copied: {err}", parameter.name),
            );
        }
    }
    table
}

/// Migrates behaviour property bags against a destination parameter table.
#[derive(Debug, Clone, Copy)]
pub struct BehaviourMigrator<'a> {
    parameters: &'a ParameterTable,
}

impl<'a> BehaviourMigrator<'a> {
    /// Migrator resolving parameter names in `parameters`.
    pub fn new(parameters: &'a ParameterTable) -> Self {
        Self { parameters }
    }

    /// Migrated copy of `behaviour`, or `None` if it cannot be migrated.
    ///
    /// - plain values copy verbatim;
    /// - `ParameterRef` survives only if the destination table has the name,
    ///   otherwise it is reset to the empty name;
    /// - `NodeRef` is remapped through `map`, otherwise reset to `None`;
    /// - `Unsupported` fields are omitted.
    pub fn migrate_behaviour(
        &self,
        behaviour: &Behaviour,
        map: &IdentityMap,
        ledger: &mut Ledger,
        label: &str,
    ) -> Option<Behaviour> {
        if behaviour.type_name.trim().is_empty() {
            ledger.record(
                IssueKind::BehaviourSkipped,
                format!("{label}: behaviour has no type name; skipped"),
            );
            return None;
        }
        let context = format!("{label}: {}", behaviour.type_name);
        let mut unresolved_parameters = false;
        let mut fields = Vec::with_capacity(behaviour.fields.len());
        for field in &behaviour.fields {
            let value = match &field.value {
                FieldValue::ParameterRef(name)
                    if !name.is_empty() && !self.parameters.contains(name) =>
                {
                    ledger.record(
                        IssueKind::UnresolvedParameter,
                        format!(
                            "{context}.{}: parameter {name:?} is not in the destination table",
                            field.name
                        ),
                    );
                    unresolved_parameters = true;
                    FieldValue::ParameterRef(String::new())
                }
                FieldValue::NodeRef(Some(source)) => match map.resolve(*source) {
                    Some(clone) => FieldValue::NodeRef(Some(clone)),
                    None => {
                        ledger.record(
                            IssueKind::UnresolvedNodeRef,
                            format!("{context}.{}: node {source} was not cloned", field.name),
                        );
                        FieldValue::NodeRef(None)
                    }
                },
                FieldValue::Unsupported { .. } => {
                    ledger.record(
                        IssueKind::PayloadFieldSkipped,
                        format!(
                            "{context}.{}: unsupported field type {:?}",
                            field.name,
                            field.value.type_name()
                        ),
                    );
                    continue;
                }
                other => other.clone(),
            };
            fields.push(Field {
                name: field.name.clone(),
                value,
            });
        }
        if unresolved_parameters {
            ledger.behaviour_had_unresolved_parameters();
        }
        Some(Behaviour {
            type_name: behaviour.type_name.clone(),
            fields,
        })
    }
}
