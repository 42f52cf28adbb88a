use crate::{
    MAX_GROUP_ROWS,
    path::PathSegment,
    schema::{FieldKind, FieldSpec, Membership, RecordSchema, Rule},
    validate::{Issues, ValidateContext},
};
use std::collections::BTreeSet;

/// Collect every structural problem in a schema tree, keyed by path.
pub(super) fn check_schema(root: &RecordSchema) -> Issues {
    let mut ctx = ValidateContext::new();
    check_record(root, &mut ctx);

    ctx.finish()
}

fn check_record(schema: &RecordSchema, ctx: &mut ValidateContext) {
    let mut seen = BTreeSet::new();

    let names = schema
        .fields
        .iter()
        .map(|f| f.name.as_str())
        .chain(schema.groups.iter().map(|g| g.name.as_str()));

    for name in names {
        if let Err(msg) = check_name(name) {
            ctx.issue_at(name, msg);
        }
        if !seen.insert(name) {
            ctx.issue_at(name, format!("duplicate name '{name}'"));
        }
    }

    for field in &schema.fields {
        check_field(schema, field, ctx);
    }

    let mut counts = BTreeSet::new();

    for group in &schema.groups {
        match &group.membership {
            Membership::CountDriven { count_field } => {
                match schema.field(count_field) {
                    Some(f) if f.kind == FieldKind::Count => {}
                    Some(_) => ctx.issue_at(
                        &group.name,
                        format!("count field '{count_field}' must be of kind count"),
                    ),
                    None => ctx.issue_at(
                        &group.name,
                        format!("count field '{count_field}' does not exist"),
                    ),
                }
                if !counts.insert(count_field.as_str()) {
                    ctx.issue_at(
                        &group.name,
                        format!("count field '{count_field}' already drives another group"),
                    );
                }
            }
            Membership::ActionDriven { min_len } => {
                if *min_len > MAX_GROUP_ROWS {
                    ctx.issue_at(
                        &group.name,
                        format!("minimum length {min_len} exceeds {MAX_GROUP_ROWS} rows"),
                    );
                }
            }
        }

        ctx.push(PathSegment::Field(group.name.clone()));
        check_record(&group.row, ctx);
        ctx.pop();
    }
}

fn check_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        Err("name must not be empty")
    } else if name.contains('.') {
        Err("name must not contain '.'")
    } else if name.bytes().all(|b| b.is_ascii_digit()) {
        Err("name must not be all digits")
    } else {
        Ok(())
    }
}

fn check_field(schema: &RecordSchema, field: &FieldSpec, ctx: &mut ValidateContext) {
    let name = field.name.as_str();

    if let FieldKind::Choice { options } = &field.kind
        && options.is_empty()
    {
        ctx.issue_at(name, "choice field has no options".to_string());
    }

    if let Some(default) = &field.default
        && !field.kind.accepts(default)
    {
        ctx.issue_at(name, "default value does not fit the field kind".to_string());
    }

    // derived
    if let Some(derivation) = &field.derived {
        if field.kind != FieldKind::Digits {
            ctx.issue_at(name, "derived fields must be of kind digits".to_string());
        }
        if !field.rules.is_empty() || field.default.is_some() || field.live {
            ctx.issue_at(
                name,
                "derived fields cannot carry rules, defaults or live checks".to_string(),
            );
        }
        for input in derivation.inputs() {
            match schema.field(input) {
                Some(f) if f.is_derived() => ctx.issue_at(
                    name,
                    format!("derivation input '{input}' is itself derived"),
                ),
                Some(f) if !f.kind.is_numeric() => ctx.issue_at(
                    name,
                    format!("derivation input '{input}' is not numeric"),
                ),
                Some(_) => {}
                None => ctx.issue_at(name, format!("derivation input '{input}' does not exist")),
            }
        }
    }

    // rules
    for rule in &field.rules {
        match rule {
            Rule::Required => {}
            Rule::Pattern { .. } => {
                if !field.kind.is_textual() {
                    ctx.issue_at(name, "pattern rule needs a text-like field".to_string());
                }
            }
            Rule::Min { .. } => {
                if !field.kind.is_numeric() {
                    ctx.issue_at(name, "min rule needs a numeric field".to_string());
                }
            }
            Rule::Compare { sibling, .. } => {
                if sibling == name {
                    ctx.issue_at(name, "comparison against itself".to_string());
                    continue;
                }
                match schema.field(sibling) {
                    Some(other) => {
                        let comparable = (field.kind.is_numeric() && other.kind.is_numeric())
                            || (field.kind == FieldKind::Date && other.kind == FieldKind::Date);
                        if !comparable {
                            ctx.issue_at(
                                name,
                                format!("cannot compare with '{sibling}' of a different kind"),
                            );
                        }
                    }
                    None => {
                        ctx.issue_at(
                            name,
                            format!("comparison sibling '{sibling}' does not exist"),
                        );
                    }
                }
            }
        }
    }
}

///
/// TESTS
///
